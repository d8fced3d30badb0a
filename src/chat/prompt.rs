mod builder;
mod template;

pub use builder::{CHAT_HISTORY, CONTEXT, INPUT, PromptConfig};
pub use template::{PromptError, TemplateVariables, template_variables};

use crate::chat::{ChatMessage, MessageRole};

/// One entry of a [`ChatPromptTemplate`].
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    /// A message whose content is a `{variable}` template.
    Message(MessageRole, String),
    /// Expands to the message list supplied under this name.
    Placeholder(String),
}

impl PromptPart {
    pub fn system(template: impl Into<String>) -> Self {
        Self::Message(MessageRole::System, template.into())
    }

    pub fn user(template: impl Into<String>) -> Self {
        Self::Message(MessageRole::User, template.into())
    }

    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::Placeholder(name.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatPromptTemplate {
    parts: Vec<PromptPart>,
}

impl ChatPromptTemplate {
    pub fn from_messages(parts: impl IntoIterator<Item = PromptPart>) -> Self {
        Self {
            parts: parts.into_iter().collect(),
        }
    }

    pub fn parts(&self) -> &[PromptPart] {
        &self.parts
    }

    /// Renders every part in order, expanding placeholders.
    pub fn format_messages(
        &self,
        variables: &TemplateVariables,
    ) -> Result<Vec<ChatMessage>, PromptError> {
        let mut messages = Vec::with_capacity(self.parts.len());

        for part in &self.parts {
            match part {
                PromptPart::Message(role, template) => messages.push(ChatMessage::new(
                    *role,
                    variables.substitute_template(template)?,
                )),
                PromptPart::Placeholder(name) => {
                    messages.extend_from_slice(variables.messages(name)?);
                }
            }
        }

        Ok(messages)
    }

    /// Variables referenced by the message parts, in order of appearance.
    pub fn input_variables(&self) -> Result<Vec<String>, PromptError> {
        let mut names = Vec::new();

        for part in &self.parts {
            if let PromptPart::Message(_, template) = part {
                for name in template_variables(template)? {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }

        Ok(names)
    }

    /// Like [`Self::format_messages`], but the system parts leading the
    /// template become the preamble. Placeholder messages keep their place
    /// in the conversation whatever their role.
    pub fn format_prompt(&self, variables: &TemplateVariables) -> Result<PromptValue, PromptError> {
        let leading = self
            .parts
            .iter()
            .take_while(|part| matches!(part, PromptPart::Message(MessageRole::System, _)))
            .count();

        let preamble = Self::from_messages(self.parts[..leading].iter().cloned())
            .format_messages(variables)?;
        let conversation = Self::from_messages(self.parts[leading..].iter().cloned())
            .format_messages(variables)?;

        PromptValue::new(preamble, conversation)
    }
}

/// A rendered prompt in the shape a completion request takes.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptValue {
    pub preamble: Option<String>,
    pub chat_history: Vec<ChatMessage>,
    pub prompt: ChatMessage,
}

impl PromptValue {
    /// Leading system messages are joined into the preamble, the trailing
    /// user message becomes the prompt and everything in between is history.
    pub fn from_messages(mut messages: Vec<ChatMessage>) -> Result<Self, PromptError> {
        let leading = messages
            .iter()
            .take_while(|message| message.role == MessageRole::System)
            .count();
        let conversation = messages.split_off(leading);

        Self::new(messages, conversation)
    }

    fn new(
        system: Vec<ChatMessage>,
        mut conversation: Vec<ChatMessage>,
    ) -> Result<Self, PromptError> {
        let prompt = match conversation.pop() {
            Some(message) if message.role == MessageRole::User => message,
            _ => return Err(PromptError::NoUserMessage),
        };

        let preamble = match system.is_empty() {
            true => None,
            false => Some(
                system
                    .into_iter()
                    .map(|message| message.content)
                    .collect::<Vec<String>>()
                    .join("\n\n"),
            ),
        };

        Ok(Self {
            preamble,
            chat_history: conversation,
            prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qa_template() -> ChatPromptTemplate {
        ChatPromptTemplate::from_messages([
            PromptPart::system("You answer questions."),
            PromptPart::system("Context: {context}"),
            PromptPart::placeholder("chat_history"),
            PromptPart::user("{input}"),
        ])
    }

    #[test]
    fn placeholder_expands_in_order() {
        let history = vec![
            ChatMessage::user("who wrote dune?"),
            ChatMessage::assistant("Frank Herbert."),
        ];
        let vars = TemplateVariables::new()
            .with("context", "doc")
            .with("input", "when?")
            .with_messages("chat_history", &history);

        let messages = qa_template().format_messages(&vars).unwrap();
        assert_eq!(
            messages,
            vec![
                ChatMessage::system("You answer questions."),
                ChatMessage::system("Context: doc"),
                ChatMessage::user("who wrote dune?"),
                ChatMessage::assistant("Frank Herbert."),
                ChatMessage::user("when?"),
            ]
        );
    }

    #[test]
    fn prompt_value_splits_preamble_history_and_prompt() {
        let history = vec![
            ChatMessage::user("who wrote dune?"),
            ChatMessage::assistant("Frank Herbert."),
        ];
        let vars = TemplateVariables::new()
            .with("context", "doc")
            .with("input", "when?")
            .with_messages("chat_history", &history);

        let value = qa_template().format_prompt(&vars).unwrap();
        assert_eq!(
            value.preamble.as_deref(),
            Some("You answer questions.\n\nContext: doc")
        );
        assert_eq!(value.chat_history, history);
        assert_eq!(value.prompt, ChatMessage::user("when?"));
    }

    #[test]
    fn system_turns_in_history_stay_in_place() {
        let history = vec![
            ChatMessage::user("q1"),
            ChatMessage::system("operator note"),
            ChatMessage::assistant("a1"),
        ];
        let vars = TemplateVariables::new()
            .with("context", "doc")
            .with("input", "q2")
            .with_messages("chat_history", &history);

        let value = qa_template().format_prompt(&vars).unwrap();
        assert_eq!(
            value.preamble.as_deref(),
            Some("You answer questions.\n\nContext: doc")
        );
        assert_eq!(value.chat_history, history);
        assert_eq!(value.prompt, ChatMessage::user("q2"));
    }

    #[test]
    fn history_leading_with_system_is_not_preamble() {
        let template = ChatPromptTemplate::from_messages([
            PromptPart::placeholder("chat_history"),
            PromptPart::user("{input}"),
        ]);
        let history = vec![ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let vars = TemplateVariables::new()
            .with("input", "q")
            .with_messages("chat_history", &history);

        let value = template.format_prompt(&vars).unwrap();
        assert_eq!(value.preamble, None);
        assert_eq!(value.chat_history, history);
    }

    #[test]
    fn rendered_list_splits_on_leading_system_only() {
        let value = PromptValue::from_messages(vec![
            ChatMessage::system("sys"),
            ChatMessage::user("q1"),
            ChatMessage::system("note"),
            ChatMessage::user("q2"),
        ])
        .unwrap();

        assert_eq!(value.preamble.as_deref(), Some("sys"));
        assert_eq!(
            value.chat_history,
            vec![ChatMessage::user("q1"), ChatMessage::system("note")]
        );
    }

    #[test]
    fn input_variables_skip_escapes_and_placeholders() {
        let template = ChatPromptTemplate::from_messages([
            PromptPart::system("Literal {{context}} and {topic}"),
            PromptPart::placeholder("chat_history"),
            PromptPart::user("{input} about {topic}"),
        ]);

        assert_eq!(template.input_variables().unwrap(), vec!["topic", "input"]);
    }

    #[test]
    fn empty_history_leaves_only_the_prompt() {
        let vars = TemplateVariables::new()
            .with("context", "")
            .with("input", "hello")
            .with_messages("chat_history", &[]);

        let value = qa_template().format_prompt(&vars).unwrap();
        assert!(value.chat_history.is_empty());
        assert_eq!(value.prompt.content, "hello");
    }

    #[test]
    fn missing_history_is_an_error() {
        let vars = TemplateVariables::new()
            .with("context", "")
            .with("input", "hello");

        assert_eq!(
            qa_template().format_prompt(&vars),
            Err(PromptError::MissingPlaceholder("chat_history".to_string()))
        );
    }

    #[test]
    fn prompt_must_end_with_user_message() {
        let template = ChatPromptTemplate::from_messages([
            PromptPart::system("sys"),
            PromptPart::placeholder("chat_history"),
        ]);
        let history = vec![ChatMessage::assistant("hi")];
        let vars = TemplateVariables::new().with_messages("chat_history", &history);

        assert_eq!(
            template.format_prompt(&vars),
            Err(PromptError::NoUserMessage)
        );
    }
}
