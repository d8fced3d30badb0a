use std::collections::HashMap;

use crate::chat::ChatMessage;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("template references `{{{0}}}` but no value was supplied")]
    MissingVariable(String),

    #[error("no messages were supplied for placeholder `{0}`")]
    MissingPlaceholder(String),

    #[error("malformed template: {0}")]
    Malformed(String),

    #[error("rendered prompt does not end with a user message")]
    NoUserMessage,
}

/// Values substituted into templates, plus message lists for placeholders.
#[derive(Debug, Default, Clone)]
pub struct TemplateVariables<'a> {
    values: HashMap<&'a str, &'a str>,
    messages: HashMap<&'a str, &'a [ChatMessage]>,
}

impl<'a> TemplateVariables<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'a str, value: &'a str) -> Self {
        self.values.insert(name, value);
        self
    }

    pub fn with_messages(mut self, name: &'a str, messages: &'a [ChatMessage]) -> Self {
        self.messages.insert(name, messages);
        self
    }

    pub fn messages(&self, name: &str) -> Result<&'a [ChatMessage], PromptError> {
        self.messages
            .get(name)
            .copied()
            .ok_or_else(|| PromptError::MissingPlaceholder(name.to_string()))
    }

    /// Replaces every `{name}` in `s`. `{{` and `}}` produce literal braces.
    pub fn substitute_template(&self, s: &str) -> Result<String, PromptError> {
        let mut out = String::with_capacity(s.len());

        for segment in parse(s)? {
            match segment {
                Segment::Text(text) => out.push_str(&text),
                Segment::Variable(name) => {
                    let value = self
                        .values
                        .get(name.as_str())
                        .ok_or_else(|| PromptError::MissingVariable(name.clone()))?;
                    out.push_str(value);
                }
            }
        }

        Ok(out)
    }
}

/// Names referenced by `s`, in order. Escaped `{{name}}` is not a reference.
pub fn template_variables(s: &str) -> Result<Vec<String>, PromptError> {
    Ok(parse(s)?
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Variable(name) => Some(name),
            Segment::Text(_) => None,
        })
        .collect())
}

enum Segment {
    Text(String),
    Variable(String),
}

fn parse(s: &str) -> Result<Vec<Segment>, PromptError> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                text.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                text.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => {
                            return Err(PromptError::Malformed(format!(
                                "unterminated `{{{name}`"
                            )));
                        }
                        Some(c) => name.push(c),
                    }
                }

                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                segments.push(Segment::Variable(name.trim().to_string()));
            }
            '}' => return Err(PromptError::Malformed("single `}` in template".to_string())),
            c => text.push(c),
        }
    }

    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_named_variables() {
        let vars = TemplateVariables::new()
            .with("input", "what is rust?")
            .with("context", "a language");

        assert_eq!(
            vars.substitute_template("Context: {context}\nQ: { input }").unwrap(),
            "Context: a language\nQ: what is rust?"
        );
    }

    #[test]
    fn values_are_not_rescanned() {
        let vars = TemplateVariables::new().with("context", "fn main() { {input} }");
        assert_eq!(
            vars.substitute_template("{context}").unwrap(),
            "fn main() { {input} }"
        );
    }

    #[test]
    fn doubled_braces_are_literal() {
        let vars = TemplateVariables::new();
        assert_eq!(
            vars.substitute_template("json: {{\"a\": 1}}").unwrap(),
            "json: {\"a\": 1}"
        );
    }

    #[test]
    fn missing_and_malformed_are_errors() {
        let vars = TemplateVariables::new();
        assert_eq!(
            vars.substitute_template("Context: {context}"),
            Err(PromptError::MissingVariable("context".to_string()))
        );
        assert!(matches!(
            vars.substitute_template("oops {input"),
            Err(PromptError::Malformed(_))
        ));
        assert!(matches!(
            vars.substitute_template("oops }"),
            Err(PromptError::Malformed(_))
        ));
    }

    #[test]
    fn escaped_names_are_not_variables() {
        assert_eq!(
            template_variables("Context: {context}, Q: {input}").unwrap(),
            vec!["context", "input"]
        );
        assert!(template_variables("Context: {{context}}").unwrap().is_empty());
        assert!(template_variables("Context: {context").is_err());
    }

    #[test]
    fn placeholders_must_be_supplied() {
        let history = vec![ChatMessage::user("hi")];
        let vars = TemplateVariables::new().with_messages("chat_history", &history);

        assert_eq!(vars.messages("chat_history").unwrap().len(), 1);
        assert_eq!(
            vars.messages("scratchpad"),
            Err(PromptError::MissingPlaceholder("scratchpad".to_string()))
        );
    }
}
