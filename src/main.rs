use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use ragchain::{
    ChatMessage, RagChain, RagOutput, archive::VectorStoreRetriever, config::store::RagConfig,
    get_rag_chain, utils::log::Logger,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Ask questions about a document collection, with follow-ups.
#[derive(Parser, Debug)]
#[command(name = "ragchain", version, about, long_about = None)]
struct Cli {
    /// Question to answer (starts interactive mode if omitted)
    question: Option<String>,

    /// Model to answer with, overrides `llm.model` from the config
    #[arg(short, long)]
    model: Option<String>,

    /// Configuration file path, created with defaults when missing
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Print the retrieved documents along with the answer
    #[arg(long)]
    show_context: bool,

    /// Print the whole chain output as JSON (one-shot mode only)
    #[arg(long)]
    json: bool,

    /// Check that the vector collection is reachable and exit
    #[arg(long)]
    check: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    Logger::init(Some(Logger::level_from_verbosity(cli.verbose, cli.quiet)));

    let config = RagConfig::read(cli.config.clone())
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    if cli.check {
        let retriever = VectorStoreRetriever::from_config(&config.retrieval, &config.llm)?;
        retriever.health_check().await?;
        println!("{} collection `{}` is ready", "ok".green(), config.retrieval.collection);
        return Ok(());
    }

    let model = cli.model.unwrap_or_else(|| config.llm.model.clone());
    let chain = get_rag_chain(&model, &config)?;

    match cli.question {
        Some(question) => {
            let output = chain.invoke(&question, &[]).await?;
            match cli.json {
                true => println!("{}", serde_json::to_string_pretty(&output)?),
                false => print_output(&output, cli.show_context),
            }
            Ok(())
        }
        None => {
            if cli.json {
                log::warn!("--json only applies to a one-shot question, ignoring it");
            }
            repl(&chain, cli.show_context).await
        }
    }
}

async fn repl(chain: &RagChain, show_context: bool) -> anyhow::Result<()> {
    let mut history: Vec<ChatMessage> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("{}", "ask a question, /clear to forget the conversation, /exit to quit".dimmed());

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/exit" | "/quit" => break,
            "/clear" => {
                history.clear();
                log::info!("history cleared");
                continue;
            }
            question => match chain.invoke(question, &history).await {
                Ok(output) => {
                    print_output(&output, show_context);
                    history.push(ChatMessage::user(question));
                    history.push(ChatMessage::assistant(output.answer));
                }
                Err(why) => log::error!("{why:#}"),
            },
        }
    }

    Ok(())
}

fn print_output(output: &RagOutput, show_context: bool) {
    if show_context {
        for (i, document) in output.context.iter().enumerate() {
            println!(
                "{} {}\n{}\n",
                format!("[{}]", i + 1).cyan(),
                document.id.dimmed(),
                document.page_content
            );
        }
    }

    println!("{}", output.answer);
}
