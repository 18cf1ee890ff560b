use anyhow::Result;
use clap::Parser;
use colored::*;
use futures_util::StreamExt;
use pagila_agents::{AskService, HandoffController, InMemoryRentalStore, SummaryService};
use pagila_common::ProviderSettings;
use pagila_llm::{AiService, LlmService};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Command-line arguments for the Pagila assistant CLI
#[derive(Parser)]
#[command(
    name = "pagila",
    about = "Pagila Assist - a two-agent DVD rental store assistant"
)]
pub struct Args {
    /// Enable debug mode
    #[clap(short, long)]
    debug: bool,

    /// Model to use for completions
    #[clap(long, default_value = "gpt-4o-mini", short_alias = 'm')]
    model: String,

    /// Ask a single question and stream the answer, bypassing orchestration
    #[clap(long)]
    ask: Option<String>,

    /// Summarize a film from the catalog by id
    #[clap(long)]
    summarize: Option<i32>,
}

/// Stream a one-shot answer to stdout as chunks arrive
async fn run_ask(provider: Arc<dyn AiService>, question: &str) -> Result<()> {
    let service = AskService::new(provider);
    let mut stream = service.ask_question(question).await?;

    print!("{}", "Pagila: ".bright_green().bold());
    io::stdout().flush()?;

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(text) => {
                print!("{}", text);
                io::stdout().flush()?;
            }
            Err(e) => {
                println!();
                println!("{}", format!("Stream error: {}", e).red());
                break;
            }
        }
    }
    println!();
    Ok(())
}

async fn run_summarize(provider: Arc<dyn AiService>, film_id: i32) -> Result<()> {
    let store = Arc::new(InMemoryRentalStore::with_sample_data());
    let service = SummaryService::new(provider, store);
    let summary = service.summarize_film(film_id).await?;

    println!(
        "{} {}",
        "Title:".bright_yellow(),
        summary.title.bright_green().bold()
    );
    println!("{} {}", "Rating:".bright_yellow(), summary.rating.bright_blue());
    println!(
        "{} {}",
        "Recommended:".bright_yellow(),
        if summary.recommended {
            "yes".bright_green()
        } else {
            "no".red()
        }
    );
    Ok(())
}

/// Interactive loop routing each question through the handoff controller
async fn conversation_loop(provider: Arc<dyn AiService>, settings: ProviderSettings) -> Result<()> {
    let store = Arc::new(InMemoryRentalStore::with_sample_data());
    let mut controller = HandoffController::new(provider, store, settings);

    println!(
        "{}",
        "Ask about films and rentals, or anything else. Type 'quit' or 'exit' to stop."
            .bright_green()
    );
    println!();

    loop {
        print!("{}", "You: ".bright_cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit") {
            println!("{}", "Goodbye!".bright_green());
            break;
        }

        let outcome = controller.process_question(input).await;

        if outcome.metadata.fallback_used {
            println!(
                "{} {}",
                format!("{}:", outcome.agent).red().bold(),
                outcome.answer.red()
            );
        } else {
            println!(
                "{} {}",
                format!("{}:", outcome.agent).bright_green().bold(),
                outcome.answer
            );
        }
        println!();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Pagila Assist CLI");

    let settings = ProviderSettings {
        model: args.model,
        ..Default::default()
    };
    let provider: Arc<dyn AiService> = Arc::new(LlmService::new(None, &settings.model));

    info!("Model: {}", settings.model);

    if let Some(question) = &args.ask {
        return run_ask(provider, question).await;
    }
    if let Some(film_id) = args.summarize {
        return run_summarize(provider, film_id).await;
    }

    conversation_loop(provider, settings).await
}
