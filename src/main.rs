//! websum CLI - summarise web pages
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use websum::agent::{self, SummaryService};
use websum::{extract, pipeline, scraper, Config, LengthTier, Storage, SummaryRequest};

#[derive(Parser)]
#[command(name = "websum")]
#[command(author, version, about = "Summarise web pages with an AI service or a local fallback", long_about = None)]
struct Cli {
    /// Path to a websum.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a webpage by URL or local HTML file
    Summarise {
        /// URL or path to summarise
        source: String,
        /// Summary length: short, medium or long
        #[arg(short, long)]
        length: Option<LengthTier>,
        /// Skip the AI service and use extractive summarisation
        #[arg(long)]
        no_ai: bool,
        /// Show raw extracted text instead of summary
        #[arg(long)]
        raw: bool,
        /// Do not record this summary in history
        #[arg(long)]
        no_history: bool,
    },
    /// Check whether the AI service is reachable
    Status,
    /// List recent summaries
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// Delete all stored summaries
    ClearHistory {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summarise {
            source,
            length,
            no_ai,
            raw,
            no_history,
        } => {
            let config = load_config(cli.config.as_deref())?;
            println!("Fetching: {}", source);

            let document = scraper::load_document(&source).await?;
            let content = extract::extract_content(&document);

            if raw {
                println!("\n=== {} ===\n", content.title);
                println!("{}", content.text);
                println!(
                    "\n--- Extracted {} characters, {} words ---",
                    content.text.chars().count(),
                    content.word_count
                );
                return Ok(());
            }

            let tier = length.unwrap_or(config.summary.length);
            let prefer_ai = config.summary.prefer_ai && !no_ai;
            let service = if prefer_ai { build_service(&config) } else { None };
            let request = SummaryRequest::new(tier)
                .with_prefer_ai(prefer_ai)
                .with_timeout(config.generation_timeout());

            println!("Summarising {} words ({})...\n", content.word_count, tier);
            let result = pipeline::summarize_content(&content, &request, service.as_deref()).await?;

            println!("=== {} ===", content.title.bold());
            if !content.metadata.domain.is_empty() {
                println!("{}", content.metadata.domain.dimmed());
            }
            println!("[{}]\n", result.method.label().cyan());
            println!("{}\n", result.text);
            println!(
                "{}",
                format!(
                    "Summary: {} words | Original: ~{} words",
                    result.word_count(),
                    content.word_count
                )
                .dimmed()
            );

            if config.summary.save_history && !no_history {
                let saved = Storage::open(&config.storage.path, config.storage.history_limit)
                    .and_then(|storage| storage.record(&content, &result));
                if let Err(e) = saved {
                    warn!(error = %e, "failed to save summary to history");
                }
            }
        }
        Commands::Status => {
            let config = load_config(cli.config.as_deref())?;
            let status = match agent::service_from_config(&config) {
                Ok(service) => service.probe().await.map(|models| (service.name().to_string(), models)),
                Err(e) => Err(e),
            };

            match status {
                Ok((name, models)) if models.is_empty() => {
                    println!("{} AI Ready via {} (no models found)", "●".green(), name);
                }
                Ok((name, models)) => {
                    let shown: Vec<&str> = models
                        .iter()
                        .take(2)
                        .map(|m| m.split(':').next().unwrap_or(m))
                        .collect();
                    println!("{} AI Ready via {} ({})", "●".green(), name, shown.join(", "));
                }
                Err(e) => {
                    println!("{} AI Offline - using fallback", "●".red());
                    println!("  {}", e.to_string().dimmed());
                }
            }
        }
        Commands::History { limit } => {
            let config = load_config(cli.config.as_deref())?;
            let storage = Storage::open(&config.storage.path, config.storage.history_limit)?;
            let entries = storage.list(limit)?;

            if entries.is_empty() {
                println!("No summaries in history yet.");
            } else {
                println!("Recent summaries ({} of {}):\n", entries.len(), storage.count());
                for entry in entries {
                    println!("📄 {}", entry.title.bold());
                    println!(
                        "   {} • {} • {} words • {}",
                        entry.url,
                        entry.created_at.format("%Y-%m-%d %H:%M"),
                        entry.word_count,
                        entry.method.label()
                    );
                    println!("   {}\n", preview(&entry.summary, 200));
                }
            }
        }
        Commands::ClearHistory { yes } => {
            let config = load_config(cli.config.as_deref())?;
            let confirmed = yes
                || dialoguer::Confirm::new()
                    .with_prompt("Clear all summary history? This cannot be undone.")
                    .default(false)
                    .interact()?;

            if confirmed {
                let storage = Storage::open(&config.storage.path, config.storage.history_limit)?;
                let removed = storage.clear()?;
                println!("History cleared ({} entries removed).", removed);
            } else {
                println!("History kept.");
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "websum", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Config::load().context("failed to load config"),
    }
}

/// The configured service, or None when it cannot be built
fn build_service(config: &Config) -> Option<Box<dyn SummaryService>> {
    match agent::service_from_config(config) {
        Ok(service) => Some(service),
        Err(e) => {
            warn!(error = %e, "AI service unavailable, using extractive summary");
            None
        }
    }
}

/// First `max` characters of `text`, with an ellipsis when cut
fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &flat[..idx]),
        None => flat,
    }
}
