use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use carbot_agent::{ChatSession, HttpToolBridge, OpenAiCompatClient, GENERIC_APOLOGY};
use carbot_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "carbot",
    about = "CarBot interactive booking assistant",
    long_about = "Chat with CarBot to check availability and book car service appointments. \
                  Requires a running booking backend and an LLM API key.",
    after_help = "Examples:\n  carbot\n  carbot --backend-url http://127.0.0.1:8000\n  carbot --model gpt-4o-mini"
)]
pub struct Cli {
    #[arg(long, help = "Path to the carbot.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, help = "Booking backend base URL override")]
    backend_url: Option<String>,
    #[arg(long, help = "Completion model override")]
    model: Option<String>,
}

impl Cli {
    fn into_load_options(self) -> LoadOptions {
        LoadOptions {
            config_path: self.config,
            overrides: ConfigOverrides {
                backend_base_url: self.backend_url,
                llm_model: self.model,
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }
}

/// The literal inputs that end the session, matched case-insensitively.
fn is_termination(input: &str) -> bool {
    matches!(input.to_ascii_lowercase().as_str(), "quit" | "exit" | "bye")
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.into_load_options())?;
    init_logging(&config);

    let completion = OpenAiCompatClient::new(&config.llm)
        .context("set llm.api_key in carbot.toml or CARBOT_LLM_API_KEY to start a chat")?;
    let bridge = HttpToolBridge::new(&config.backend)
        .context("could not build the booking backend client")?;
    let mut session = ChatSession::new(Arc::new(completion), Arc::new(bridge), &config.agent);

    tracing::info!(
        event_name = "cli.session.started",
        backend = %config.backend.base_url,
        model = %config.llm.model,
        "chat session ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_termination(input) {
            println!("\nCarBot: Thank you! Come back again. Goodbye!");
            break;
        }

        match session.chat(input).await {
            Ok(reply) => println!("\nCarBot: {reply}\n"),
            Err(error) => {
                // Infrastructure detail stays in the log; the user gets the
                // generic apology only.
                tracing::error!(
                    event_name = "cli.turn_failed",
                    error = %error,
                    "chat turn failed"
                );
                println!("\nCarBot: {GENERIC_APOLOGY}\n");
            }
        }
    }

    Ok(())
}
