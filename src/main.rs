//! One-shot chat completion client
//!
//! Sends a single chat completion request and prints the answer. The
//! `context` subcommand runs the merchant context pipeline over a text file.

mod cli;
mod context;
mod core;
mod models;

use crate::cli::Command;
use crate::context::agent::ContextCore;
use crate::context::ContextError;
use crate::context::pipeline::{PipelineReport, run_pipeline};
use crate::context::store::ContextStore;
use crate::core::config::Config;
use crate::core::constants::diagnostic;
use crate::core::invoker::{Invoker, write_diagnostic};
use crate::core::logging::init_logging;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Variables already in the environment win over .env
    dotenv::dotenv().ok();

    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Run with --help for usage.");
            return ExitCode::FAILURE;
        }
    };

    if command == Command::Help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.log_level);
    debug!(?config, "Configuration loaded");

    match command {
        Command::Invoke { model, prompt } => invoke(&config, model, prompt).await,
        Command::Context { path, question } => {
            run_context(&config, &path, question.as_deref()).await
        }
        Command::Help => ExitCode::SUCCESS,
    }
}

async fn invoke(config: &Config, model: Option<String>, prompt: Option<String>) -> ExitCode {
    let mut stderr = io::stderr();

    let mut invoker = match Invoker::from_config(config) {
        Ok(invoker) => invoker,
        Err(e) => {
            write_diagnostic(&mut stderr, diagnostic::INVOKE, &e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(model) = model {
        invoker = invoker.with_model(model);
    }
    if let Some(prompt) = prompt {
        invoker = invoker.with_prompt(prompt);
    }
    debug!(model = invoker.model(), prompt = invoker.prompt(), "Invoking");

    match invoker.run(&mut io::stdout(), &mut stderr).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

async fn run_context(config: &Config, path: &Path, question: Option<&str>) -> ExitCode {
    match context_pipeline(config, path, question).await {
        Ok(report) => {
            info!(
                merchant = %report.merchant,
                stage = %report.context.lifecycle_stage,
                saved_to = ?report.saved_to,
                salesforce_chars = report.salesforce_fields.len(),
                answered = report.answer.is_some(),
                "Context pipeline finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            write_diagnostic(&mut io::stderr(), diagnostic::CONTEXT, &e);
            ExitCode::FAILURE
        }
    }
}

async fn context_pipeline(
    config: &Config,
    path: &Path,
    question: Option<&str>,
) -> Result<PipelineReport, ContextError> {
    let text = tokio::fs::read_to_string(path).await?;
    let core = ContextCore::from_config(config)?;
    let store = ContextStore::new(&config.store_dir);
    info!(file = %path.display(), store = %store.dir().display(), "Running context pipeline");
    run_pipeline(&core, &store, &text, question, &mut io::stdout()).await
}

/// Print help message
fn print_help() {
    println!("completion-invoker v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage:");
    println!("  completion-invoker [--model <name>] [--prompt <text>]");
    println!("  completion-invoker context <file> [--question <text>]");
    println!();
    println!("Options:");
    println!("  --model <name>      Model for the one-shot request");
    println!("  --prompt <text>     Prompt for the one-shot request");
    println!("  --question <text>   Business question asked after condensing <file>");
    println!("  --help              Display this help message");
    println!();
    println!("Environment variables (a .env file is loaded first):");
    println!("  OPENAI_API_KEY  - Completion service API key (required)");
    println!("  OPENAI_BASE_URL - API base URL (default: https://api.openai.com/v1)");
    println!("  CONFIG_PATH     - TOML config file (default: config.toml, optional)");
    println!("  LOG_LEVEL       - Logging level (default: info)");
    println!("  RUST_LOG        - Full tracing filter, overrides LOG_LEVEL");
    println!();
    println!("Exit status is 0 on success and 1 on any failure.");
}
