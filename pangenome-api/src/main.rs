//! # Pangenome CLI Entry Point
//!
//! The main executable for the `pangenome` tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Installs the log subscriber and parses arguments using [`cli::Cli`].
//! 2. **Configuration**: Merges the config file, flags and environment into a `ClientConfig`.
//! 3. **Execution**: Dispatches the chosen operation through `PanGenomeClient`.
//! 4. **Presentation**: Prints the result as pretty JSON, or the error to standard error.

mod cli;
mod formatter;


use clap::Parser;
use cli::{Cli, Commands};
use formatter::{FormattedString, GenericError};
use pangenome_api_core::{CallError, PanGenomeClient, transport::Transport};
use serde::Serialize;
use serde_json::Value;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let config = match args.client_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!(
                "{}",
                FormattedString::from(GenericError("Invalid configuration", format!("{err:#}")))
            );
            process::exit(2);
        }
    };

    tracing::debug!(url = %config.url, service_version = ?config.service_version, "resolved configuration");

    let client = match PanGenomeClient::from_config(&config) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    };

    match run(&client, args.command).await {
        Ok(value) => println!("{}", FormattedString::from(value)),
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

/// Why a command produced no output.
#[derive(Debug)]
enum RunError {
    Call(CallError),
    /// A decoded record could not be turned back into JSON for printing.
    Render(serde_json::Error),
}

impl From<CallError> for RunError {
    fn from(err: CallError) -> Self {
        RunError::Call(err)
    }
}

impl From<serde_json::Error> for RunError {
    fn from(err: serde_json::Error) -> Self {
        RunError::Render(err)
    }
}

async fn run<T: Transport>(
    client: &PanGenomeClient<T>,
    command: Commands,
) -> Result<Value, RunError> {
    let value = match command {
        Commands::SearchOrthologs { body } => {
            to_json(&client.search_orthologs_from_pangenome(&body, None).await?)?
        }
        Commands::SearchGenomes { body } => {
            to_json(&client.search_genomes_from_pangenome(&body, None).await?)?
        }
        Commands::SearchFamilies { body } => {
            to_json(&client.search_families_from_comparison_genome(&body, None).await?)?
        }
        Commands::SearchFunctions { body } => {
            to_json(&client.search_functions_from_comparison_genome(&body, None).await?)?
        }
        Commands::SearchComparisonGenomes { body } => to_json(
            &client
                .search_comparison_genome_from_comparison_genome(&body, None)
                .await?,
        )?,
        Commands::Summary { body } => {
            to_json(&client.compute_summary_from_pangenome(&body, None).await?)?
        }
        Commands::Status => Value::Object(client.status(None).await?),
    };
    Ok(value)
}

fn to_json<R: Serialize>(record: &R) -> Result<Value, RunError> {
    Ok(serde_json::to_value(record)?)
}
