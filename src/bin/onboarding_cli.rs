//! Onboarding Command Line Interface
//!
//! Drives the onboarding wizard from a shell. State lives in a JSON file so
//! a session can span several invocations.
//!
//! # Usage
//!
//! ```bash
//! # Start a client with two forms
//! onboarding_cli new --forms INVESTOR_PROFILE,SFC
//!
//! # Show a step
//! onboarding_cli read --client <uuid> --form SFC --step 1
//!
//! # Answer one question
//! onboarding_cli write --client <uuid> --form SFC --step 1 \
//!     --question step1.accountRegistration.rrName --answer '"Pat Advisor"'
//!
//! # Where to go next
//! onboarding_cli next --client <uuid>
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use ob_onboarding::{
    init_tracing, InMemoryStore, OnboardingConfig, OnboardingService, ServiceError,
};
use ob_onboarding_types::{ClientCursor, ClientOnboarding, FormType, QuestionId, WriteRequest};
use serde::Serialize;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "onboarding_cli")]
#[command(version = "0.1.0")]
#[command(about = "Step through regulatory onboarding forms one question at a time")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// State file holding every client's onboarding
    #[arg(long, global = true, env = "ONBOARDING_STATE", default_value = "onboarding-state.json")]
    state: PathBuf,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a client onboarding with the selected forms
    New {
        /// Comma-separated form types (INVESTOR_PROFILE, SFC, BAIODF, BAIV_506C)
        #[arg(long, value_delimiter = ',', value_parser = parse_form, required = true)]
        forms: Vec<FormType>,
    },

    /// Add a form to an existing client
    Select {
        #[arg(long)]
        client: Uuid,
        #[arg(long, value_parser = parse_form)]
        form: FormType,
    },

    /// Show one step
    Read {
        #[arg(long)]
        client: Uuid,
        #[arg(long, value_parser = parse_form)]
        form: FormType,
        #[arg(long)]
        step: u8,
    },

    /// Answer one question
    Write {
        #[arg(long)]
        client: Uuid,
        #[arg(long, value_parser = parse_form)]
        form: FormType,
        #[arg(long)]
        step: u8,
        /// Question id, e.g. step1.accountRegistration.rrName
        #[arg(long)]
        question: String,
        /// Answer as JSON (quote strings: '"text"')
        #[arg(long)]
        answer: String,
        /// Question the caller believes is current
        #[arg(long)]
        cursor: Option<String>,
    },

    /// Route to the next pending form
    Next {
        #[arg(long)]
        client: Uuid,
    },

    /// Status and resume route of every selected form
    Summary {
        #[arg(long)]
        client: Uuid,
    },
}

fn parse_form(raw: &str) -> Result<FormType, String> {
    raw.parse::<FormType>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match OnboardingConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    match run(cli.command, &cli.state, cli.format, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let failure = e
                .downcast_ref::<ServiceError>()
                .and_then(ServiceError::validation_failure);
            match (failure, cli.format) {
                (Some(failure), _) => print(&failure, cli.format),
                (None, OutputFormat::Json) => {
                    println!("{}", serde_json::json!({ "error": e.to_string() }))
                }
                (None, OutputFormat::Pretty) => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Commands,
    state: &Path,
    format: OutputFormat,
    config: OnboardingConfig,
) -> anyhow::Result<()> {
    let store = Arc::new(load_state(state).await?);
    let service = OnboardingService::new(store.clone(), config);

    match command {
        Commands::New { forms } => {
            let client = service.create_client(forms).await?;
            print(&client, format);
        }
        Commands::Select { client, form } => {
            service.select_form(client, form).await?;
            print(&service.summary(client).await?, format);
        }
        Commands::Read { client, form, step } => {
            print(&service.read_step(client, form, step).await?, format);
        }
        Commands::Write {
            client,
            form,
            step,
            question,
            answer,
            cursor,
        } => {
            let answer: serde_json::Value = serde_json::from_str(&answer)
                .with_context(|| format!("--answer is not valid JSON: {answer}"))?;
            let request = WriteRequest {
                question_id: QuestionId::new(question),
                answer,
                client_cursor: cursor.map(|id| ClientCursor {
                    current_question_id: QuestionId::new(id),
                }),
            };
            print(&service.write_step(client, form, step, request).await?, format);
        }
        Commands::Next { client } => {
            print(&service.next_route(client).await?, format);
        }
        Commands::Summary { client } => {
            print(&service.summary(client).await?, format);
        }
    }

    save_state(state, &store.export().await).await
}

async fn load_state(path: &Path) -> anyhow::Result<InMemoryStore> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(InMemoryStore::new());
    }
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let clients: Vec<ClientOnboarding> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(InMemoryStore::with_clients(clients))
}

async fn save_state(path: &Path, clients: &[ClientOnboarding]) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(clients)?;
    tokio::fs::write(path, raw)
        .await
        .with_context(|| format!("writing {}", path.display()))
}

fn print<T: Serialize>(value: &T, format: OutputFormat) {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(value),
        OutputFormat::Pretty => serde_json::to_string_pretty(value),
    };
    match rendered {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("error: {e}"),
    }
}
