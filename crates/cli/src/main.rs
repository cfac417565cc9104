//! Portfolio admin console CLI.
//!
//! # Usage
//!
//! ```bash
//! # List projects
//! folio projects list
//!
//! # Create a certification with its certificate document
//! folio certifications create -f cert.json --attachment certificate.pdf
//!
//! # Search contact responses
//! folio contacts list --page 2 --limit 20 --search acme
//!
//! # Delete several contact responses
//! folio contacts delete-many 65a1 65a2 65a3
//! ```
//!
//! # Environment Variables
//!
//! - `PORTFOLIO_API_URL` - Backend base URL (required)
//! - `PORTFOLIO_API_TOKEN` / `PORTFOLIO_TOKEN_FILE` - Bearer credential
//! - `PORTFOLIO_LOG_JSON` - Emit JSON logs on stderr
//! - `SENTRY_DSN` - Error tracking

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use portfolio_console::{Console, ConsoleConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Portfolio admin console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage portfolio projects
    Projects {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Manage certifications
    Certifications {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Manage contact form responses
    Contacts {
        #[command(subcommand)]
        action: ContactAction,
    },
}

/// Actions shared by projects and certifications.
#[derive(Subcommand)]
enum RecordAction {
    /// List every record
    List,
    /// Create a record from a JSON payload
    Create {
        /// JSON file with the form fields
        #[arg(short, long)]
        file: PathBuf,

        /// Image or document to upload with the record
        #[arg(long)]
        attachment: Option<PathBuf>,
    },
    /// Replace a record's fields
    Update {
        /// Record identifier
        id: String,

        /// JSON file with the form fields
        #[arg(short, long)]
        file: PathBuf,

        /// Replacement image or document
        #[arg(long)]
        attachment: Option<PathBuf>,
    },
    /// Delete a record
    Delete {
        /// Record identifier
        id: String,
    },
}

#[derive(Subcommand)]
enum ContactAction {
    /// List contact responses, one page at a time
    List {
        /// Page number (1-indexed)
        #[arg(long)]
        page: Option<u32>,

        /// Responses per page
        #[arg(long)]
        limit: Option<u32>,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a single response
    Show {
        /// Response identifier
        id: String,
    },
    /// Submit a contact form from a JSON payload
    Submit {
        /// JSON file with the form fields
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete a response
    Delete {
        /// Response identifier
        id: String,
    },
    /// Delete several responses in one request
    DeleteMany {
        /// Response identifiers
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ConsoleConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portfolio_console=info,portfolio_cli=info".into());

    // stdout carries command output, so logs go to stderr
    let json = std::env::var("PORTFOLIO_LOG_JSON")
        .is_ok_and(|value| value == "1" || value.eq_ignore_ascii_case("true"));
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = ConsoleConfig::from_env();
    let sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ConsoleConfig) -> Result<(), CommandError> {
    let console = Console::from_config(config)?;

    match cli.command {
        Commands::Projects { action } => {
            let store = console.projects();
            match action {
                RecordAction::List => commands::projects::list(store).await,
                RecordAction::Create { file, attachment } => {
                    commands::projects::create(store, &file, attachment.as_deref()).await
                }
                RecordAction::Update {
                    id,
                    file,
                    attachment,
                } => {
                    commands::projects::update(store, id.into(), &file, attachment.as_deref())
                        .await
                }
                RecordAction::Delete { id } => commands::projects::delete(store, id.into()).await,
            }
        }
        Commands::Certifications { action } => {
            let store = console.certifications();
            match action {
                RecordAction::List => commands::certifications::list(store).await,
                RecordAction::Create { file, attachment } => {
                    commands::certifications::create(store, &file, attachment.as_deref()).await
                }
                RecordAction::Update {
                    id,
                    file,
                    attachment,
                } => {
                    commands::certifications::update(store, id.into(), &file, attachment.as_deref())
                        .await
                }
                RecordAction::Delete { id } => {
                    commands::certifications::delete(store, id.into()).await
                }
            }
        }
        Commands::Contacts { action } => {
            let store = console.contacts();
            match action {
                ContactAction::List {
                    page,
                    limit,
                    search,
                } => commands::contacts::list(store, page, limit, search).await,
                ContactAction::Show { id } => commands::contacts::show(store, id.into()).await,
                ContactAction::Submit { file } => commands::contacts::submit(store, &file).await,
                ContactAction::Delete { id } => commands::contacts::delete(store, id.into()).await,
                ContactAction::DeleteMany { ids } => {
                    let ids: Vec<_> = ids.into_iter().map(Into::into).collect();
                    commands::contacts::delete_many(store, &ids).await
                }
            }
        }
    }
}
