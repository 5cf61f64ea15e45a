mod fixture;

use clap::{Parser, Subcommand};
use consent_core::{ClientSettings, ConsentError, Privacy};
use fixture::{load_items, FixtureConsentService};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "consent-cli", version)]
struct Cli {
    /// TOML file with tenant, auth and context tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tenant URL, overrides the config file and CONSENT_TENANT_URL
    #[arg(long)]
    tenant_url: Option<String>,

    /// Access token, overrides the config file and CONSENT_ACCESS_TOKEN
    #[arg(long)]
    access_token: Option<String>,

    /// Subject the calls are made for
    #[arg(long)]
    subject_id: Option<String>,

    /// JSON document answering service calls
    #[arg(long)]
    fixture: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Assess whether the requested items may be used
    Assess {
        /// JSON list of request items
        #[arg(long)]
        items: PathBuf,
    },
    /// Fetch consent metadata for the requested items
    Metadata {
        /// JSON list of request items
        #[arg(long)]
        items: PathBuf,
    },
}

/// Settings from the config file, then the environment, then flags
async fn settings(cli: &Cli) -> consent_core::Result<ClientSettings> {
    let mut settings = match &cli.config {
        Some(path) => ClientSettings::load(path).await?,
        None => ClientSettings::default(),
    };
    settings.apply_env_overrides();
    apply_flags(cli, &mut settings);
    Ok(settings)
}

fn apply_flags(cli: &Cli, settings: &mut ClientSettings) {
    if let Some(url) = &cli.tenant_url {
        settings.tenant.tenant_url = Some(url.clone());
    }
    if let Some(token) = &cli.access_token {
        settings.auth.access_token = Some(token.clone());
    }
    if let Some(subject) = &cli.subject_id {
        settings.context.subject_id = Some(subject.clone());
    }
}

fn print<T: Serialize>(outcome: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}

/// Run the command, returning whether the outcome was successful
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let settings = settings(&cli).await?;
    execute(cli, settings).await
}

async fn execute(cli: Cli, settings: ClientSettings) -> anyhow::Result<bool> {
    let service = FixtureConsentService::load(&cli.fixture).await?;
    let privacy = Privacy::with_identity(settings.into_identity()?, service);

    match cli.command {
        Commands::Assess { items } => {
            let items = load_items(&items).await?;
            let outcome = privacy.assess(&items).await;
            info!(status = ?outcome.status, "Assessment finished");
            print(&outcome)?;
            Ok(!outcome.is_error())
        }
        Commands::Metadata { items } => {
            let items = load_items(&items).await?;
            let outcome = privacy.get_consent_metadata(&items).await;
            info!(status = ?outcome.status, "Metadata lookup finished");
            print(&outcome)?;
            Ok(!outcome.is_error())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            let code = match e.downcast_ref::<ConsentError>() {
                Some(ConsentError::Configuration(_)) => 2,
                _ => 1,
            };
            std::process::exit(code);
        }
    }
}
