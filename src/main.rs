use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use transport_quote::{
    app::{persist_draft, RequestWorkflow, SubmitOutcome},
    domain::{RequestForm, TransportRequest},
    infra::{NotificationBus, TransportApiClient},
    util::{
        config::AppConfig,
        persistence::{clear_draft, load_draft},
        version::{version_label, APP_NAME},
    },
};

#[derive(Debug, Parser)]
#[command(
    name = "transport-quote",
    version,
    about = "Estimate, validate and submit transport requests"
)]
struct Cli {
    /// JSON file with the transport request. Falls back to the saved draft.
    request: Option<PathBuf>,

    /// Send the request to the backend once it validates.
    #[arg(long)]
    submit: bool,

    /// Keep the request as the local draft.
    #[arg(long)]
    save_draft: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "transport_quote=info",
        1 => "transport_quote=debug",
        _ => "transport_quote=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .init();
}

fn load_request(path: Option<&PathBuf>) -> Result<TransportRequest> {
    match path {
        Some(path) => {
            let data = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("{} is not a valid transport request", path.display()))
        }
        None => load_draft().context("no request file given and no saved draft found"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("{APP_NAME} {}", version_label());

    let config = AppConfig::from_env()?;
    let form = RequestForm::from_draft(load_request(cli.request.as_ref())?);

    match form.estimate() {
        Some(estimate) => {
            println!("Estimated cost: {}", estimate.estimated_cost);
            println!("  {}", estimate.rationale());
        }
        None => println!("Fill in a quantity to see an estimate."),
    }

    if cli.save_draft {
        persist_draft(&form);
    }

    if !cli.submit {
        let errors = transport_quote::validate(&form.request);
        if errors.is_valid() {
            println!("Request is ready to submit.");
        } else {
            for (field, message) in errors.iter() {
                println!("  {field}: {message}");
            }
        }
        return Ok(());
    }

    let client = TransportApiClient::new(&config)?;
    let workflow = RequestWorkflow::new(client, NotificationBus::default(), &config);

    match workflow.submit(&form).await? {
        SubmitOutcome::Submitted(done) => {
            if let Some(record) = &done.submitted {
                println!("Submitted request {} ({})", record.id, record.status.label());
            }
            if let Err(err) = clear_draft() {
                debug!("draft not cleared: {err}");
            }
            Ok(())
        }
        SubmitOutcome::Invalid(rejected) => {
            for (field, message) in rejected.errors.iter() {
                println!("  {field}: {message}");
            }
            bail!("request has {} validation error(s)", rejected.errors.len())
        }
        SubmitOutcome::Failed(failed) => {
            bail!(failed
                .submit_error
                .unwrap_or_else(|| "submission failed".to_string()))
        }
    }
}
