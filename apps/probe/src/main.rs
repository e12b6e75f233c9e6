use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    ApiKeyChangeHandler, HttpOptionsSource, MemoryOptionList, OptionListTarget, RefreshOutcome,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Runs one API-key change against a live server and prints the resulting
/// option list, the way the documentation page would render it.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server_url: String,
    #[arg(long)]
    api_key: String,
    /// Options present before the change, comma separated.
    #[arg(long, value_delimiter = ',')]
    seed: Vec<String>,
    /// Print the resulting list as a JSON array.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let source = HttpOptionsSource::new(&args.server_url)?;
    info!(endpoint = %source.endpoint(), "probing options endpoint");
    let handler = ApiKeyChangeHandler::new(source, MemoryOptionList::with_options(args.seed));

    let outcome = handler.handle_change(&args.api_key).await;
    let options = handler.target().current_options()?;

    if args.json {
        println!("{}", serde_json::to_string(&options)?);
    } else {
        for option in &options {
            println!("{option}");
        }
    }

    match outcome {
        RefreshOutcome::Applied { .. } => Ok(()),
        RefreshOutcome::Rejected { status } => bail!("server rejected the api key (status {status})"),
        RefreshOutcome::Failed { reason } => bail!("options refresh failed: {reason}"),
        RefreshOutcome::Superseded => bail!("options refresh was superseded"),
    }
}
