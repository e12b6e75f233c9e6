use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/options.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateKey {
        api_key: String,
        #[arg(long)]
        label: Option<String>,
    },
    RevokeKey {
        api_key: String,
    },
    Grant {
        api_key: String,
        /// One or more dataset names.
        #[arg(required = true)]
        datasets: Vec<String>,
    },
    RevokeGrant {
        api_key: String,
        dataset: String,
    },
    /// Prints what the options endpoint would return for a key.
    ListOptions {
        api_key: String,
    },
    ListGrants,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateKey { api_key, label } => {
            let key_id = storage.create_api_key(&api_key, label.as_deref()).await?;
            println!("created key_id={}", key_id.0);
        }
        Command::RevokeKey { api_key } => {
            if !storage.revoke_api_key(&api_key).await? {
                bail!("api key '{api_key}' is not registered");
            }
            println!("revoked {api_key}");
        }
        Command::Grant { api_key, datasets } => {
            for dataset in &datasets {
                storage.grant_dataset(&api_key, dataset).await?;
            }
            println!("granted {} dataset(s) to {api_key}", datasets.len());
        }
        Command::RevokeGrant { api_key, dataset } => {
            if !storage.revoke_dataset(&api_key, &dataset).await? {
                bail!("'{api_key}' has no grant for '{dataset}'");
            }
            println!("revoked {dataset} from {api_key}");
        }
        Command::ListOptions { api_key } => {
            let Some(record) = storage.api_key_status(&api_key).await? else {
                bail!("api key '{api_key}' is not registered");
            };
            if record.revoked {
                println!("# key is revoked; the server will answer 403");
            }
            for dataset in storage.datasets_for_key(&api_key).await? {
                println!("{dataset}");
            }
        }
        Command::ListGrants => {
            for grant in storage.list_grants().await? {
                println!("{}\t{}", grant.api_key, grant.dataset);
            }
        }
    }

    Ok(())
}
