//! list_remote.rs
//! Inspect what the remote store actually holds: the first few public ids
//! per folder and resource type, plus an optional targeted prefix probe
//! (e.g. --probe 250 to see every stored variant of file 250).

use anyhow::Result;
use clap::Parser;
use portfolio_media::config::RemoteCredentials;
use portfolio_media::reconcile::FOLDERS;
use portfolio_media::remote::{RemoteStore, ResourceKind};
use portfolio_media::util::env as env_util;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "list_remote", about = "List stored public ids per folder")]
struct Cli {
    /// How many entries to show per folder/resource-type section
    #[arg(long, default_value_t = 10)]
    limit: usize,
    /// Optional file-number probe, listed under every folder
    #[arg(long)]
    probe: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_util::bootstrap_cli("list_remote");
    let cli = Cli::parse();

    let creds = RemoteCredentials::from_env()?;
    let store = RemoteStore::new(creds);

    for folder in FOLDERS {
        for kind in ResourceKind::ALL {
            println!("=== {folder}/ ({}) ===", kind.as_str());
            match store.list_page(&format!("{folder}/"), kind, None).await {
                Ok(page) => {
                    println!(
                        "Found {} entries (showing first {}):",
                        page.resources.len(),
                        cli.limit
                    );
                    for entry in page.resources.iter().take(cli.limit) {
                        println!("  - {}", entry.public_id);
                    }
                }
                Err(err) => warn!(folder, kind = kind.as_str(), error = %err, "listing failed"),
            }
            println!();
        }
    }

    if let Some(number) = cli.probe {
        println!("=== probe: {number} ===");
        for folder in FOLDERS {
            for kind in ResourceKind::ALL {
                let prefix = format!("{folder}/{number}");
                match store.list_page(&prefix, kind, None).await {
                    Ok(page) if !page.resources.is_empty() => {
                        println!("Found in {folder}/ ({}):", kind.as_str());
                        for entry in &page.resources {
                            println!("  - {}", entry.public_id);
                        }
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(prefix = %prefix, error = %err, "probe failed");
                    }
                }
            }
        }
    }

    Ok(())
}
