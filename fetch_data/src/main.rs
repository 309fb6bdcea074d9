//! One-shot download of the sample database.
//!
//! Run from repo root: `cargo run -p fetch-data`
//! Writes `server/data.json` unless `--out` says otherwise.

use clap::Parser;
use std::path::PathBuf;

const DEFAULT_URL: &str = "https://github.com/typicode/jsonplaceholder/raw/master/data.json";

#[derive(Debug, Parser)]
#[command(name = "fetch-data", about = "Download the sample JSON database")]
struct Args {
    /// Source URL of the database document.
    #[arg(long, env = "FETCH_DATA_URL", default_value = DEFAULT_URL)]
    url: String,

    /// Destination file.
    #[arg(long, env = "FETCH_DATA_OUT", default_value = "server/data.json")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fetch_data=info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!(url = %args.url, "downloading");
    let document: serde_json::Value = reqwest::get(&args.url)
        .await?
        .error_for_status()?
        .json()
        .await?;

    let resources = document
        .as_object()
        .ok_or("downloaded document is not a JSON object")?;
    for (name, value) in resources {
        let count = value.as_array().map(Vec::len).unwrap_or(1);
        tracing::info!(resource = %name, records = count, "received");
    }

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&args.out, serde_json::to_string_pretty(&document)?).await?;
    tracing::info!(out = %args.out.display(), "written");
    Ok(())
}
