use std::io::Read;

use anyhow::Context;
use stroom::client::WebSocketQueryClient;
use stroom::logging;
use tracing::info;

/// Runs one streaming query against the configured environment and prints
/// each raw result message on its own line.
///
/// Usage: `stroom <query-json> [resource-path]`, or pipe the query on stdin.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;

    let mut args = std::env::args().skip(1);
    let query = match args.next() {
        Some(query) => query,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read query from stdin")?;
            buffer
        }
    };
    let resource_path = args.next().unwrap_or_else(|| "events".to_string());

    info!("Running streaming query against '{resource_path}'");
    let client = WebSocketQueryClient::from_config();
    let results = client.query_web_socket(query.trim(), &resource_path).await?;

    for message in results {
        println!("{message}");
    }

    Ok(())
}
