//! # Block Ingest Node
//!
//! Reads one JSON request per line from stdin and writes one response
//! envelope per line to stdout. Logs go to stderr.
//!
//! ```text
//! {"method":"addBlock","params":{"chainId":1,"blockHeader":"<hex>"},"id":7}
//! {"id":7,"code":"SUCCESS","msg":null,"data":{"value":true}}
//! ```

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, NodeRuntime};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(config: &NodeConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("failed to load configuration")?;
    init_logging(&config)?;

    info!(
        chains = ?config.chain_ids,
        window_size = config.window_size,
        drift_bound_secs = config.drift_bound_secs,
        "Starting block ingest node"
    );
    let runtime = NodeRuntime::new(config)
        .await
        .context("failed to register chains")?;

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        served = runtime.serve(stdin, stdout) => {
            let served = served.context("request stream failed")?;
            info!(served, "Input closed");
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
        }
    }

    runtime.shutdown();
    Ok(())
}
