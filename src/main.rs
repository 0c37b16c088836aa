use anyhow::Result;
use log::error;
use std::time::Duration;
use tokio::sync::broadcast;

use iec61850_bridge::options::Options;

#[tokio::main]
async fn main() -> Result<()> {
    let options = Options::new();

    // Create a channel for shutdown signaling
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    // Handle Ctrl+C
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
        let _ = shutdown_tx_clone.send(());
    });

    // Optional runtime limit
    if let Some(seconds) = options.runtime {
        let shutdown_tx_clone = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            let _ = shutdown_tx_clone.send(());
        });
    }

    if let Err(e) = iec61850_bridge::app(shutdown_rx, options).await {
        error!("Application error: {}", e);
        std::process::exit(255);
    }

    Ok(())
}
