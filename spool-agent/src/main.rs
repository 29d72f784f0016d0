use anyhow::Context;
use spool_agent::{
    AgentConfig, InvoiceRenderer, JobProcessor, Poller, QueueClient, init_logger,
};
use spool_printer::DeviceSink;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env is optional)
    dotenv::dotenv().ok();

    // 2. Configuration and logging
    let config = AgentConfig::from_env().context("Invalid configuration")?;
    init_logger(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    tracing::info!(
        printer_id = %config.printer_id,
        base_url = %config.base_url,
        poll_interval_ms = config.poll_interval_ms,
        max_retries = config.max_retries,
        device = ?config.device,
        "Print agent starting"
    );

    // 3. Collaborators
    let client = QueueClient::from_config(&config)?;
    let device = config.printer_device()?;
    if !device.is_online().await {
        tracing::warn!(device = %device.describe(), "Printer not reachable at startup, will retry per job");
    }

    let processor = JobProcessor::new(
        device,
        client.clone(),
        InvoiceRenderer::new(config.paper_width),
        config.retry_policy(),
    );
    let poller = Poller::new(client, processor, config.poll_interval());

    // 4. Run until Ctrl+C / SIGTERM
    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    poller.run(shutdown).await;

    tracing::info!("Print agent stopped");
    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, finishing current cycle...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, finishing current cycle...");
        },
    }

    token.cancel();
}
