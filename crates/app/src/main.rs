use std::sync::Arc;

use engine::{DiscardSink, EventSink, Notifier, WalletManager};
use tokio::{signal, task::JoinHandle};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "walletd={level},server={level},engine={level},relay={level}",
            level = settings.app.level
        ))
        .init();

    let (sink, relay): (Arc<dyn EventSink>, Option<JoinHandle<()>>) = match &settings.nsq {
        Some(nsq) => {
            tracing::info!("Found nsq settings...");
            let publisher = relay::NsqPublisher::new(&nsq.url, &nsq.topic)?;
            let (sink, handle) = relay::spawn(publisher, nsq.queue_capacity);
            (Arc::new(sink), Some(handle))
        }
        None => {
            tracing::info!("no nsq settings, wallet events are discarded");
            (Arc::new(DiscardSink), None)
        }
    };

    let wallets = Notifier::new(WalletManager::default(), sink);
    let listener = tokio::net::TcpListener::bind(settings.listen_addr()).await?;
    server::run_with_listener(wallets, listener, shutdown_signal()).await?;

    // The server owned the last sink; the relay now drains what is queued.
    if let Some(relay) = relay {
        relay.await?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
