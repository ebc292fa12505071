//! Delivery of wallet events to NSQ.
//!
//! The engine's [`Notifier`](engine::Notifier) writes events synchronously to
//! an [`EventSink`](engine::EventSink). [`ChannelSink`] only queues them; a
//! background task started by [`spawn`] drains the queue and publishes each
//! event through [`NsqPublisher`], so a slow broker never holds up a wallet
//! operation.

use thiserror::Error;
use tokio::task::JoinHandle;

pub use nsq::NsqPublisher;
pub use sink::{ChannelSink, channel};

mod nsq;
mod sink;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid relay config: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("nsqd rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Start the relay task.
///
/// The task stops once every clone of the returned sink has been dropped and
/// the queued events have been published.
pub fn spawn(publisher: NsqPublisher, capacity: usize) -> (ChannelSink, JoinHandle<()>) {
    let (sink, mut receiver) = channel(capacity);
    let handle = tokio::spawn(async move {
        tracing::info!("relaying wallet events to topic {}", publisher.topic());
        while let Some(event) = receiver.recv().await {
            if let Err(err) = publisher.publish(event).await {
                tracing::error!("event not published to nsq: {err}");
            }
        }
        tracing::info!("event relay stopped");
    });
    (sink, handle)
}
