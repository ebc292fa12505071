//! Post-commit notifications.
//!
//! [`Notifier`] wraps a [`WalletManager`] and, once a mutating operation has
//! returned successfully, serialises a [`WalletEvent`] and hands it to an
//! [`EventSink`]. The manager call (and so the repository lock) is already
//! over at that point. Publishing is best effort: failures are logged and the
//! caller only ever sees the manager's own result.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::{MemoryStore, MoneyCents, ResultEngine, Wallet, WalletId, WalletManager, WalletStore};

/// Error returned by an [`EventSink`].
#[derive(Error, Debug)]
#[error("{0}")]
pub struct SinkError(pub String);

/// Destination of serialised events, e.g. a message broker topic.
pub trait EventSink: Send + Sync {
    fn write(&self, data: &[u8]) -> Result<(), SinkError>;
}

/// Sink used when no broker is configured: events are only traced.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardSink;

impl EventSink for DiscardSink {
    fn write(&self, data: &[u8]) -> Result<(), SinkError> {
        tracing::debug!("discarding event {}", String::from_utf8_lossy(data));
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EventKind {
    #[serde(rename = "Wallet_Created")]
    Created,
    #[serde(rename = "Wallet_Deposited")]
    Deposited,
    #[serde(rename = "Wallet_Withdrawn")]
    Withdrawn,
    #[serde(rename = "Wallet_Transfered")]
    Transferred,
    #[serde(rename = "Wallet_Deleted")]
    Deactivated,
    #[serde(rename = "Wallet_Renamed")]
    Renamed,
}

/// Wire format of a published event: `{"type": "...", "amount": <cents>}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WalletEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub amount: MoneyCents,
}

impl WalletEvent {
    pub fn new(kind: EventKind, amount: MoneyCents) -> Self {
        Self { kind, amount }
    }
}

/// [`WalletManager`] decorator publishing an event after every successful
/// mutation.
pub struct Notifier<S: WalletStore = MemoryStore> {
    manager: WalletManager<S>,
    sink: Arc<dyn EventSink>,
}

impl<S: WalletStore> Clone for Notifier<S> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S: WalletStore> Notifier<S> {
    pub fn new(manager: WalletManager<S>, sink: Arc<dyn EventSink>) -> Self {
        Self { manager, sink }
    }

    pub fn create(&self, name: &str) -> ResultEngine<Wallet> {
        let wallet = self.manager.create(name)?;
        self.send_event(EventKind::Created, MoneyCents::ZERO);
        Ok(wallet)
    }

    pub fn by_id(&self, id: &WalletId) -> ResultEngine<Wallet> {
        self.manager.by_id(id)
    }

    pub fn list(&self) -> Vec<Wallet> {
        self.manager.list()
    }

    pub fn increase_balance_by(&self, id: &WalletId, amount: MoneyCents) -> ResultEngine<()> {
        self.manager.increase_balance_by(id, amount)?;
        self.send_event(EventKind::Deposited, amount);
        Ok(())
    }

    pub fn decrease_balance_by(&self, id: &WalletId, amount: MoneyCents) -> ResultEngine<()> {
        self.manager.decrease_balance_by(id, amount)?;
        self.send_event(EventKind::Withdrawn, amount);
        Ok(())
    }

    pub fn transfer_balance(
        &self,
        from_id: &WalletId,
        to_id: &WalletId,
        amount: MoneyCents,
    ) -> ResultEngine<()> {
        self.manager.transfer_balance(from_id, to_id, amount)?;
        self.send_event(EventKind::Transferred, amount);
        Ok(())
    }

    pub fn deactivate_by_id(&self, id: &WalletId) -> ResultEngine<()> {
        self.manager.deactivate_by_id(id)?;
        self.send_event(EventKind::Deactivated, MoneyCents::ZERO);
        Ok(())
    }

    pub fn update_name(&self, id: &WalletId, name: &str) -> ResultEngine<()> {
        self.manager.update_name(id, name)?;
        self.send_event(EventKind::Renamed, MoneyCents::ZERO);
        Ok(())
    }

    fn send_event(&self, kind: EventKind, amount: MoneyCents) {
        let event = WalletEvent::new(kind, amount);
        let bytes = match serde_json::to_vec(&event) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!("failed to serialize event {kind:?} ({amount}): {err}");
                return;
            }
        };
        match self.sink.write(&bytes) {
            Ok(()) => tracing::debug!("event {kind:?} ({amount}) sent"),
            Err(err) => tracing::error!("event {kind:?} ({amount}) not sent: {err}"),
        }
    }
}
