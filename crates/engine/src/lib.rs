//! In-memory wallet ledger.
//!
//! The crate is split in three layers:
//!
//! - [`Repository`] owns the wallets behind one read-write lock and exposes
//!   write access only through [`Repository::transaction`];
//! - [`WalletManager`] enforces the business rules (positive amounts,
//!   non-negative balances, no self-transfer, non-empty names);
//! - [`Notifier`] decorates the manager and publishes an event to an
//!   [`EventSink`] after each successful mutation.
//!
//! ```rust
//! use engine::{MoneyCents, WalletManager};
//!
//! let manager = WalletManager::default();
//! let alice = manager.create("alice")?;
//! let bob = manager.create("bob")?;
//! manager.increase_balance_by(alice.id(), MoneyCents::new(100_00))?;
//! manager.transfer_balance(alice.id(), bob.id(), MoneyCents::new(40_00))?;
//!
//! assert_eq!(manager.by_id(alice.id())?.balance(), MoneyCents::new(60_00));
//! assert_eq!(manager.by_id(bob.id())?.balance(), MoneyCents::new(40_00));
//! # Ok::<(), engine::EngineError>(())
//! ```

pub use error::EngineError;
pub use manager::WalletManager;
pub use money::MoneyCents;
pub use notify::{DiscardSink, EventKind, EventSink, Notifier, SinkError, WalletEvent};
pub use repository::{MemoryStore, Repository, Transaction, WalletStore};
pub use wallets::{Patch, WALLET_ID_LEN, Wallet, WalletId, WalletPatch, WalletStatus};

mod error;
mod manager;
mod money;
mod notify;
mod repository;
mod wallets;

pub type ResultEngine<T> = Result<T, EngineError>;
