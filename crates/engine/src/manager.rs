//! Business rules on top of the [`Repository`].
//!
//! Every operation validates its arguments first, without locking, then runs
//! all of its reads and writes inside one repository transaction. Wallets are
//! always fetched again inside that transaction, never reused from an earlier
//! read.

use std::sync::Arc;

use crate::{
    EngineError, MemoryStore, MoneyCents, Repository, ResultEngine, Wallet, WalletId, WalletPatch,
    WalletStore, repository::Transaction,
};

const DEFAULT_BALANCE: MoneyCents = MoneyCents::ZERO;
const DEFAULT_ACTIVE: bool = true;

#[derive(Debug)]
pub struct WalletManager<S: WalletStore = MemoryStore> {
    repository: Arc<Repository<S>>,
}

impl<S: WalletStore> Clone for WalletManager<S> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl Default for WalletManager<MemoryStore> {
    fn default() -> Self {
        Self::new(Arc::new(Repository::default()))
    }
}

impl<S: WalletStore> WalletManager<S> {
    pub fn new(repository: Arc<Repository<S>>) -> Self {
        Self { repository }
    }

    /// Create a new active wallet with a zero balance.
    pub fn create(&self, name: &str) -> ResultEngine<Wallet> {
        let name = normalize_name(name)?;
        let wallet = self
            .repository
            .transaction(|tx| tx.create(name, DEFAULT_BALANCE, DEFAULT_ACTIVE))?;
        tracing::debug!("created wallet {}", wallet.id());
        Ok(wallet)
    }

    /// Return a wallet, even if deactivated.
    pub fn by_id(&self, id: &WalletId) -> ResultEngine<Wallet> {
        self.repository.by_id(id)
    }

    /// Return every wallet, deactivated ones included.
    pub fn list(&self) -> Vec<Wallet> {
        self.repository.all()
    }

    /// Deposit `amount` (must be > 0) into the wallet.
    pub fn increase_balance_by(&self, id: &WalletId, amount: MoneyCents) -> ResultEngine<()> {
        let amount = amount.require_positive()?;
        self.repository.transaction(|tx| {
            let wallet = tx.by_id(id)?;
            let new_balance = wallet.balance().checked_add(amount).ok_or_else(|| {
                EngineError::InvalidAmount(format!("balance overflow on wallet {id}"))
            })?;
            set_balance(tx, id, new_balance)
        })
    }

    /// Withdraw `amount` (must be > 0) from the wallet. The balance may reach
    /// zero but never go below it.
    pub fn decrease_balance_by(&self, id: &WalletId, amount: MoneyCents) -> ResultEngine<()> {
        let amount = amount.require_positive()?;
        self.repository.transaction(|tx| {
            let wallet = tx.by_id(id)?;
            let new_balance = debit(&wallet, amount)?;
            set_balance(tx, id, new_balance)
        })
    }

    /// Move `amount` (must be > 0) between two distinct wallets.
    ///
    /// Debit and credit happen in the same transaction: either both are
    /// stored or neither is.
    pub fn transfer_balance(
        &self,
        from_id: &WalletId,
        to_id: &WalletId,
        amount: MoneyCents,
    ) -> ResultEngine<()> {
        if from_id == to_id {
            return Err(EngineError::SameWallet);
        }
        let amount = amount.require_positive()?;
        self.repository.transaction(|tx| {
            let from = tx.by_id(from_id)?;
            let to = tx.by_id(to_id)?;

            let from_balance = debit(&from, amount)?;
            let to_balance = to.balance().checked_add(amount).ok_or_else(|| {
                EngineError::InvalidAmount(format!("balance overflow on wallet {to_id}"))
            })?;

            set_balance(tx, from_id, from_balance)?;
            set_balance(tx, to_id, to_balance)?;
            tracing::debug!("transferred {amount} from {from_id} to {to_id}");
            Ok(())
        })
    }

    /// Soft-delete a wallet. It stays readable and listable.
    pub fn deactivate_by_id(&self, id: &WalletId) -> ResultEngine<()> {
        self.repository.transaction(|tx| {
            tx.by_id(id)?;
            update(tx, id, WalletPatch::default().active(false))
        })
    }

    pub fn update_name(&self, id: &WalletId, name: &str) -> ResultEngine<()> {
        let name = normalize_name(name)?;
        self.repository
            .transaction(|tx| tx.update_by_id(id, WalletPatch::default().name(name)))
    }
}

fn normalize_name(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn debit(wallet: &Wallet, amount: MoneyCents) -> ResultEngine<MoneyCents> {
    match wallet.balance().checked_sub(amount) {
        Some(balance) if !balance.is_negative() => Ok(balance),
        _ => Err(EngineError::InsufficientFunds(format!(
            "wallet {} has {}, needs {amount}",
            wallet.id(),
            wallet.balance()
        ))),
    }
}

fn set_balance<S: WalletStore>(
    tx: &mut Transaction<'_, S>,
    id: &WalletId,
    balance: MoneyCents,
) -> ResultEngine<()> {
    update(tx, id, WalletPatch::default().balance(balance))
}

/// Write to a wallet already fetched in this transaction. A failure here is
/// the store's fault, not the caller's.
fn update<S: WalletStore>(
    tx: &mut Transaction<'_, S>,
    id: &WalletId,
    patch: WalletPatch,
) -> ResultEngine<()> {
    tx.update_by_id(id, patch).map_err(|err| match err {
        EngineError::Storage(_) => err,
        other => EngineError::Storage(format!("cannot update wallet {id}: {other}")),
    })
}
