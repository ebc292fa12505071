//! Wallet storage and the transaction primitive.
//!
//! [`Repository`] owns a [`WalletStore`] behind a single read-write lock.
//! Reads take the lock shared. Every write sequence runs inside
//! [`Repository::transaction`], which holds the lock exclusively for the
//! whole closure and hands it a [`Transaction`] handle: the handle is the only
//! way to create or update wallets.
//!
//! A transaction journals the pre-image of every wallet it touches. If the
//! closure returns an error (or panics) the journal is replayed before the
//! lock is released, so the store never keeps half of a write sequence.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use crate::{EngineError, MoneyCents, ResultEngine, Wallet, WalletId, WalletPatch};

/// Storage backend of the repository.
///
/// Implementations only provide keyed primitives; id generation, lookup
/// errors, patching and rollback live in [`Transaction`].
pub trait WalletStore: Send + Sync {
    /// Return a copy of the wallet stored under `id`.
    fn get(&self, id: &WalletId) -> Option<Wallet>;

    fn contains(&self, id: &WalletId) -> bool {
        self.get(id).is_some()
    }

    /// Insert or overwrite a wallet. Overwriting keeps its listing position.
    fn insert(&mut self, wallet: Wallet) -> ResultEngine<()>;

    /// Remove a wallet. Only used to undo a creation on rollback.
    fn remove(&mut self, id: &WalletId) -> ResultEngine<Option<Wallet>>;

    /// Every wallet, in insertion order.
    fn list(&self) -> Vec<Wallet>;
}

/// In-memory store keeping insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    wallets: IndexMap<WalletId, Wallet>,
}

impl WalletStore for MemoryStore {
    fn get(&self, id: &WalletId) -> Option<Wallet> {
        self.wallets.get(id).cloned()
    }

    fn contains(&self, id: &WalletId) -> bool {
        self.wallets.contains_key(id)
    }

    fn insert(&mut self, wallet: Wallet) -> ResultEngine<()> {
        self.wallets.insert(wallet.id().clone(), wallet);
        Ok(())
    }

    fn remove(&mut self, id: &WalletId) -> ResultEngine<Option<Wallet>> {
        Ok(self.wallets.shift_remove(id))
    }

    fn list(&self) -> Vec<Wallet> {
        self.wallets.values().cloned().collect()
    }
}

#[derive(Debug)]
pub struct Repository<S: WalletStore = MemoryStore> {
    store: RwLock<S>,
}

impl Default for Repository<MemoryStore> {
    fn default() -> Self {
        Self::new(MemoryStore::default())
    }
}

impl<S: WalletStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Return the wallet with the given id, active or not.
    ///
    /// Outside a transaction the value may already be stale, but it is never
    /// a partially applied write.
    pub fn by_id(&self, id: &WalletId) -> ResultEngine<Wallet> {
        let store = self.read();
        lookup(&*store, id)
    }

    /// Return every wallet, in creation order, inactive ones included.
    pub fn all(&self) -> Vec<Wallet> {
        self.read().list()
    }

    /// Run `f` with exclusive access to the store.
    ///
    /// The lock is held until `f` returns and released on every path. When
    /// `f` fails, all its writes are undone and the error is forwarded as is.
    pub fn transaction<T, F>(&self, f: F) -> ResultEngine<T>
    where
        F: FnOnce(&mut Transaction<'_, S>) -> ResultEngine<T>,
    {
        let mut store = self.write();
        let mut tx = Transaction::new(&mut *store);
        let result = f(&mut tx);
        if result.is_ok() {
            tx.commit();
        }
        result
    }

    // A poisoned lock only means a closure panicked; its transaction was
    // rolled back while unwinding, so the data is consistent.
    fn read(&self) -> RwLockReadGuard<'_, S> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, S> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lookup<S: WalletStore + ?Sized>(store: &S, id: &WalletId) -> ResultEngine<Wallet> {
    store
        .get(id)
        .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
}

enum Undo {
    Restore(Wallet),
    Discard(WalletId),
}

/// Handle given to a [`Repository::transaction`] closure.
///
/// It borrows the locked store, so it cannot outlive the lock.
pub struct Transaction<'a, S: WalletStore> {
    store: &'a mut S,
    journal: Vec<Undo>,
    committed: bool,
}

impl<'a, S: WalletStore> Transaction<'a, S> {
    fn new(store: &'a mut S) -> Self {
        Self {
            store,
            journal: Vec::new(),
            committed: false,
        }
    }

    /// Create a wallet with a fresh id.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        balance: MoneyCents,
        active: bool,
    ) -> ResultEngine<Wallet> {
        let id = loop {
            let id = WalletId::generate();
            if !self.store.contains(&id) {
                break id;
            }
        };
        let wallet = Wallet::new(id, name.into(), balance, active);
        self.journal.push(Undo::Discard(wallet.id().clone()));
        self.store.insert(wallet.clone())?;
        Ok(wallet)
    }

    /// Return the wallet with the given id as seen by this transaction.
    pub fn by_id(&self, id: &WalletId) -> ResultEngine<Wallet> {
        lookup(&*self.store, id)
    }

    /// Apply `patch` to the wallet with the given id. No business rule is
    /// checked here.
    pub fn update_by_id(&mut self, id: &WalletId, patch: WalletPatch) -> ResultEngine<()> {
        let previous = self.by_id(id)?;
        let mut wallet = previous.clone();
        wallet.apply(patch);
        self.journal.push(Undo::Restore(previous));
        self.store.insert(wallet)
    }

    fn commit(mut self) {
        self.committed = true;
        self.journal.clear();
    }

    fn rollback(&mut self) {
        let undone = self.journal.len();
        while let Some(undo) = self.journal.pop() {
            let result = match undo {
                Undo::Restore(wallet) => self.store.insert(wallet),
                Undo::Discard(id) => self.store.remove(&id).map(|_| ()),
            };
            if let Err(err) = result {
                tracing::error!("failed to undo wallet write: {err}");
            }
        }
        if undone > 0 {
            tracing::debug!("rolled back {undone} wallet write(s)");
        }
    }
}

impl<S: WalletStore> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, panic::AssertUnwindSafe};

    use super::*;
    use crate::WalletStatus;

    fn create(repo: &Repository, name: &str, balance: i64, active: bool) -> Wallet {
        repo.transaction(|tx| tx.create(name, MoneyCents::new(balance), active))
            .unwrap()
    }

    #[test]
    fn create_keeps_given_fields() {
        let repo = Repository::default();
        let wallet = create(&repo, "test_name", 9999, true);

        assert_eq!(wallet.name(), "test_name");
        assert_eq!(wallet.balance(), MoneyCents::new(9999));
        assert_eq!(wallet.status(), WalletStatus::Active);
        assert_eq!(repo.by_id(wallet.id()).unwrap(), wallet);
    }

    #[test]
    fn create_generates_distinct_ids() {
        let repo = Repository::default();
        let ids: HashSet<_> = (0..500)
            .map(|i| create(&repo, &format!("w{i}"), 0, true).id().clone())
            .collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn update_by_id_only_touches_set_fields() {
        let repo = Repository::default();
        let old = create(&repo, "test_name", 9999, true);

        repo.transaction(|tx| {
            tx.update_by_id(old.id(), WalletPatch::default().name("test_namepostfix"))
        })
        .unwrap();

        let updated = repo.by_id(old.id()).unwrap();
        assert_eq!(updated.name(), "test_namepostfix");
        assert_eq!(updated.balance(), MoneyCents::new(9999));
        assert_eq!(updated.status(), WalletStatus::Active);
    }

    #[test]
    fn update_by_id_unknown_fails() {
        let repo = Repository::default();
        let err = repo
            .transaction(|tx| {
                tx.update_by_id(&WalletId::from("missing"), WalletPatch::default().active(false))
            })
            .unwrap_err();
        assert_eq!(err, EngineError::KeyNotFound("missing".to_string()));
    }

    #[test]
    fn by_id_found_among_many() {
        let repo = Repository::default();
        create(&repo, "test_name", 9999, true);
        let expected = create(&repo, "test_name_2", 8888, true);

        assert_eq!(repo.by_id(expected.id()).unwrap(), expected);
    }

    #[test]
    fn by_id_not_found() {
        let repo = Repository::default();
        create(&repo, "test_name", 9999, true);

        assert!(matches!(
            repo.by_id(&WalletId::from("unknown")),
            Err(EngineError::KeyNotFound(_))
        ));
    }

    #[test]
    fn all_keeps_insertion_order_and_inactive_wallets() {
        let repo = Repository::default();
        let a = create(&repo, "a", 0, true);
        let b = create(&repo, "b", 0, false);
        let c = create(&repo, "c", 0, true);

        repo.transaction(|tx| tx.update_by_id(a.id(), WalletPatch::default().name("a2")))
            .unwrap();

        let names: Vec<_> = repo.all().iter().map(|w| w.name().to_string()).collect();
        assert_eq!(names, vec!["a2", "b", "c"]);
        assert_eq!(repo.all()[1].status(), WalletStatus::Inactive);
        assert_eq!(repo.all()[2].id(), c.id());
        assert_eq!(repo.all()[1].id(), b.id());
    }

    #[test]
    fn failed_transaction_rolls_back_every_write() {
        let repo = Repository::default();
        let wallet = create(&repo, "cash", 100, true);

        let err = repo
            .transaction(|tx| {
                tx.update_by_id(wallet.id(), WalletPatch::default().balance(MoneyCents::ZERO))?;
                tx.update_by_id(wallet.id(), WalletPatch::default().name("renamed"))?;
                tx.create("ghost", MoneyCents::new(5), true)?;
                tx.update_by_id(&WalletId::from("missing"), WalletPatch::default())
            })
            .unwrap_err();

        assert!(matches!(err, EngineError::KeyNotFound(_)));
        assert_eq!(repo.all(), vec![wallet]);
    }

    #[test]
    fn panicking_transaction_rolls_back_and_releases_lock() {
        let repo = Repository::default();
        let wallet = create(&repo, "cash", 100, true);

        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            repo.transaction(|tx| -> ResultEngine<()> {
                tx.update_by_id(wallet.id(), WalletPatch::default().balance(MoneyCents::ZERO))?;
                panic!("closure blew up");
            })
        }));
        assert!(outcome.is_err());

        assert_eq!(repo.by_id(wallet.id()).unwrap().balance(), MoneyCents::new(100));
        // The lock is usable again for writers.
        create(&repo, "after", 0, true);
        assert_eq!(repo.all().len(), 2);
    }

    #[test]
    fn transaction_sees_its_own_writes() {
        let repo = Repository::default();
        let wallet = create(&repo, "cash", 100, true);

        let seen = repo
            .transaction(|tx| {
                tx.update_by_id(wallet.id(), WalletPatch::default().balance(MoneyCents::new(7)))?;
                Ok(tx.by_id(wallet.id())?.balance())
            })
            .unwrap();
        assert_eq!(seen, MoneyCents::new(7));
    }
}
