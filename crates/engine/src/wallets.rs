//! The module contains `Wallet` struct and the types used to address and
//! patch it.

use std::fmt;

use rand::{Rng, distributions::Alphanumeric, thread_rng};
use serde::{Deserialize, Serialize};

use crate::MoneyCents;

/// Length of a generated [`WalletId`].
pub const WALLET_ID_LEN: usize = 8;

/// Opaque wallet identifier.
///
/// Generated ids are [`WALLET_ID_LEN`] characters drawn from `[A-Za-z0-9]`.
/// Ids coming from callers are not validated: an id that was never generated
/// simply does not resolve.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletId(String);

impl WalletId {
    /// Draw a fresh random id.
    pub(crate) fn generate() -> Self {
        let id = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(WALLET_ID_LEN)
            .map(char::from)
            .collect();
        Self(id)
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WalletId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WalletId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle status exposed to readers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    Active,
    Inactive,
}

/// A wallet.
///
/// A wallet is a named balance. It is a passive record: every change goes
/// through a [`WalletPatch`] applied inside a repository transaction, so the
/// fields are only readable from outside the crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    id: WalletId,
    name: String,
    balance: MoneyCents,
    active: bool,
}

impl Wallet {
    pub(crate) fn new(id: WalletId, name: String, balance: MoneyCents, active: bool) -> Self {
        Self {
            id,
            name,
            balance,
            active,
        }
    }

    pub fn id(&self) -> &WalletId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> MoneyCents {
        self.balance
    }

    pub fn status(&self) -> WalletStatus {
        if self.active {
            WalletStatus::Active
        } else {
            WalletStatus::Inactive
        }
    }

    /// Apply every `Set` field of the patch. The id is never touched.
    pub(crate) fn apply(&mut self, patch: WalletPatch) {
        let WalletPatch {
            name,
            balance,
            active,
        } = patch;
        if let Patch::Set(name) = name {
            self.name = name;
        }
        if let Patch::Set(balance) = balance {
            self.balance = balance;
        }
        if let Patch::Set(active) = active {
            self.active = active;
        }
    }
}

/// A single field of a [`WalletPatch`].
///
/// `Keep` leaves the stored value alone, `Set` overwrites it. This keeps "no
/// change" distinct from "set to the zero value".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Set(T),
}

/// Field-level update of a wallet.
///
/// ```rust
/// use engine::{MoneyCents, Patch, WalletPatch};
///
/// let patch = WalletPatch::default().balance(MoneyCents::new(500));
/// assert_eq!(patch.balance, Patch::Set(MoneyCents::new(500)));
/// assert_eq!(patch.name, Patch::Keep);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalletPatch {
    pub name: Patch<String>,
    pub balance: Patch<MoneyCents>,
    pub active: Patch<bool>,
}

impl WalletPatch {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Patch::Set(name.into());
        self
    }

    #[must_use]
    pub fn balance(mut self, balance: MoneyCents) -> Self {
        self.balance = Patch::Set(balance);
        self
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = Patch::Set(active);
        self
    }
}
