//! JSON bodies of the wallet HTTP API.
//!
//! Amounts and balances are integer minor units (cents).

use serde::{Deserialize, Serialize};

pub mod wallet {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum WalletStatus {
        Active,
        Inactive,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletNew {
        pub name: String,
    }

    /// Read projection of a wallet.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct WalletView {
        pub id: String,
        pub name: String,
        pub balance_minor: i64,
        pub status: WalletStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletRename {
        pub name: String,
    }
}

pub mod transaction {
    use super::*;

    /// Body of a deposit or a withdrawal.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AmountChange {
        /// Must be > 0.
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub to_wallet_id: String,
        /// Must be > 0.
        pub amount_minor: i64,
    }
}
