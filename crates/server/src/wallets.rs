//! Wallets API endpoints.

use api_types::{
    transaction::{AmountChange, TransferNew},
    wallet::{WalletNew, WalletRename, WalletStatus, WalletView},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{MoneyCents, Wallet, WalletId};

use crate::{ServerError, server::ServerState};

fn view(wallet: &Wallet) -> WalletView {
    WalletView {
        id: wallet.id().to_string(),
        name: wallet.name().to_string(),
        balance_minor: wallet.balance().cents(),
        status: match wallet.status() {
            engine::WalletStatus::Active => WalletStatus::Active,
            engine::WalletStatus::Inactive => WalletStatus::Inactive,
        },
    }
}

pub async fn wallet_new(
    State(state): State<ServerState>,
    Json(payload): Json<WalletNew>,
) -> Result<(StatusCode, Json<WalletView>), ServerError> {
    let wallet = state.wallets.create(&payload.name)?;
    Ok((StatusCode::CREATED, Json(view(&wallet))))
}

pub async fn wallet_get(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.wallets.by_id(&WalletId::from(wallet_id))?;
    Ok(Json(view(&wallet)))
}

pub async fn wallet_list(State(state): State<ServerState>) -> Json<Vec<WalletView>> {
    Json(state.wallets.list().iter().map(view).collect())
}

pub async fn wallet_rename(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
    Json(payload): Json<WalletRename>,
) -> Result<StatusCode, ServerError> {
    state
        .wallets
        .update_name(&WalletId::from(wallet_id), &payload.name)?;
    Ok(StatusCode::OK)
}

pub async fn wallet_deactivate(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.wallets.deactivate_by_id(&WalletId::from(wallet_id))?;
    Ok(StatusCode::OK)
}

pub async fn deposit(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
    Json(payload): Json<AmountChange>,
) -> Result<StatusCode, ServerError> {
    state.wallets.increase_balance_by(
        &WalletId::from(wallet_id),
        MoneyCents::new(payload.amount_minor),
    )?;
    Ok(StatusCode::OK)
}

pub async fn withdraw(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
    Json(payload): Json<AmountChange>,
) -> Result<StatusCode, ServerError> {
    state.wallets.decrease_balance_by(
        &WalletId::from(wallet_id),
        MoneyCents::new(payload.amount_minor),
    )?;
    Ok(StatusCode::OK)
}

pub async fn transfer(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
    Json(payload): Json<TransferNew>,
) -> Result<StatusCode, ServerError> {
    state.wallets.transfer_balance(
        &WalletId::from(wallet_id),
        &WalletId::from(payload.to_wallet_id),
        MoneyCents::new(payload.amount_minor),
    )?;
    Ok(StatusCode::OK)
}
