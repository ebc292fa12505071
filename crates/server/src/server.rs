use axum::{
    Router,
    body::{Body, to_bytes},
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use std::{sync::Arc, time::Instant};

use crate::wallets;
use engine::Notifier;

#[derive(Clone)]
pub struct ServerState {
    pub wallets: Arc<Notifier>,
}

/// Same as axum's default body limit for extractors.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Log method, path, body, status and time spent for every request.
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!("{method} {uri} body rejected: {err}");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };
    if !bytes.is_empty() {
        tracing::debug!("{method} {uri} body: {}", String::from_utf8_lossy(&bytes));
    }

    let response = next
        .run(Request::from_parts(parts, Body::from(bytes)))
        .await;

    tracing::debug!(
        "{method} {uri} -> {} in {:?}",
        response.status(),
        started.elapsed()
    );
    response
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/wallets",
            post(wallets::wallet_new).get(wallets::wallet_list),
        )
        .route(
            "/wallets/{id}",
            get(wallets::wallet_get)
                .put(wallets::wallet_rename)
                .delete(wallets::wallet_deactivate),
        )
        .route("/wallets/{id}/deposit", post(wallets::deposit))
        .route("/wallets/{id}/withdraw", post(wallets::withdraw))
        .route("/wallets/{id}/transfer", post(wallets::transfer))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn run_with_listener<F>(
    wallets: Notifier,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        wallets: Arc::new(wallets),
    };

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
