/// HTTP API Module
///
/// JSON endpoints for balances, transaction details and signature verification.
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::error::ServiceError;
use crate::rpc::ChainRpc;
use crate::service::TokenService;

type AppState<R> = Arc<TokenService<R>>;

/// Error body returned as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        if e.is_not_found() {
            ApiError(StatusCode::NOT_FOUND, "Transaction not found".to_string())
        } else {
            ApiError(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    message: Option<String>,
    signature: Option<String>,
    public_key: Option<String>,
}

async fn health() -> &'static str {
    "ok"
}

async fn balance_handler<R: ChainRpc>(
    State(service): State<AppState<R>>,
    Path(address): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if address.is_empty() {
        return Err(ApiError(StatusCode::BAD_REQUEST, "Invalid address parameter".to_string()));
    }

    let balance = service.get_balance(&address).await?;
    Ok(Json(json!({ "balance": balance })))
}

async fn transaction_handler<R: ChainRpc>(
    State(service): State<AppState<R>>,
    Path(signature): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if signature.is_empty() {
        return Err(ApiError(StatusCode::BAD_REQUEST, "Invalid signature parameter".to_string()));
    }

    let transaction = service.get_transaction_details(&signature).await?;
    Ok(Json(json!({ "transaction": transaction })))
}

async fn verify_signature_handler<R: ChainRpc>(
    State(service): State<AppState<R>>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError(StatusCode::BAD_REQUEST, e.body_text()))?;

    let (Some(message), Some(signature), Some(public_key)) = (
        request.message.filter(|m| !m.is_empty()),
        request.signature.filter(|s| !s.is_empty()),
        request.public_key.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError(
            StatusCode::BAD_REQUEST,
            "Missing required fields: message, signature, publicKey".to_string(),
        ));
    };

    let is_valid = service.verify_signature(&message, &signature, &public_key);
    Ok(Json(json!({ "isValid": is_valid })))
}

pub fn router<R: ChainRpc + 'static>(service: AppState<R>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/balance/:address", get(balance_handler::<R>))
        .route("/api/transaction/:signature", get(transaction_handler::<R>))
        .route("/api/verify-signature", post(verify_signature_handler::<R>))
        .with_state(service)
}

/// Serve the API until the process is stopped
pub async fn serve<R: ChainRpc + 'static>(service: TokenService<R>, bind_addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = bind_addr.parse()?;
    tracing::info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(Arc::new(service))).await?;

    Ok(())
}
