use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bridge_core::{
    reconcile::{ReconcileError, Reconciler},
    types::{
        CheckResponse, ErrorResponse, GetValueResponse, HealthResponse, SetValueRequest,
        SetValueResponse, SyncResponse,
    },
};
use std::sync::Arc;

/// Path prefix of every API route.
pub const API_PREFIX: &str = "/api/v1";

/// Error half of every handler: a status code plus the failure envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    /// 400 for a body that is not a `{"value": "<non-empty string>"}` object.
    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::new("Invalid request format", detail),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self { status, body: ErrorResponse::from(&err) }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Builds the API router with all routes nested under [`API_PREFIX`].
pub fn create_router(reconciler: Arc<Reconciler>) -> Router {
    let api = Router::new()
        .route("/health", get(handle_health))
        .route("/value", get(handle_get_value).post(handle_set_value))
        .route("/sync", post(handle_sync))
        .route("/check", get(handle_check));

    Router::new().nest(API_PREFIX, api).fallback(handle_not_found).with_state(reconciler)
}

/// Liveness only; never touches the chain or the store.
#[allow(clippy::unused_async)]
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

pub async fn handle_get_value(
    State(reconciler): State<Arc<Reconciler>>,
) -> Result<Json<GetValueResponse>, ApiError> {
    let value = reconciler.get_value().await?;
    Ok(Json(GetValueResponse::new(value)))
}

/// Parses the body regardless of `content-type`; a missing or empty `value`
/// is rejected before numeric validation.
pub async fn handle_set_value(
    State(reconciler): State<Arc<Reconciler>>,
    body: Bytes,
) -> Result<Json<SetValueResponse>, ApiError> {
    let request: SetValueRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "rejected malformed set request");
        ApiError::invalid_request(e.to_string())
    })?;

    if request.value.is_empty() {
        return Err(ApiError::invalid_request("value is required"));
    }

    let receipt = reconciler.set_value(&request.value).await?;
    Ok(Json(SetValueResponse::from(receipt)))
}

pub async fn handle_sync(
    State(reconciler): State<Arc<Reconciler>>,
) -> Result<Json<SyncResponse>, ApiError> {
    let outcome = reconciler.sync().await?;
    Ok(Json(SyncResponse::from(outcome)))
}

pub async fn handle_check(
    State(reconciler): State<Arc<Reconciler>>,
) -> Result<Json<CheckResponse>, ApiError> {
    let report = reconciler.check().await?;
    Ok(Json(CheckResponse::from(report)))
}

#[allow(clippy::unused_async)]
async fn handle_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404 page not found")
}
