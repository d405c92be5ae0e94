//! HTTP surface for the Overlap service.
//!
//! ## Endpoints
//!
//! - `POST /psi` - run one PSI computation
//! - `GET /health` - health check

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use overlap_core::{CoreError, PsiEngine, PsiOutcome, PsiRequest};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the HTTP router for the Overlap service.
///
/// The returned router can be served directly with axum or composed
/// into a larger application.
pub fn build_router(engine: PsiEngine) -> Router {
    tracing::debug!("Building HTTP router");

    Router::new()
        .route("/psi", post(psi_handler))
        .route("/health", get(health_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

/// Run one PSI computation.
async fn psi_handler(
    State(engine): State<PsiEngine>,
    Json(request): Json<PsiRequest>,
) -> Result<Json<PsiOutcome>, ApiError> {
    let outcome = engine.execute(&request).await?;
    Ok(Json(outcome))
}

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    tracing::trace!("Health check request");
    Json(serde_json::json!({
        "status": "healthy",
        "service": "overlap-server"
    }))
}

/// HTTP-facing wrapper for [`CoreError`].
///
/// Every failure becomes a single JSON error body; no partial result
/// is ever returned.
#[derive(Debug)]
pub struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error.
    fn status(&self) -> StatusCode {
        match &self.0 {
            err if err.is_client_error() => StatusCode::BAD_REQUEST,
            CoreError::ComputationFailed { .. } => StatusCode::BAD_GATEWAY,
            CoreError::ComputationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Start the HTTP server.
///
/// Runs until the provided shutdown signal resolves.
pub async fn serve(
    engine: PsiEngine,
    addr: std::net::SocketAddr,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let router = build_router(engine);

    tracing::info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::debug!(%addr, "TCP listener bound");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
