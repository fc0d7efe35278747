use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use localmind_core::error::{IntelError, IntelResult};
use localmind_core::service::{CompetitorRequest, HoursRequest, IntelService, MarketScanRequest};

const NOT_CONFIGURED: &str = "Places service is not configured. Please try again later.";

#[derive(Clone)]
pub struct AppState {
    /// `None` when the places API key is missing; the API still starts and answers health checks.
    pub service: Option<IntelService>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/health", get(health))
        .route("/api/analyze-competitors", post(analyze_competitors))
        .route("/api/optimize-hours", post(optimize_hours))
        .route("/api/scan-market", post(scan_market))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    places_configured: bool,
    timestamp: DateTime<Utc>,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        places_configured: state.service.is_some(),
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Serialize)]
struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
    processed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct Failure {
    success: bool,
    error: String,
}

fn failure(error: impl Into<String>) -> Response {
    Json(Failure {
        success: false,
        error: error.into(),
    })
    .into_response()
}

/// Every handled outcome is a 200 with a `success` flag; error detail stays in logs and Sentry.
fn respond<T: Serialize>(operation: &'static str, result: IntelResult<T>) -> Response {
    match result {
        Ok(body) => Json(Success {
            success: true,
            body,
            processed_at: Utc::now(),
        })
        .into_response(),
        Err(err) => {
            match &err {
                IntelError::Validation(message) => {
                    tracing::info!(operation, reason = %message, "request rejected");
                }
                _ => {
                    if let Some(source) = err.report_source() {
                        sentry_anyhow::capture_anyhow(source);
                    }
                    tracing::error!(operation, kind = err.kind(), error = %err, "request failed");
                }
            }
            failure(err.user_message())
        }
    }
}

fn decoded<T>(operation: &'static str, payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload.map(|Json(req)| req).map_err(|rejection| {
        tracing::info!(operation, error = %rejection, "undecodable request body");
        failure(format!("Invalid request body: {}", rejection.body_text()))
    })
}

fn configured(state: &AppState) -> Result<&IntelService, Response> {
    state.service.as_ref().ok_or_else(|| {
        tracing::warn!("analysis requested but places client is not configured");
        failure(NOT_CONFIGURED)
    })
}

async fn analyze_competitors(
    State(state): State<AppState>,
    payload: Result<Json<CompetitorRequest>, JsonRejection>,
) -> Response {
    let req = match decoded("competitors", payload) {
        Ok(req) => req,
        Err(res) => return res,
    };
    let service = match configured(&state) {
        Ok(service) => service,
        Err(res) => return res,
    };
    respond("competitors", service.analyze_competitors(&req).await)
}

async fn optimize_hours(
    State(state): State<AppState>,
    payload: Result<Json<HoursRequest>, JsonRejection>,
) -> Response {
    let req = match decoded("hours", payload) {
        Ok(req) => req,
        Err(res) => return res,
    };
    let service = match configured(&state) {
        Ok(service) => service,
        Err(res) => return res,
    };
    respond("hours", service.optimize_hours(&req).await)
}

async fn scan_market(
    State(state): State<AppState>,
    payload: Result<Json<MarketScanRequest>, JsonRejection>,
) -> Response {
    let req = match decoded("market_scan", payload) {
        Ok(req) => req,
        Err(res) => return res,
    };
    let service = match configured(&state) {
        Ok(service) => service,
        Err(res) => return res,
    };
    respond("market_scan", service.scan_market(&req).await)
}
