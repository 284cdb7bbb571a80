//! JSON admin API.
//!
//! Translates HTTP requests into monitor and store calls and serializes
//! state snapshots. Mutations gated by the admin passkey compare it in
//! constant time.

use crate::config::Config;
use crate::core::{EndpointState, StoredEndpoint};
use crate::monitor::{Monitor, MonitorError};
use crate::store::Store;
use crate::utils::duration::parse as parse_duration;
use crate::utils::id::generate_id;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<Monitor>,
    pub store: Arc<Store>,
    pub config: Arc<Config>,
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/endpoints", get(get_endpoints))
        .route("/api/endpoints/add", post(add_endpoint))
        .route(
            "/api/endpoints/delete",
            post(delete_endpoint).delete(delete_endpoint),
        )
        .route("/api/endpoints/enable", post(enable_endpoint))
        .route("/api/endpoints/disable", post(disable_endpoint))
        .route("/api/endpoints/suppress", post(suppress_alerts))
        .route("/api/endpoints/unsuppress", post(unsuppress_alerts))
        .route("/api/endpoints/update", post(update_endpoint))
        .route("/api/endpoints/enable-health", post(enable_health_monitoring))
        .route("/api/history", get(get_history))
        .route("/api/expiring-certs", get(get_expiring_certs))
        .route("/api/config", get(get_config))
        .route("/api/verify-passkey", post(verify_passkey))
        .route("/api/ssl/recheck", post(ssl_recheck))
        .with_state(state)
}

/// Serves the API until the shutdown signal fires.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    mut shutdown_rx: watch::Receiver<()>,
) -> anyhow::Result<()> {
    let app = router(state);
    info!("Web server listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_rx.changed().await.ok();
        })
        .await?;
    Ok(())
}

// --- Error plumbing ---------------------------------------------------------

#[derive(Debug)]
struct ApiError(StatusCode, String);

impl ApiError {
    fn bad_request(msg: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

impl From<MonitorError> for ApiError {
    fn from(e: MonitorError) -> Self {
        match e {
            MonitorError::NotFound(_) => {
                Self(StatusCode::NOT_FOUND, "Endpoint not found".to_string())
            }
            MonitorError::Store(e) => {
                error!("Store error in admin API: {}", e);
                Self(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

// --- Read handlers ----------------------------------------------------------

async fn get_status(State(app): State<AppState>) -> ApiResult {
    let states = app.monitor.get_status();

    let mut endpoints = serde_json::Map::new();
    for state in states {
        endpoints.insert(state.id.clone(), status_entry(&state));
    }

    Ok(Json(json!({
        "endpoints": endpoints,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

fn status_entry(state: &EndpointState) -> Value {
    let mut entry = json!({
        "id": state.id,
        "name": state.name,
        "url": state.url,
        "method": state.method,
        "status": state.status.to_string(),
        "enabled": state.enabled,
        "alerts_suppressed": state.alerts_suppressed,
        "monitor_health": state.monitor_health,
        "last_check": state.last_check.map(|t| t.to_rfc3339()),
        "last_success": state.last_success.map(|t| t.to_rfc3339()),
        "last_error": state.last_error,
        "response_time_ms": state.response_time.as_secs_f64() * 1000.0,
        "consecutive_failures": state.consecutive_failures,
        "consecutive_successes": state.consecutive_successes,
        "ssl_expiring_soon": state.ssl_expiring_soon,
        "days_to_expiry": state.days_to_expiry,
    });
    if let Some(expiry) = state.ssl_cert_expiry {
        entry["ssl_cert_expiry"] = json!(expiry.to_rfc3339());
    }
    entry
}

async fn get_endpoints(State(app): State<AppState>) -> ApiResult {
    let endpoints = app
        .store
        .list_endpoints()
        .map_err(|e| ApiError::from(MonitorError::from(e)))?;

    Ok(Json(json!({
        "endpoints": endpoints,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

#[derive(Deserialize)]
struct HistoryQuery {
    id: Option<String>,
    limit: Option<usize>,
}

async fn get_history(State(app): State<AppState>, Query(query): Query<HistoryQuery>) -> ApiResult {
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Endpoint ID is required"))?;
    let limit = query.limit.unwrap_or(1000);

    let records = app
        .store
        .list_records(&id, limit)
        .map_err(|e| ApiError::from(MonitorError::from(e)))?;

    let timed: Vec<&Duration> = records
        .iter()
        .map(|r| &r.response_time)
        .filter(|d| !d.is_zero())
        .collect();
    let avg_response_time_ms = if timed.is_empty() {
        0.0
    } else {
        timed.iter().map(|d| d.as_secs_f64()).sum::<f64>() / timed.len() as f64 * 1000.0
    };

    Ok(Json(json!({
        "endpoint_id": id,
        "records": records,
        "avg_response_time_ms": avg_response_time_ms,
        "record_count": timed.len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

async fn get_expiring_certs(State(app): State<AppState>) -> ApiResult {
    let expiring: Vec<Value> = app
        .monitor
        .expiring_certificates()
        .into_iter()
        .map(|cert| {
            json!({
                "name": cert.endpoint_name,
                "url": cert.url,
                "expiry_date": cert.expiry_date.to_rfc3339(),
                "days_to_expiry": cert.days_to_expiry,
            })
        })
        .collect();

    Ok(Json(json!({
        "expiring_certs": expiring,
        "count": expiring.len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

async fn get_config(State(app): State<AppState>) -> ApiResult {
    Ok(Json(json!({
        "ssl_expiry_warning_days": app.config.ssl_expiry_warning_days,
        "has_passkey": !app.config.admin_passkey.is_empty(),
    })))
}

// --- Mutations --------------------------------------------------------------

#[derive(Deserialize, Default)]
#[serde(default)]
struct AddEndpointRequest {
    name: String,
    url: String,
    monitor_health: bool,
    method: String,
    timeout: String,
    check_interval: String,
    expected_status: u16,
    headers: HashMap<String, String>,
    failure_threshold: u32,
    success_threshold: u32,
}

async fn add_endpoint(
    State(app): State<AppState>,
    Json(req): Json<AddEndpointRequest>,
) -> ApiResult {
    if req.name.is_empty() || req.url.is_empty() {
        return Err(ApiError::bad_request("Name and URL are required"));
    }
    if !req.url.contains("://") {
        return Err(ApiError::bad_request(
            "Invalid URL format: must include protocol (e.g., https://)",
        ));
    }

    let existing = app
        .store
        .list_endpoints()
        .map_err(|e| ApiError::from(MonitorError::from(e)))?;
    for ep in &existing {
        if ep.name == req.name {
            return Err(ApiError(
                StatusCode::CONFLICT,
                "Endpoint with this name already exists".to_string(),
            ));
        }
        if ep.url == req.url {
            return Err(ApiError(
                StatusCode::CONFLICT,
                "Endpoint with this URL already exists".to_string(),
            ));
        }
    }

    let mut timeout = Duration::from_secs(10);
    if !req.timeout.is_empty() && req.monitor_health {
        timeout = parse_duration(&req.timeout).map_err(ApiError::bad_request)?;
    }

    // SSL-only endpoints carry a zero interval; the 24-hour cadence comes
    // from the monitor-health flag.
    let mut check_interval = Duration::ZERO;
    if req.monitor_health {
        check_interval = Duration::from_secs(30);
        if !req.check_interval.is_empty() {
            check_interval = parse_duration(&req.check_interval).map_err(ApiError::bad_request)?;
        }
    }

    let mut endpoint = StoredEndpoint {
        id: generate_id(&req.name, &req.url),
        name: req.name,
        url: req.url,
        method: req.method,
        timeout,
        check_interval,
        expected_status: req.expected_status,
        headers: req.headers,
        failure_threshold: req.failure_threshold,
        success_threshold: req.success_threshold,
        enabled: true,
        alerts_suppressed: false,
        monitor_health: req.monitor_health,
        created_at: None,
        updated_at: None,
    };

    app.monitor.add_endpoint(&mut endpoint)?;

    Ok(Json(json!({
        "success": true,
        "endpoint": endpoint,
    })))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct IdQuery {
    id: Option<String>,
}

#[derive(Deserialize)]
struct IdBody {
    id: String,
}

/// Pulls the endpoint id from the query string or a JSON body.
fn extract_id(query: IdQuery, body: &[u8]) -> Result<String, ApiError> {
    if let Some(id) = query.id.filter(|id| !id.is_empty()) {
        return Ok(id);
    }
    if let Ok(parsed) = serde_json::from_slice::<IdBody>(body) {
        if !parsed.id.is_empty() {
            return Ok(parsed.id);
        }
    }
    Err(ApiError::bad_request("Endpoint ID is required"))
}

async fn delete_endpoint(
    State(app): State<AppState>,
    Query(query): Query<IdQuery>,
    body: axum::body::Bytes,
) -> ApiResult {
    let id = extract_id(query, &body)?;
    app.monitor.remove_endpoint(&id)?;
    Ok(Json(json!({
        "success": true,
        "message": "Endpoint deleted",
    })))
}

async fn enable_endpoint(
    State(app): State<AppState>,
    Query(query): Query<IdQuery>,
    body: axum::body::Bytes,
) -> ApiResult {
    let id = extract_id(query, &body)?;
    app.monitor.enable_endpoint(&id)?;
    Ok(Json(json!({ "success": true, "message": "Endpoint enabled" })))
}

async fn disable_endpoint(
    State(app): State<AppState>,
    Query(query): Query<IdQuery>,
    body: axum::body::Bytes,
) -> ApiResult {
    let id = extract_id(query, &body)?;
    app.monitor.disable_endpoint(&id)?;
    Ok(Json(json!({ "success": true, "message": "Endpoint disabled" })))
}

async fn suppress_alerts(
    State(app): State<AppState>,
    Query(query): Query<IdQuery>,
    body: axum::body::Bytes,
) -> ApiResult {
    let id = extract_id(query, &body)?;
    app.monitor.suppress_alerts(&id)?;
    Ok(Json(json!({ "success": true, "message": "Endpoint alerts suppressed" })))
}

async fn unsuppress_alerts(
    State(app): State<AppState>,
    Query(query): Query<IdQuery>,
    body: axum::body::Bytes,
) -> ApiResult {
    let id = extract_id(query, &body)?;
    app.monitor.unsuppress_alerts(&id)?;
    Ok(Json(json!({ "success": true, "message": "Endpoint alerts enabled" })))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct UpdateEndpointRequest {
    id: String,
    check_interval: String,
    timeout: String,
    failure_threshold: u32,
    success_threshold: u32,
}

async fn update_endpoint(
    State(app): State<AppState>,
    Json(req): Json<UpdateEndpointRequest>,
) -> ApiResult {
    let mut endpoint = app
        .store
        .get_endpoint(&req.id)
        .map_err(|e| ApiError::from(MonitorError::from(e)))?;

    if !req.check_interval.is_empty() {
        endpoint.check_interval =
            parse_duration(&req.check_interval).map_err(ApiError::bad_request)?;
    }
    if !req.timeout.is_empty() {
        endpoint.timeout = parse_duration(&req.timeout).map_err(ApiError::bad_request)?;
    }
    if req.failure_threshold > 0 {
        endpoint.failure_threshold = req.failure_threshold;
    }
    if req.success_threshold > 0 {
        endpoint.success_threshold = req.success_threshold;
    }

    app.monitor.update_endpoint_settings(&req.id, &mut endpoint)?;

    Ok(Json(json!({
        "success": true,
        "message": "Endpoint updated successfully",
    })))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct EnableHealthRequest {
    id: String,
    passkey: String,
    check_interval: String,
    timeout: String,
    expected_status: u16,
    failure_threshold: u32,
    success_threshold: u32,
}

async fn enable_health_monitoring(
    State(app): State<AppState>,
    Json(req): Json<EnableHealthRequest>,
) -> ApiResult {
    if !app.config.admin_passkey.is_empty()
        && !constant_time_eq(&app.config.admin_passkey, &req.passkey)
    {
        return Err(ApiError(
            StatusCode::UNAUTHORIZED,
            "Invalid passkey".to_string(),
        ));
    }

    let mut endpoint = app
        .store
        .get_endpoint(&req.id)
        .map_err(|e| ApiError::from(MonitorError::from(e)))?;

    endpoint.check_interval = if req.check_interval.is_empty() {
        Duration::from_secs(30)
    } else {
        parse_duration(&req.check_interval).map_err(ApiError::bad_request)?
    };
    if !req.timeout.is_empty() {
        endpoint.timeout = parse_duration(&req.timeout).map_err(ApiError::bad_request)?;
    }
    if req.expected_status > 0 {
        endpoint.expected_status = req.expected_status;
    }
    if req.failure_threshold > 0 {
        endpoint.failure_threshold = req.failure_threshold;
    }
    if req.success_threshold > 0 {
        endpoint.success_threshold = req.success_threshold;
    }

    app.monitor.enable_health_monitoring(&req.id, &mut endpoint)?;

    Ok(Json(json!({
        "success": true,
        "message": "Health monitoring enabled",
    })))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PasskeyRequest {
    passkey: String,
}

async fn verify_passkey(
    State(app): State<AppState>,
    Json(req): Json<PasskeyRequest>,
) -> ApiResult {
    let valid = !app.config.admin_passkey.is_empty()
        && constant_time_eq(&app.config.admin_passkey, &req.passkey);
    Ok(Json(json!({ "valid": valid })))
}

async fn ssl_recheck(State(app): State<AppState>) -> ApiResult {
    let count = app.monitor.trigger_ssl_recheck();
    Ok(Json(json!({
        "success": true,
        "message": "SSL recheck scheduled",
        "count": count,
    })))
}

fn constant_time_eq(configured: &str, supplied: &str) -> bool {
    configured.as_bytes().ct_eq(supplied.as_bytes()).into()
}
