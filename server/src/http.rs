use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderName, StatusCode, header},
    routing::{get, patch, post},
};
use platform_api::{ApiError, ApiResult};
use products_hr::{Employee, EmployeeRepository, HrError, ValidationError};
use serde::Serialize;
use serde_json::{Map, Value};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, warn};

use crate::config::AppConfig;

const INVALID_EMPLOYEE: &str = "Invalid employee data.";
const INVALID_REVIEW: &str = "Invalid review data.";
const EMPLOYEE_NOT_FOUND: &str = "Employee not found.";
const MALFORMED_BODY: &str = "Malformed JSON body.";

#[derive(Clone, Default)]
pub struct AppState {
    pub employees: Arc<EmployeeRepository>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

impl From<&AppConfig> for ServeConfig {
    fn from(value: &AppConfig) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "hr server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    info!("hr server stopped");
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/v1/employees",
            get(list_employees).post(create_employee),
        )
        .route(
            "/api/v1/employees/{id}",
            get(get_employee).put(update_employee),
        )
        .route("/api/v1/employees/{id}/reviews", post(add_review))
        .route("/api/v1/employees/{id}/deactivate", patch(deactivate_employee))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

async fn create_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let fields = decode_body(&headers, &body)?;
    let employee = state.employees.create(&fields).map_err(hr_error)?;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn list_employees(State(state): State<AppState>) -> Json<Vec<Employee>> {
    Json(state.employees.list())
}

async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Employee>> {
    state.employees.get(&id).map(Json).map_err(hr_error)
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Employee>> {
    let fields = decode_body(&headers, &body)?;
    state
        .employees
        .update(&id, &fields)
        .map(Json)
        .map_err(hr_error)
}

async fn add_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let review = decode_body(&headers, &body)?;
    let employee = state.employees.add_review(&id, &review).map_err(hr_error)?;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn deactivate_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Employee>> {
    state.employees.deactivate(&id).map(Json).map_err(hr_error)
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        employees: state.employees.len(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    employees: usize,
    version: &'static str,
}

/// Only `application/json` bodies are parsed. Anything else, and an empty
/// JSON body, reads as `{}` and is left to the route's own checks.
fn decode_body(headers: &HeaderMap, body: &Bytes) -> ApiResult<Value> {
    if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|err| {
        debug!(error = %err, "rejected request body");
        ApiError::InvalidInput(MALFORMED_BODY)
    })
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

fn hr_error(err: HrError) -> ApiError {
    debug!(error = %err, "employee request rejected");
    match err {
        HrError::NotFound(_) => ApiError::NotFound(EMPLOYEE_NOT_FOUND),
        HrError::Validation(ValidationError::Employee { .. }) => {
            ApiError::InvalidInput(INVALID_EMPLOYEE)
        }
        HrError::Validation(ValidationError::Review(_)) => ApiError::InvalidInput(INVALID_REVIEW),
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix. A signal source that cannot be
/// installed is logged and never fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let source = tokio::select! {
        _ = interrupt => "ctrl-c",
        _ = terminate => "terminate",
    };
    info!(source, "shutdown signal received");
}
