use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use once_cell::sync::Lazy;
use prometheus::proto::MetricFamily;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")] pub trace_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")] pub message: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: &'static str, trace_id: Option<Uuid>, message: Option<String> },
    NotFound { code: &'static str, trace_id: Option<Uuid>, message: Option<String> },
    Conflict { code: &'static str, trace_id: Option<Uuid>, message: Option<String> },
    BadGateway { code: &'static str, trace_id: Option<Uuid>, message: Option<String> },
    Unimplemented { what: &'static str, trace_id: Option<Uuid> },
    Internal { trace_id: Option<Uuid>, message: Option<String> },
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(e: E, trace_id: Option<Uuid>) -> Self { Self::Internal { trace_id, message: Some(e.to_string()) } }
    pub fn bad_request(code: &'static str, trace_id: Option<Uuid>) -> Self { Self::BadRequest { code, trace_id, message: None } }
    pub fn unimplemented(what: &'static str) -> Self { Self::Unimplemented { what, trace_id: None } }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body, error_code) = match self {
            ApiError::BadRequest { code, trace_id, message } => (
                StatusCode::BAD_REQUEST,
                ErrorBody { code: code.into(), trace_id, message },
                code
            ),
            ApiError::NotFound { code, trace_id, message } => (
                StatusCode::NOT_FOUND,
                ErrorBody { code: code.into(), trace_id, message },
                code
            ),
            ApiError::Conflict { code, trace_id, message } => (
                StatusCode::CONFLICT,
                ErrorBody { code: code.into(), trace_id, message },
                code
            ),
            ApiError::BadGateway { code, trace_id, message } => (
                StatusCode::BAD_GATEWAY,
                ErrorBody { code: code.into(), trace_id, message },
                code
            ),
            ApiError::Unimplemented { what, trace_id } => (
                StatusCode::NOT_IMPLEMENTED,
                ErrorBody { code: "unimplemented".into(), trace_id, message: Some(format!("{what} is not implemented")) },
                "unimplemented"
            ),
            ApiError::Internal { trace_id, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody { code: "internal_error".into(), trace_id, message },
                "internal_error"
            ),
        };
        let mut resp = (status, Json(body)).into_response();
        if let Ok(val) = HeaderValue::from_str(error_code) {
            resp.headers_mut().insert("X-Error-Code", val);
        }
        resp
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// --- Error metrics ---
//
// Error codes are request-derived strings; the label set is capped at
// MAX_ERROR_CODES and codes beyond the cap fold into a single "overflow"
// label.

const MAX_ERROR_CODES: usize = 40;

pub static ERROR_METRICS_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static HTTP_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let v = IntCounterVec::new(
        Opts::new("http_errors_total", "Count of HTTP error responses emitted (status >= 400)"),
        &["service", "code", "status"],
    ).unwrap();
    ERROR_METRICS_REGISTRY.register(Box::new(v.clone())).ok();
    v
});

static DISTINCT_ERROR_CODES: Lazy<IntGauge> = Lazy::new(|| {
    let g = IntGauge::new(
        "http_error_codes_distinct",
        "Number of distinct error code labels currently tracked",
    ).unwrap();
    ERROR_METRICS_REGISTRY.register(Box::new(g.clone())).ok();
    g
});

static ERROR_CODE_OVERFLOW_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new(
        "http_error_code_overflow_total",
        "Errors recorded under the overflow label because the code cap was hit",
    ).unwrap();
    ERROR_METRICS_REGISTRY.register(Box::new(c.clone())).ok();
    c
});

static SEEN_CODES: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

fn bounded_code(code: &str) -> String {
    let mut seen = SEEN_CODES.lock().unwrap_or_else(|e| e.into_inner());
    if seen.contains(code) {
        return code.to_string();
    }
    if seen.len() >= MAX_ERROR_CODES {
        ERROR_CODE_OVERFLOW_TOTAL.inc();
        return "overflow".to_string();
    }
    seen.insert(code.to_string());
    DISTINCT_ERROR_CODES.set(seen.len() as i64);
    code.to_string()
}

pub fn record_error(service: &str, code: &str, status: StatusCode) {
    let code = bounded_code(code);
    HTTP_ERRORS_TOTAL
        .with_label_values(&[service, code.as_str(), status.as_str()])
        .inc();
}

/// Axum middleware counting error responses by their `X-Error-Code` header.
pub fn http_error_metrics_layer(
    service: &'static str,
) -> impl Fn(Request<Body>, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Clone + Send + 'static {
    move |req, next| {
        Box::pin(async move {
            let resp = next.run(req).await;
            let status = resp.status();
            if status.as_u16() >= 400 {
                let code = resp
                    .headers()
                    .get("X-Error-Code")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                record_error(service, code, status);
            }
            resp
        })
    }
}

/// Metric families for a service `/metrics` endpoint to encode.
pub fn error_metric_families() -> Vec<MetricFamily> {
    Lazy::force(&HTTP_ERRORS_TOTAL);
    Lazy::force(&DISTINCT_ERROR_CODES);
    Lazy::force(&ERROR_CODE_OVERFLOW_TOTAL);
    ERROR_METRICS_REGISTRY.gather()
}

pub mod test_helpers {
    use super::*;

    pub fn simulate_error_code(code: &str) {
        record_error("test", code, StatusCode::BAD_REQUEST);
    }

    pub fn distinct_gauge() -> i64 {
        Lazy::force(&DISTINCT_ERROR_CODES).get()
    }

    pub fn overflow_count() -> u64 {
        Lazy::force(&ERROR_CODE_OVERFLOW_TOTAL).get()
    }
}
