use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method, StatusCode,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use tower_http::cors::{AllowOrigin, CorsLayer};

use common_http_errors::{error_metric_families, http_error_metrics_layer};

use crate::cart_handlers::{
    create_payment, create_refund, delete_payment_method, disable_payment_method,
    enable_payment_method, get_payment_method, list_payment_methods, update_payment, update_refund,
};
use crate::services::{PaymentMethodService, PaymentService, RefundService};

pub static CART_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static RPC_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let v = IntCounterVec::new(
        Opts::new("rpc_requests_total", "Count of RPC operations dispatched"),
        &["operation"],
    ).unwrap();
    CART_REGISTRY.register(Box::new(v.clone())).ok();
    v
});

pub(crate) fn track(operation: &'static str) {
    RPC_REQUESTS_TOTAL.with_label_values(&[operation]).inc();
}

/// Service references are assigned once here and never reassigned; handlers
/// share nothing else, so any number may run concurrently.
#[derive(Clone)]
pub struct AppState {
    pub payment_methods: Arc<dyn PaymentMethodService>,
    pub payments: Arc<dyn PaymentService>,
    pub refunds: Arc<dyn RefundService>,
}

pub async fn health() -> &'static str {
    "ok"
}

async fn metrics() -> (StatusCode, String) {
    Lazy::force(&RPC_REQUESTS_TOTAL);
    let encoder = TextEncoder::new();
    let mut families = CART_REGISTRY.gather();
    families.extend(error_metric_families());
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut buf) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8_lossy(&buf).to_string())
}

pub fn build_router(state: AppState) -> Router {
    let allowed_origins = [
        "http://localhost:3000",
        "http://localhost:3001",
        "http://localhost:5173",
    ];
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([ACCEPT, CONTENT_TYPE]);

    Router::new()
        .route("/healthz", get(health))
        .route("/payments", post(create_payment))
        .route("/payments/update", post(update_payment))
        .route("/refunds", post(create_refund))
        .route("/refunds/update", post(update_refund))
        .route("/payment_methods", get(list_payment_methods))
        .route(
            "/payment_methods/:code",
            get(get_payment_method).delete(delete_payment_method),
        )
        .route("/payment_methods/:code/enable", post(enable_payment_method))
        .route("/payment_methods/:code/disable", post(disable_payment_method))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(http_error_metrics_layer("cart-service")))
}
