use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use cart_service::services::{InMemoryPaymentMethodService, StubPaymentService, StubRefundService};
use cart_service::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let state = AppState {
        payment_methods: Arc::new(InMemoryPaymentMethodService::seeded()),
        payments: Arc::new(StubPaymentService::new()),
        refunds: Arc::new(StubRefundService::new()),
    };
    let app = build_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8087".to_string())
        .parse()
        .context("PORT must be a number")?;
    let addr = SocketAddr::new(host.parse().context("HOST must be an IP address")?, port);
    info!(%addr, "starting cart-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
