pub mod app;
pub mod cart_handlers;
pub mod model;
pub mod services;
pub mod wire;

pub use app::{build_router, AppState};
