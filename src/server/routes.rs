use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::server::handlers;
use crate::server::state::AppState;
use crate::SynthesisEngine;

pub fn create_router<E>(state: AppState<E>) -> Router
where
    E: SynthesisEngine + Send + 'static,
{
    Router::new()
        .route("/", get(handlers::index))
        .route("/ping", get(handlers::ping))
        .route("/output", get(handlers::output::<E>))
        .route("/generate", post(handlers::generate::<E>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
