//! HTTP service for the posts resource.
//!
//! Three endpoints over a document store:
//! - `GET /posts/{id}` fetches one post
//! - `GET /posts` lists posts, optionally filtered by `owner_id`
//! - `POST /posts` creates a post and returns its new id

pub mod config;
pub mod dto;
pub mod errors;
pub mod models;
pub mod routes;
pub mod states;
pub mod store;

pub use config::Config;
pub use states::AppState;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Builds the router with every route and middleware layer.
pub fn app(state: AppState, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health_check))
        .route("/posts", post(routes::create_post).get(routes::get_posts))
        .route("/posts/{id}", get(routes::get_post))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        // one semaphore shared by every route the layer is applied to
        .layer(GlobalConcurrencyLimitLayer::new(
            config.max_concurrent_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
