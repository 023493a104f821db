//! JSON surface for the post actions, authenticated with a bearer token.

pub mod error;
pub mod handlers;

use axum::{
    Router,
    routing::{delete, post},
};

use super::state::HttpState;

pub fn build_api_router() -> Router<HttpState> {
    Router::new()
        .route("/api/v1/posts", post(handlers::create_post))
        .route("/api/v1/posts/{id}", delete(handlers::delete_post))
        .route("/api/v1/posts/{id}/publish", post(handlers::publish_post))
}
