//! Browser-facing routes: pages, post controls and the session stream.

mod controls;
mod health;
mod pages;
mod session;
pub(crate) mod selectors;
pub(crate) mod shared;
mod toasts;

use axum::{
    Router,
    routing::{get, post},
};

use super::state::HttpState;

pub fn build_ui_router() -> Router<HttpState> {
    Router::new()
        .route("/", get(pages::root))
        .route("/posts", get(pages::posts_page))
        .route("/posts/create", post(controls::create_post))
        .route("/posts/{id}", get(pages::post_page))
        .route("/posts/{id}/publish", post(controls::publish_post))
        .route(
            "/posts/{id}/delete/open",
            post(controls::open_delete_dialog),
        )
        .route(
            "/posts/{id}/delete/cancel",
            post(controls::cancel_delete_dialog),
        )
        .route("/posts/{id}/delete", post(controls::delete_post))
        .route("/session/events", get(session::session_events))
        .route("/auth/session", post(session::sign_in))
        .route("/auth/signout", post(session::sign_out))
        .route("/toasts", post(toasts::push_toast))
        .route("/_health/db", get(health::db_health))
}
