pub mod api;
mod middleware;
mod state;
pub mod ui;

pub use middleware::{CurrentSession, RequestContext};
pub use state::HttpState;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{IntoResponse, Response};

use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;

/// Assemble the browser and JSON routers behind the shared middleware stack.
pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .merge(ui::build_ui_router())
        .merge(api::build_api_router())
        .with_state(state.clone())
        .layer(from_fn_with_state(state, middleware::resolve_session))
        .layer(from_fn(middleware::log_responses))
        .layer(from_fn(middleware::set_request_context))
}

fn db_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
