use axum::{extract::State, response::Response};

use crate::infra::http::{db_health_response, state::HttpState};

pub(super) async fn db_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.health.ping().await)
}
