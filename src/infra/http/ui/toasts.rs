use axum::{
    extract::Form,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::application::error::HttpError;

use super::shared::{Toast, toast_response};

#[derive(Debug, Deserialize)]
pub(super) struct ToastForm {
    kind: String,
    message: String,
}

/// Echo a client-side notice back through the toast stack.
pub(super) async fn push_toast(Form(form): Form<ToastForm>) -> Response {
    let toast = match form.kind.as_str() {
        "success" => Toast::success(form.message),
        "error" => Toast::error(form.message),
        other => {
            return HttpError::new(
                "infra::http::ui::push_toast",
                StatusCode::BAD_REQUEST,
                "Invalid toast kind",
                format!("Unsupported toast kind `{other}`"),
            )
            .into_response();
        }
    };

    toast_response(toast)
}
