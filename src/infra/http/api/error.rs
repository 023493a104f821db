use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use postdesk_api_types::{ApiErrorBody, ApiErrorMessage, codes};

use crate::application::controls::InFlightError;
use crate::application::error::ErrorReport;
use crate::application::posts::ActionError;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            codes::UNAUTHORIZED,
            "Session required",
            None,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<ActionError> for ApiError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::Validation(issues) => {
                let hint = issues
                    .iter()
                    .map(|issue| format!("{} {}", issue.field, issue.message))
                    .collect::<Vec<_>>()
                    .join("; ");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    codes::VALIDATION,
                    "Request failed validation",
                    Some(hint),
                )
            }
            ActionError::MissingPrecondition(what) => Self::new(
                StatusCode::UNAUTHORIZED,
                codes::UNAUTHORIZED,
                "Missing required context",
                Some(format!("{what} is required")),
            ),
            ActionError::NotFound(id) => Self::new(
                StatusCode::NOT_FOUND,
                codes::NOT_FOUND,
                "Post not found",
                Some(format!("no post `{id}` for this user")),
            ),
            ActionError::Store(err) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::STORE,
                "Post store unavailable",
                Some(err.to_string()),
            ),
        }
    }
}

impl From<InFlightError> for ApiError {
    fn from(err: InFlightError) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            codes::CONFLICT,
            "Action already in progress",
            Some(err.to_string()),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let hint = self.hint.clone();
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(
            "infra::http::api",
            self.status,
            format!("{}: {}", self.code, hint.as_deref().unwrap_or(self.message)),
        )
        .attach(&mut response);
        response
    }
}
