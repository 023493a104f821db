use std::time::Duration;

use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use super::selectors::TOAST_STACK;
use crate::{
    application::{error::HttpError, stream::StreamBuilder},
    presentation::{ui, views::render_fragment},
};

#[derive(Clone, Debug)]
pub(crate) struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub text: String,
    pub ttl: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    fn as_variant(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(6000);

impl Toast {
    pub fn success(text: impl Into<String>) -> Self {
        Self::with_kind(ToastKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::with_kind(ToastKind::Error, text)
    }

    fn with_kind(kind: ToastKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            ttl: DEFAULT_TOAST_TTL,
        }
    }
}

pub(crate) fn push_toasts(stream: &mut StreamBuilder, toasts: &[Toast]) -> Result<(), HttpError> {
    let toasts = toasts
        .iter()
        .map(|toast| ui::ToastItem {
            id: toast.id.to_string(),
            kind: toast.kind.as_variant(),
            text: toast.text.clone(),
            ttl_ms: u64::try_from(toast.ttl.as_millis()).unwrap_or(u64::MAX),
        })
        .collect::<Vec<_>>();

    let html = render_fragment(
        &ui::ToastStackTemplate { toasts },
        "infra::http::ui::push_toasts",
    )?;

    stream.push_replace(html, TOAST_STACK);
    Ok(())
}

/// A response carrying a single toast and nothing else.
pub(crate) fn toast_response(toast: Toast) -> Response {
    let mut stream = StreamBuilder::new();
    match push_toasts(&mut stream, &[toast]) {
        Ok(()) => stream.into_response(),
        Err(err) => err.into_response(),
    }
}
