//! Handlers behind the create, publish and delete controls.
//!
//! Each handler reads the caller's session, refuses to touch the store when
//! there is none, claims the in-flight slot for its control, runs the action
//! and answers with a toast plus the refreshed fragment.

use std::convert::Infallible;

use async_stream::stream;
use axum::{
    Extension,
    extract::{Form, Path, State},
    response::{
        IntoResponse, Response,
        sse::{Event, Sse},
    },
};
use serde::Deserialize;
use tracing::{error, warn};

use super::selectors::{CREATE_FORM, DELETE_DIALOG, POST_EDITOR, POSTS_PANEL};
use super::shared::{Toast, push_toasts, toast_response};
use crate::{
    application::{
        controls::{ActionGuard, ControlKey, DeleteDialogPhase, InFlightError},
        error::HttpError,
        posts::PostAction,
        session::Session,
        stream::StreamBuilder,
    },
    config::CopySettings,
    domain::{
        posts::{CreatePostInput, DeletePostInput, PublishPostInput},
        types::PostId,
    },
    infra::http::{middleware::CurrentSession, state::HttpState},
    presentation::{ui, views::render_fragment},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct CreatePostForm {
    title: Option<String>,
    content: Option<String>,
    published: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PublishPostForm {
    published: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct DeleteDialogForm {
    phase: Option<String>,
}

pub(super) async fn create_post(
    State(state): State<HttpState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Form(form): Form<CreatePostForm>,
) -> Response {
    let copy = &state.copy;
    let Some(session) = session else {
        return toast_response(Toast::error(failure_copy(PostAction::Create, copy)));
    };

    let _guard = match claim(&state, PostAction::Create, &session, None) {
        Ok(guard) => guard,
        Err(response) => return response,
    };

    let input = CreatePostInput {
        title: form.title,
        content: form.content,
        published: Some(parse_flag(form.published.as_deref()).unwrap_or(false)),
        user_id: Some(session.user_id().to_string()),
    };

    if state.posts.create(input).await.is_err() {
        return toast_response(Toast::error(failure_copy(PostAction::Create, copy)));
    }

    let mut stream = StreamBuilder::new();
    if let Err(err) = refresh_posts_panel(&state, &session, &mut stream).await {
        return err.into_response();
    }
    if let Err(err) = push_toasts(&mut stream, &[Toast::success(&copy.success_post_created)]) {
        return err.into_response();
    }
    stream.into_response()
}

pub(super) async fn publish_post(
    State(state): State<HttpState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Path(id): Path<String>,
    Form(form): Form<PublishPostForm>,
) -> Response {
    let copy = &state.copy;
    let Some(session) = session else {
        return toast_response(Toast::error(failure_copy(PostAction::Publish, copy)));
    };

    let _guard = match claim(&state, PostAction::Publish, &session, PostId::parse(&id).ok()) {
        Ok(guard) => guard,
        Err(response) => return response,
    };

    let input = PublishPostInput {
        id: Some(id),
        published: parse_flag(form.published.as_deref()),
        user_id: Some(session.user_id().to_string()),
    };

    let post = match state.posts.publish(input).await {
        Ok(post) => post,
        Err(_) => {
            return toast_response(Toast::error(failure_copy(PostAction::Publish, copy)));
        }
    };

    let editor = ui::PostEditorView::from_record(&post, copy);
    let editor_html = match render_fragment(
        &ui::PostEditorPanelTemplate { editor },
        "infra::http::ui::publish_post",
    ) {
        Ok(html) => html,
        Err(err) => return err.into_response(),
    };

    let message = if post.published {
        &copy.success_post_published
    } else {
        &copy.success_post_unpublished
    };

    let mut stream = StreamBuilder::new();
    stream.push_replace(editor_html, POST_EDITOR);
    if let Err(err) = push_toasts(&mut stream, &[Toast::success(message)]) {
        return err.into_response();
    }
    stream.into_response()
}

pub(super) async fn open_delete_dialog(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    Form(form): Form<DeleteDialogForm>,
) -> Response {
    let phase = DeleteDialogPhase::from_client(form.phase.as_deref()).open();
    dialog_response(&state.copy, &id, phase)
}

pub(super) async fn cancel_delete_dialog(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    Form(form): Form<DeleteDialogForm>,
) -> Response {
    let phase = DeleteDialogPhase::from_client(form.phase.as_deref()).cancel();
    dialog_response(&state.copy, &id, phase)
}

/// Confirm a deletion. The "please wait" view is streamed before the store
/// call so the client shows it while the action runs.
pub(super) async fn delete_post(
    State(state): State<HttpState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Path(id): Path<String>,
    Form(form): Form<DeleteDialogForm>,
) -> Response {
    let current = DeleteDialogPhase::from_client(form.phase.as_deref());
    let deleting = current.confirm();
    if deleting != DeleteDialogPhase::Deleting {
        return dialog_response(&state.copy, &id, current);
    }

    let Some(session) = session else {
        let mut stream = StreamBuilder::new();
        if let Err(err) = push_dialog(&mut stream, &state.copy, &id, deleting.resolve()) {
            return err.into_response();
        }
        if let Err(err) = push_toasts(
            &mut stream,
            &[Toast::error(failure_copy(PostAction::Delete, &state.copy))],
        ) {
            return err.into_response();
        }
        return stream.into_response();
    };

    let guard = match claim(&state, PostAction::Delete, &session, PostId::parse(&id).ok()) {
        Ok(guard) => guard,
        Err(response) => return response,
    };

    let mut waiting = StreamBuilder::new();
    let mut closed = StreamBuilder::new();
    if let Err(err) = push_dialog(&mut waiting, &state.copy, &id, deleting)
        .and_then(|_| push_dialog(&mut closed, &state.copy, &id, deleting.resolve()))
    {
        return err.into_response();
    }

    let input = DeletePostInput {
        id: Some(id),
        user_id: Some(session.user_id().to_string()),
    };

    let events = stream! {
        let _guard: ActionGuard = guard;
        for event in waiting.into_events() {
            yield Ok::<Event, Infallible>(event);
        }

        let outcome = state.posts.delete(input).await;

        let mut finish = closed;
        let toast = match outcome {
            Ok(_) => {
                finish.push_redirect("/posts");
                Toast::success(&state.copy.success_post_deleted)
            }
            Err(_) => Toast::error(failure_copy(PostAction::Delete, &state.copy)),
        };
        if let Err(err) = push_toasts(&mut finish, &[toast]) {
            error!(
                target = "infra::http::ui::delete_post",
                error = ?err,
                "failed to render delete outcome toast"
            );
        }
        for event in finish.into_events() {
            yield Ok::<Event, Infallible>(event);
        }
    };

    Sse::new(events).into_response()
}

fn claim(
    state: &HttpState,
    action: PostAction,
    session: &Session,
    target: Option<PostId>,
) -> Result<ActionGuard, Response> {
    let key = ControlKey::new(action, session.user_id().clone(), target);
    state.in_flight.acquire(key).map_err(|err| {
        let InFlightError::AlreadyRunning { action } = &err;
        warn!(
            target = "infra::http::ui::claim",
            action = action.as_str(),
            user_id = %session.user_id(),
            "duplicate submission ignored"
        );
        toast_response(Toast::error(&state.copy.error_in_progress))
    })
}

async fn refresh_posts_panel(
    state: &HttpState,
    session: &Session,
    stream: &mut StreamBuilder,
) -> Result<(), HttpError> {
    const SOURCE: &str = "infra::http::ui::refresh_posts_panel";

    match state.posts.list_owned(session.user_id()).await {
        Ok(posts) => {
            let panel = ui::PostsPanelView::new(&posts, true);
            let html = render_fragment(&ui::PostsPanelTemplate { panel }, SOURCE)?;
            stream.push_replace(html, POSTS_PANEL);
        }
        Err(err) => {
            warn!(
                target = SOURCE,
                error = %err,
                "post list refresh failed after create"
            );
        }
    }

    let form = ui::CreateFormView::new(&state.copy);
    let html = render_fragment(&ui::CreateFormTemplate { form }, SOURCE)?;
    stream.push_replace(html, CREATE_FORM);
    Ok(())
}

fn push_dialog(
    stream: &mut StreamBuilder,
    copy: &CopySettings,
    id: &str,
    phase: DeleteDialogPhase,
) -> Result<(), HttpError> {
    let dialog = ui::DeleteDialogView::new(id, phase, copy);
    let html = render_fragment(
        &ui::DeleteDialogTemplate { dialog },
        "infra::http::ui::push_dialog",
    )?;
    stream.push_replace(html, DELETE_DIALOG);
    Ok(())
}

fn dialog_response(copy: &CopySettings, id: &str, phase: DeleteDialogPhase) -> Response {
    let mut stream = StreamBuilder::new();
    match push_dialog(&mut stream, copy, id, phase) {
        Ok(()) => stream.into_response(),
        Err(err) => err.into_response(),
    }
}

fn failure_copy(action: PostAction, copy: &CopySettings) -> &str {
    match action {
        PostAction::Create => &copy.error_create,
        PostAction::Publish => &copy.error_update,
        PostAction::Delete => &copy.error_delete,
    }
}

/// Interpret a checkbox or hidden boolean field.
fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw.map(str::trim)?.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_checkbox_and_hidden_values() {
        assert_eq!(parse_flag(Some("on")), Some(true));
        assert_eq!(parse_flag(Some(" TRUE ")), Some(true));
        assert_eq!(parse_flag(Some("false")), Some(false));
        assert_eq!(parse_flag(Some("maybe")), None);
        assert_eq!(parse_flag(None), None);
    }

    #[test]
    fn failures_use_the_action_copy() {
        let copy = CopySettings::default();
        assert_eq!(failure_copy(PostAction::Delete, &copy), copy.error_delete);
        assert_eq!(failure_copy(PostAction::Publish, &copy), copy.error_update);
    }
}
