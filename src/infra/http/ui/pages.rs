use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    application::{
        error::{AppError, ErrorReport},
        session::Session,
    },
    domain::types::PostId,
    infra::http::{middleware::CurrentSession, state::HttpState},
    presentation::{
        ui,
        views::{render_error_page, render_template_response},
    },
};

pub(super) async fn root() -> Redirect {
    Redirect::to("/posts")
}

pub(super) async fn posts_page(
    State(state): State<HttpState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Response {
    let posts = match session.as_ref() {
        Some(session) => match state.posts.list_owned(session.user_id()).await {
            Ok(posts) => posts,
            Err(err) => return AppError::from(err).into_response(),
        },
        None => Vec::new(),
    };

    let template = ui::PostsPageTemplate {
        layout: ui::LayoutView::new("Posts", session.as_ref()),
        panel: ui::PostsPanelView::new(&posts, session.is_some()),
        form: ui::CreateFormView::new(&state.copy),
    };
    render_template_response(template, StatusCode::OK)
}

pub(super) async fn post_page(
    State(state): State<HttpState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Response {
    const SOURCE: &str = "infra::http::ui::post_page";

    let Some(session) = session else {
        return message_page(
            None,
            StatusCode::UNAUTHORIZED,
            &state.copy.error_sign_in_required,
            "Sign in with an access token to edit posts.",
            SOURCE,
        );
    };

    let post = match PostId::parse(&id) {
        Ok(id) => match state.posts.load_owned(&id, session.user_id()).await {
            Ok(post) => post,
            Err(err) => return AppError::from(err).into_response(),
        },
        Err(_) => None,
    };

    let Some(post) = post else {
        return message_page(
            Some(&session),
            StatusCode::NOT_FOUND,
            "Post not found",
            "It may have been deleted, or it belongs to another account.",
            SOURCE,
        );
    };

    let template = ui::PostEditorPageTemplate {
        layout: ui::LayoutView::new(post.title.clone(), Some(&session)),
        editor: ui::PostEditorView::from_record(&post, &state.copy),
    };
    render_template_response(template, StatusCode::OK)
}

fn message_page(
    session: Option<&Session>,
    status: StatusCode,
    heading: &str,
    body: &str,
    source: &'static str,
) -> Response {
    let template = ui::MessagePageTemplate {
        layout: ui::LayoutView::new(heading, session),
        heading: heading.to_string(),
        body: body.to_string(),
    };
    render_error_page(template, ErrorReport::from_message(source, status, heading))
}
