use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use postdesk_api_types::{PostCreateRequest, PostPublishRequest, PostView};

use super::error::ApiError;
use crate::{
    application::{
        controls::{ActionGuard, ControlKey},
        posts::PostAction,
        session::Session,
    },
    domain::{
        posts::{CreatePostInput, DeletePostInput, PublishPostInput},
        types::PostId,
    },
    infra::http::{middleware::CurrentSession, state::HttpState},
};

pub async fn create_post(
    State(state): State<HttpState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Json(payload): Json<PostCreateRequest>,
) -> Result<(StatusCode, Json<PostView>), ApiError> {
    let session = session.ok_or_else(ApiError::unauthorized)?;

    // Every request is a distinct post, so creates take no in-flight slot.
    let input = CreatePostInput {
        title: payload.title,
        content: payload.content,
        published: payload.published,
        user_id: Some(session.user_id().to_string()),
    };

    let post = state.posts.create(input).await?;
    Ok((StatusCode::CREATED, Json(post.into())))
}

pub async fn publish_post(
    State(state): State<HttpState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Path(id): Path<String>,
    Json(payload): Json<PostPublishRequest>,
) -> Result<Json<PostView>, ApiError> {
    let session = session.ok_or_else(ApiError::unauthorized)?;
    let _guard = claim(&state, PostAction::Publish, &session, PostId::parse(&id).ok())?;

    let input = PublishPostInput {
        id: Some(id),
        published: payload.published,
        user_id: Some(session.user_id().to_string()),
    };

    let post = state.posts.publish(input).await?;
    Ok(Json(post.into()))
}

pub async fn delete_post(
    State(state): State<HttpState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Result<Json<PostView>, ApiError> {
    let session = session.ok_or_else(ApiError::unauthorized)?;
    let _guard = claim(&state, PostAction::Delete, &session, PostId::parse(&id).ok())?;

    let input = DeletePostInput {
        id: Some(id),
        user_id: Some(session.user_id().to_string()),
    };

    let post = state.posts.delete(input).await?;
    Ok(Json(post.into()))
}

fn claim(
    state: &HttpState,
    action: PostAction,
    session: &Session,
    target: Option<PostId>,
) -> Result<ActionGuard, ApiError> {
    let key = ControlKey::new(action, session.user_id().clone(), target);
    Ok(state.in_flight.acquire(key)?)
}
