//! Sign-in, sign-out and the live session stream.

use std::convert::Infallible;

use async_stream::stream;
use axum::{
    Extension,
    extract::{Form, State},
    http::StatusCode,
    response::{
        IntoResponse, Redirect, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{error, warn};

use super::selectors::SESSION_BADGE;
use crate::{
    application::{
        error::HttpError,
        session::{Session, SessionChange},
        stream::StreamBuilder,
    },
    infra::http::{middleware::CurrentSession, state::HttpState},
    presentation::{ui, views::render_fragment},
};

#[derive(Debug, Deserialize)]
pub(super) struct SignInForm {
    access_token: String,
}

pub(super) async fn sign_in(
    State(state): State<HttpState>,
    jar: CookieJar,
    Form(form): Form<SignInForm>,
) -> Response {
    const SOURCE: &str = "infra::http::ui::sign_in";

    match state.sessions.sign_in(&form.access_token).await {
        Ok(Some(session)) => {
            let cookie = Cookie::build((
                state.session_cookie.to_string(),
                session.access_token().to_string(),
            ))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
            (jar.add(cookie), Redirect::to("/posts")).into_response()
        }
        Ok(None) => HttpError::new(
            SOURCE,
            StatusCode::UNAUTHORIZED,
            "Invalid access token",
            "auth provider rejected the token",
        )
        .into_response(),
        Err(err) => HttpError::from_error(
            SOURCE,
            StatusCode::BAD_GATEWAY,
            "Sign-in service unavailable",
            &err,
        )
        .into_response(),
    }
}

pub(super) async fn sign_out(
    State(state): State<HttpState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    jar: CookieJar,
) -> Response {
    if let Some(session) = session {
        if let Err(err) = state.sessions.sign_out(&session).await {
            warn!(
                target = "infra::http::ui::sign_out",
                user_id = %session.user_id(),
                error = %err,
                "auth provider sign-out failed; clearing local session anyway"
            );
        }
    }

    let jar = jar.remove(Cookie::build((state.session_cookie.to_string(), "")).path("/"));
    (jar, Redirect::to("/posts")).into_response()
}

/// Long-lived stream that keeps the session badge and `signedIn` signal in
/// step with changes published through the session hub.
pub(super) async fn session_events(
    State(state): State<HttpState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Response {
    let mut subscription = state.sessions.subscribe();
    let watched = session.as_ref().map(|session| session.user_id().clone());
    let initial = badge_events(session.as_ref());

    let events = stream! {
        for event in initial {
            yield Ok::<Event, Infallible>(event);
        }

        while let Some(change) = subscription.recv().await {
            let Some(user) = watched.as_ref() else {
                continue;
            };
            if change.user_id() != user {
                continue;
            }
            if let SessionChange::SignedOut { .. } = change {
                for event in badge_events(None) {
                    yield Ok::<Event, Infallible>(event);
                }
            }
        }
    };

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn badge_events(session: Option<&Session>) -> Vec<Event> {
    let badge = ui::SessionBadgeView::from_session(session);
    let signals = badge.signals();
    let mut stream = StreamBuilder::new();

    match render_fragment(
        &ui::SessionBadgeTemplate { session: badge },
        "infra::http::ui::badge_events",
    ) {
        Ok(html) => {
            stream.push_replace(html, SESSION_BADGE);
        }
        Err(err) => {
            error!(
                target = "infra::http::ui::badge_events",
                status = err.status().as_u16(),
                "failed to render session badge"
            );
        }
    }

    stream.push_signals(&signals);
    stream.into_events()
}
