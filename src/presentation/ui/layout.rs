use askama::Template;

use crate::application::session::Session;

#[derive(Clone)]
pub struct SessionBadgeView {
    pub signed_in: bool,
    pub label: String,
}

impl SessionBadgeView {
    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(session) => Self {
                signed_in: true,
                label: session
                    .user()
                    .email
                    .clone()
                    .unwrap_or_else(|| session.user_id().to_string()),
            },
            None => Self {
                signed_in: false,
                label: String::new(),
            },
        }
    }

    /// Initial datastar signals for the page body.
    pub fn signals(&self) -> String {
        serde_json::json!({ "signedIn": self.signed_in }).to_string()
    }
}

#[derive(Clone)]
pub struct LayoutView {
    pub title: String,
    pub session: SessionBadgeView,
}

impl LayoutView {
    pub fn new(title: impl Into<String>, session: Option<&Session>) -> Self {
        Self {
            title: title.into(),
            session: SessionBadgeView::from_session(session),
        }
    }
}

#[derive(Template)]
#[template(path = "ui/session_badge.html")]
pub struct SessionBadgeTemplate {
    pub session: SessionBadgeView,
}

#[derive(Template)]
#[template(path = "ui/message.html")]
pub struct MessagePageTemplate {
    pub layout: LayoutView,
    pub heading: String,
    pub body: String,
}
