use std::sync::Arc;

use crate::application::{
    controls::InFlightActions, posts::PostActions, repos::StoreHealth, session::SessionHub,
};
use crate::config::CopySettings;

#[derive(Clone)]
pub struct HttpState {
    pub posts: PostActions,
    pub sessions: SessionHub,
    pub in_flight: InFlightActions,
    pub health: Arc<dyn StoreHealth>,
    pub copy: Arc<CopySettings>,
    pub session_cookie: Arc<str>,
}
