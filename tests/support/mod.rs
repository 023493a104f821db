#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use time::OffsetDateTime;
use tokio::sync::Notify;
use tower::ServiceExt;

use postdesk::application::controls::InFlightActions;
use postdesk::application::posts::PostActions;
use postdesk::application::repos::{
    PostMatch, PostsRepo, PostsWriteRepo, RepoError, StoreHealth,
};
use postdesk::application::session::{AuthError, AuthProvider, Session, SessionHub, SessionUser};
use postdesk::config::CopySettings;
use postdesk::domain::entities::PostRecord;
use postdesk::domain::posts::NewPost;
use postdesk::domain::types::{PostId, UserId};
use postdesk::infra::http::{HttpState, build_router};

pub const ALICE: &str = "alice-token";
pub const BOB: &str = "bob-token";

/// Post store kept in memory. A gated store parks every write until
/// `release` is notified, after signalling `entered`.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<PostRecord>>,
    writes: AtomicUsize,
    next_id: AtomicUsize,
    gated: bool,
    pub entered: Notify,
    pub release: Notify,
}

impl MemoryStore {
    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Self::default()
        }
    }

    pub fn seed(&self, id: &str, owner: &str, published: bool) {
        let now = OffsetDateTime::now_utc();
        self.rows.lock().unwrap().push(PostRecord {
            id: PostId::parse(id).unwrap(),
            title: format!("Post {id}"),
            content: "body".to_string(),
            published,
            user_id: UserId::parse(owner).unwrap(),
            created_at: now,
            updated_at: now,
        });
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn row(&self, id: &str) -> Option<PostRecord> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id.as_str() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    async fn enter_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl PostsRepo for MemoryStore {
    async fn find_by_id(&self, id: &PostId) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.row(id.as_str()))
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<PostRecord>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .rev()
            .filter(|row| &row.user_id == owner)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryStore {
    async fn insert_post(&self, post: NewPost) -> Result<PostRecord, RepoError> {
        self.enter_write().await;
        let now = OffsetDateTime::now_utc();
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = PostRecord {
            id: PostId::parse(&format!("new-{n}")).unwrap(),
            title: post.title,
            content: post.content,
            published: post.published,
            user_id: post.user_id,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_published(
        &self,
        matcher: &PostMatch,
        published: bool,
    ) -> Result<Option<PostRecord>, RepoError> {
        self.enter_write().await;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|row| matcher.matches(row)).map(|row| {
            row.published = published;
            row.updated_at = OffsetDateTime::now_utc();
            row.clone()
        }))
    }

    async fn delete_post(&self, matcher: &PostMatch) -> Result<Option<PostRecord>, RepoError> {
        self.enter_write().await;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .position(|row| matcher.matches(row))
            .map(|index| rows.remove(index)))
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

/// Accepts two fixed tokens.
pub struct StubAuth;

#[async_trait]
impl AuthProvider for StubAuth {
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, AuthError> {
        let user = match access_token {
            ALICE => "alice",
            BOB => "bob",
            _ => return Ok(None),
        };
        Ok(Some(Session::new(
            SessionUser {
                id: UserId::parse(user).unwrap(),
                email: Some(format!("{user}@example.com")),
            },
            access_token,
        )))
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub state: HttpState,
    pub copy: CopySettings,
}

pub fn app(store: MemoryStore) -> TestApp {
    let store = Arc::new(store);
    let reader: Arc<dyn PostsRepo> = store.clone();
    let writer: Arc<dyn PostsWriteRepo> = store.clone();
    let health: Arc<dyn StoreHealth> = store.clone();
    let copy = CopySettings::default();

    let state = HttpState {
        posts: PostActions::new(reader, writer),
        sessions: SessionHub::new(Arc::new(StubAuth)),
        in_flight: InFlightActions::new(),
        health,
        copy: Arc::new(copy.clone()),
        session_cookie: Arc::from("postdesk_session"),
    };

    TestApp {
        router: build_router(state.clone()),
        store,
        state,
        copy,
    }
}

pub fn form(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn json(method: Method, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Read frames from a long-lived body until `needle` shows up.
pub async fn read_until(body: &mut Body, needle: &str) -> String {
    let mut seen = String::new();
    let wait = async {
        while !seen.contains(needle) {
            let Some(frame) = body.frame().await else {
                break;
            };
            if let Ok(data) = frame.unwrap().into_data() {
                seen.push_str(&String::from_utf8_lossy(&data));
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("stream produced the expected frame");
    seen
}
