//! HTTP adapter for a GoTrue-compatible auth service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::application::session::{AuthError, AuthProvider, Session, SessionUser};
use crate::config::AuthSettings;
use crate::domain::types::UserId;

use super::error::InfraError;

const USER_PATH: &str = "auth/v1/user";
const LOGOUT_PATH: &str = "auth/v1/logout";

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Clone)]
pub struct RemoteAuthProvider {
    client: Client,
    base: Url,
    api_key: String,
}

impl RemoteAuthProvider {
    pub fn new(settings: &AuthSettings) -> Result<Self, InfraError> {
        let mut base = Url::parse(&settings.base_url).map_err(|err| {
            InfraError::configuration(format!("auth.base_url `{}`: {err}", settings.base_url))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(concat!("postdesk/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.request_timeout_seconds.get()))
            .build()
            .map_err(|err| InfraError::auth_client(err.to_string()))?;

        Ok(Self {
            client,
            base,
            api_key: settings.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base
            .join(path)
            .map_err(|err| AuthError::Unavailable(err.to_string()))
    }
}

#[async_trait]
impl AuthProvider for RemoteAuthProvider {
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, AuthError> {
        let response = self
            .client
            .get(self.endpoint(USER_PATH)?)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| AuthError::Unavailable(err.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let user: RemoteUser = response
                    .json()
                    .await
                    .map_err(|err| AuthError::Malformed(err.to_string()))?;
                let id = UserId::parse(&user.id)
                    .map_err(|err| AuthError::Malformed(err.to_string()))?;
                Ok(Some(Session::new(
                    SessionUser {
                        id,
                        email: user.email,
                    },
                    access_token,
                )))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            other => Err(AuthError::UnexpectedStatus(other.as_u16())),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.endpoint(LOGOUT_PATH)?)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| AuthError::Unavailable(err.to_string()))?;

        let status = response.status();
        // A token the provider no longer knows is already signed out.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(AuthError::UnexpectedStatus(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU64;

    use httpmock::MockServer;

    use super::*;

    fn provider(server: &MockServer) -> RemoteAuthProvider {
        RemoteAuthProvider::new(&AuthSettings {
            base_url: server.base_url(),
            api_key: "anon-key".into(),
            cookie_name: "postdesk_session".into(),
            request_timeout_seconds: NonZeroU64::new(5).unwrap(),
        })
        .expect("provider")
    }

    #[tokio::test]
    async fn valid_token_yields_session() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/auth/v1/user")
                .header("apikey", "anon-key")
                .header("authorization", "Bearer good-token");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"id":"u1","email":"u1@example.com","role":"authenticated"}"#);
        });

        let session = provider(&server)
            .get_session("good-token")
            .await
            .expect("request")
            .expect("session");
        mock.assert();
        assert_eq!(session.user_id().as_str(), "u1");
        assert_eq!(session.user().email.as_deref(), Some("u1@example.com"));
        assert_eq!(session.access_token(), "good-token");
    }

    #[tokio::test]
    async fn rejected_token_yields_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/auth/v1/user");
            then.status(401).body(r#"{"msg":"invalid JWT"}"#);
        });

        let session = provider(&server).get_session("stale").await.expect("request");
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn provider_outage_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/auth/v1/user");
            then.status(500);
        });

        let err = provider(&server)
            .get_session("token")
            .await
            .expect_err("server error");
        assert!(matches!(err, AuthError::UnexpectedStatus(500)));
    }

    #[tokio::test]
    async fn sign_out_posts_to_logout() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST")
                .path("/auth/v1/logout")
                .header("authorization", "Bearer good-token");
            then.status(204);
        });

        provider(&server)
            .sign_out("good-token")
            .await
            .expect("signed out");
        mock.assert();
    }
}
