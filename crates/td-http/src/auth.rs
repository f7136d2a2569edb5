//! Auth endpoints.

use async_trait::async_trait;
use reqwest::Method;

use td_core::auth::{AuthResponse, LoginRequest, SignupRequest, User};
use td_core::ports::{AuthRemotePort, RemoteResult};

use crate::client::HttpRemote;

#[async_trait]
impl AuthRemotePort for HttpRemote {
    async fn signup(&self, request: &SignupRequest) -> RemoteResult<User> {
        let builder = self.request(Method::POST, "/auth/signup").json(request);
        self.send_json(builder).await
    }

    async fn login(&self, request: &LoginRequest) -> RemoteResult<AuthResponse> {
        let builder = self.request(Method::POST, "/auth/login").json(request);
        self.send_json(builder).await
    }

    async fn me(&self) -> RemoteResult<User> {
        let builder = self.request(Method::GET, "/auth/me");
        self.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use td_core::auth::{LoginRequest, SignupRequest};
    use td_core::error::RemoteError;
    use td_core::ports::{AuthRemotePort, TokenStorePort};

    use crate::client::{HttpConfig, HttpRemote};
    use crate::token::InMemoryTokenStore;

    fn remote_for(server: &mockito::Server) -> HttpRemote {
        let tokens: Arc<dyn TokenStorePort> = Arc::new(InMemoryTokenStore::new());
        let config = HttpConfig {
            base_url: server.url(),
            timeout: Duration::from_secs(2),
        };
        HttpRemote::new(config, tokens).expect("client construction")
    }

    #[tokio::test]
    async fn login_returns_the_token_envelope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/auth/login")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "email": "user@example.com",
                "password": "hunter2"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"accessToken": "tok-1", "tokenType": "Bearer", "expiresIn": 3600}"#)
            .create_async()
            .await;

        let remote = remote_for(&server);
        let response = remote
            .login(&LoginRequest {
                email: "user@example.com".into(),
                password: "hunter2".into(),
            })
            .await
            .unwrap();
        assert_eq!(response.access_token, "tok-1");
        assert_eq!(response.token_type, "Bearer");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn signup_surfaces_field_level_details() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/auth/signup")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "error": {
                        "code": "VALIDATION_FAILED",
                        "message": "invalid signup",
                        "details": [{"field": "email", "message": "already in use"}]
                    },
                    "timestamp": "2026-08-01T10:00:00Z"
                }"#,
            )
            .create_async()
            .await;

        let remote = remote_for(&server);
        let err = remote
            .signup(&SignupRequest {
                email: "user@example.com".into(),
                password: "hunter2".into(),
                password_confirm: "hunter2".into(),
            })
            .await
            .unwrap_err();
        match err {
            RemoteError::Api { details, .. } => {
                assert_eq!(details[0].field, "email");
                assert_eq!(details[0].message, "already in use");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn me_parses_the_user() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/auth/me")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id": 5, "email": "user@example.com", "createdAt": "2026-01-01T00:00:00Z"}"#,
            )
            .create_async()
            .await;

        let remote = remote_for(&server);
        let user = remote.me().await.unwrap();
        assert_eq!(user.id, 5);
        assert_eq!(user.email, "user@example.com");
    }
}
