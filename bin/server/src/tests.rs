//! Router-level tests against a stub identity provider.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use session_gate_access::{
    AccessClaims, CookieCodec, IdentityProvider, IdentityProviderError, Role, RoleSet, TokenBundle,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use crate::app;
use crate::auth::middleware::FORBIDDEN_MESSAGE;
use crate::auth::{AppState, FlowConfig, SessionManager};

const KEY: [u8; 32] = [9u8; 32];
const HOST: &str = "gate.test";

/// In-memory identity provider with scripted outcomes.
struct StubProvider {
    tokens: HashMap<String, RoleSet>,
    exchange_fails: bool,
    revoke_fails: bool,
    exchanges: Mutex<Vec<(String, String)>>,
    revoked: Mutex<Vec<String>>,
}

impl StubProvider {
    fn new() -> Self {
        Self {
            tokens: HashMap::from([
                ("user-token".to_string(), RoleSet::of([Role::User])),
                ("admin-token".to_string(), RoleSet::of([Role::Admin])),
            ]),
            exchange_fails: false,
            revoke_fails: false,
            exchanges: Mutex::new(Vec::new()),
            revoked: Mutex::new(Vec::new()),
        }
    }

    fn failing_exchange(mut self) -> Self {
        self.exchange_fails = true;
        self
    }

    fn failing_revoke(mut self) -> Self {
        self.revoke_fails = true;
        self
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    fn authorization_url(
        &self,
        redirect_uri: &str,
        scope: &str,
    ) -> Result<String, IdentityProviderError> {
        Ok(format!(
            "https://idp.test/auth?redirect_uri={redirect_uri}&scope={scope}"
        ))
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        _scope: &str,
    ) -> Result<TokenBundle, IdentityProviderError> {
        self.exchanges
            .lock()
            .expect("lock")
            .push((code.to_string(), redirect_uri.to_string()));

        if self.exchange_fails {
            return Err(IdentityProviderError::TokenExchange {
                reason: "invalid_grant".to_string(),
            });
        }

        Ok(TokenBundle {
            token_type: "Bearer".to_string(),
            access_token: "user-token".to_string(),
            expires_in: 300,
            refresh_token: "refresh-123".to_string(),
            refresh_expires_in: 1800,
            id_token: "id-token".to_string(),
        })
    }

    async fn decode_access_token(
        &self,
        access_token: &str,
    ) -> Result<AccessClaims, IdentityProviderError> {
        self.tokens
            .get(access_token)
            .map(|roles| AccessClaims::new(roles.clone(), "Test User", "tester"))
            .ok_or_else(|| IdentityProviderError::TokenInvalid {
                reason: "expired".to_string(),
            })
    }

    async fn revoke_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<(), IdentityProviderError> {
        self.revoked
            .lock()
            .expect("lock")
            .push(refresh_token.to_string());

        if self.revoke_fails {
            return Err(IdentityProviderError::Revocation {
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

fn test_app(provider: Arc<StubProvider>) -> Router {
    let sessions = SessionManager::new(CookieCodec::new(KEY), true);
    let flow = FlowConfig {
        scope: "openid".to_string(),
        public_url: None,
    };
    app::router(Arc::new(AppState::new(provider, sessions, flow)))
}

fn sealed(token: &str) -> String {
    CookieCodec::new(KEY).encrypt(token).expect("encrypt")
}

async fn get(app: Router, uri: &str, cookies: &[(&str, String)]) -> Response<Body> {
    let mut request = Request::builder().uri(uri).header(header::HOST, HOST);
    if !cookies.is_empty() {
        let cookie_header = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        request = request.header(header::COOKIE, cookie_header);
    }

    app.oneshot(request.body(Body::empty()).expect("request"))
        .await
        .expect("response")
}

fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

fn set_cookie<'a>(cookies: &'a [String], name: &str) -> Option<&'a String> {
    let prefix = format!("{name}=");
    cookies.iter().find(|c| c.starts_with(&prefix))
}

/// Value part of a `Set-Cookie` header.
fn cookie_value(set_cookie: &str) -> &str {
    let pair = set_cookie.split(';').next().unwrap_or_default();
    pair.split_once('=').map(|(_, v)| v).unwrap_or_default()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8")
}

#[tokio::test]
async fn admin_without_session_redirects_to_login() {
    let response = get(test_app(Arc::new(StubProvider::new())), "/admin", &[]).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn admin_with_user_role_is_forbidden() {
    let cookies = [("access_token", sealed("user-token"))];
    let response = get(test_app(Arc::new(StubProvider::new())), "/admin", &cookies).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(location(&response).is_none());
    assert_eq!(body_text(response).await, FORBIDDEN_MESSAGE);
}

#[tokio::test]
async fn admin_with_admin_role_is_allowed() {
    let cookies = [("access_token", sealed("admin-token"))];
    let response = get(test_app(Arc::new(StubProvider::new())), "/admin", &cookies).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.starts_with("admin page"));
}

#[tokio::test]
async fn home_allows_user_and_admin() {
    for token in ["user-token", "admin-token"] {
        let cookies = [("access_token", sealed(token))];
        let response = get(test_app(Arc::new(StubProvider::new())), "/", &cookies).await;

        assert_eq!(response.status(), StatusCode::OK, "{token}");
        let body: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json");
        assert!(body.get("/admin").is_some());
    }
}

#[tokio::test]
async fn home_without_session_redirects_to_login() {
    let response = get(test_app(Arc::new(StubProvider::new())), "/", &[]).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn expired_token_redirects_to_login() {
    let cookies = [("access_token", sealed("expired-token"))];
    let response = get(test_app(Arc::new(StubProvider::new())), "/", &cookies).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn tampered_cookie_redirects_to_login() {
    let mut forged = sealed("admin-token");
    let flipped = if forged[20..21] == *"A" { "B" } else { "A" };
    forged.replace_range(20..21, flipped);
    let cookies = [("access_token", forged)];
    let response = get(test_app(Arc::new(StubProvider::new())), "/admin", &cookies).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn plaintext_token_cookie_is_not_accepted() {
    let cookies = [("access_token", "admin-token".to_string())];
    let response = get(test_app(Arc::new(StubProvider::new())), "/admin", &cookies).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn login_redirects_to_provider_without_touching_session() {
    let response = get(test_app(Arc::new(StubProvider::new())), "/login", &[]).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        Some("https://idp.test/auth?redirect_uri=http://gate.test/callback&scope=openid")
    );
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn callback_sets_both_cookies_and_redirects_home() {
    let provider = Arc::new(StubProvider::new());
    let response = get(test_app(provider.clone()), "/callback?code=abc123", &[]).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let cookies = set_cookies(&response);
    let codec = CookieCodec::new(KEY);
    for (name, token) in [("access_token", "user-token"), ("refresh_token", "refresh-123")] {
        let cookie = set_cookie(&cookies, name).expect("cookie set");
        assert!(cookie.contains("HttpOnly"), "{cookie}");
        assert!(cookie.contains("SameSite=Lax"), "{cookie}");
        assert!(cookie.contains("Secure"), "{cookie}");
        assert!(!cookie.contains("Max-Age"), "{cookie}");
        assert_eq!(
            codec.decrypt(Some(cookie_value(cookie))).expect("decrypt").as_deref(),
            Some(token)
        );
    }

    let exchanges = provider.exchanges.lock().expect("lock");
    assert_eq!(
        exchanges.as_slice(),
        &[("abc123".to_string(), "http://gate.test/callback".to_string())]
    );
}

#[tokio::test]
async fn session_from_callback_opens_home() {
    let app = test_app(Arc::new(StubProvider::new()));
    let callback = get(app.clone(), "/callback?code=abc123", &[]).await;
    let cookies = set_cookies(&callback);
    let access = set_cookie(&cookies, "access_token").expect("cookie set");

    let cookies = [("access_token", cookie_value(access).to_string())];
    let response = get(app, "/", &cookies).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn failed_exchange_sets_no_cookies() {
    let provider = Arc::new(StubProvider::new().failing_exchange());
    let response = get(test_app(provider), "/callback?code=abc123", &[]).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn provider_error_on_callback_sets_no_cookies() {
    let provider = Arc::new(StubProvider::new());
    let response = get(
        test_app(provider.clone()),
        "/callback?error=access_denied&error_description=denied",
        &[],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookies(&response).is_empty());
    assert!(provider.exchanges.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn logout_clears_cookies_even_when_revoke_fails() {
    let provider = Arc::new(StubProvider::new().failing_revoke());
    let cookies = [
        ("access_token", sealed("user-token")),
        ("refresh_token", sealed("refresh-123")),
    ];
    let response = get(test_app(provider.clone()), "/logout", &cookies).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let set = set_cookies(&response);
    for name in ["access_token", "refresh_token"] {
        let cookie = set_cookie(&set, name).expect("removal cookie");
        assert_eq!(cookie_value(cookie), "");
        assert!(cookie.contains("Max-Age=0"), "{cookie}");
    }

    assert_eq!(
        provider.revoked.lock().expect("lock").as_slice(),
        &["refresh-123".to_string()]
    );
}

#[tokio::test]
async fn logout_without_session_still_clears_cookies() {
    let provider = Arc::new(StubProvider::new());
    let response = get(test_app(provider.clone()), "/logout", &[]).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let set = set_cookies(&response);
    assert!(set_cookie(&set, "access_token").is_some());
    assert!(set_cookie(&set, "refresh_token").is_some());
    assert!(provider.revoked.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn healthz_needs_no_session() {
    let response = get(test_app(Arc::new(StubProvider::new())), "/healthz", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}
