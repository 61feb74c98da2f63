//! Authorization extractors for Axum.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use session_gate_access::{AccessClaims, AuthDecision, Role, RoleSet};
use std::sync::Arc;
use tracing::debug;

use super::AppState;

/// Message returned to authenticated users lacking an allowed role.
pub const FORBIDDEN_MESSAGE: &str = "You don't have enough permission to view this page";

/// Extractor for routes open to any signed-in user (`user` or `admin`).
///
/// Unauthenticated requests are redirected to the login page.
pub struct RequireUser(pub AccessClaims);

impl<S> FromRequestParts<S> for RequireUser
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let allow = RoleSet::of([Role::User, Role::Admin]);
        authorize(parts, state, &allow).await.map(RequireUser)
    }
}

/// Extractor for routes restricted to the `admin` role.
pub struct RequireAdmin(pub AccessClaims);

impl<S> FromRequestParts<S> for RequireAdmin
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let allow = RoleSet::of([Role::Admin]);
        authorize(parts, state, &allow).await.map(RequireAdmin)
    }
}

/// Runs the authorization engine against the request's session cookie.
async fn authorize<S>(
    parts: &mut Parts,
    state: &S,
    allow: &RoleSet,
) -> Result<AccessClaims, AuthRejection>
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    let app_state = Arc::<AppState>::from_ref(state);
    let jar = CookieJar::from_headers(&parts.headers);
    let access_token = app_state.sessions.read_access_token(&jar);

    match app_state
        .engine
        .authorize(access_token.as_deref(), allow)
        .await
    {
        AuthDecision::Authorized(claims) => Ok(claims),
        AuthDecision::LoginRequired(reason) => {
            debug!(?reason, path = %parts.uri.path(), "login required");
            Err(AuthRejection::LoginRequired)
        }
        AuthDecision::Forbidden(claims) => {
            debug!(username = %claims.username, path = %parts.uri.path(), "forbidden");
            Err(AuthRejection::Forbidden)
        }
    }
}

/// Rejection type for authorization extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No valid session.
    LoginRequired,
    /// Valid session, no allowed role. Never redirects, so an authenticated
    /// user cannot loop through the login flow.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::LoginRequired => Redirect::to("/login").into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, FORBIDDEN_MESSAGE).into_response(),
        }
    }
}
