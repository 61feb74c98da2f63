//! Authentication routes for login, callback, and logout.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{AppState, FlowConfig};

/// Path of the OIDC callback route.
pub const CALLBACK_PATH: &str = "/callback";

/// Query parameters for the OIDC callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Initiates the OIDC login flow by redirecting to the identity provider.
///
/// Does not touch the session cookies.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Redirect, FlowError> {
    let redirect_uri = callback_url(&state.flow, &headers);
    let auth_url = state
        .provider
        .authorization_url(&redirect_uri, &state.flow.scope)
        .map_err(|e| FlowError::Provider(e.to_string()))?;

    Ok(Redirect::to(&auth_url))
}

/// Handles the OIDC callback after the user authenticates with the identity provider.
///
/// Session cookies are written only after a successful exchange.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), FlowError> {
    if let Some(error) = query.error {
        return Err(FlowError::Denied {
            error,
            description: query.error_description.unwrap_or_default(),
        });
    }
    let code = query.code.ok_or(FlowError::MissingCode)?;

    let redirect_uri = callback_url(&state.flow, &headers);
    let tokens = state
        .provider
        .exchange_code(&code, &redirect_uri, &state.flow.scope)
        .await
        .map_err(|e| FlowError::TokenExchange(e.to_string()))?;

    let jar = state
        .sessions
        .write_session(jar, &tokens)
        .map_err(|e| FlowError::Session(e.to_string()))?;

    info!("session established");
    Ok((jar, Redirect::to("/")))
}

/// Logs out the user by revoking the refresh token and clearing the session.
///
/// Revocation is best effort: the cookies are cleared even when the
/// provider cannot be reached.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(refresh_token) = state.sessions.read_refresh_token(&jar) {
        if let Err(e) = state.provider.revoke_refresh_token(&refresh_token).await {
            warn!(error = %e, "failed to revoke refresh token, clearing session anyway");
        }
    }

    (state.sessions.clear_session(jar), Redirect::to("/"))
}

/// Computes the absolute callback URL for the current request.
///
/// Uses the configured public URL if there is one, otherwise the request's
/// `Host` and `X-Forwarded-Proto` headers.
pub fn callback_url(flow: &FlowConfig, headers: &HeaderMap) -> String {
    if let Some(public_url) = &flow.public_url {
        return format!("{}{CALLBACK_PATH}", public_url.trim_end_matches('/'));
    }

    let header_value = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let scheme = header_value("x-forwarded-proto").unwrap_or("http");
    let host = header_value("host").unwrap_or("localhost");
    format!("{scheme}://{host}{CALLBACK_PATH}")
}

/// Login flow errors.
#[derive(Debug)]
pub enum FlowError {
    /// The provider reported an error instead of a code.
    Denied { error: String, description: String },
    /// The callback carried neither a code nor an error.
    MissingCode,
    /// The authorization URL could not be built.
    Provider(String),
    /// The provider rejected the code or was unreachable.
    TokenExchange(String),
    /// The tokens could not be sealed into cookies.
    Session(String),
}

impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Denied { error, description } => {
                warn!(%error, %description, "identity provider denied authentication");
                (StatusCode::BAD_REQUEST, "Authentication failed")
            }
            Self::MissingCode => (StatusCode::BAD_REQUEST, "Missing authorization code"),
            Self::Provider(msg) => {
                error!("Failed to build authorization URL: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            Self::TokenExchange(msg) => {
                error!("Token exchange failed: {}", msg);
                (StatusCode::BAD_GATEWAY, "Authentication failed")
            }
            Self::Session(msg) => {
                error!("Session cookie error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}
