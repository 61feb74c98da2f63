//! Cookie-held sessions.
//!
//! A session is nothing but two cookies holding the encrypted access and
//! refresh tokens. There is no server-side session state.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use session_gate_access::{CookieCodec, EncryptionError, TokenBundle};
use time::Duration as TimeDuration;
use tracing::debug;

/// Access token cookie name.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Refresh token cookie name.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Reads and writes the session cookies.
#[derive(Debug, Clone)]
pub struct SessionManager {
    codec: CookieCodec,
    secure_cookies: bool,
}

impl SessionManager {
    /// Creates a session manager sealing cookies with `codec`.
    #[must_use]
    pub fn new(codec: CookieCodec, secure_cookies: bool) -> Self {
        Self {
            codec,
            secure_cookies,
        }
    }

    /// Adds both session cookies for a freshly issued token bundle.
    ///
    /// Either both cookies are added or, on error, neither.
    ///
    /// # Errors
    ///
    /// Returns an error if a token cannot be encrypted.
    pub fn write_session(
        &self,
        jar: CookieJar,
        tokens: &TokenBundle,
    ) -> Result<CookieJar, EncryptionError> {
        let access = self.codec.encrypt(&tokens.access_token)?;
        let refresh = self.codec.encrypt(&tokens.refresh_token)?;

        Ok(jar
            .add(self.session_cookie(ACCESS_TOKEN_COOKIE, access))
            .add(self.session_cookie(REFRESH_TOKEN_COOKIE, refresh)))
    }

    /// Returns the decrypted access token, if the cookie is present and intact.
    #[must_use]
    pub fn read_access_token(&self, jar: &CookieJar) -> Option<String> {
        self.read_token(jar, ACCESS_TOKEN_COOKIE)
    }

    /// Returns the decrypted refresh token, if the cookie is present and intact.
    #[must_use]
    pub fn read_refresh_token(&self, jar: &CookieJar) -> Option<String> {
        self.read_token(jar, REFRESH_TOKEN_COOKIE)
    }

    /// Expires both session cookies, whether or not the request carried them.
    #[must_use]
    pub fn clear_session(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.removal_cookie(ACCESS_TOKEN_COOKIE))
            .add(self.removal_cookie(REFRESH_TOKEN_COOKIE))
    }

    fn read_token(&self, jar: &CookieJar, name: &'static str) -> Option<String> {
        let value = jar.get(name).map(|c| c.value());
        // A cookie that fails to decrypt is treated as absent.
        self.codec.decrypt(value).unwrap_or_else(|e| {
            debug!(cookie = name, error = %e, "discarding unreadable session cookie");
            None
        })
    }

    fn session_cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
            .build()
    }

    fn removal_cookie(&self, name: &'static str) -> Cookie<'static> {
        Cookie::build((name, ""))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
            .max_age(TimeDuration::ZERO)
            .build()
    }
}
