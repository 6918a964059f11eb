//! Sign-in status and credential access.
//!
//! The identity provider itself is out of scope; the backend only needs to
//! know whether someone is signed in and to obtain a bearer token on demand.

use std::future::Future;

/// Environment variable read by [`EnvTokenProvider`].
pub const API_TOKEN_ENV: &str = "SUBSENTRY_API_TOKEN";

/// Capability supplied by the identity provider.
///
/// Implementations must be cheap to query for [`is_signed_in`]; the token
/// accessor may suspend (e.g. to refresh a session).
///
/// [`is_signed_in`]: AuthTokenProvider::is_signed_in
pub trait AuthTokenProvider: Send + Sync + 'static {
    /// Whether a user is currently signed in.
    fn is_signed_in(&self) -> bool;

    /// Obtain a bearer token for the signed-in user, if one is available.
    fn get_token(&self) -> impl Future<Output = Option<String>> + Send;
}

/// Provider backed by a fixed token, typically read from the environment.
///
/// Signed in exactly when a non-empty token is present.
#[derive(Debug, Clone, Default)]
pub struct EnvTokenProvider {
    token: Option<String>,
}

impl EnvTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|token| !token.is_empty()),
        }
    }

    /// Build a provider from [`API_TOKEN_ENV`].
    pub fn from_env() -> Self {
        let token = std::env::var(API_TOKEN_ENV).ok();
        if token.is_none() {
            log::info!("{API_TOKEN_ENV} is not set, alerts will stay empty until sign-in");
        }
        Self::new(token)
    }
}

impl AuthTokenProvider for EnvTokenProvider {
    fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    async fn get_token(&self) -> Option<String> {
        self.token.clone()
    }
}
