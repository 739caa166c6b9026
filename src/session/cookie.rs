use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::Environment;

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

/// Attributes for the session cookie, which depend on the deployment mode.
///
/// Production serves the API cross-site from the frontend, so the cookie must
/// be `SameSite=None` and therefore `Secure`.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    environment: Environment,
}

impl CookiePolicy {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    fn same_site(&self) -> SameSite {
        match self.environment {
            Environment::Production => SameSite::None,
            Environment::Development => SameSite::Strict,
        }
    }

    fn secure(&self) -> bool {
        self.environment == Environment::Production
    }

    fn build(&self, value: String) -> Cookie<'static> {
        Cookie::build((TOKEN_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(self.same_site())
            .secure(self.secure())
            .build()
    }

    /// Cookie carrying a freshly issued token
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        self.build(token)
    }

    /// Empty cookie that expires immediately, overwriting any session cookie
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.build(String::new());
        cookie.make_removal();
        cookie
    }
}
