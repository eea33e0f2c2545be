//! Session cookies.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use hearth_auth::{AuthSession, SessionId, User};

/// HttpOnly customer session id.
pub const SESSION_COOKIE: &str = "session_id";
pub const USER_ID_COOKIE: &str = "userId";
pub const USERNAME_COOKIE: &str = "username";
/// HttpOnly admin session id.
pub const ADMIN_SESSION_COOKIE: &str = "admin_session";
pub const ADMIN_FLAG_COOKIE: &str = "admin_authenticated";
/// Admin session expiry, Unix seconds.
pub const ADMIN_EXPIRES_COOKIE: &str = "admin_session_expires";

#[derive(Debug, Clone, Copy, Default)]
pub struct CookieSettings {
    pub secure: bool,
}

impl CookieSettings {
    fn build(
        &self,
        name: &'static str,
        value: String,
        http_only: bool,
        max_age_secs: i64,
    ) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .http_only(http_only)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(max_age_secs.max(0)))
            .finish()
    }

    fn removal(&self, name: &'static str, http_only: bool) -> Cookie<'static> {
        self.build(name, String::new(), http_only, 0)
    }

    /// Session id plus the `userId`/`username` hints read by the storefront UI.
    pub fn customer_login(&self, id: &SessionId, session: &AuthSession) -> Vec<Cookie<'static>> {
        let max_age = session.remaining_secs();
        let mut cookies = vec![self.build(SESSION_COOKIE, id.to_string(), true, max_age)];
        if let User::Customer { id, username, .. } = &session.user {
            cookies.push(self.build(USER_ID_COOKIE, id.to_string(), false, max_age));
            cookies.push(self.build(USERNAME_COOKIE, username.clone(), false, max_age));
        }
        cookies
    }

    pub fn customer_logout(&self) -> Vec<Cookie<'static>> {
        vec![
            self.removal(SESSION_COOKIE, true),
            self.removal(USER_ID_COOKIE, false),
            self.removal(USERNAME_COOKIE, false),
        ]
    }

    pub fn admin_login(&self, id: &SessionId, session: &AuthSession) -> Vec<Cookie<'static>> {
        let max_age = session.remaining_secs();
        vec![
            self.build(ADMIN_SESSION_COOKIE, id.to_string(), true, max_age),
            self.build(ADMIN_FLAG_COOKIE, "true".to_string(), false, max_age),
            self.build(
                ADMIN_EXPIRES_COOKIE,
                session.expires_at.to_string(),
                false,
                max_age,
            ),
        ]
    }

    pub fn admin_logout(&self) -> Vec<Cookie<'static>> {
        vec![
            self.removal(ADMIN_SESSION_COOKIE, true),
            self.removal(ADMIN_FLAG_COOKIE, false),
            self.removal(ADMIN_EXPIRES_COOKIE, false),
        ]
    }
}
