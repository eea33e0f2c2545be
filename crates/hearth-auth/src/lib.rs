//! Authentication for Hearth.
//!
//! Customer accounts log in with a username or email and an Argon2-hashed
//! password. The admin panel sits behind a single shared password. Both
//! kinds of session live in the `hearth-cache` session store and expire on
//! their own schedule: 7 days for customers, 24 hours for admins.

mod admin;
mod error;
mod password;
mod session;
mod user;

pub use admin::{AdminGate, ADMIN_NAMESPACE};
pub use error::AuthError;
pub use hearth_cache::SessionId;
pub use password::{PasswordHasher, MIN_PASSWORD_LENGTH};
pub use session::{AuthSession, SessionStore};
pub use user::{Registration, Role, User, UserCredentials};
