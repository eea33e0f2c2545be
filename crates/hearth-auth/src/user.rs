//! User types.

use crate::AuthError;
use hearth_commerce::ids::UserId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Storefront customer.
    #[default]
    Customer,
    /// Holder of the admin password.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }

    /// Check if this role has at least the given permission level.
    pub fn has_permission(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    fn level(&self) -> u8 {
        match self {
            Role::Customer => 0,
            Role::Admin => 1,
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            other => Err(AuthError::InvalidInput(format!("unknown role: {other}"))),
        }
    }
}

/// Whoever a session belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum User {
    #[default]
    Anonymous,
    /// Logged-in storefront customer.
    Customer {
        id: UserId,
        username: String,
        email: String,
    },
    /// Admin panel operator. There are no admin accounts, only the shared password.
    Admin,
}

impl User {
    pub fn customer(id: UserId, username: impl Into<String>, email: impl Into<String>) -> Self {
        User::Customer {
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, User::Anonymous)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, User::Admin)
    }

    /// Customer id, if this is a customer.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            User::Customer { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            User::Customer { username, .. } => Some(username),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            User::Anonymous => None,
            User::Customer { .. } => Some(Role::Customer),
            User::Admin => Some(Role::Admin),
        }
    }

    pub fn has_permission(&self, required: Role) -> bool {
        self.role().is_some_and(|r| r.has_permission(required))
    }
}

/// Login form: username or email, plus password.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
}

impl UserCredentials {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(AuthError::InvalidInput(
                "Username and password are required".into(),
            ));
        }
        Ok(())
    }
}

/// Sign-up form.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    /// Field presence and password strength. Username and email rules live
    /// with the stored account.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.username.trim().is_empty() || self.email.trim().is_empty() {
            return Err(AuthError::InvalidInput(
                "Username and email are required".into(),
            ));
        }
        crate::PasswordHasher::validate_password(&self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.has_permission(Role::Customer));
        assert!(!Role::Customer.has_permission(Role::Admin));
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_anonymous_user() {
        let user = User::default();
        assert!(!user.is_authenticated());
        assert!(user.user_id().is_none());
        assert!(!user.has_permission(Role::Customer));
    }

    #[test]
    fn test_customer_user() {
        let user = User::customer(UserId::new("usr_1"), "asha", "asha@example.com");
        assert!(user.is_authenticated());
        assert!(!user.is_admin());
        assert_eq!(user.user_id().map(UserId::as_str), Some("usr_1"));
        assert_eq!(user.username(), Some("asha"));
        assert!(user.has_permission(Role::Customer));
        assert!(!user.has_permission(Role::Admin));
    }

    #[test]
    fn test_registration_validation() {
        let reg = Registration {
            username: "asha".into(),
            email: "asha@example.com".into(),
            password: "weak".into(),
        };
        assert!(matches!(reg.validate(), Err(AuthError::WeakPassword(_))));

        let reg = Registration {
            password: "curry-leaf-42".into(),
            ..reg
        };
        assert!(reg.validate().is_ok());

        let creds = UserCredentials {
            username: "  ".into(),
            password: "x".into(),
        };
        assert!(creds.validate().is_err());
    }
}
