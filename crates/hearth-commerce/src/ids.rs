//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a ProductId where a CategoryId is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
///
/// Generated IDs carry a short prefix so they are recognisable in logs
/// and URLs, e.g. `prod_1b4e28ba2fa1427e8e0d1f7a3c3f9e52`.
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID.
            pub fn generate() -> Self {
                Self(generate_id($prefix))
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId, "prod");
define_id!(CategoryId, "cat");
define_id!(SubCategoryId, "sub");
define_id!(OrderId, "ord");
define_id!(CouponId, "cpn");
define_id!(BlogPostId, "blog");
define_id!(RecipeId, "rcp");
define_id!(TopbarId, "top");
define_id!(ReviewId, "rev");
define_id!(OfferId, "off");
define_id!(UserId, "user");

fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("prod-123");
        assert_eq!(id.as_str(), "prod-123");
    }

    #[test]
    fn test_id_generation() {
        let id1 = ProductId::generate();
        let id2 = ProductId::generate();
        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("prod_"));
        assert_eq!(id1.as_str().len(), "prod_".len() + 32);
    }

    #[test]
    fn test_id_from_string() {
        let id: CouponId = "cpn-456".into();
        assert_eq!(id.as_str(), "cpn-456");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = OrderId::new("ord_1");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""ord_1""#);
    }
}
