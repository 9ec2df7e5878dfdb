//! Newtype IDs for catalog documents.
//!
//! The document store assigns every record an opaque string id. Wrapping
//! each kind keeps a `CategoryId` from being passed where a `ProductId`
//! is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// An opaque document identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the store handed us a blank id.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
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

define_id!(ProductId);
define_id!(CategoryId);
define_id!(CollectionId);
define_id!(MaterialId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("product-zeta-bowl");
        assert_eq!(id.as_str(), "product-zeta-bowl");
    }

    #[test]
    fn test_id_from_str() {
        let id: CategoryId = "category-bowls".into();
        assert_eq!(id.as_str(), "category-bowls");
        assert_eq!(format!("{}", id), "category-bowls");
    }

    #[test]
    fn test_blank_id() {
        assert!(ProductId::new("   ").is_blank());
        assert!(!ProductId::new("p1").is_blank());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = MaterialId::new("material-sterling");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"material-sterling\"");
        let back: MaterialId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
