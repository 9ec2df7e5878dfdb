//! Catalog error types.

use thiserror::Error;

use crate::ids::ProductId;

/// Errors raised at the catalog engine boundary.
///
/// Every variant is a local validation failure: it is deterministic for a
/// given input and never worth retrying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// A product record cannot be used by the engine.
    #[error("Invalid product {id}: {reason}")]
    InvalidProduct { id: ProductId, reason: String },

    /// A filter criterion holds a value outside its domain.
    #[error("Invalid filter criteria: {0}")]
    InvalidCriteria(String),

    /// Unknown sort key.
    #[error("Invalid sort key: {0}")]
    InvalidSortKey(String),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CatalogError {
    /// Shorthand for an [`CatalogError::InvalidProduct`].
    pub fn invalid_product(id: &ProductId, reason: impl Into<String>) -> Self {
        CatalogError::InvalidProduct {
            id: id.clone(),
            reason: reason.into(),
        }
    }

    /// The offending product id, for product-level errors.
    pub fn product_id(&self) -> Option<&ProductId> {
        match self {
            CatalogError::InvalidProduct { id, .. } => Some(id),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(e: toml::de::Error) -> Self {
        CatalogError::Config(e.to_string())
    }
}

/// Result alias used across the crate.
pub type CatalogResult<T> = Result<T, CatalogError>;
