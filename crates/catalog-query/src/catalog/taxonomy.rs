//! Categories, collections and materials.
//!
//! Products reference these documents; none of them own products.

use crate::ids::{CategoryId, CollectionId, MaterialId};
use serde::{Deserialize, Serialize};

/// A product category. Every product points at one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// URL-friendly slug (unique).
    pub slug: String,
    pub description: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: slug.into(),
            description: None,
        }
    }
}

/// A curated collection. Many-to-many with products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub featured: bool,
}

impl Collection {
    pub fn new(id: impl Into<CollectionId>, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: slug.into(),
            description: None,
            featured: false,
        }
    }
}

/// A material products are made from. Many-to-many with products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Purity metric, e.g. 92.5 for sterling silver.
    pub purity: Option<f64>,
}

impl Material {
    pub fn new(id: impl Into<MaterialId>, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: slug.into(),
            description: None,
            purity: None,
        }
    }
}
