//! Product records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, Collection, Material, Variant};
use crate::ids::ProductId;

/// A product image reference. Upload and rendering live elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductImage {
    /// Asset reference in the media store.
    pub asset_ref: String,
    /// Alt text for accessibility.
    pub alt: Option<String>,
    pub caption: Option<String>,
}

/// A validated product with its references already resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Opaque store identifier.
    pub id: ProductId,
    pub name: String,
    /// URL-friendly slug (unique per catalog).
    pub slug: String,
    /// Full description.
    pub description: Option<String>,
    /// Short description for listings.
    pub short_description: Option<String>,
    /// The product's category. `None` only when the store returned a
    /// dangling reference.
    pub category: Option<Category>,
    pub materials: Vec<Material>,
    pub collections: Vec<Collection>,
    pub images: Vec<ProductImage>,
    /// Highlighted on the storefront.
    pub featured: bool,
    /// Product-level availability flag set by admins.
    pub available: bool,
    pub created_at: Option<DateTime<Utc>>,
    /// Weight/size options, in display order.
    pub variants: Vec<Variant>,
}

impl Product {
    /// Create a product with no references and no variants.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: slug.into(),
            description: None,
            short_description: None,
            category: None,
            materials: Vec::new(),
            collections: Vec::new(),
            images: Vec::new(),
            featured: false,
            available: true,
            created_at: None,
            variants: Vec::new(),
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Append a variant.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Add a collection, skipping duplicates by slug.
    pub fn add_collection(&mut self, collection: Collection) {
        if !self.collections.iter().any(|c| c.slug == collection.slug) {
            self.collections.push(collection);
        }
    }

    /// Add a material, skipping duplicates by slug.
    pub fn add_material(&mut self, material: Material) {
        if !self.materials.iter().any(|m| m.slug == material.slug) {
            self.materials.push(material);
        }
    }

    /// Category name, or an empty string when the category is missing.
    pub fn category_name(&self) -> &str {
        self.category.as_ref().map(|c| c.name.as_str()).unwrap_or("")
    }

    pub fn category_slug(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.slug.as_str())
    }

    pub fn in_collection(&self, slug: &str) -> bool {
        self.collections.iter().any(|c| c.slug == slug)
    }

    pub fn has_material(&self, slug: &str) -> bool {
        self.materials.iter().any(|m| m.slug == slug)
    }

    /// Case-insensitive substring match over name, category name, short
    /// description and description. `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

        contains(self.name.as_str())
            || self.category.as_ref().is_some_and(|c| contains(c.name.as_str()))
            || self.short_description.as_deref().is_some_and(contains)
            || self.description.as_deref().is_some_and(contains)
    }
}
