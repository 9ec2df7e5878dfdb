//! Sort keys for catalog listings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::AnnotatedProduct;
use crate::collate;
use crate::error::CatalogError;

/// Sort options for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Name A-Z.
    #[default]
    Name,
    /// Category name A-Z; products without a category first.
    Category,
    /// Newest first; products without a timestamp last.
    Newest,
    /// Featured products first.
    Featured,
    /// Lightest variant first.
    Weight,
    /// Most variants first.
    Variants,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Name,
        SortKey::Category,
        SortKey::Newest,
        SortKey::Featured,
        SortKey::Weight,
        SortKey::Variants,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Category => "category",
            SortKey::Newest => "newest",
            SortKey::Featured => "featured",
            SortKey::Weight => "weight",
            SortKey::Variants => "variants",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortKey::Name => "Name: A-Z",
            SortKey::Category => "Category",
            SortKey::Newest => "Newest",
            SortKey::Featured => "Featured First",
            SortKey::Weight => "Weight: Light to Heavy",
            SortKey::Variants => "Most Options",
        }
    }

    /// Ordering of two products under this key. Equal keys compare
    /// `Equal` so a stable sort keeps their input order.
    pub fn compare(&self, a: &AnnotatedProduct, b: &AnnotatedProduct) -> Ordering {
        match self {
            SortKey::Name => collate::compare(&a.product.name, &b.product.name),
            SortKey::Category => {
                collate::compare(a.product.category_name(), b.product.category_name())
            }
            SortKey::Newest => match (a.product.created_at, b.product.created_at) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortKey::Featured => b.product.featured.cmp(&a.product.featured),
            SortKey::Weight => a.summary.min_weight.total_cmp(&b.summary.min_weight),
            SortKey::Variants => b.summary.variant_count.cmp(&a.summary.variant_count),
        }
    }
}

impl FromStr for SortKey {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| CatalogError::InvalidSortKey(s.to_string()))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
