//! Product catalog module.
//!
//! Contains the validated records the engine works on: products, variants,
//! categories, collections, materials, and derived summaries.

mod product;
mod summary;
mod taxonomy;
mod variant;

pub use product::{Product, ProductImage};
pub use summary::{AnnotatedProduct, DerivedSummary};
pub use taxonomy::{Category, Collection, Material};
pub use variant::{DimensionUnit, Variant, VariantStatus};
