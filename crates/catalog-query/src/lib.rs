//! Product catalog query engine for the storefront.
//!
//! Works on product lists already fetched from the content store:
//!
//! - **Ingest**: validate raw store records into [`catalog::Product`]s
//! - **Annotate**: derive min/max weight, variant count and availability
//! - **Filter**: category, collection, material, weight range, availability, text
//! - **Sort**: name, category, newest, featured, weight, variant count
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_query::prelude::*;
//!
//! let report = ingest::products_from_json(&store_response)?;
//! let engine = CatalogQueryEngine::default();
//!
//! let annotation = engine.annotate(&report.products)?;
//! let criteria = FilterCriteria::new()
//!     .with_category("bowls")
//!     .with_availability(Availability::Available);
//! let bowls = engine.filter(&annotation.products, &criteria)?;
//! let listing = engine.sort(&bowls, SortKey::Featured);
//! ```

pub mod collate;
pub mod config;
pub mod error;
pub mod ids;
pub mod ingest;

pub mod catalog;
pub mod engine;
pub mod search;

pub use config::{AnnotatePolicy, EngineConfig};
pub use engine::{Annotation, CatalogQueryEngine, QueryOutcome};
pub use error::{CatalogError, CatalogResult};
pub use ids::*;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{AnnotatePolicy, EngineConfig};
    pub use crate::engine::{Annotation, CatalogQueryEngine, QueryOutcome};
    pub use crate::error::{CatalogError, CatalogResult};
    pub use crate::ids::*;
    pub use crate::ingest::{self, IngestReport};

    // Catalog
    pub use crate::catalog::{
        AnnotatedProduct, Category, Collection, DerivedSummary, DimensionUnit, Material, Product,
        ProductImage, Variant, VariantStatus,
    };

    // Search
    pub use crate::search::{
        Availability, CatalogQuery, Facet, FacetValue, FilterCriteria, Pagination, SearchResults,
        SortKey, WeightRange,
    };
}
