//! Search module.
//!
//! Contains filter criteria, sort keys, listing queries, pagination and
//! facets.

mod criteria;
mod query;
mod results;
mod sort;

pub use criteria::{Availability, CriteriaParams, FilterCriteria, WeightRange, ALL};
pub use query::CatalogQuery;
pub use results::{Facet, FacetValue, Pagination, SearchResults};
pub use sort::SortKey;
