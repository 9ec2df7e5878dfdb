//! Listing query: criteria, sort and page in one value.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::search::criteria::explicit_bound;
use crate::search::{FilterCriteria, SortKey, WeightRange};

/// A full catalog listing request.
///
/// The engine holds no "current filter"; callers keep one of these and
/// pass it in on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub criteria: FilterCriteria,
    pub sort: SortKey,
    /// Current page (1-indexed).
    pub page: usize,
    /// Items per page; `None` uses the engine default.
    pub per_page: Option<usize>,
    /// Whether to compute facets alongside the page.
    pub include_facets: bool,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            sort: SortKey::Name,
            page: 1,
            per_page: None,
            include_facets: false,
        }
    }

    /// Set the criteria.
    pub fn with_criteria(mut self, criteria: FilterCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Set sort key.
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Set pagination. Page numbers below 1 become 1.
    pub fn with_pagination(mut self, page: usize, per_page: usize) -> Self {
        self.page = page.max(1);
        self.per_page = Some(per_page);
        self
    }

    /// Enable facets.
    pub fn with_facets(mut self) -> Self {
        self.include_facets = true;
        self
    }

    /// Parse a listing URL query string such as
    /// `q=silver&category=bowls&availability=available&sort=featured`.
    ///
    /// Unknown parameter names are ignored; bad values for known ones are
    /// errors.
    pub fn from_query_string(qs: &str) -> CatalogResult<Self> {
        let mut query = CatalogQuery::new();
        let mut weight_min = None;
        let mut weight_max = None;

        for pair in qs.trim_start_matches('?').split('&').filter(|p| !p.is_empty()) {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_component(raw)?;

            match key {
                "q" | "search" => query.criteria.search = Some(value),
                "category" => query.criteria.category = Some(value),
                "collection" => query.criteria.collection = Some(value),
                "material" => query.criteria.material = Some(value),
                "availability" => query.criteria.availability = value.parse()?,
                "weight_min" => weight_min = Some(parse_number(key, &value)?),
                "weight_max" => weight_max = Some(parse_number(key, &value)?),
                "sort" => query.sort = value.parse()?,
                "page" => query.page = parse_count(key, &value)?.max(1),
                "per_page" => query.per_page = Some(parse_count(key, &value)?),
                "facets" => query.include_facets = matches!(value.as_str(), "1" | "true"),
                _ => {}
            }
        }

        if weight_min.is_some() || weight_max.is_some() {
            query.criteria.weight_range = Some(WeightRange::from_bounds(weight_min, weight_max)?);
        }

        Ok(query)
    }

    /// Render back to a query string, omitting defaults.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        let c = &self.criteria;

        if let Some(term) = c.search.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(("q", term.to_string()));
        }
        if let Some(slug) = c.category_constraint() {
            pairs.push(("category", slug.to_string()));
        }
        if let Some(slug) = c.collection_constraint() {
            pairs.push(("collection", slug.to_string()));
        }
        if let Some(slug) = c.material_constraint() {
            pairs.push(("material", slug.to_string()));
        }
        if c.availability != Default::default() {
            pairs.push(("availability", c.availability.as_str().to_string()));
        }
        if let Some(range) = &c.weight_range {
            if range.min > 0.0 {
                pairs.push(("weight_min", range.min.to_string()));
            }
            if range.max.is_finite() {
                pairs.push(("weight_max", range.max.to_string()));
            }
        }
        if self.sort != SortKey::default() {
            pairs.push(("sort", self.sort.as_str().to_string()));
        }
        if self.page > 1 {
            pairs.push(("page", self.page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        if self.include_facets {
            pairs.push(("facets", "true".to_string()));
        }

        pairs
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(&v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn decode_component(raw: &str) -> CatalogResult<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|value| value.into_owned())
        .map_err(|e| CatalogError::InvalidCriteria(format!("bad percent-encoding: {}", e)))
}

fn parse_number(key: &str, value: &str) -> CatalogResult<f64> {
    let number = value
        .trim()
        .parse::<f64>()
        .map_err(|_| CatalogError::InvalidCriteria(format!("{} must be a number, got '{}'", key, value)))?;
    explicit_bound(key, number)
}

fn parse_count(key: &str, value: &str) -> CatalogResult<usize> {
    value.trim().parse::<usize>().map_err(|_| {
        CatalogError::InvalidCriteria(format!("{} must be a whole number, got '{}'", key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Availability;

    #[test]
    fn test_query_builder() {
        let query = CatalogQuery::new()
            .with_criteria(FilterCriteria::new().with_search("bowl"))
            .with_sort(SortKey::Weight)
            .with_pagination(0, 10)
            .with_facets();

        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, Some(10));
        assert_eq!(query.sort, SortKey::Weight);
        assert!(query.include_facets);
    }

    #[test]
    fn test_parse_query_string() {
        let query = CatalogQuery::from_query_string(
            "?q=silver+bowl&category=bowls&availability=out_of_stock&weight_min=10&weight_max=50&sort=featured&page=3&per_page=12&facets=1&utm_source=mail",
        )
        .unwrap();

        assert_eq!(query.criteria.search.as_deref(), Some("silver bowl"));
        assert_eq!(query.criteria.category.as_deref(), Some("bowls"));
        assert_eq!(query.criteria.availability, Availability::OutOfStock);
        assert_eq!(query.criteria.weight_range, Some(WeightRange { min: 10.0, max: 50.0 }));
        assert_eq!(query.sort, SortKey::Featured);
        assert_eq!(query.page, 3);
        assert_eq!(query.per_page, Some(12));
        assert!(query.include_facets);
    }

    #[test]
    fn test_parse_percent_encoded() {
        let query = CatalogQuery::from_query_string("q=%C3%A9clat%20ring").unwrap();
        assert_eq!(query.criteria.search.as_deref(), Some("éclat ring"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            CatalogQuery::from_query_string("sort=price_desc"),
            Err(CatalogError::InvalidSortKey(_))
        ));
        assert!(matches!(
            CatalogQuery::from_query_string("availability=maybe"),
            Err(CatalogError::InvalidCriteria(_))
        ));
        assert!(matches!(
            CatalogQuery::from_query_string("weight_min=heavy"),
            Err(CatalogError::InvalidCriteria(_))
        ));
        assert!(matches!(
            CatalogQuery::from_query_string("weight_min=90&weight_max=10"),
            Err(CatalogError::InvalidCriteria(_))
        ));
        assert!(matches!(
            CatalogQuery::from_query_string("page=-2"),
            Err(CatalogError::InvalidCriteria(_))
        ));
    }

    #[test]
    fn test_parse_rejects_infinite_weights() {
        for qs in ["weight_min=inf", "weight_max=inf", "weight_min=-inf", "weight_max=NaN"] {
            assert!(
                matches!(CatalogQuery::from_query_string(qs), Err(CatalogError::InvalidCriteria(_))),
                "{qs} should be rejected"
            );
        }

        let open = CatalogQuery::from_query_string("weight_min=25").unwrap();
        let range = open.criteria.weight_range.unwrap();
        assert_eq!(range.min, 25.0);
        assert!(range.max.is_infinite());
    }

    #[test]
    fn test_empty_query_string() {
        assert_eq!(CatalogQuery::from_query_string("").unwrap(), CatalogQuery::new());
    }

    #[test]
    fn test_query_string_round_trip() {
        let query = CatalogQuery::new()
            .with_criteria(
                FilterCriteria::new()
                    .with_search("silver bowl")
                    .with_collection("heritage")
                    .with_weight_range(WeightRange::from_bounds(None, Some(40.0)).unwrap()),
            )
            .with_sort(SortKey::Newest);

        let qs = query.to_query_string();
        assert_eq!(qs, "q=silver%20bowl&collection=heritage&weight_max=40&sort=newest");
        assert_eq!(CatalogQuery::from_query_string(&qs).unwrap(), query);
    }
}
