//! Filter criteria for catalog listings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::AnnotatedProduct;
use crate::error::{CatalogError, CatalogResult};

/// Slug value meaning "no constraint" in the storefront's select boxes.
pub const ALL: &str = "all";

/// Stock availability constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// At least one variant is available.
    Available,
    /// No variant is available.
    OutOfStock,
    /// Unconstrained.
    #[default]
    All,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::OutOfStock => "out_of_stock",
            Availability::All => "all",
        }
    }

    /// Whether a product with the given summary flag passes.
    pub fn accepts(&self, has_available_variant: bool) -> bool {
        match self {
            Availability::Available => has_available_variant,
            Availability::OutOfStock => !has_available_variant,
            Availability::All => true,
        }
    }
}

impl FromStr for Availability {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Availability::Available),
            "out_of_stock" => Ok(Availability::OutOfStock),
            "all" | "" => Ok(Availability::All),
            other => Err(CatalogError::InvalidCriteria(format!(
                "unknown availability '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive weight interval in grams. Either end may be open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
}

impl WeightRange {
    /// Build a validated range.
    pub fn new(min: f64, max: f64) -> CatalogResult<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Build a range from optional bounds; a missing bound is open.
    pub fn from_bounds(min: Option<f64>, max: Option<f64>) -> CatalogResult<Self> {
        Self::new(min.unwrap_or(0.0), max.unwrap_or(f64::INFINITY))
    }

    /// An infinite `max` is the open-end marker; `min` must be finite.
    pub fn validate(&self) -> CatalogResult<()> {
        if !self.min.is_finite() || self.max.is_nan() {
            return Err(CatalogError::InvalidCriteria(format!(
                "weight range [{}, {}] has a non-finite bound",
                self.min, self.max
            )));
        }
        if self.min < 0.0 {
            return Err(CatalogError::InvalidCriteria(format!(
                "weight range minimum {} is negative",
                self.min
            )));
        }
        if self.min > self.max {
            return Err(CatalogError::InvalidCriteria(format!(
                "weight range [{}, {}] is inverted",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Check a bound the caller wrote out explicitly. Infinity is only ever
/// implied by leaving `max` out.
pub(crate) fn explicit_bound(name: &str, value: f64) -> CatalogResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CatalogError::InvalidCriteria(format!(
            "{} must be a finite number, got {}",
            name, value
        )))
    }
}

/// Independently optional listing constraints, combined with AND.
///
/// Slug fields treat `None`, an empty string and `"all"` alike as
/// unconstrained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(try_from = "CriteriaParams")]
pub struct FilterCriteria {
    pub category: Option<String>,
    pub collection: Option<String>,
    pub material: Option<String>,
    pub weight_range: Option<WeightRange>,
    pub availability: Availability,
    /// Free-text term, matched case-insensitively.
    pub search: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode criteria sent by a caller as JSON.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let params: CriteriaParams = serde_json::from_str(json)
            .map_err(|e| CatalogError::InvalidCriteria(e.to_string()))?;
        Self::try_from(params)
    }

    pub fn with_category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    pub fn with_collection(mut self, slug: impl Into<String>) -> Self {
        self.collection = Some(slug.into());
        self
    }

    pub fn with_material(mut self, slug: impl Into<String>) -> Self {
        self.material = Some(slug.into());
        self
    }

    pub fn with_weight_range(mut self, range: WeightRange) -> Self {
        self.weight_range = Some(range);
        self
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> CatalogResult<()> {
        if let Some(range) = &self.weight_range {
            range.validate()?;
        }
        Ok(())
    }

    pub fn category_constraint(&self) -> Option<&str> {
        slug_constraint(self.category.as_deref())
    }

    pub fn collection_constraint(&self) -> Option<&str> {
        slug_constraint(self.collection.as_deref())
    }

    pub fn material_constraint(&self) -> Option<&str> {
        slug_constraint(self.material.as_deref())
    }

    /// Lowercased search term, or `None` when blank.
    pub fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether no criterion is active.
    pub fn is_unconstrained(&self) -> bool {
        self.category_constraint().is_none()
            && self.collection_constraint().is_none()
            && self.material_constraint().is_none()
            && self.weight_range.is_none()
            && self.availability == Availability::All
            && self.search_needle().is_none()
    }

    /// Evaluate every active predicate against one product.
    ///
    /// `needle` is the precomputed [`FilterCriteria::search_needle`].
    pub(crate) fn matches(&self, item: &AnnotatedProduct, needle: Option<&str>) -> bool {
        let product = &item.product;

        if let Some(slug) = self.category_constraint() {
            if product.category_slug() != Some(slug) {
                return false;
            }
        }

        if let Some(slug) = self.collection_constraint() {
            if !product.in_collection(slug) {
                return false;
            }
        }

        if let Some(slug) = self.material_constraint() {
            if !product.has_material(slug) {
                return false;
            }
        }

        if let Some(range) = &self.weight_range {
            if !item.summary.overlaps_weight(range.min, range.max) {
                return false;
            }
        }

        if !self.availability.accepts(item.summary.has_available_variant) {
            return false;
        }

        if let Some(needle) = needle {
            if !product.matches_text(needle) {
                return false;
            }
        }

        true
    }
}

fn slug_constraint(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|slug| !slug.is_empty() && *slug != ALL)
}

/// Wire shape of [`FilterCriteria`]: the storefront's field names, with
/// enum values kept as strings so bad values surface as `InvalidCriteria`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaParams {
    category: Option<String>,
    collection: Option<String>,
    material: Option<String>,
    #[serde(alias = "weight_range")]
    weight_range: Option<RangeParams>,
    availability: Option<String>,
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RangeParams {
    Pair([f64; 2]),
    Bounds { min: Option<f64>, max: Option<f64> },
}

impl TryFrom<CriteriaParams> for FilterCriteria {
    type Error = CatalogError;

    fn try_from(params: CriteriaParams) -> Result<Self, Self::Error> {
        let weight_range = match params.weight_range {
            Some(RangeParams::Pair([min, max])) => Some(WeightRange::new(
                explicit_bound("weight range minimum", min)?,
                explicit_bound("weight range maximum", max)?,
            )?),
            Some(RangeParams::Bounds { min, max }) => Some(WeightRange::from_bounds(
                min.map(|v| explicit_bound("weight range minimum", v)).transpose()?,
                max.map(|v| explicit_bound("weight range maximum", v)).transpose()?,
            )?),
            None => None,
        };

        let availability = match params.availability.as_deref() {
            Some(value) => value.parse()?,
            None => Availability::All,
        };

        Ok(Self {
            category: params.category,
            collection: params.collection,
            material: params.material,
            weight_range,
            availability,
            search: params.search,
        })
    }
}
