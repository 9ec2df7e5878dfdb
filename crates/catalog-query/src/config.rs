//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::DimensionUnit;
use crate::error::{CatalogError, CatalogResult};

/// What `annotate` does with a product that has no variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnnotatePolicy {
    /// Drop the product from the output and report it next to the result.
    #[default]
    SkipAndReport,
    /// Fail the whole batch on the first invalid product.
    AbortBatch,
}

/// Catalog engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Zero-variant handling in `annotate`.
    #[serde(default)]
    pub annotate_policy: AnnotatePolicy,

    /// Unit for variant height/diameter/length in this deployment.
    #[serde(default)]
    pub dimension_unit: DimensionUnit,

    /// Page size when a query does not ask for one.
    #[serde(default = "default_per_page")]
    pub default_per_page: usize,

    /// Upper bound on requested page sizes.
    #[serde(default = "default_max_per_page")]
    pub max_per_page: usize,

    /// How many products the featured listing returns.
    #[serde(default = "default_featured_limit")]
    pub featured_limit: usize,

    /// How many related products a product page shows.
    #[serde(default = "default_related_limit")]
    pub related_limit: usize,
}

fn default_per_page() -> usize {
    24
}

fn default_max_per_page() -> usize {
    100
}

fn default_featured_limit() -> usize {
    8
}

fn default_related_limit() -> usize {
    6
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            annotate_policy: AnnotatePolicy::default(),
            dimension_unit: DimensionUnit::default(),
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
            featured_limit: default_featured_limit(),
            related_limit: default_related_limit(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> CatalogResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> CatalogResult<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| CatalogError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file. `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Reject settings the engine cannot honour.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.default_per_page == 0 || self.max_per_page == 0 {
            return Err(CatalogError::Config("page sizes must be positive".to_string()));
        }
        if self.default_per_page > self.max_per_page {
            return Err(CatalogError::Config(format!(
                "default_per_page ({}) exceeds max_per_page ({})",
                self.default_per_page, self.max_per_page
            )));
        }
        Ok(())
    }

    /// Set the annotate policy.
    pub fn with_annotate_policy(mut self, policy: AnnotatePolicy) -> Self {
        self.annotate_policy = policy;
        self
    }

    /// Set the dimension unit.
    pub fn with_dimension_unit(mut self, unit: DimensionUnit) -> Self {
        self.dimension_unit = unit;
        self
    }

    /// Clamp a requested page size to the configured bounds.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_per_page)
            .clamp(1, self.max_per_page)
    }
}
