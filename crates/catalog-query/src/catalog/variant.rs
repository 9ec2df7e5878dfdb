//! Product variants: one purchasable weight/size configuration.

use serde::{Deserialize, Serialize};

/// Stock status of a single variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VariantStatus {
    /// Can be ordered now.
    #[default]
    Available,
    /// Temporarily unavailable.
    OutOfStock,
    /// No longer produced.
    Discontinued,
    /// Announced but not yet orderable.
    ComingSoon,
}

impl VariantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantStatus::Available => "available",
            VariantStatus::OutOfStock => "out_of_stock",
            VariantStatus::Discontinued => "discontinued",
            VariantStatus::ComingSoon => "coming_soon",
        }
    }

    /// Parse the store's status value. Returns `None` outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "available" => Some(VariantStatus::Available),
            "out_of_stock" => Some(VariantStatus::OutOfStock),
            "discontinued" => Some(VariantStatus::Discontinued),
            "coming_soon" => Some(VariantStatus::ComingSoon),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            VariantStatus::Available => "Available",
            VariantStatus::OutOfStock => "Out of Stock",
            VariantStatus::Discontinued => "Discontinued",
            VariantStatus::ComingSoon => "Coming Soon",
        }
    }

    pub fn is_available(&self) -> bool {
        *self == VariantStatus::Available
    }
}

/// Unit for variant height/diameter/length. Fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DimensionUnit {
    #[default]
    Inches,
    Millimeters,
}

impl DimensionUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            DimensionUnit::Inches => "\"",
            DimensionUnit::Millimeters => "mm",
        }
    }
}

/// A weight/size option of a product.
///
/// Variants have no identity of their own; `key` is only the position
/// marker the store assigns inside the owning product's list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    /// Store-assigned key within the product, if any.
    pub key: Option<String>,
    /// Weight in grams. Always finite and positive.
    pub weight_grams: f64,
    pub height: Option<f64>,
    pub diameter: Option<f64>,
    pub length: Option<f64>,
    pub status: VariantStatus,
    pub sku: Option<String>,
    pub notes: Option<String>,
}

impl Variant {
    /// Create an available variant with only a weight.
    pub fn new(weight_grams: f64) -> Self {
        Self {
            key: None,
            weight_grams,
            height: None,
            diameter: None,
            length: None,
            status: VariantStatus::Available,
            sku: None,
            notes: None,
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: VariantStatus) -> Self {
        self.status = status;
        self
    }

    /// Set height, diameter and length in one go.
    pub fn with_dimensions(
        mut self,
        height: Option<f64>,
        diameter: Option<f64>,
        length: Option<f64>,
    ) -> Self {
        self.height = height;
        self.diameter = diameter;
        self.length = length;
        self
    }

    pub fn is_available(&self) -> bool {
        self.status.is_available()
    }

    /// Short label for admin lists, e.g. `50g (H: 3", D: 2")`.
    pub fn label(&self, unit: DimensionUnit) -> String {
        let dimensions: Vec<String> = [("H", self.height), ("D", self.diameter), ("L", self.length)]
            .into_iter()
            .filter_map(|(tag, value)| value.map(|v| format!("{}: {}{}", tag, v, unit.suffix())))
            .collect();

        if dimensions.is_empty() {
            format!("{}g", self.weight_grams)
        } else {
            format!("{}g ({})", self.weight_grams, dimensions.join(", "))
        }
    }
}
