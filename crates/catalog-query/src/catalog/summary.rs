//! Derived per-product summaries.

use serde::{Deserialize, Serialize};

use crate::catalog::{Product, Variant};

/// Aggregates over a product's variants. Computed, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DerivedSummary {
    pub min_weight: f64,
    pub max_weight: f64,
    pub variant_count: usize,
    pub has_available_variant: bool,
}

impl DerivedSummary {
    /// Summarize a variant list. `None` when the list is empty.
    pub fn from_variants(variants: &[Variant]) -> Option<Self> {
        let (first, rest) = variants.split_first()?;

        let (min_weight, max_weight) = rest.iter().fold(
            (first.weight_grams, first.weight_grams),
            |(min, max), v| (min.min(v.weight_grams), max.max(v.weight_grams)),
        );

        Some(Self {
            min_weight,
            max_weight,
            variant_count: variants.len(),
            has_available_variant: variants.iter().any(Variant::is_available),
        })
    }

    /// Whether `[min_weight, max_weight]` intersects `[min, max]`.
    pub fn overlaps_weight(&self, min: f64, max: f64) -> bool {
        self.max_weight >= min && self.min_weight <= max
    }
}

/// A product paired with its derived summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotatedProduct {
    #[serde(flatten)]
    pub product: Product,
    #[serde(flatten)]
    pub summary: DerivedSummary,
}

impl AnnotatedProduct {
    /// Pair a product with its summary. `None` when it has no variants.
    pub fn new(product: Product) -> Option<Self> {
        let summary = DerivedSummary::from_variants(&product.variants)?;
        Some(Self { product, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VariantStatus;

    #[test]
    fn test_summary_bounds() {
        let variants = vec![
            Variant::new(50.0).with_status(VariantStatus::OutOfStock),
            Variant::new(10.0).with_status(VariantStatus::Available),
            Variant::new(30.0).with_status(VariantStatus::Discontinued),
        ];
        let summary = DerivedSummary::from_variants(&variants).unwrap();

        assert_eq!(summary.min_weight, 10.0);
        assert_eq!(summary.max_weight, 50.0);
        assert_eq!(summary.variant_count, 3);
        assert!(summary.has_available_variant);
    }

    #[test]
    fn test_summary_without_available_variant() {
        let variants = vec![
            Variant::new(5.0).with_status(VariantStatus::ComingSoon),
            Variant::new(7.0).with_status(VariantStatus::OutOfStock),
        ];
        let summary = DerivedSummary::from_variants(&variants).unwrap();
        assert!(!summary.has_available_variant);
    }

    #[test]
    fn test_empty_variants_have_no_summary() {
        assert!(DerivedSummary::from_variants(&[]).is_none());
        assert!(AnnotatedProduct::new(Product::new("p", "Empty", "empty")).is_none());
    }

    #[test]
    fn test_overlap() {
        let summary = DerivedSummary::from_variants(&[Variant::new(10.0), Variant::new(50.0)]).unwrap();
        assert!(summary.overlaps_weight(40.0, 100.0));
        assert!(summary.overlaps_weight(0.0, 20.0));
        assert!(summary.overlaps_weight(50.0, 50.0));
        assert!(!summary.overlaps_weight(60.0, 100.0));
        assert!(!summary.overlaps_weight(0.0, 9.9));
    }

    #[test]
    fn test_annotated_serializes_flat() {
        let product = Product::new("p1", "Ring", "ring").with_variant(Variant::new(4.0));
        let annotated = AnnotatedProduct::new(product).unwrap();
        let json = serde_json::to_value(&annotated).unwrap();

        assert_eq!(json["name"], "Ring");
        assert_eq!(json["variant_count"], 1);
        assert_eq!(json["min_weight"], 4.0);
    }
}
