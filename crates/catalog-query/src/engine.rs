//! The catalog query engine: annotate, filter, sort.
//!
//! Callers run the stages in that order; each stage's output is valid
//! input to the next. The engine keeps no state between calls, so one
//! instance can be shared freely across threads.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::catalog::{AnnotatedProduct, Product};
use crate::collate;
use crate::config::{AnnotatePolicy, EngineConfig};
use crate::error::{CatalogError, CatalogResult};
use crate::search::{Availability, CatalogQuery, Facet, FilterCriteria, Pagination, SearchResults, SortKey};

/// Output of [`CatalogQueryEngine::annotate`].
///
/// Under [`AnnotatePolicy::SkipAndReport`] invalid products are left out of
/// `products` and listed in `rejected`, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    pub products: Vec<AnnotatedProduct>,
    pub rejected: Vec<CatalogError>,
}

impl Annotation {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Result of a full listing run.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub results: SearchResults<AnnotatedProduct>,
    /// Products skipped during annotation.
    pub rejected: Vec<CatalogError>,
}

/// Filters, sorts and summarizes already-fetched product lists.
#[derive(Debug, Clone, Default)]
pub struct CatalogQueryEngine {
    config: EngineConfig,
}

impl CatalogQueryEngine {
    /// Create an engine with a validated configuration.
    pub fn new(config: EngineConfig) -> CatalogResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute each product's derived summary.
    ///
    /// Order is preserved. A product without variants is either skipped and
    /// reported or aborts the batch, depending on the configured policy.
    pub fn annotate(&self, products: &[Product]) -> CatalogResult<Annotation> {
        let mut annotation = Annotation {
            products: Vec::with_capacity(products.len()),
            rejected: Vec::new(),
        };

        for product in products {
            match AnnotatedProduct::new(product.clone()) {
                Some(annotated) => annotation.products.push(annotated),
                None => {
                    let err = CatalogError::invalid_product(&product.id, "product has no variants");
                    match self.config.annotate_policy {
                        AnnotatePolicy::AbortBatch => return Err(err),
                        AnnotatePolicy::SkipAndReport => {
                            warn!(product_id = %product.id, "skipping product without variants");
                            annotation.rejected.push(err);
                        }
                    }
                }
            }
        }

        debug!(
            input = products.len(),
            annotated = annotation.products.len(),
            rejected = annotation.rejected.len(),
            "annotated products"
        );
        Ok(annotation)
    }

    /// Keep the products that satisfy every active criterion.
    pub fn filter(
        &self,
        products: &[AnnotatedProduct],
        criteria: &FilterCriteria,
    ) -> CatalogResult<Vec<AnnotatedProduct>> {
        criteria.validate()?;

        let needle = criteria.search_needle();
        let filtered: Vec<AnnotatedProduct> = products
            .iter()
            .filter(|item| criteria.matches(item, needle.as_deref()))
            .cloned()
            .collect();

        debug!(input = products.len(), output = filtered.len(), "filtered products");
        Ok(filtered)
    }

    /// Stable sort by `key`, returning a new list.
    pub fn sort(&self, products: &[AnnotatedProduct], key: SortKey) -> Vec<AnnotatedProduct> {
        let mut sorted = products.to_vec();
        sorted.sort_by(|a, b| key.compare(a, b));
        debug!(count = sorted.len(), key = key.as_str(), "sorted products");
        sorted
    }

    /// [`CatalogQueryEngine::sort`] with a key given as text.
    pub fn sort_by_name(&self, products: &[AnnotatedProduct], key: &str) -> CatalogResult<Vec<AnnotatedProduct>> {
        let key: SortKey = key.parse()?;
        Ok(self.sort(products, key))
    }

    /// Annotate, filter, sort and paginate in one call.
    ///
    /// Facets, when requested, count over every annotated product so the
    /// sidebar does not collapse to the current selection.
    pub fn run(&self, products: &[Product], query: &CatalogQuery) -> CatalogResult<QueryOutcome> {
        let annotation = self.annotate(products)?;
        let filtered = self.filter(&annotation.products, &query.criteria)?;
        let sorted = self.sort(&filtered, query.sort);

        let pagination = Pagination::new(query.page, self.config.page_size(query.per_page), sorted.len());
        let mut results = SearchResults::new(pagination.slice(sorted), pagination);
        if query.include_facets {
            results = results.with_facets(self.facets(&annotation.products, &query.criteria));
        }

        Ok(QueryOutcome {
            results,
            rejected: annotation.rejected,
        })
    }

    /// Featured products by name, capped at the configured limit.
    pub fn featured(&self, products: &[AnnotatedProduct]) -> Vec<AnnotatedProduct> {
        let featured: Vec<AnnotatedProduct> = products
            .iter()
            .filter(|item| item.product.featured)
            .cloned()
            .collect();

        let mut sorted = self.sort(&featured, SortKey::Name);
        sorted.truncate(self.config.featured_limit);
        sorted
    }

    /// Find a product by slug.
    pub fn by_slug<'a>(&self, products: &'a [AnnotatedProduct], slug: &str) -> Option<&'a AnnotatedProduct> {
        products.iter().find(|item| item.product.slug == slug)
    }

    /// Other products in the same category, by name, capped at the
    /// configured limit. Empty when `current` has no category.
    pub fn related(&self, products: &[AnnotatedProduct], current: &AnnotatedProduct) -> Vec<AnnotatedProduct> {
        let Some(category) = current.product.category_slug() else {
            return Vec::new();
        };

        let siblings: Vec<AnnotatedProduct> = products
            .iter()
            .filter(|item| item.product.category_slug() == Some(category))
            .filter(|item| item.product.slug != current.product.slug)
            .cloned()
            .collect();

        let mut sorted = self.sort(&siblings, SortKey::Name);
        sorted.truncate(self.config.related_limit);
        sorted
    }

    /// Category, collection, material and availability facets over
    /// `products`. Values are ordered by label; `selected` mirrors
    /// `criteria`.
    pub fn facets(&self, products: &[AnnotatedProduct], criteria: &FilterCriteria) -> Vec<Facet> {
        let mut categories = TermCounter::default();
        let mut collections = TermCounter::default();
        let mut materials = TermCounter::default();
        let mut in_stock = 0;

        for item in products {
            let product = &item.product;
            if let Some(category) = &product.category {
                categories.add(&category.slug, &category.name);
            }
            for collection in &product.collections {
                collections.add(&collection.slug, &collection.name);
            }
            for material in &product.materials {
                materials.add(&material.slug, &material.name);
            }
            if item.summary.has_available_variant {
                in_stock += 1;
            }
        }

        let mut availability = Facet::new("Availability", "availability");
        availability.add_value(
            Availability::Available.as_str(),
            "In Stock",
            in_stock,
            criteria.availability == Availability::Available,
        );
        availability.add_value(
            Availability::OutOfStock.as_str(),
            "Out of Stock",
            products.len() - in_stock,
            criteria.availability == Availability::OutOfStock,
        );

        vec![
            categories.into_facet("Category", "category", criteria.category_constraint()),
            collections.into_facet("Collection", "collection", criteria.collection_constraint()),
            materials.into_facet("Material", "material", criteria.material_constraint()),
            availability,
        ]
    }

    /// Admin labels for a product's variants in the deployment's unit.
    pub fn variant_labels(&self, product: &Product) -> Vec<String> {
        product
            .variants
            .iter()
            .map(|v| v.label(self.config.dimension_unit))
            .collect()
    }
}

/// Per-slug counts with the first label seen for each slug.
#[derive(Default)]
struct TermCounter {
    terms: BTreeMap<String, (String, usize)>,
}

impl TermCounter {
    fn add(&mut self, slug: &str, label: &str) {
        self.terms
            .entry(slug.to_string())
            .or_insert_with(|| (label.to_string(), 0))
            .1 += 1;
    }

    fn into_facet(self, name: &str, field: &str, selected: Option<&str>) -> Facet {
        let mut terms: Vec<(String, (String, usize))> = self.terms.into_iter().collect();
        terms.sort_by(|(_, (a, _)), (_, (b, _))| collate::compare(a, b));

        let mut facet = Facet::new(name, field);
        for (slug, (label, count)) in terms {
            let is_selected = selected == Some(slug.as_str());
            facet.add_value(slug, label, count, is_selected);
        }
        facet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, Collection, DimensionUnit, Material, Variant, VariantStatus};
    use crate::ids::ProductId;
    use crate::search::WeightRange;

    fn product(id: &str, name: &str, category: Option<(&str, &str)>, weights: &[(f64, VariantStatus)]) -> Product {
        let mut product = Product::new(id, name, id);
        product.category = category.map(|(slug, name)| Category::new(slug, name, slug));
        for (weight, status) in weights {
            product.variants.push(Variant::new(*weight).with_status(*status));
        }
        product
    }

    fn catalog() -> Vec<Product> {
        let mut bowl = product(
            "silver-bowl",
            "Silver Bowl",
            Some(("bowls", "Bowls")),
            &[(10.0, VariantStatus::Available), (50.0, VariantStatus::OutOfStock)],
        );
        bowl.add_collection(Collection::new("heritage", "Heritage", "heritage"));
        bowl.add_material(Material::new("sterling", "Sterling", "sterling"));

        let mut tray = product(
            "alpha-tray",
            "Alpha Tray",
            Some(("trays", "Trays")),
            &[(500.0, VariantStatus::OutOfStock)],
        );
        tray.featured = true;
        tray.short_description = Some("Engraved silver serving tray".to_string());

        let mut cup = product(
            "kiddush-cup",
            "Kiddush Cup",
            Some(("bowls", "Bowls")),
            &[(75.0, VariantStatus::Available), (90.0, VariantStatus::Available), (120.0, VariantStatus::ComingSoon)],
        );
        cup.featured = true;
        cup.add_material(Material::new("sterling", "Sterling", "sterling"));
        cup.add_material(Material::new("gold", "Gold Plate", "gold"));

        vec![bowl, tray, cup]
    }

    fn annotated() -> Vec<AnnotatedProduct> {
        CatalogQueryEngine::default().annotate(&catalog()).unwrap().products
    }

    fn names(items: &[AnnotatedProduct]) -> Vec<&str> {
        items.iter().map(|i| i.product.name.as_str()).collect()
    }

    #[test]
    fn test_annotate_preserves_order() {
        let engine = CatalogQueryEngine::default();
        let annotation = engine.annotate(&catalog()).unwrap();

        assert!(annotation.is_complete());
        assert_eq!(names(&annotation.products), vec!["Silver Bowl", "Alpha Tray", "Kiddush Cup"]);
        assert_eq!(annotation.products[2].summary.variant_count, 3);
        assert_eq!(annotation.products[2].summary.min_weight, 75.0);
        assert_eq!(annotation.products[2].summary.max_weight, 120.0);
    }

    #[test]
    fn test_annotate_skip_and_report() {
        let mut products = catalog();
        products.insert(1, Product::new("p-empty", "Empty", "empty"));

        let annotation = CatalogQueryEngine::default().annotate(&products).unwrap();
        assert_eq!(annotation.products.len(), 3);
        assert_eq!(annotation.rejected.len(), 1);
        assert_eq!(annotation.rejected[0].product_id().map(|id| id.as_str()), Some("p-empty"));
    }

    #[test]
    fn test_annotate_abort_batch() {
        let engine = CatalogQueryEngine::new(
            EngineConfig::default().with_annotate_policy(AnnotatePolicy::AbortBatch),
        )
        .unwrap();
        let mut products = catalog();
        products.push(Product::new("p-empty", "Empty", "empty"));

        let err = engine.annotate(&products).unwrap_err();
        assert_eq!(err, CatalogError::invalid_product(&ProductId::new("p-empty"), "product has no variants"));
    }

    #[test]
    fn test_filter_by_category_and_material() {
        let engine = CatalogQueryEngine::default();
        let items = annotated();

        let bowls = engine
            .filter(&items, &FilterCriteria::new().with_category("bowls"))
            .unwrap();
        assert_eq!(names(&bowls), vec!["Silver Bowl", "Kiddush Cup"]);

        let gold = engine
            .filter(&items, &FilterCriteria::new().with_material("gold"))
            .unwrap();
        assert_eq!(names(&gold), vec!["Kiddush Cup"]);

        let heritage = engine
            .filter(&items, &FilterCriteria::new().with_collection("heritage"))
            .unwrap();
        assert_eq!(names(&heritage), vec!["Silver Bowl"]);
    }

    #[test]
    fn test_filter_search_covers_short_description() {
        let engine = CatalogQueryEngine::default();
        let hits = engine
            .filter(&annotated(), &FilterCriteria::new().with_search("SILVER"))
            .unwrap();
        assert_eq!(names(&hits), vec!["Silver Bowl", "Alpha Tray"]);
    }

    #[test]
    fn test_filter_combines_with_and() {
        let engine = CatalogQueryEngine::default();
        let criteria = FilterCriteria::new()
            .with_category("bowls")
            .with_availability(Availability::Available)
            .with_weight_range(WeightRange::new(60.0, 200.0).unwrap());

        let hits = engine.filter(&annotated(), &criteria).unwrap();
        assert_eq!(names(&hits), vec!["Kiddush Cup"]);
    }

    #[test]
    fn test_filter_rejects_bad_range() {
        let engine = CatalogQueryEngine::default();
        let criteria = FilterCriteria {
            weight_range: Some(WeightRange { min: 9.0, max: 1.0 }),
            ..Default::default()
        };
        assert!(matches!(
            engine.filter(&annotated(), &criteria),
            Err(CatalogError::InvalidCriteria(_))
        ));
    }

    #[test]
    fn test_sort_keys() {
        let engine = CatalogQueryEngine::default();
        let items = annotated();

        assert_eq!(names(&engine.sort(&items, SortKey::Name)), vec!["Alpha Tray", "Kiddush Cup", "Silver Bowl"]);
        assert_eq!(names(&engine.sort(&items, SortKey::Featured)), vec!["Alpha Tray", "Kiddush Cup", "Silver Bowl"]);
        assert_eq!(names(&engine.sort(&items, SortKey::Weight)), vec!["Silver Bowl", "Kiddush Cup", "Alpha Tray"]);
        assert_eq!(names(&engine.sort(&items, SortKey::Variants)), vec!["Kiddush Cup", "Silver Bowl", "Alpha Tray"]);
        assert_eq!(names(&engine.sort(&items, SortKey::Category)), vec!["Silver Bowl", "Kiddush Cup", "Alpha Tray"]);
    }

    #[test]
    fn test_sort_by_name_rejects_unknown_key() {
        let engine = CatalogQueryEngine::default();
        assert!(matches!(
            engine.sort_by_name(&annotated(), "price"),
            Err(CatalogError::InvalidSortKey(_))
        ));
        assert_eq!(engine.sort_by_name(&annotated(), "weight").unwrap().len(), 3);
    }

    #[test]
    fn test_featured_and_related() {
        let engine = CatalogQueryEngine::default();
        let items = annotated();

        assert_eq!(names(&engine.featured(&items)), vec!["Alpha Tray", "Kiddush Cup"]);

        let bowl = engine.by_slug(&items, "silver-bowl").unwrap();
        assert_eq!(names(&engine.related(&items, bowl)), vec!["Kiddush Cup"]);
        assert!(engine.by_slug(&items, "missing").is_none());
    }

    #[test]
    fn test_featured_limit() {
        let mut config = EngineConfig::default();
        config.featured_limit = 1;
        let engine = CatalogQueryEngine::new(config).unwrap();

        assert_eq!(names(&engine.featured(&annotated())), vec!["Alpha Tray"]);
    }

    #[test]
    fn test_related_without_category() {
        let engine = CatalogQueryEngine::default();
        let items = annotated();
        let orphan = AnnotatedProduct::new(product("orphan", "Orphan", None, &[(1.0, VariantStatus::Available)])).unwrap();
        assert!(engine.related(&items, &orphan).is_empty());
    }

    #[test]
    fn test_facets() {
        let engine = CatalogQueryEngine::default();
        let facets = engine.facets(&annotated(), &FilterCriteria::new().with_category("bowls"));

        let category = &facets[0];
        assert_eq!(category.field, "category");
        let bowls = category.value("bowls").unwrap();
        assert_eq!((bowls.count, bowls.selected), (2, true));
        assert!(!category.value("trays").unwrap().selected);

        let materials = &facets[2];
        let labels: Vec<&str> = materials.values.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["Gold Plate", "Sterling"]);
        assert_eq!(materials.value("sterling").unwrap().count, 2);

        let availability = &facets[3];
        assert_eq!(availability.value("available").unwrap().count, 2);
        assert_eq!(availability.value("out_of_stock").unwrap().count, 1);
    }

    #[test]
    fn test_run_paginates() {
        let engine = CatalogQueryEngine::default();
        let query = CatalogQuery::new()
            .with_sort(SortKey::Name)
            .with_pagination(2, 2)
            .with_facets();

        let outcome = engine.run(&catalog(), &query).unwrap();
        assert_eq!(names(&outcome.results.items), vec!["Silver Bowl"]);
        assert_eq!(outcome.results.pagination.total, 3);
        assert_eq!(outcome.results.pagination.total_pages, 2);
        assert!(outcome.results.facet("material").is_some());
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn test_variant_labels_use_configured_unit() {
        let engine = CatalogQueryEngine::new(
            EngineConfig::default().with_dimension_unit(DimensionUnit::Millimeters),
        )
        .unwrap();
        let product = Product::new("p", "Pendant", "pendant")
            .with_variant(Variant::new(4.0).with_dimensions(None, None, Some(18.0)));

        assert_eq!(engine.variant_labels(&product), vec!["4g (L: 18mm)"]);
    }
}
