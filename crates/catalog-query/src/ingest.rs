//! Ingestion boundary: raw document-store records into validated products.
//!
//! The store returns loosely shaped JSON. Everything is decoded into the
//! `Raw*` mirrors first, then checked and converted; records that fail
//! validation are rejected here, before the engine sees them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::catalog::{Category, Collection, Material, Product, ProductImage, Variant, VariantStatus};
use crate::error::{CatalogError, CatalogResult};
use crate::ids::{CategoryId, CollectionId, MaterialId, ProductId};

/// A slug as the store sends it: `{ "current": "..." }` or a bare string
/// when a projection flattens it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSlug {
    Plain(String),
    Nested { current: String },
}

impl RawSlug {
    pub fn as_str(&self) -> &str {
        match self {
            RawSlug::Plain(s) => s,
            RawSlug::Nested { current } => current,
        }
    }
}

/// Text that is either a plain string or a list of rich-text blocks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawText {
    Plain(String),
    Blocks(Vec<RawBlock>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBlock {
    #[serde(default)]
    pub children: Vec<RawSpan>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSpan {
    pub text: Option<String>,
}

impl RawText {
    /// Flatten to plain text, one line per block.
    pub fn to_plain(&self) -> String {
        match self {
            RawText::Plain(s) => s.clone(),
            RawText::Blocks(blocks) => blocks
                .iter()
                .map(|block| {
                    block
                        .children
                        .iter()
                        .filter_map(|span| span.text.as_deref())
                        .collect::<String>()
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCategory {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<RawSlug>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCollection {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<RawSlug>,
    pub description: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMaterial {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<RawSlug>,
    pub description: Option<String>,
    pub purity: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAssetRef {
    #[serde(rename = "_ref")]
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawImage {
    pub asset: Option<RawAssetRef>,
    pub alt: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    #[serde(rename = "_key")]
    pub key: Option<String>,
    pub weight_grams: Option<f64>,
    #[serde(alias = "height")]
    pub height_inches: Option<f64>,
    #[serde(alias = "diameter")]
    pub diameter_inches: Option<f64>,
    #[serde(alias = "length")]
    pub length_inches: Option<f64>,
    pub status: Option<String>,
    pub sku: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<String>,
    pub slug: Option<RawSlug>,
    pub description: Option<RawText>,
    pub short_description: Option<String>,
    pub category: Option<RawCategory>,
    #[serde(default)]
    pub materials: Vec<RawMaterial>,
    #[serde(default)]
    pub collections: Vec<RawCollection>,
    /// Older documents reference a single collection.
    pub collection: Option<RawCollection>,
    #[serde(default)]
    pub images: Vec<RawImage>,
    pub featured: Option<bool>,
    pub available: Option<bool>,
    pub is_available: Option<bool>,
    #[serde(rename = "_createdAt")]
    pub system_created_at: Option<String>,
    pub created_at: Option<String>,
    #[serde(default)]
    pub variants: Vec<RawVariant>,
}

/// Outcome of ingesting a batch: accepted products plus one error per
/// rejected record.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub products: Vec<Product>,
    pub rejected: Vec<CatalogError>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Decode a JSON array of product documents.
///
/// Malformed or invalid records are reported individually; only a
/// document that is not a JSON array at all fails the call.
pub fn products_from_json(json: &str) -> CatalogResult<IngestReport> {
    let documents: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut report = IngestReport::default();

    for document in documents {
        let outcome = match RawProduct::deserialize(&document) {
            Ok(raw) => product_from_raw(raw),
            Err(e) => Err(CatalogError::invalid_product(
                &document_id(&document),
                format!("malformed record: {}", e),
            )),
        };

        match outcome {
            Ok(product) => report.products.push(product),
            Err(err) => {
                warn!(error = %err, "rejected product record");
                report.rejected.push(err);
            }
        }
    }

    debug!(
        accepted = report.products.len(),
        rejected = report.rejected.len(),
        "ingested product records"
    );
    Ok(report)
}

fn document_id(document: &serde_json::Value) -> ProductId {
    ProductId::new(document.get("_id").and_then(|v| v.as_str()).unwrap_or_default())
}

/// Validate one raw product and convert it.
pub fn product_from_raw(raw: RawProduct) -> CatalogResult<Product> {
    let id = ProductId::new(raw.id);
    if id.is_blank() {
        return Err(CatalogError::invalid_product(&id, "missing id"));
    }

    let name = required_text(&id, "name", raw.name)?;
    let slug = required_text(&id, "slug", raw.slug.map(|s| s.as_str().to_string()))?;

    if raw.variants.is_empty() {
        return Err(CatalogError::invalid_product(&id, "product has no variants"));
    }
    let variants = raw
        .variants
        .into_iter()
        .enumerate()
        .map(|(index, variant)| variant_from_raw(&id, index, variant))
        .collect::<CatalogResult<Vec<_>>>()?;

    let created_at = raw
        .system_created_at
        .or(raw.created_at)
        .map(|value| parse_timestamp(&id, &value))
        .transpose()?;

    let category = raw.category.and_then(category_from_raw);
    if category.is_none() {
        warn!(product_id = %id, "product has no resolvable category");
    }

    let mut product = Product::new(id, name, slug);
    product.description = raw.description.map(|d| d.to_plain()).filter(|d| !d.is_empty());
    product.short_description = raw.short_description;
    product.category = category;
    product.images = raw.images.into_iter().filter_map(image_from_raw).collect();
    product.featured = raw.featured.unwrap_or(false);
    product.available = raw.available.or(raw.is_available).unwrap_or(true);
    product.created_at = created_at;
    product.variants = variants;

    for collection in raw
        .collections
        .into_iter()
        .chain(raw.collection)
        .filter_map(collection_from_raw)
    {
        product.add_collection(collection);
    }
    for material in raw.materials.into_iter().filter_map(material_from_raw) {
        product.add_material(material);
    }

    Ok(product)
}

fn required_text(id: &ProductId, field: &str, value: Option<String>) -> CatalogResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CatalogError::invalid_product(id, format!("missing {}", field)))
}

fn variant_from_raw(id: &ProductId, index: usize, raw: RawVariant) -> CatalogResult<Variant> {
    let weight_grams = raw
        .weight_grams
        .ok_or_else(|| CatalogError::invalid_product(id, format!("variant {} has no weight", index)))?;
    positive(id, index, "weight", weight_grams)?;

    for (label, value) in [
        ("height", raw.height_inches),
        ("diameter", raw.diameter_inches),
        ("length", raw.length_inches),
    ] {
        if let Some(value) = value {
            positive(id, index, label, value)?;
        }
    }

    // The admin form's initial value is "available".
    let status = match raw.status.as_deref() {
        None => VariantStatus::Available,
        Some(value) => VariantStatus::parse(value).ok_or_else(|| {
            CatalogError::invalid_product(id, format!("variant {} has unknown status '{}'", index, value))
        })?,
    };

    Ok(Variant {
        key: raw.key,
        weight_grams,
        height: raw.height_inches,
        diameter: raw.diameter_inches,
        length: raw.length_inches,
        status,
        sku: raw.sku.filter(|s| !s.trim().is_empty()),
        notes: raw.notes.filter(|s| !s.trim().is_empty()),
    })
}

fn positive(id: &ProductId, index: usize, label: &str, value: f64) -> CatalogResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CatalogError::invalid_product(
            id,
            format!("variant {} {} must be positive, got {}", index, label, value),
        ))
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
fn parse_timestamp(id: &ProductId, value: &str) -> CatalogResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CatalogError::invalid_product(id, format!("unparseable timestamp '{}'", value)))
}

/// Slug is the one field a reference needs; name and id fall back to it.
fn reference_parts(
    id: Option<String>,
    name: Option<String>,
    slug: Option<RawSlug>,
) -> Option<(String, String, String)> {
    let slug = slug.map(|s| s.as_str().trim().to_string()).filter(|s| !s.is_empty())?;
    let name = name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| slug.clone());
    let id = id.filter(|i| !i.trim().is_empty()).unwrap_or_else(|| slug.clone());
    Some((id, name, slug))
}

fn category_from_raw(raw: RawCategory) -> Option<Category> {
    let (id, name, slug) = reference_parts(raw.id, raw.name, raw.slug)?;
    Some(Category {
        id: CategoryId::new(id),
        name,
        slug,
        description: raw.description,
    })
}

fn collection_from_raw(raw: RawCollection) -> Option<Collection> {
    let (id, name, slug) = reference_parts(raw.id, raw.name, raw.slug)?;
    Some(Collection {
        id: CollectionId::new(id),
        name,
        slug,
        description: raw.description,
        featured: raw.featured.unwrap_or(false),
    })
}

fn material_from_raw(raw: RawMaterial) -> Option<Material> {
    let (id, name, slug) = reference_parts(raw.id, raw.name, raw.slug)?;
    Some(Material {
        id: MaterialId::new(id),
        name,
        slug,
        description: raw.description,
        purity: raw.purity,
    })
}

fn image_from_raw(raw: RawImage) -> Option<ProductImage> {
    let asset = raw.asset?;
    Some(ProductImage {
        asset_ref: asset.reference,
        alt: raw.alt,
        caption: raw.caption,
    })
}
