//! Catalog entities: products, ingredients, their link table and tags
//!
//! Patches serialize only the fields they carry, so the serialized patch
//! doubles as the key set the audit recorder diffs. Nullable columns use a
//! double option: `Some(None)` clears the value, `None` leaves it alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_CATALOG_NAME_LENGTH;
use crate::errors::{Result, RoutinelyError};

/// Fields of a product a patch may touch, in serialized form.
pub const PRODUCT_EDITABLE_FIELDS: &[&str] =
    &["name", "brand", "slug", "category", "description", "imageUrl"];

/// Fields of an ingredient a patch may touch, in serialized form.
pub const INGREDIENT_EDITABLE_FIELDS: &[&str] =
    &["name", "slug", "inciName", "description", "function", "comedogenicRating"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub slug: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub name: String,
    pub brand: String,
    /// Derived from name and brand when absent.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_by: String,
}

impl CreateProductInput {
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
            slug: None,
            category: None,
            description: None,
            image_url: None,
            created_by: created_by.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_name("product name", &self.name)?;
        validate_name("brand", &self.brand)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub category: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub image_url: Option<Option<String>>,
}

impl ProductPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name("product name", name)?;
        }
        if let Some(brand) = &self.brand {
            validate_name("brand", brand)?;
        }
        Ok(())
    }
}

/// Product listing filter. `search` matches name or brand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub inci_name: Option<String>,
    pub description: Option<String>,
    pub function: Option<String>,
    /// 0 (non-comedogenic) to 5.
    pub comedogenic_rating: Option<u8>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngredientInput {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub inci_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub comedogenic_rating: Option<u8>,
    pub created_by: String,
}

impl CreateIngredientInput {
    pub fn new(name: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
            inci_name: None,
            description: None,
            function: None,
            comedogenic_rating: None,
            created_by: created_by.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_name("ingredient name", &self.name)?;
        validate_rating(self.comedogenic_rating)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub inci_name: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub function: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub comedogenic_rating: Option<Option<u8>>,
}

impl IngredientPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name("ingredient name", name)?;
        }
        validate_rating(self.comedogenic_rating.flatten())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

/// Row of the product/ingredient link table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIngredient {
    pub product_id: String,
    pub ingredient_id: String,
    /// Percentage, when the manufacturer discloses it.
    pub concentration: Option<f64>,
    /// Order on the ingredient list, 0-based.
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIngredientInput {
    pub product_id: String,
    pub ingredient_id: String,
    #[serde(default)]
    pub concentration: Option<f64>,
    #[serde(default)]
    pub position: u32,
}

impl ProductIngredientInput {
    pub fn validate(&self) -> Result<()> {
        validate_concentration(self.concentration)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIngredientPatch {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub concentration: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl ProductIngredientPatch {
    pub fn validate(&self) -> Result<()> {
        validate_concentration(self.concentration.flatten())
    }
}

/// An ingredient as listed on a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientInProduct {
    pub ingredient: Ingredient,
    pub concentration: Option<f64>,
    pub position: u32,
}

/// A product containing a given ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithConcentration {
    pub product: Product,
    pub concentration: Option<f64>,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagInput {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl CreateTagInput {
    pub fn validate(&self) -> Result<()> {
        validate_name("tag name", &self.name)
    }
}

fn validate_name(what: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RoutinelyError::InvalidInput(format!("{what} must not be empty")));
    }
    if trimmed.chars().count() > MAX_CATALOG_NAME_LENGTH {
        return Err(RoutinelyError::InvalidInput(format!(
            "{what} longer than {MAX_CATALOG_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_rating(rating: Option<u8>) -> Result<()> {
    match rating {
        Some(r) if r > 5 => Err(RoutinelyError::InvalidInput(format!(
            "comedogenic rating must be 0-5, got {r}"
        ))),
        _ => Ok(()),
    }
}

fn validate_concentration(concentration: Option<f64>) -> Result<()> {
    match concentration {
        Some(c) if !(0.0..=100.0).contains(&c) => Err(RoutinelyError::InvalidInput(format!(
            "concentration must be a percentage, got {c}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = ProductPatch {
            name: Some("Barrier Cream".into()),
            description: Some(None),
            ..ProductPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Barrier Cream", "description": null }));
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch: IngredientPatch =
            serde_json::from_str(r#"{"inciName":null,"function":"humectant"}"#).unwrap();
        assert_eq!(patch.inci_name, Some(None));
        assert_eq!(patch.function, Some(Some("humectant".into())));
        assert_eq!(patch.description, None);
    }

    #[test]
    fn editable_field_lists_match_patch_keys() {
        let full = ProductPatch {
            name: Some(String::new()),
            brand: Some(String::new()),
            slug: Some(String::new()),
            category: Some(None),
            description: Some(None),
            image_url: Some(None),
        };
        let json = serde_json::to_value(&full).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        for key in keys {
            assert!(PRODUCT_EDITABLE_FIELDS.contains(&key.as_str()), "{key}");
        }
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert!(CreateProductInput::new(" ", "Brand", "u1").validate().is_err());
        let mut ingredient = CreateIngredientInput::new("Niacinamide", "u1");
        ingredient.comedogenic_rating = Some(6);
        assert!(ingredient.validate().is_err());

        let link = ProductIngredientInput {
            product_id: "p".into(),
            ingredient_id: "i".into(),
            concentration: Some(120.0),
            position: 0,
        };
        assert!(link.validate().is_err());
    }
}
