//! Catalog services: products, ingredients, their links and tags

pub mod ingredient_service;
pub mod ports;
pub mod product_ingredient_service;
pub mod product_service;
pub mod tag_service;

pub use ingredient_service::IngredientService;
pub use product_ingredient_service::ProductIngredientService;
pub use product_service::ProductService;
pub use tag_service::TagService;

use routinely_domain::{slugify, Result, RoutinelyError};

/// Slug from an explicit value or, failing that, from `fallback`.
pub(crate) fn resolve_slug(explicit: Option<&str>, fallback: &str) -> Result<String> {
    let slug = slugify(explicit.unwrap_or(fallback));
    if slug.is_empty() {
        return Err(RoutinelyError::InvalidInput(format!("cannot derive a slug from `{fallback}`")));
    }
    Ok(slug)
}
