//! Product/ingredient link service

use std::sync::Arc;

use routinely_domain::{
    Entity, IngredientInProduct, ProductIngredient, ProductIngredientInput,
    ProductIngredientPatch, ProductWithConcentration, Result, RoutinelyError,
};
use tracing::info;

use super::ports::ProductIngredientRepository;

pub struct ProductIngredientService {
    links: Arc<dyn ProductIngredientRepository>,
}

impl ProductIngredientService {
    pub fn new(links: Arc<dyn ProductIngredientRepository>) -> Self {
        Self { links }
    }

    pub async fn add_ingredient_to_product(
        &self,
        input: ProductIngredientInput,
    ) -> Result<ProductIngredient> {
        input.validate()?;
        let link = self.links.add_link(&input).await?;
        info!(
            product_id = %link.product_id,
            ingredient_id = %link.ingredient_id,
            position = link.position,
            "Ingredient linked to product"
        );
        Ok(link)
    }

    /// Change concentration and/or position of an existing link.
    pub async fn update_product_ingredient(
        &self,
        product_id: &str,
        ingredient_id: &str,
        patch: ProductIngredientPatch,
    ) -> Result<ProductIngredient> {
        patch.validate()?;
        self.links
            .update_link(product_id, ingredient_id, &patch)
            .await?
            .ok_or(RoutinelyError::NotFound(Entity::ProductIngredient))
    }

    pub async fn remove_ingredient_from_product(
        &self,
        product_id: &str,
        ingredient_id: &str,
    ) -> Result<()> {
        if !self.links.remove_link(product_id, ingredient_id).await? {
            return Err(RoutinelyError::NotFound(Entity::ProductIngredient));
        }
        info!(product_id, ingredient_id, "Ingredient unlinked from product");
        Ok(())
    }

    /// Ingredient list of a product, in label order.
    pub async fn get_product_ingredients(&self, product_id: &str) -> Result<Vec<IngredientInProduct>> {
        self.links.ingredients_of(product_id).await
    }

    /// Products containing an ingredient, with the disclosed concentration.
    pub async fn get_products_with_ingredient(
        &self,
        ingredient_id: &str,
    ) -> Result<Vec<ProductWithConcentration>> {
        self.links.products_with(ingredient_id).await
    }
}
