//! Port interfaces for the catalog
//!
//! Adapters translate slug and link uniqueness violations into
//! `AlreadyExists` of the matching entity.

use async_trait::async_trait;
use routinely_domain::{
    CreateIngredientInput, CreateProductInput, Ingredient, IngredientFilter, IngredientInProduct,
    IngredientPatch, Product, ProductFilter, ProductIngredient, ProductIngredientInput,
    ProductIngredientPatch, ProductPatch, ProductWithConcentration, Result, Tag,
};

use crate::audit::EditLog;

#[async_trait]
pub trait ProductRepository: EditLog {
    async fn insert_product(&self, input: &CreateProductInput, slug: &str) -> Result<Product>;

    async fn find_product(&self, id: &str) -> Result<Option<Product>>;

    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>>;

    /// Newest first.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>>;

    /// Apply the patch and return `(before, after)`, both read inside the
    /// writing transaction.
    async fn update_product(
        &self,
        id: &str,
        patch: &ProductPatch,
    ) -> Result<Option<(Product, Product)>>;

    async fn delete_product(&self, id: &str) -> Result<bool>;
}

#[async_trait]
pub trait IngredientRepository: EditLog {
    async fn insert_ingredient(&self, input: &CreateIngredientInput, slug: &str)
        -> Result<Ingredient>;

    async fn find_ingredient(&self, id: &str) -> Result<Option<Ingredient>>;

    async fn find_ingredient_by_slug(&self, slug: &str) -> Result<Option<Ingredient>>;

    /// Ordered by name.
    async fn list_ingredients(&self, filter: &IngredientFilter) -> Result<Vec<Ingredient>>;

    /// Apply the patch and return `(before, after)` from one transaction.
    async fn update_ingredient(
        &self,
        id: &str,
        patch: &IngredientPatch,
    ) -> Result<Option<(Ingredient, Ingredient)>>;

    async fn delete_ingredient(&self, id: &str) -> Result<bool>;
}

#[async_trait]
pub trait ProductIngredientRepository: Send + Sync {
    /// Fails with `product_not_found` / `ingredient_not_found` when either
    /// side is missing, `product_ingredient_already_exists` when linked.
    async fn add_link(&self, input: &ProductIngredientInput) -> Result<ProductIngredient>;

    async fn update_link(
        &self,
        product_id: &str,
        ingredient_id: &str,
        patch: &ProductIngredientPatch,
    ) -> Result<Option<ProductIngredient>>;

    async fn remove_link(&self, product_id: &str, ingredient_id: &str) -> Result<bool>;

    /// Ordered by position.
    async fn ingredients_of(&self, product_id: &str) -> Result<Vec<IngredientInProduct>>;

    async fn products_with(&self, ingredient_id: &str) -> Result<Vec<ProductWithConcentration>>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn insert_tag(&self, name: &str, slug: &str) -> Result<Tag>;

    /// Ordered by name.
    async fn list_tags(&self) -> Result<Vec<Tag>>;

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>>;

    async fn delete_tag(&self, id: &str) -> Result<bool>;

    /// `false` when the tag was already attached.
    async fn attach(&self, product_id: &str, tag_id: &str) -> Result<bool>;

    async fn detach(&self, product_id: &str, tag_id: &str) -> Result<bool>;

    async fn tags_of(&self, product_id: &str) -> Result<Vec<Tag>>;
}
