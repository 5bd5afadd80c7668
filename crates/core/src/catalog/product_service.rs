//! Product service - CRUD, slugs and audited updates

use std::sync::Arc;

use routinely_domain::{
    CreateProductInput, EditRecord, Entity, Product, ProductFilter, ProductPatch, Result,
    RoutinelyError, PRODUCT_EDITABLE_FIELDS,
};
use tracing::{info, instrument};

use super::ports::ProductRepository;
use super::resolve_slug;
use crate::audit::{Audited, AuditRecorder, DiffPolicy, Editor};

/// Product audit: identity, owner, slug and both timestamps are never diffed.
pub const PRODUCT_DIFF_POLICY: DiffPolicy = DiffPolicy {
    edit_entity: Entity::ProductEdit,
    excluded: &["id", "createdBy", "createdAt", "slug", "updatedAt"],
    editable: PRODUCT_EDITABLE_FIELDS,
};

pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
    recorder: AuditRecorder,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo, recorder: AuditRecorder::new(PRODUCT_DIFF_POLICY) }
    }

    /// Slug defaults to the slugified "name brand".
    #[instrument(skip(self, input), fields(name = %input.name, brand = %input.brand))]
    pub async fn create_product(&self, input: CreateProductInput) -> Result<Product> {
        input.validate()?;
        let source = product_slug_source(&input.name, &input.brand);
        let slug = resolve_slug(input.slug.as_deref(), &source)?;
        let product = self.repo.insert_product(&input, &slug).await?;
        info!(product_id = %product.id, slug = %product.slug, "Product created");
        Ok(product)
    }

    pub async fn get_product_by_id(&self, id: &str) -> Result<Product> {
        self.repo.find_product(id).await?.ok_or(RoutinelyError::NotFound(Entity::Product))
    }

    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Product> {
        self.repo
            .find_product_by_slug(slug)
            .await?
            .ok_or(RoutinelyError::NotFound(Entity::Product))
    }

    pub async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>> {
        self.repo.list_products(&filter).await
    }

    /// Apply `patch` and record the field-level diff as an edit by `editor`.
    ///
    /// A changed name without an explicit slug regenerates the slug from the
    /// new name and the (possibly patched) brand. Resending the stored name
    /// keeps the current slug.
    #[instrument(skip(self, patch, editor), fields(edited_by = editor.user_id))]
    pub async fn update_product(
        &self,
        id: &str,
        mut patch: ProductPatch,
        editor: Editor<'_>,
    ) -> Result<Audited<Product>> {
        patch.validate()?;
        patch.slug = match (patch.name.as_deref(), patch.slug.as_deref()) {
            (_, Some(slug)) => Some(resolve_slug(Some(slug), slug)?),
            (Some(name), None) => {
                let current = self.get_product_by_id(id).await?;
                if current.name == name {
                    None
                } else {
                    let brand = patch.brand.as_deref().unwrap_or(&current.brand);
                    Some(resolve_slug(None, &product_slug_source(name, brand))?)
                }
            }
            (None, None) => None,
        };

        let (before, after) = self
            .repo
            .update_product(id, &patch)
            .await?
            .ok_or(RoutinelyError::NotFound(Entity::Product))?;

        let edit = self.recorder.record(&*self.repo, id, editor, &patch, &before, &after).await?;
        info!(product_id = id, audited = edit.is_some(), "Product updated");
        Ok(Audited { value: after, edit })
    }

    pub async fn delete_product(&self, id: &str) -> Result<()> {
        if !self.repo.delete_product(id).await? {
            return Err(RoutinelyError::NotFound(Entity::Product));
        }
        info!(product_id = id, "Product deleted");
        Ok(())
    }

    /// Edit history, newest first.
    pub async fn list_product_edits(&self, id: &str) -> Result<Vec<EditRecord>> {
        self.repo.list_edits(id).await
    }
}

fn product_slug_source(name: &str, brand: &str) -> String {
    format!("{name} {brand}")
}
