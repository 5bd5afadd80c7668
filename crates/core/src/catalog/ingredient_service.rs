//! Ingredient service - CRUD, slugs and audited updates

use std::sync::Arc;

use routinely_domain::{
    CreateIngredientInput, EditRecord, Entity, Ingredient, IngredientFilter, IngredientPatch,
    Result, RoutinelyError, INGREDIENT_EDITABLE_FIELDS,
};
use tracing::{info, instrument};

use super::ports::IngredientRepository;
use super::resolve_slug;
use crate::audit::{Audited, AuditRecorder, DiffPolicy, Editor};

/// Ingredient audit: identity, owner, creation time and slug are never diffed.
pub const INGREDIENT_DIFF_POLICY: DiffPolicy = DiffPolicy {
    edit_entity: Entity::IngredientEdit,
    excluded: &["id", "createdBy", "createdAt", "slug"],
    editable: INGREDIENT_EDITABLE_FIELDS,
};

pub struct IngredientService {
    repo: Arc<dyn IngredientRepository>,
    recorder: AuditRecorder,
}

impl IngredientService {
    pub fn new(repo: Arc<dyn IngredientRepository>) -> Self {
        Self { repo, recorder: AuditRecorder::new(INGREDIENT_DIFF_POLICY) }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_ingredient(&self, input: CreateIngredientInput) -> Result<Ingredient> {
        input.validate()?;
        let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
        let ingredient = self.repo.insert_ingredient(&input, &slug).await?;
        info!(ingredient_id = %ingredient.id, slug = %ingredient.slug, "Ingredient created");
        Ok(ingredient)
    }

    pub async fn get_ingredient_by_id(&self, id: &str) -> Result<Ingredient> {
        self.repo.find_ingredient(id).await?.ok_or(RoutinelyError::NotFound(Entity::Ingredient))
    }

    pub async fn get_ingredient_by_slug(&self, slug: &str) -> Result<Ingredient> {
        self.repo
            .find_ingredient_by_slug(slug)
            .await?
            .ok_or(RoutinelyError::NotFound(Entity::Ingredient))
    }

    pub async fn list_ingredients(&self, filter: IngredientFilter) -> Result<Vec<Ingredient>> {
        self.repo.list_ingredients(&filter).await
    }

    /// A changed name without an explicit slug regenerates the slug.
    #[instrument(skip(self, patch, editor), fields(edited_by = editor.user_id))]
    pub async fn update_ingredient(
        &self,
        id: &str,
        mut patch: IngredientPatch,
        editor: Editor<'_>,
    ) -> Result<Audited<Ingredient>> {
        patch.validate()?;
        patch.slug = match (&patch.name, &patch.slug) {
            (_, Some(slug)) => Some(resolve_slug(Some(slug), slug)?),
            (Some(name), None) => {
                if self.get_ingredient_by_id(id).await?.name == *name {
                    None
                } else {
                    Some(resolve_slug(None, name)?)
                }
            }
            (None, None) => None,
        };

        let (before, after) = self
            .repo
            .update_ingredient(id, &patch)
            .await?
            .ok_or(RoutinelyError::NotFound(Entity::Ingredient))?;

        let edit = self.recorder.record(&*self.repo, id, editor, &patch, &before, &after).await?;
        info!(ingredient_id = id, audited = edit.is_some(), "Ingredient updated");
        Ok(Audited { value: after, edit })
    }

    pub async fn delete_ingredient(&self, id: &str) -> Result<()> {
        if !self.repo.delete_ingredient(id).await? {
            return Err(RoutinelyError::NotFound(Entity::Ingredient));
        }
        info!(ingredient_id = id, "Ingredient deleted");
        Ok(())
    }

    /// Edit history, newest first.
    pub async fn list_ingredient_edits(&self, id: &str) -> Result<Vec<EditRecord>> {
        self.repo.list_edits(id).await
    }
}
