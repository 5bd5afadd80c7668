//! Tag service

use std::sync::Arc;

use routinely_domain::{CreateTagInput, Entity, Result, RoutinelyError, Tag};
use tracing::{debug, info};

use super::ports::TagRepository;
use super::resolve_slug;

pub struct TagService {
    tags: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    pub async fn create_tag(&self, input: CreateTagInput) -> Result<Tag> {
        input.validate()?;
        let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
        let tag = self.tags.insert_tag(input.name.trim(), &slug).await?;
        info!(tag_id = %tag.id, slug = %tag.slug, "Tag created");
        Ok(tag)
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.tags.list_tags().await
    }

    pub async fn get_tag_by_slug(&self, slug: &str) -> Result<Tag> {
        self.tags.find_tag_by_slug(slug).await?.ok_or(RoutinelyError::NotFound(Entity::Tag))
    }

    pub async fn delete_tag(&self, id: &str) -> Result<()> {
        if !self.tags.delete_tag(id).await? {
            return Err(RoutinelyError::NotFound(Entity::Tag));
        }
        info!(tag_id = id, "Tag deleted");
        Ok(())
    }

    /// Idempotent: attaching an attached tag is a no-op.
    pub async fn attach_tag_to_product(&self, product_id: &str, tag_id: &str) -> Result<()> {
        if !self.tags.attach(product_id, tag_id).await? {
            debug!(product_id, tag_id, "Tag already attached");
        }
        Ok(())
    }

    pub async fn detach_tag_from_product(&self, product_id: &str, tag_id: &str) -> Result<()> {
        if !self.tags.detach(product_id, tag_id).await? {
            return Err(RoutinelyError::NotFound(Entity::Tag));
        }
        Ok(())
    }

    pub async fn get_product_tags(&self, product_id: &str) -> Result<Vec<Tag>> {
        self.tags.tags_of(product_id).await
    }
}
