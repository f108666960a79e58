//! Category lifecycle orchestration.
//!
//! Categories are simpler than stories: a single row plus an optional
//! image blob, cached as one well-known list key. Deleting a category
//! cascades to its stories and their slides inside the store, so both
//! list caches are invalidated on delete.

use std::sync::Arc;

use storydeck_cache::Cache;
use storydeck_core::cache_keys::{CATEGORY_LIST_KEY, STORY_LIST_PREFIX};
use storydeck_core::color::{dominant_color, FALLBACK_COLOR};
use storydeck_core::error::CoreError;
use storydeck_db::models::category::{Category, NewCategory};
use storydeck_storage::ObjectStore;
use uuid::Uuid;

use crate::cleanup::{delete_blob_best_effort, run_to_completion};
use crate::config::ContentConfig;
use crate::ports::CategoryStore;
use crate::story::non_empty;
use crate::upload::{blob_path, FileUpload};

/// Orchestrates category writes across Postgres, the blob store, and the
/// category list cache.
///
/// Cloning is shallow; clones share the underlying stores. Write paths
/// clone the service into a detached task so an aborted request cannot
/// skip compensation.
#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryStore>,
    cache: Arc<dyn Cache>,
    blobs: Arc<dyn ObjectStore>,
    config: ContentConfig,
}

impl CategoryService {
    pub fn new(
        categories: Arc<dyn CategoryStore>,
        cache: Arc<dyn Cache>,
        blobs: Arc<dyn ObjectStore>,
        config: ContentConfig,
    ) -> Self {
        Self {
            categories,
            cache,
            blobs,
            config,
        }
    }

    /// Create a category, optionally with a cover image.
    pub async fn create(
        &self,
        name: String,
        image: Option<FileUpload>,
    ) -> Result<Category, CoreError> {
        let service = self.clone();
        run_to_completion(async move { service.create_inner(name, image).await }).await
    }

    async fn create_inner(
        &self,
        name: String,
        image: Option<FileUpload>,
    ) -> Result<Category, CoreError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::Validation("name is required".into()));
        }
        if self.categories.find_by_name(&name).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "category '{name}' already exists"
            )));
        }

        let uuid = Uuid::new_v4();
        let mut image_url = String::new();
        let mut color = FALLBACK_COLOR.to_string();
        if let Some(image) = image {
            color = dominant_color(&image.bytes).unwrap_or(color);
            let path = blob_path("", &uuid.to_string(), &image);
            image_url = self
                .blobs
                .upload(
                    &self.config.category_image_container,
                    &path,
                    image.bytes,
                    image.content_type.as_deref(),
                )
                .await
                .map_err(|err| CoreError::internal("category image upload failed", err))?;
        }

        let category = match self
            .categories
            .insert(&NewCategory {
                uuid,
                name,
                image_url: image_url.clone(),
                dominant_color: color,
            })
            .await
        {
            Ok(category) => category,
            Err(err) => {
                // The row never landed; the blob must not outlive it.
                delete_blob_best_effort(&self.blobs, &image_url, "create category").await;
                return Err(err.into());
            }
        };

        self.invalidate_category_cache().await;
        Ok(category)
    }

    /// Fetch one category.
    pub async fn get(&self, uuid: Uuid) -> Result<Category, CoreError> {
        self.categories
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("Category", uuid))
    }

    /// List every category, read-through cached under one key.
    pub async fn get_all(&self) -> Result<Vec<Category>, CoreError> {
        match self.cache.get(CATEGORY_LIST_KEY).await {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Category>>(&json) {
                Ok(categories) => return Ok(categories),
                Err(err) => {
                    tracing::warn!(error = %err, "Discarding corrupt cached category list");
                }
            },
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "Cache read failed, serving from database");
            }
        }

        let categories = self.categories.list_all().await?;

        match serde_json::to_string(&categories) {
            Ok(json) => {
                if let Err(err) = self
                    .cache
                    .set(CATEGORY_LIST_KEY, &json, self.config.category_list_ttl)
                    .await
                {
                    tracing::warn!(error = %err, "Category list cache write failed");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Category list serialization for cache failed");
            }
        }
        Ok(categories)
    }

    /// Search categories by name.
    pub async fn search(&self, term: &str) -> Result<Vec<Category>, CoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(CoreError::Validation("search term is required".into()));
        }
        Ok(self.categories.search(term).await?)
    }

    /// Rename a category and/or replace its cover image.
    ///
    /// Like story updates, the new image is uploaded before the row is
    /// touched and the old blob is only removed after the update commits.
    pub async fn update(
        &self,
        uuid: Uuid,
        name: Option<String>,
        image: Option<FileUpload>,
    ) -> Result<Category, CoreError> {
        let service = self.clone();
        run_to_completion(async move { service.update_inner(uuid, name, image).await }).await
    }

    async fn update_inner(
        &self,
        uuid: Uuid,
        name: Option<String>,
        image: Option<FileUpload>,
    ) -> Result<Category, CoreError> {
        let mut category = self
            .categories
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("Category", uuid))?;

        if let Some(name) = non_empty(name) {
            let name = name.trim().to_string();
            if name != category.name {
                // Pre-check so a losing rename never uploads its image;
                // uq_categories_name still backstops racing writers.
                if self.categories.find_by_name(&name).await?.is_some() {
                    return Err(CoreError::Conflict(format!(
                        "category '{name}' already exists"
                    )));
                }
                category.name = name;
            }
        }

        let old_image = category.image_url.clone();
        let mut new_image: Option<String> = None;
        if let Some(image) = image {
            let color = dominant_color(&image.bytes)
                .unwrap_or_else(|_| category.dominant_color.clone());
            let path = blob_path("", &Uuid::new_v4().to_string(), &image);
            let url = self
                .blobs
                .upload(
                    &self.config.category_image_container,
                    &path,
                    image.bytes,
                    image.content_type.as_deref(),
                )
                .await
                .map_err(|err| CoreError::internal("category image upload failed", err))?;
            category.image_url = url.clone();
            category.dominant_color = color;
            new_image = Some(url);
        }

        match self.categories.update(&category).await {
            Ok(true) => {
                if new_image.is_some() && !old_image.is_empty() && old_image != category.image_url {
                    delete_blob_best_effort(&self.blobs, &old_image, "replace category image")
                        .await;
                }
            }
            Ok(false) => {
                if let Some(url) = &new_image {
                    delete_blob_best_effort(&self.blobs, url, "update category").await;
                }
                return Err(CoreError::not_found("Category", uuid));
            }
            Err(err) => {
                if let Some(url) = &new_image {
                    delete_blob_best_effort(&self.blobs, url, "update category").await;
                }
                return Err(err.into());
            }
        }

        self.invalidate_category_cache().await;
        Ok(category)
    }

    /// Delete a category and, through the store's cascade, its stories and
    /// slides.
    ///
    /// Only the category's own image blob is cleaned up here; assets of
    /// cascaded stories are reclaimed out of band.
    pub async fn delete(&self, uuid: Uuid) -> Result<(), CoreError> {
        let service = self.clone();
        run_to_completion(async move { service.delete_inner(uuid).await }).await
    }

    async fn delete_inner(&self, uuid: Uuid) -> Result<(), CoreError> {
        let category = self
            .categories
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("Category", uuid))?;

        self.categories.delete(uuid).await?;
        delete_blob_best_effort(&self.blobs, &category.image_url, "delete category").await;

        // Cascaded story rows invalidate the story listings too.
        self.invalidate_category_cache().await;
        if let Err(err) = self.cache.delete_prefix(STORY_LIST_PREFIX).await {
            tracing::warn!(error = %err, "Story list cache invalidation failed");
        }
        Ok(())
    }

    async fn invalidate_category_cache(&self) {
        if let Err(err) = self.cache.delete(CATEGORY_LIST_KEY).await {
            tracing::warn!(error = %err, "Category list cache invalidation failed");
        }
    }
}
