//! Story lifecycle orchestration.
//!
//! Story creation is two-phase: a `pending` skeleton row is inserted first,
//! then the thumbnail is uploaded and the row finalized to `draft`. Any
//! failure after the first write triggers compensation (delete the blob,
//! delete the row) so a half-created story is never left visible.

use std::sync::Arc;

use storydeck_cache::Cache;
use storydeck_core::cache_keys::{story_list_key, STORY_LIST_PREFIX};
use storydeck_core::color::{dominant_color, FALLBACK_COLOR};
use storydeck_core::error::CoreError;
use storydeck_core::listing::{clamp_limit, clamp_page, StorySort};
use storydeck_core::types::DbId;
use storydeck_db::models::slide::{NewSlide, Slide};
use storydeck_db::models::story::{NewStory, Story, StoryDetail, StoryStatus};
use storydeck_storage::ObjectStore;
use uuid::Uuid;

use crate::cleanup::{delete_blob_best_effort, run_to_completion, CLEANUP_TIMEOUT};
use crate::config::ContentConfig;
use crate::ports::{CategoryStore, StoryStore};
use crate::upload::{blob_path, FileUpload};

/// Input for [`StoryService::create`].
#[derive(Debug, Clone)]
pub struct CreateStory {
    pub title: String,
    pub description: String,
    pub category_uuid: Uuid,
    pub user_id: String,
}

/// Partial update for [`StoryService::update`]. `None` fields keep their
/// current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateStory {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<StoryStatus>,
    pub category_uuid: Option<Uuid>,
}

/// Orchestrates story writes across Postgres, the blob store, and the
/// list cache.
///
/// Cloning is shallow; clones share the underlying stores. Write paths
/// clone the service into a detached task so an aborted request cannot
/// skip compensation.
#[derive(Clone)]
pub struct StoryService {
    stories: Arc<dyn StoryStore>,
    categories: Arc<dyn CategoryStore>,
    cache: Arc<dyn Cache>,
    blobs: Arc<dyn ObjectStore>,
    config: ContentConfig,
}

/// Drop optional string fields that are present but blank.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl StoryService {
    pub fn new(
        stories: Arc<dyn StoryStore>,
        categories: Arc<dyn CategoryStore>,
        cache: Arc<dyn Cache>,
        blobs: Arc<dyn ObjectStore>,
        config: ContentConfig,
    ) -> Self {
        Self {
            stories,
            categories,
            cache,
            blobs,
            config,
        }
    }

    /// Create a story, optionally with a thumbnail image.
    pub async fn create(
        &self,
        input: CreateStory,
        image: Option<FileUpload>,
    ) -> Result<Story, CoreError> {
        let service = self.clone();
        run_to_completion(async move { service.create_inner(input, image).await }).await
    }

    async fn create_inner(
        &self,
        input: CreateStory,
        image: Option<FileUpload>,
    ) -> Result<Story, CoreError> {
        if input.title.trim().is_empty() {
            return Err(CoreError::Validation("title is required".into()));
        }
        if input.description.trim().is_empty() {
            return Err(CoreError::Validation("description is required".into()));
        }
        if input.user_id.trim().is_empty() {
            return Err(CoreError::Validation("user id is required".into()));
        }

        // Duplicate check before any expensive work; the database unique
        // constraints still backstop racing writers.
        if self
            .stories
            .title_exists(&input.title, &input.description)
            .await?
        {
            return Err(CoreError::Conflict(
                "a story with this title and description already exists".into(),
            ));
        }
        let category = self
            .categories
            .find_by_uuid(input.category_uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("Category", input.category_uuid))?;

        let uuid = Uuid::new_v4();
        let mut story = self
            .stories
            .insert(&NewStory {
                uuid,
                title: input.title,
                description: input.description,
                category_id: category.id,
                user_id: input.user_id,
                status: StoryStatus::Pending,
            })
            .await?;

        if let Some(image) = image {
            let color = dominant_color(&image.bytes)
                .unwrap_or_else(|_| FALLBACK_COLOR.to_string());
            let path = blob_path(&self.config.story_thumb_prefix, &uuid.to_string(), &image);
            let url = match self
                .blobs
                .upload(
                    &self.config.story_thumb_container,
                    &path,
                    image.bytes,
                    image.content_type.as_deref(),
                )
                .await
            {
                Ok(url) => url,
                Err(err) => {
                    self.rollback_story_row(story.id).await;
                    return Err(CoreError::internal("thumbnail upload failed", err));
                }
            };
            story.thumbnail_url = url;
            story.dominant_color = color;
        }

        story.status = StoryStatus::Draft;
        match self.stories.update(&story).await {
            Ok(true) => {}
            Ok(false) => {
                delete_blob_best_effort(&self.blobs, &story.thumbnail_url, "create story").await;
                return Err(CoreError::Internal(
                    "story row disappeared while finalizing create".into(),
                ));
            }
            Err(err) => {
                delete_blob_best_effort(&self.blobs, &story.thumbnail_url, "create story").await;
                self.rollback_story_row(story.id).await;
                return Err(err.into());
            }
        }

        self.invalidate_list_cache().await;
        Ok(story)
    }

    /// Fetch one story with its category and slides.
    pub async fn get(&self, uuid: Uuid) -> Result<StoryDetail, CoreError> {
        self.stories
            .find_detail_by_uuid(uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("Story", uuid))
    }

    /// List stories, read-through cached per (page, limit, sort).
    pub async fn get_all(
        &self,
        page: i64,
        limit: i64,
        sort: StorySort,
    ) -> Result<Vec<Story>, CoreError> {
        let page = clamp_page(page);
        let limit = clamp_limit(limit);
        let key = story_list_key(page, limit, sort.cache_token());

        match self.cache.get(&key).await {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Story>>(&json) {
                Ok(stories) => return Ok(stories),
                Err(err) => {
                    tracing::warn!(%key, error = %err, "Discarding corrupt cached story list");
                }
            },
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%key, error = %err, "Cache read failed, serving from database");
            }
        }

        let stories = self.stories.list(page, limit, sort).await?;

        match serde_json::to_string(&stories) {
            Ok(json) => {
                if let Err(err) = self.cache.set(&key, &json, self.config.story_list_ttl).await {
                    tracing::warn!(%key, error = %err, "Story list cache write failed");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Story list serialization for cache failed");
            }
        }
        Ok(stories)
    }

    /// Search stories by title or description.
    pub async fn search(&self, term: &str) -> Result<Vec<Story>, CoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(CoreError::Validation("search term is required".into()));
        }
        Ok(self.stories.search(term).await?)
    }

    /// Partially update a story, optionally replacing its thumbnail.
    ///
    /// The new thumbnail is uploaded before the row is touched; the old
    /// blob is only deleted once the row update has committed, so a
    /// failure mid-way never leaves the story pointing at a missing blob.
    pub async fn update(
        &self,
        uuid: Uuid,
        changes: UpdateStory,
        image: Option<FileUpload>,
    ) -> Result<Story, CoreError> {
        let service = self.clone();
        run_to_completion(async move { service.update_inner(uuid, changes, image).await }).await
    }

    async fn update_inner(
        &self,
        uuid: Uuid,
        changes: UpdateStory,
        image: Option<FileUpload>,
    ) -> Result<Story, CoreError> {
        let mut story = self
            .stories
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("Story", uuid))?;

        if let Some(title) = non_empty(changes.title) {
            story.title = title;
        }
        if let Some(description) = non_empty(changes.description) {
            story.description = description;
        }
        if let Some(status) = changes.status {
            story.status = status;
        }
        if let Some(category_uuid) = changes.category_uuid {
            let category = self
                .categories
                .find_by_uuid(category_uuid)
                .await?
                .ok_or_else(|| CoreError::not_found("Category", category_uuid))?;
            story.category_id = category.id;
        }

        let old_thumb = story.thumbnail_url.clone();
        let mut new_thumb: Option<String> = None;
        if let Some(image) = image {
            let color = dominant_color(&image.bytes)
                .unwrap_or_else(|_| story.dominant_color.clone());
            let path = blob_path(
                &self.config.story_thumb_prefix,
                &Uuid::new_v4().to_string(),
                &image,
            );
            let url = self
                .blobs
                .upload(
                    &self.config.story_thumb_container,
                    &path,
                    image.bytes,
                    image.content_type.as_deref(),
                )
                .await
                .map_err(|err| CoreError::internal("thumbnail upload failed", err))?;
            story.thumbnail_url = url.clone();
            story.dominant_color = color;
            new_thumb = Some(url);
        }

        match self.stories.update(&story).await {
            Ok(true) => {
                if new_thumb.is_some() && !old_thumb.is_empty() && old_thumb != story.thumbnail_url
                {
                    delete_blob_best_effort(&self.blobs, &old_thumb, "replace story thumbnail")
                        .await;
                }
            }
            Ok(false) => {
                if let Some(url) = &new_thumb {
                    delete_blob_best_effort(&self.blobs, url, "update story").await;
                }
                return Err(CoreError::not_found("Story", uuid));
            }
            Err(err) => {
                if let Some(url) = &new_thumb {
                    delete_blob_best_effort(&self.blobs, url, "update story").await;
                }
                return Err(err.into());
            }
        }

        self.invalidate_list_cache().await;
        Ok(story)
    }

    /// Delete a story, its slides, and their blobs. Idempotent: deleting
    /// an absent story succeeds without touching anything.
    pub async fn delete(&self, uuid: Uuid) -> Result<(), CoreError> {
        let service = self.clone();
        run_to_completion(async move { service.delete_inner(uuid).await }).await
    }

    async fn delete_inner(&self, uuid: Uuid) -> Result<(), CoreError> {
        let Some(detail) = self.stories.find_detail_by_uuid(uuid).await? else {
            return Ok(());
        };

        // Row first. Blobs are only removed once nothing references them,
        // so a failure here leaks nothing and orphans nothing.
        self.stories.delete(uuid).await?;

        delete_blob_best_effort(&self.blobs, &detail.story.thumbnail_url, "delete story").await;
        for slide in &detail.slides {
            delete_blob_best_effort(&self.blobs, &slide.image_url, "delete story slide").await;
            if let Some(audio) = &slide.audio_url {
                delete_blob_best_effort(&self.blobs, audio, "delete story slide audio").await;
            }
        }

        self.invalidate_list_cache().await;
        Ok(())
    }

    /// Append a slide to a story, enforcing the per-story slide limit.
    pub async fn add_slide(
        &self,
        story_uuid: Uuid,
        content: String,
        sequence: i32,
        image: Option<FileUpload>,
    ) -> Result<Slide, CoreError> {
        let service = self.clone();
        run_to_completion(async move {
            service
                .add_slide_inner(story_uuid, content, sequence, image)
                .await
        })
        .await
    }

    async fn add_slide_inner(
        &self,
        story_uuid: Uuid,
        content: String,
        sequence: i32,
        image: Option<FileUpload>,
    ) -> Result<Slide, CoreError> {
        let story = self
            .stories
            .find_by_uuid(story_uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("Story", story_uuid))?;

        // Cheap pre-check so a doomed request skips the upload. The
        // guarded insert below re-checks under lock.
        let count = self.stories.slide_count(story.id).await?;
        if count >= self.config.slide_limit {
            return Err(self.slide_limit_error());
        }

        let mut image_url = String::new();
        if let Some(image) = image {
            let path = blob_path(
                &self.config.slide_image_prefix,
                &Uuid::new_v4().to_string(),
                &image,
            );
            image_url = self
                .blobs
                .upload(
                    &self.config.slide_image_container,
                    &path,
                    image.bytes,
                    image.content_type.as_deref(),
                )
                .await
                .map_err(|err| CoreError::internal("slide image upload failed", err))?;
        }

        let new = NewSlide {
            story_id: Some(story.id),
            chapter_id: None,
            image_url,
            audio_url: None,
            content,
            sequence,
        };
        match self.stories.insert_slide(&new, self.config.slide_limit).await {
            Ok(Some(slide)) => {
                self.invalidate_list_cache().await;
                Ok(slide)
            }
            Ok(None) => {
                // A racing writer filled the quota between the pre-check
                // and the insert.
                delete_blob_best_effort(&self.blobs, &new.image_url, "add slide").await;
                Err(self.slide_limit_error())
            }
            Err(err) => {
                delete_blob_best_effort(&self.blobs, &new.image_url, "add slide").await;
                Err(err.into())
            }
        }
    }

    fn slide_limit_error(&self) -> CoreError {
        CoreError::LimitExceeded(format!(
            "story already holds the maximum of {} slides",
            self.config.slide_limit
        ))
    }

    async fn invalidate_list_cache(&self) {
        if let Err(err) = self.cache.delete_prefix(STORY_LIST_PREFIX).await {
            tracing::warn!(error = %err, "Story list cache invalidation failed");
        }
    }

    /// Remove a pending skeleton row after a later step failed.
    async fn rollback_story_row(&self, id: DbId) {
        match tokio::time::timeout(CLEANUP_TIMEOUT, self.stories.delete_by_id(id)).await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                tracing::error!(story_id = id, error = %err, "Pending story rollback failed");
            }
            Err(_) => {
                tracing::error!(story_id = id, "Pending story rollback timed out");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use assert_matches::assert_matches;
    use storydeck_cache::MemoryCache;

    use super::*;
    use crate::testing::{png_upload, MockCategoryStore, MockObjectStore, MockStoryStore};

    struct Fixture {
        stories: Arc<MockStoryStore>,
        categories: Arc<MockCategoryStore>,
        cache: Arc<MemoryCache>,
        blobs: Arc<MockObjectStore>,
        service: StoryService,
    }

    fn fixture() -> Fixture {
        let stories = Arc::new(MockStoryStore::default());
        let categories = Arc::new(MockCategoryStore::default());
        let cache = Arc::new(MemoryCache::new());
        let blobs = Arc::new(MockObjectStore::default());
        let service = StoryService::new(
            stories.clone(),
            categories.clone(),
            cache.clone(),
            blobs.clone(),
            ContentConfig::default(),
        );
        Fixture {
            stories,
            categories,
            cache,
            blobs,
            service,
        }
    }

    fn create_input(category_uuid: Uuid, title: &str) -> CreateStory {
        CreateStory {
            title: title.to_string(),
            description: format!("{title} description"),
            category_uuid,
            user_id: "user-1".to_string(),
        }
    }

    #[tokio::test]
    async fn create_without_image_finishes_as_draft() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");

        let story = fx
            .service
            .create(create_input(category.uuid, "Rivers"), None)
            .await
            .unwrap();

        assert_eq!(story.status, StoryStatus::Draft);
        assert_eq!(story.category_id, category.id);
        assert_eq!(story.thumbnail_url, "");
        assert_eq!(fx.blobs.uploads(), 0);
        assert!(fx.stories.get(story.uuid).is_some());
    }

    #[tokio::test]
    async fn create_with_image_attaches_thumbnail() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");

        let story = fx
            .service
            .create(create_input(category.uuid, "Rivers"), Some(png_upload()))
            .await
            .unwrap();

        assert!(story.thumbnail_url.starts_with("mock://blobs/story-thumbnails/"));
        assert!(story.thumbnail_url.contains("stories/thumbnails/"));
        // Undecodable bytes fall back to the default color.
        assert_eq!(story.dominant_color, FALLBACK_COLOR);
        assert_eq!(fx.blobs.live_count(), 1);
    }

    #[tokio::test]
    async fn create_duplicate_conflicts_before_any_upload() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        fx.service
            .create(create_input(category.uuid, "Rivers"), None)
            .await
            .unwrap();

        let err = fx
            .service
            .create(create_input(category.uuid, "Rivers"), Some(png_upload()))
            .await
            .unwrap_err();

        assert_matches!(err, CoreError::Conflict(_));
        assert_eq!(fx.blobs.uploads(), 0);
        assert_eq!(fx.stories.stories.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_with_unknown_category_is_not_found() {
        let fx = fixture();
        let err = fx
            .service
            .create(create_input(Uuid::new_v4(), "Rivers"), None)
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "Category", .. });
    }

    #[tokio::test]
    async fn create_rolls_back_row_when_upload_fails() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        fx.blobs.fail_uploads.store(true, Ordering::SeqCst);

        let err = fx
            .service
            .create(create_input(category.uuid, "Rivers"), Some(png_upload()))
            .await
            .unwrap_err();

        assert_matches!(err, CoreError::Internal(_));
        assert!(fx.stories.stories.lock().unwrap().is_empty());
        assert_eq!(fx.blobs.live_count(), 0);
    }

    #[tokio::test]
    async fn create_deletes_blob_and_row_when_finalize_fails() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        fx.stories.fail_update.store(true, Ordering::SeqCst);

        let err = fx
            .service
            .create(create_input(category.uuid, "Rivers"), Some(png_upload()))
            .await
            .unwrap_err();

        assert_matches!(err, CoreError::Internal(_));
        assert!(fx.stories.stories.lock().unwrap().is_empty());
        // The uploaded thumbnail was compensated away.
        assert_eq!(fx.blobs.live_count(), 0);
    }

    #[tokio::test]
    async fn create_losing_a_duplicate_race_maps_to_conflict() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        fx.stories.race_duplicate.store(true, Ordering::SeqCst);

        let err = fx
            .service
            .create(create_input(category.uuid, "Rivers"), Some(png_upload()))
            .await
            .unwrap_err();

        assert_matches!(err, CoreError::Conflict(_));
        // The insert failed before the thumbnail upload started.
        assert_eq!(fx.blobs.uploads(), 0);
    }

    #[tokio::test]
    async fn create_compensation_survives_a_dropped_caller() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        *fx.stories.update_delay.lock().unwrap() = Some(Duration::from_millis(100));
        fx.stories.fail_update.store(true, Ordering::SeqCst);

        let aborted = tokio::time::timeout(
            Duration::from_millis(10),
            fx.service
                .create(create_input(category.uuid, "Rivers"), Some(png_upload())),
        )
        .await;
        assert!(aborted.is_err());
        assert_eq!(fx.blobs.uploads(), 1);

        // The write keeps running on its own task; wait for the failed
        // finalize to compensate the blob and the pending row.
        let mut cleaned = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if fx.blobs.live_count() == 0 && fx.stories.stories.lock().unwrap().is_empty() {
                cleaned = true;
                break;
            }
        }
        assert!(cleaned, "cleanup never ran after the caller went away");
    }

    #[tokio::test]
    async fn get_all_serves_second_read_from_cache() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        fx.stories.seed(category.id, "Rivers");

        let first = fx
            .service
            .get_all(1, 10, StorySort::default())
            .await
            .unwrap();
        let second = fx
            .service
            .get_all(1, 10, StorySort::default())
            .await
            .unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(fx.stories.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cached_story_list_json_round_trips() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        let story = fx.stories.seed(category.id, "Rivers");

        fx.service
            .get_all(1, 10, StorySort::default())
            .await
            .unwrap();

        let key = story_list_key(1, 10, StorySort::default().cache_token());
        let json = fx.cache.get(&key).await.unwrap().unwrap();
        let cached: Vec<Story> = serde_json::from_str(&json).unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].uuid, story.uuid);
    }

    #[tokio::test]
    async fn mutation_invalidates_cached_lists() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        fx.stories.seed(category.id, "Rivers");

        fx.service
            .get_all(1, 10, StorySort::default())
            .await
            .unwrap();
        fx.service
            .create(create_input(category.uuid, "Lakes"), None)
            .await
            .unwrap();
        let listed = fx
            .service
            .get_all(1, 10, StorySort::default())
            .await
            .unwrap();

        // Second listing re-read the store and saw the new story.
        assert_eq!(fx.stories.list_calls.load(Ordering::SeqCst), 2);
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn get_all_clamps_out_of_range_pagination() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        fx.stories.seed(category.id, "Rivers");

        fx.service
            .get_all(0, 0, StorySort::default())
            .await
            .unwrap();

        // The cached key uses the clamped values.
        let key = story_list_key(1, 1, StorySort::default().cache_token());
        assert!(fx.cache.get(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_replaces_thumbnail_and_deletes_old_blob() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        let story = fx
            .service
            .create(create_input(category.uuid, "Rivers"), Some(png_upload()))
            .await
            .unwrap();
        let old_thumb = story.thumbnail_url.clone();

        let updated = fx
            .service
            .update(story.uuid, UpdateStory::default(), Some(png_upload()))
            .await
            .unwrap();

        assert_ne!(updated.thumbnail_url, old_thumb);
        assert!(fx.blobs.was_deleted(&old_thumb));
        assert_eq!(fx.blobs.live_count(), 1);
    }

    #[tokio::test]
    async fn update_failure_keeps_old_blob_and_drops_new_one() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        let story = fx
            .service
            .create(create_input(category.uuid, "Rivers"), Some(png_upload()))
            .await
            .unwrap();
        let old_thumb = story.thumbnail_url.clone();
        fx.stories.fail_update.store(true, Ordering::SeqCst);

        let err = fx
            .service
            .update(story.uuid, UpdateStory::default(), Some(png_upload()))
            .await
            .unwrap_err();

        assert_matches!(err, CoreError::Internal(_));
        assert!(!fx.blobs.was_deleted(&old_thumb));
        // Only the original thumbnail remains live.
        assert_eq!(fx.blobs.live_count(), 1);
        assert_eq!(fx.stories.get(story.uuid).unwrap().thumbnail_url, old_thumb);
    }

    #[tokio::test]
    async fn update_rebinding_to_unknown_category_fails() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        let story = fx
            .service
            .create(create_input(category.uuid, "Rivers"), None)
            .await
            .unwrap();

        let changes = UpdateStory {
            category_uuid: Some(Uuid::new_v4()),
            ..UpdateStory::default()
        };
        let err = fx.service.update(story.uuid, changes, None).await.unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "Category", .. });
    }

    #[tokio::test]
    async fn update_ignores_blank_fields() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        let story = fx
            .service
            .create(create_input(category.uuid, "Rivers"), None)
            .await
            .unwrap();

        let changes = UpdateStory {
            title: Some("  ".to_string()),
            status: Some(StoryStatus::Published),
            ..UpdateStory::default()
        };
        let updated = fx.service.update(story.uuid, changes, None).await.unwrap();

        assert_eq!(updated.title, "Rivers");
        assert_eq!(updated.status, StoryStatus::Published);
    }

    #[tokio::test]
    async fn delete_removes_row_and_every_blob() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        let story = fx
            .service
            .create(create_input(category.uuid, "Rivers"), Some(png_upload()))
            .await
            .unwrap();
        fx.service
            .add_slide(story.uuid, "page one".into(), 1, Some(png_upload()))
            .await
            .unwrap();
        assert_eq!(fx.blobs.live_count(), 2);

        fx.service.delete(story.uuid).await.unwrap();

        assert!(fx.stories.get(story.uuid).is_none());
        assert!(fx.stories.slides.lock().unwrap().is_empty());
        assert_eq!(fx.blobs.live_count(), 0);
    }

    #[tokio::test]
    async fn delete_of_absent_story_is_idempotent() {
        let fx = fixture();
        fx.service.delete(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn add_slide_at_quota_is_rejected_before_upload() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        let story = fx.stories.seed(category.id, "Rivers");
        for i in 0..ContentConfig::default().slide_limit {
            fx.stories.seed_slide(story.id, &format!("mock://blobs/slide-{i}"));
        }

        let err = fx
            .service
            .add_slide(story.uuid, "over".into(), 21, Some(png_upload()))
            .await
            .unwrap_err();

        assert_matches!(err, CoreError::LimitExceeded(_));
        assert_eq!(fx.blobs.uploads(), 0);
    }

    #[tokio::test]
    async fn add_slide_losing_the_quota_race_deletes_its_upload() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        let story = fx.stories.seed(category.id, "Rivers");
        fx.stories.force_slide_quota.store(true, Ordering::SeqCst);

        let err = fx
            .service
            .add_slide(story.uuid, "raced".into(), 1, Some(png_upload()))
            .await
            .unwrap_err();

        assert_matches!(err, CoreError::LimitExceeded(_));
        assert_eq!(fx.blobs.uploads(), 1);
        assert_eq!(fx.blobs.live_count(), 0);
    }

    #[tokio::test]
    async fn add_slide_insert_failure_deletes_its_upload() {
        let fx = fixture();
        let category = fx.categories.seed("Nature");
        let story = fx.stories.seed(category.id, "Rivers");
        fx.stories.fail_insert_slide.store(true, Ordering::SeqCst);

        let err = fx
            .service
            .add_slide(story.uuid, "broken".into(), 1, Some(png_upload()))
            .await
            .unwrap_err();

        assert_matches!(err, CoreError::Internal(_));
        assert_eq!(fx.blobs.live_count(), 0);
    }

    #[tokio::test]
    async fn search_requires_a_term() {
        let fx = fixture();
        assert_matches!(
            fx.service.search("   ").await.unwrap_err(),
            CoreError::Validation(_)
        );
    }
}
