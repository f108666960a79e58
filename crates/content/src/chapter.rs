//! Chapter orchestration.
//!
//! Chapters group slides under a story for serialized, episodic content.
//! Chapter slides may carry an audio narration blob alongside the image,
//! so the compensation paths here track up to two uploads per slide.

use std::sync::Arc;

use storydeck_core::error::CoreError;
use storydeck_db::models::chapter::{Chapter, ChapterDetail, NewChapter};
use storydeck_db::models::slide::{NewSlide, Slide};
use storydeck_storage::ObjectStore;
use uuid::Uuid;

use crate::cleanup::{delete_blob_best_effort, run_to_completion};
use crate::config::ContentConfig;
use crate::ports::{ChapterStore, StoryStore};
use crate::upload::{blob_path, FileUpload};

/// Input for [`ChapterService::add_slide`].
#[derive(Debug, Clone)]
pub struct NewChapterSlide {
    pub content: String,
    pub sequence: i32,
    pub image: Option<FileUpload>,
    pub audio: Option<FileUpload>,
}

/// Orchestrates chapter and chapter-slide writes.
///
/// Cloning is shallow; clones share the underlying stores. Write paths
/// clone the service into a detached task so an aborted request cannot
/// skip compensation.
#[derive(Clone)]
pub struct ChapterService {
    chapters: Arc<dyn ChapterStore>,
    stories: Arc<dyn StoryStore>,
    blobs: Arc<dyn ObjectStore>,
    config: ContentConfig,
}

impl ChapterService {
    pub fn new(
        chapters: Arc<dyn ChapterStore>,
        stories: Arc<dyn StoryStore>,
        blobs: Arc<dyn ObjectStore>,
        config: ContentConfig,
    ) -> Self {
        Self {
            chapters,
            stories,
            blobs,
            config,
        }
    }

    /// Create an empty chapter under a story.
    pub async fn create(&self, story_uuid: Uuid) -> Result<Chapter, CoreError> {
        let story = self
            .stories
            .find_by_uuid(story_uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("Story", story_uuid))?;

        Ok(self
            .chapters
            .insert(&NewChapter {
                uuid: Uuid::new_v4(),
                story_id: story.id,
            })
            .await?)
    }

    /// Fetch a chapter with its ordered slides.
    pub async fn get(&self, uuid: Uuid) -> Result<ChapterDetail, CoreError> {
        self.chapters
            .find_detail_by_uuid(uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("Chapter", uuid))
    }

    /// Delete a chapter, its slides, and their blobs. Idempotent.
    pub async fn delete(&self, uuid: Uuid) -> Result<(), CoreError> {
        let service = self.clone();
        run_to_completion(async move { service.delete_inner(uuid).await }).await
    }

    async fn delete_inner(&self, uuid: Uuid) -> Result<(), CoreError> {
        let Some(detail) = self.chapters.find_detail_by_uuid(uuid).await? else {
            return Ok(());
        };

        self.chapters.delete(uuid).await?;

        for slide in &detail.slides {
            delete_blob_best_effort(&self.blobs, &slide.image_url, "delete chapter slide").await;
            if let Some(audio) = &slide.audio_url {
                delete_blob_best_effort(&self.blobs, audio, "delete chapter slide audio").await;
            }
        }
        Ok(())
    }

    /// Append a slide to a chapter, enforcing the per-chapter slide limit.
    pub async fn add_slide(
        &self,
        chapter_uuid: Uuid,
        input: NewChapterSlide,
    ) -> Result<Slide, CoreError> {
        let service = self.clone();
        run_to_completion(async move { service.add_slide_inner(chapter_uuid, input).await }).await
    }

    async fn add_slide_inner(
        &self,
        chapter_uuid: Uuid,
        input: NewChapterSlide,
    ) -> Result<Slide, CoreError> {
        let detail = self
            .chapters
            .find_detail_by_uuid(chapter_uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("Chapter", chapter_uuid))?;

        let count = self.chapters.slide_count(detail.chapter.id).await?;
        if count >= self.config.slide_limit {
            return Err(self.slide_limit_error());
        }

        let mut image_url = String::new();
        if let Some(image) = input.image {
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

        let mut audio_url: Option<String> = None;
        if let Some(audio) = input.audio {
            let path = blob_path("", &Uuid::new_v4().to_string(), &audio);
            match self
                .blobs
                .upload(
                    &self.config.slide_audio_container,
                    &path,
                    audio.bytes,
                    audio.content_type.as_deref(),
                )
                .await
            {
                Ok(url) => audio_url = Some(url),
                Err(err) => {
                    // The image went up first; take it back down.
                    delete_blob_best_effort(&self.blobs, &image_url, "add chapter slide").await;
                    return Err(CoreError::internal("slide audio upload failed", err));
                }
            }
        }

        let new = NewSlide {
            story_id: None,
            chapter_id: Some(detail.chapter.id),
            image_url,
            audio_url,
            content: input.content,
            sequence: input.sequence,
        };
        match self.chapters.insert_slide(&new, self.config.slide_limit).await {
            Ok(Some(slide)) => Ok(slide),
            Ok(None) => {
                self.drop_slide_blobs(&new).await;
                Err(self.slide_limit_error())
            }
            Err(err) => {
                self.drop_slide_blobs(&new).await;
                Err(err.into())
            }
        }
    }

    async fn drop_slide_blobs(&self, new: &NewSlide) {
        delete_blob_best_effort(&self.blobs, &new.image_url, "add chapter slide").await;
        if let Some(audio) = &new.audio_url {
            delete_blob_best_effort(&self.blobs, audio, "add chapter slide audio").await;
        }
    }

    fn slide_limit_error(&self) -> CoreError {
        CoreError::LimitExceeded(format!(
            "chapter already holds the maximum of {} slides",
            self.config.slide_limit
        ))
    }
}
