//! In-memory fakes for the store and gateway ports, with call counters and
//! fault injection. Shared by the service test modules.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use storydeck_core::color::FALLBACK_COLOR;
use storydeck_core::listing::StorySort;
use storydeck_core::types::DbId;
use storydeck_db::models::category::{Category, NewCategory};
use storydeck_db::models::chapter::{Chapter, ChapterDetail, NewChapter};
use storydeck_db::models::preference::NewChoice;
use storydeck_db::models::slide::{NewSlide, Slide};
use storydeck_db::models::story::{NewStory, Story, StoryDetail, StoryStatus};
use storydeck_storage::{ObjectStore, StorageError};
use uuid::Uuid;

use crate::ports::{CategoryStore, ChapterStore, PreferenceStore, StoreError, StoryStore};

fn db_err() -> StoreError {
    StoreError::Database("injected failure".into())
}

// ---------------------------------------------------------------------------
// Blob store fake
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct MockObjectStore {
    pub upload_calls: AtomicUsize,
    pub fail_uploads: AtomicBool,
    /// When set, only uploads into this container fail.
    pub fail_container: Mutex<Option<String>>,
    pub objects: Mutex<HashSet<String>>,
    pub deleted: Mutex<Vec<String>>,
}

impl MockObjectStore {
    pub fn live_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn uploads(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn was_deleted(&self, url: &str) -> bool {
        self.deleted.lock().unwrap().iter().any(|u| u == url)
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn upload(
        &self,
        container: &str,
        path: &str,
        _bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError("injected upload failure".into()));
        }
        if let Some(bad) = self.fail_container.lock().unwrap().as_deref() {
            if bad == container {
                return Err(StorageError(format!("injected failure for {container}")));
            }
        }
        let url = format!("mock://blobs/{container}/{path}");
        self.objects.lock().unwrap().insert(url.clone());
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        self.objects.lock().unwrap().remove(url);
        self.deleted.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Category store fake
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct MockCategoryStore {
    pub categories: Mutex<Vec<Category>>,
    pub next_id: AtomicI64,
    pub list_calls: AtomicUsize,
    pub fail_insert: AtomicBool,
    pub fail_update: AtomicBool,
    /// Emulates the `ON DELETE CASCADE` foreign keys: deleting a category
    /// removes its stories and their slides from the linked story store.
    pub cascade_to: Mutex<Option<std::sync::Arc<MockStoryStore>>>,
}

impl MockCategoryStore {
    pub fn seed(&self, name: &str) -> Category {
        let category = Category {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            image_url: String::new(),
            dominant_color: FALLBACK_COLOR.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.categories.lock().unwrap().push(category.clone());
        category
    }

    pub fn name_of(&self, uuid: Uuid) -> Option<String> {
        self.categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.uuid == uuid)
            .map(|c| c.name.clone())
    }
}

#[async_trait]
impl CategoryStore for MockCategoryStore {
    async fn insert(&self, new: &NewCategory) -> Result<Category, StoreError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(db_err());
        }
        let mut categories = self.categories.lock().unwrap();
        if categories.iter().any(|c| c.name == new.name) {
            return Err(StoreError::UniqueViolation("uq_categories_name".into()));
        }
        let category = Category {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            uuid: new.uuid,
            name: new.name.clone(),
            image_url: new.image_url.clone(),
            dominant_color: new.dominant_color.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        categories.push(category.clone());
        Ok(category)
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Category>, StoreError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.uuid == uuid)
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Category>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn search(&self, term: &str) -> Result<Vec<Category>, StoreError> {
        let term = term.to_lowercase();
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&term))
            .cloned()
            .collect())
    }

    async fn update(&self, category: &Category) -> Result<bool, StoreError> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(db_err());
        }
        let mut categories = self.categories.lock().unwrap();
        match categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => {
                *existing = category.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, uuid: Uuid) -> Result<bool, StoreError> {
        let removed_id = {
            let mut categories = self.categories.lock().unwrap();
            let before = categories.len();
            let id = categories.iter().find(|c| c.uuid == uuid).map(|c| c.id);
            categories.retain(|c| c.uuid != uuid);
            if categories.len() == before {
                return Ok(false);
            }
            id
        };
        if let (Some(category_id), Some(stories)) =
            (removed_id, self.cascade_to.lock().unwrap().clone())
        {
            stories.cascade_delete_category(category_id);
        }
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Story store fake
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct MockStoryStore {
    pub stories: Mutex<Vec<Story>>,
    pub slides: Mutex<Vec<Slide>>,
    pub next_id: AtomicI64,
    pub list_calls: AtomicUsize,
    pub fail_update: AtomicBool,
    /// Stall `update` before it touches any state, so a caller can be
    /// dropped mid-write.
    pub update_delay: Mutex<Option<Duration>>,
    pub fail_insert_slide: AtomicBool,
    /// Emulates a racing writer committing the same (title, description)
    /// between the pre-check and the insert.
    pub race_duplicate: AtomicBool,
    /// Force the guarded insert to report a full quota, emulating a racing
    /// writer that filled the story between the pre-check and the insert.
    pub force_slide_quota: AtomicBool,
}

impl MockStoryStore {
    pub fn seed(&self, category_id: DbId, title: &str) -> Story {
        let story = Story {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            uuid: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("{title} description"),
            thumbnail_url: String::new(),
            dominant_color: FALLBACK_COLOR.to_string(),
            category_id,
            user_id: "user-1".to_string(),
            slide_count: 0,
            status: StoryStatus::Draft,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.stories.lock().unwrap().push(story.clone());
        story
    }

    pub fn seed_slide(&self, story_id: DbId, image_url: &str) -> Slide {
        let slide = Slide {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            story_id: Some(story_id),
            chapter_id: None,
            image_url: image_url.to_string(),
            audio_url: None,
            content: String::new(),
            sequence: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.slides.lock().unwrap().push(slide.clone());
        slide
    }

    pub fn get(&self, uuid: Uuid) -> Option<Story> {
        self.stories
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.uuid == uuid)
            .cloned()
    }

    fn cascade_delete_category(&self, category_id: DbId) {
        let story_ids: Vec<DbId> = {
            let mut stories = self.stories.lock().unwrap();
            let ids = stories
                .iter()
                .filter(|s| s.category_id == category_id)
                .map(|s| s.id)
                .collect();
            stories.retain(|s| s.category_id != category_id);
            ids
        };
        self.slides
            .lock()
            .unwrap()
            .retain(|slide| !matches!(slide.story_id, Some(id) if story_ids.contains(&id)));
    }
}

#[async_trait]
impl StoryStore for MockStoryStore {
    async fn insert(&self, new: &NewStory) -> Result<Story, StoreError> {
        if self.race_duplicate.load(Ordering::SeqCst) {
            return Err(StoreError::UniqueViolation(
                "uq_stories_title_description".into(),
            ));
        }
        let story = Story {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            uuid: new.uuid,
            title: new.title.clone(),
            description: new.description.clone(),
            thumbnail_url: String::new(),
            dominant_color: FALLBACK_COLOR.to_string(),
            category_id: new.category_id,
            user_id: new.user_id.clone(),
            slide_count: 0,
            status: new.status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.stories.lock().unwrap().push(story.clone());
        Ok(story)
    }

    async fn title_exists(&self, title: &str, description: &str) -> Result<bool, StoreError> {
        Ok(self
            .stories
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.title == title && s.description == description))
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Story>, StoreError> {
        Ok(self.get(uuid))
    }

    async fn find_detail_by_uuid(&self, uuid: Uuid) -> Result<Option<StoryDetail>, StoreError> {
        let Some(story) = self.get(uuid) else {
            return Ok(None);
        };
        let slides = self
            .slides
            .lock()
            .unwrap()
            .iter()
            .filter(|slide| slide.story_id == Some(story.id))
            .cloned()
            .collect();
        Ok(Some(StoryDetail {
            story,
            category: None,
            slides,
        }))
    }

    async fn list(&self, _page: i64, _limit: i64, _sort: StorySort) -> Result<Vec<Story>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.stories.lock().unwrap().clone())
    }

    async fn search(&self, term: &str) -> Result<Vec<Story>, StoreError> {
        let term = term.to_lowercase();
        Ok(self
            .stories
            .lock()
            .unwrap()
            .iter()
            .filter(|s| {
                s.title.to_lowercase().contains(&term)
                    || s.description.to_lowercase().contains(&term)
            })
            .cloned()
            .collect())
    }

    async fn update(&self, story: &Story) -> Result<bool, StoreError> {
        let delay = *self.update_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(db_err());
        }
        let mut stories = self.stories.lock().unwrap();
        match stories.iter_mut().find(|s| s.id == story.id) {
            Some(existing) => {
                *existing = story.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, uuid: Uuid) -> Result<bool, StoreError> {
        let Some(story) = self.get(uuid) else {
            return Ok(false);
        };
        self.stories.lock().unwrap().retain(|s| s.id != story.id);
        self.slides
            .lock()
            .unwrap()
            .retain(|slide| slide.story_id != Some(story.id));
        Ok(true)
    }

    async fn delete_by_id(&self, id: DbId) -> Result<bool, StoreError> {
        let mut stories = self.stories.lock().unwrap();
        let before = stories.len();
        stories.retain(|s| s.id != id);
        Ok(stories.len() != before)
    }

    async fn slide_count(&self, story_id: DbId) -> Result<i64, StoreError> {
        Ok(self
            .slides
            .lock()
            .unwrap()
            .iter()
            .filter(|slide| slide.story_id == Some(story_id))
            .count() as i64)
    }

    async fn insert_slide(&self, new: &NewSlide, limit: i64) -> Result<Option<Slide>, StoreError> {
        if self.fail_insert_slide.load(Ordering::SeqCst) {
            return Err(db_err());
        }
        let count = self.slide_count(new.story_id.unwrap_or(0)).await?;
        if self.force_slide_quota.load(Ordering::SeqCst) || count >= limit {
            return Ok(None);
        }
        let slide = Slide {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            story_id: new.story_id,
            chapter_id: new.chapter_id,
            image_url: new.image_url.clone(),
            audio_url: new.audio_url.clone(),
            content: new.content.clone(),
            sequence: new.sequence,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.slides.lock().unwrap().push(slide.clone());
        Ok(Some(slide))
    }
}

// ---------------------------------------------------------------------------
// Chapter store fake
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct MockChapterStore {
    pub chapters: Mutex<Vec<Chapter>>,
    pub slides: Mutex<Vec<Slide>>,
    pub next_id: AtomicI64,
    pub fail_insert_slide: AtomicBool,
}

impl MockChapterStore {
    pub fn seed(&self, story_id: DbId) -> Chapter {
        let chapter = Chapter {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            uuid: Uuid::new_v4(),
            story_id,
            slide_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.chapters.lock().unwrap().push(chapter.clone());
        chapter
    }

    pub fn seed_slide(&self, chapter_id: DbId, image_url: &str, audio_url: Option<&str>) -> Slide {
        let slide = Slide {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            story_id: None,
            chapter_id: Some(chapter_id),
            image_url: image_url.to_string(),
            audio_url: audio_url.map(str::to_string),
            content: String::new(),
            sequence: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.slides.lock().unwrap().push(slide.clone());
        slide
    }
}

#[async_trait]
impl ChapterStore for MockChapterStore {
    async fn insert(&self, new: &NewChapter) -> Result<Chapter, StoreError> {
        let chapter = Chapter {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            uuid: new.uuid,
            story_id: new.story_id,
            slide_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.chapters.lock().unwrap().push(chapter.clone());
        Ok(chapter)
    }

    async fn find_detail_by_uuid(&self, uuid: Uuid) -> Result<Option<ChapterDetail>, StoreError> {
        let Some(chapter) = self
            .chapters
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.uuid == uuid)
            .cloned()
        else {
            return Ok(None);
        };
        let slides = self
            .slides
            .lock()
            .unwrap()
            .iter()
            .filter(|slide| slide.chapter_id == Some(chapter.id))
            .cloned()
            .collect();
        Ok(Some(ChapterDetail { chapter, slides }))
    }

    async fn delete(&self, uuid: Uuid) -> Result<bool, StoreError> {
        let id = {
            let mut chapters = self.chapters.lock().unwrap();
            let id = chapters.iter().find(|c| c.uuid == uuid).map(|c| c.id);
            chapters.retain(|c| c.uuid != uuid);
            id
        };
        let Some(id) = id else { return Ok(false) };
        self.slides
            .lock()
            .unwrap()
            .retain(|slide| slide.chapter_id != Some(id));
        Ok(true)
    }

    async fn slide_count(&self, chapter_id: DbId) -> Result<i64, StoreError> {
        Ok(self
            .slides
            .lock()
            .unwrap()
            .iter()
            .filter(|slide| slide.chapter_id == Some(chapter_id))
            .count() as i64)
    }

    async fn insert_slide(&self, new: &NewSlide, limit: i64) -> Result<Option<Slide>, StoreError> {
        if self.fail_insert_slide.load(Ordering::SeqCst) {
            return Err(db_err());
        }
        let count = self.slide_count(new.chapter_id.unwrap_or(0)).await?;
        if count >= limit {
            return Ok(None);
        }
        let slide = Slide {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            story_id: new.story_id,
            chapter_id: new.chapter_id,
            image_url: new.image_url.clone(),
            audio_url: new.audio_url.clone(),
            content: new.content.clone(),
            sequence: new.sequence,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.slides.lock().unwrap().push(slide.clone());
        Ok(Some(slide))
    }
}

// ---------------------------------------------------------------------------
// Preference store fake
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct MockPreferenceStore {
    pub replace_calls: AtomicUsize,
    pub saved: Mutex<Vec<NewChoice>>,
}

#[async_trait]
impl PreferenceStore for MockPreferenceStore {
    async fn replace_choices(
        &self,
        _user_id: &str,
        choices: &[NewChoice],
    ) -> Result<(), StoreError> {
        self.replace_calls.fetch_add(1, Ordering::SeqCst);
        *self.saved.lock().unwrap() = choices.to_vec();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// A minimal valid upload for tests that don't care about the bytes.
pub(crate) fn png_upload() -> crate::upload::FileUpload {
    crate::upload::FileUpload {
        bytes: vec![0u8; 16],
        filename: "asset.png".to_string(),
        content_type: Some("image/png".to_string()),
    }
}
