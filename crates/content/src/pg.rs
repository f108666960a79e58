//! Postgres implementations of the store ports, delegating to the
//! repositories in `storydeck-db`.

use async_trait::async_trait;
use sqlx::PgPool;
use storydeck_core::listing::StorySort;
use storydeck_core::types::DbId;
use storydeck_db::models::category::{Category, NewCategory};
use storydeck_db::models::chapter::{Chapter, ChapterDetail, NewChapter};
use storydeck_db::models::preference::NewChoice;
use storydeck_db::models::slide::{NewSlide, Slide};
use storydeck_db::models::story::{NewStory, Story, StoryDetail};
use storydeck_db::repositories::{CategoryRepo, ChapterRepo, PreferenceRepo, StoryRepo};
use uuid::Uuid;

use crate::ports::{CategoryStore, ChapterStore, PreferenceStore, StoreError, StoryStore};

/// [`CategoryStore`] backed by Postgres.
#[derive(Clone)]
pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn insert(&self, new: &NewCategory) -> Result<Category, StoreError> {
        Ok(CategoryRepo::create(&self.pool, new).await?)
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Category>, StoreError> {
        Ok(CategoryRepo::find_by_uuid(&self.pool, uuid).await?)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        Ok(CategoryRepo::find_by_name(&self.pool, name).await?)
    }

    async fn list_all(&self) -> Result<Vec<Category>, StoreError> {
        Ok(CategoryRepo::list_all(&self.pool).await?)
    }

    async fn search(&self, term: &str) -> Result<Vec<Category>, StoreError> {
        Ok(CategoryRepo::search(&self.pool, term).await?)
    }

    async fn update(&self, category: &Category) -> Result<bool, StoreError> {
        Ok(CategoryRepo::update(&self.pool, category).await?)
    }

    async fn delete(&self, uuid: Uuid) -> Result<bool, StoreError> {
        Ok(CategoryRepo::delete_by_uuid(&self.pool, uuid).await?)
    }
}

/// [`StoryStore`] backed by Postgres.
#[derive(Clone)]
pub struct PgStoryStore {
    pool: PgPool,
}

impl PgStoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoryStore for PgStoryStore {
    async fn insert(&self, new: &NewStory) -> Result<Story, StoreError> {
        Ok(StoryRepo::create(&self.pool, new).await?)
    }

    async fn title_exists(&self, title: &str, description: &str) -> Result<bool, StoreError> {
        Ok(StoryRepo::exists_with_title(&self.pool, title, description).await?)
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Story>, StoreError> {
        Ok(StoryRepo::find_by_uuid(&self.pool, uuid).await?)
    }

    async fn find_detail_by_uuid(&self, uuid: Uuid) -> Result<Option<StoryDetail>, StoreError> {
        Ok(StoryRepo::find_detail_by_uuid(&self.pool, uuid).await?)
    }

    async fn list(&self, page: i64, limit: i64, sort: StorySort) -> Result<Vec<Story>, StoreError> {
        Ok(StoryRepo::list(&self.pool, page, limit, sort).await?)
    }

    async fn search(&self, term: &str) -> Result<Vec<Story>, StoreError> {
        Ok(StoryRepo::search(&self.pool, term).await?)
    }

    async fn update(&self, story: &Story) -> Result<bool, StoreError> {
        Ok(StoryRepo::update(&self.pool, story).await?)
    }

    async fn delete(&self, uuid: Uuid) -> Result<bool, StoreError> {
        Ok(StoryRepo::delete_by_uuid(&self.pool, uuid).await?)
    }

    async fn delete_by_id(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(StoryRepo::delete_by_id(&self.pool, id).await?)
    }

    async fn slide_count(&self, story_id: DbId) -> Result<i64, StoreError> {
        Ok(StoryRepo::slide_count(&self.pool, story_id).await?)
    }

    async fn insert_slide(&self, new: &NewSlide, limit: i64) -> Result<Option<Slide>, StoreError> {
        Ok(StoryRepo::insert_slide_guarded(&self.pool, new, limit).await?)
    }
}

/// [`ChapterStore`] backed by Postgres.
#[derive(Clone)]
pub struct PgChapterStore {
    pool: PgPool,
}

impl PgChapterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChapterStore for PgChapterStore {
    async fn insert(&self, new: &NewChapter) -> Result<Chapter, StoreError> {
        Ok(ChapterRepo::create(&self.pool, new).await?)
    }

    async fn find_detail_by_uuid(&self, uuid: Uuid) -> Result<Option<ChapterDetail>, StoreError> {
        Ok(ChapterRepo::find_detail_by_uuid(&self.pool, uuid).await?)
    }

    async fn delete(&self, uuid: Uuid) -> Result<bool, StoreError> {
        Ok(ChapterRepo::delete_by_uuid(&self.pool, uuid).await?)
    }

    async fn slide_count(&self, chapter_id: DbId) -> Result<i64, StoreError> {
        Ok(ChapterRepo::slide_count(&self.pool, chapter_id).await?)
    }

    async fn insert_slide(&self, new: &NewSlide, limit: i64) -> Result<Option<Slide>, StoreError> {
        Ok(ChapterRepo::insert_slide_guarded(&self.pool, new, limit).await?)
    }
}

/// [`PreferenceStore`] backed by Postgres.
#[derive(Clone)]
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn replace_choices(
        &self,
        user_id: &str,
        choices: &[NewChoice],
    ) -> Result<(), StoreError> {
        Ok(PreferenceRepo::replace_choices(&self.pool, user_id, choices).await?)
    }
}
