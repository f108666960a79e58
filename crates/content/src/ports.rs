//! Data-access contracts consumed by the orchestration services.
//!
//! Services depend on these traits rather than on `PgPool` directly so the
//! compensation and caching logic can be exercised against fakes with
//! fault injection. The production implementations live in [`crate::pg`].

use async_trait::async_trait;
use storydeck_core::listing::StorySort;
use storydeck_core::types::DbId;
use storydeck_db::models::category::{Category, NewCategory};
use storydeck_db::models::chapter::{Chapter, ChapterDetail, NewChapter};
use storydeck_db::models::preference::NewChoice;
use storydeck_db::models::slide::{NewSlide, Slide};
use storydeck_db::models::story::{NewStory, Story, StoryDetail};
use uuid::Uuid;

/// Relational-store failure, with unique-constraint violations split out so
/// services can surface them as `Conflict` (the database is the backstop
/// for racing writers that both passed an application-level pre-check).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<StoreError> for storydeck_core::error::CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(constraint) => {
                Self::Conflict(format!("duplicate value violates {constraint}"))
            }
            StoreError::Database(msg) => Self::Internal(format!("database error: {msg}")),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // PostgreSQL unique violation.
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return Self::UniqueViolation(constraint.to_string());
            }
        }
        Self::Database(err.to_string())
    }
}

/// Category persistence operations.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn insert(&self, new: &NewCategory) -> Result<Category, StoreError>;
    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Category>, StoreError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, StoreError>;
    async fn list_all(&self) -> Result<Vec<Category>, StoreError>;
    async fn search(&self, term: &str) -> Result<Vec<Category>, StoreError>;
    async fn update(&self, category: &Category) -> Result<bool, StoreError>;
    /// Delete by UUID; stories and slides cascade inside the store.
    async fn delete(&self, uuid: Uuid) -> Result<bool, StoreError>;
}

/// Story and story-slide persistence operations.
#[async_trait]
pub trait StoryStore: Send + Sync {
    async fn insert(&self, new: &NewStory) -> Result<Story, StoreError>;
    /// Whether a story with this exact (title, description) pair exists.
    async fn title_exists(&self, title: &str, description: &str) -> Result<bool, StoreError>;
    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Story>, StoreError>;
    async fn find_detail_by_uuid(&self, uuid: Uuid) -> Result<Option<StoryDetail>, StoreError>;
    async fn list(&self, page: i64, limit: i64, sort: StorySort) -> Result<Vec<Story>, StoreError>;
    async fn search(&self, term: &str) -> Result<Vec<Story>, StoreError>;
    async fn update(&self, story: &Story) -> Result<bool, StoreError>;
    /// Delete by UUID; slides cascade inside the store.
    async fn delete(&self, uuid: Uuid) -> Result<bool, StoreError>;
    /// Roll back a pending skeleton row by surrogate key.
    async fn delete_by_id(&self, id: DbId) -> Result<bool, StoreError>;
    async fn slide_count(&self, story_id: DbId) -> Result<i64, StoreError>;
    /// Atomic guarded insert; `None` means the quota was already full.
    async fn insert_slide(&self, new: &NewSlide, limit: i64) -> Result<Option<Slide>, StoreError>;
}

/// Chapter and chapter-slide persistence operations.
#[async_trait]
pub trait ChapterStore: Send + Sync {
    async fn insert(&self, new: &NewChapter) -> Result<Chapter, StoreError>;
    async fn find_detail_by_uuid(&self, uuid: Uuid) -> Result<Option<ChapterDetail>, StoreError>;
    async fn delete(&self, uuid: Uuid) -> Result<bool, StoreError>;
    async fn slide_count(&self, chapter_id: DbId) -> Result<i64, StoreError>;
    /// Atomic guarded insert; `None` means the quota was already full.
    async fn insert_slide(&self, new: &NewSlide, limit: i64) -> Result<Option<Slide>, StoreError>;
}

/// Saved-preference persistence operations.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Replace every saved choice for the user in one transaction.
    async fn replace_choices(&self, user_id: &str, choices: &[NewChoice])
        -> Result<(), StoreError>;
}
