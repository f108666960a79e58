//! Repository for the `stories` and `slides` tables.
//!
//! Slide insertion goes through a guarded CTE that re-checks the per-story
//! quota and bumps the denormalized `slide_count` in the same statement,
//! closing the race between the orchestration-layer count check and the
//! insert.

use sqlx::PgPool;
use storydeck_core::listing::StorySort;
use storydeck_core::types::DbId;
use uuid::Uuid;

use crate::models::category::Category;
use crate::models::slide::{NewSlide, Slide};
use crate::models::story::{NewStory, Story, StoryDetail};

/// Column list for `stories` queries.
const STORY_COLUMNS: &str = "\
    id, uuid, title, description, thumbnail_url, dominant_color, \
    category_id, user_id, slide_count, status, created_at, updated_at";

/// Column list for `slides` queries.
const SLIDE_COLUMNS: &str = "\
    id, story_id, chapter_id, image_url, audio_url, content, sequence, \
    created_at, updated_at";

/// Maximum hits returned by title/description search.
const SEARCH_LIMIT: i64 = 20;

/// Provides CRUD and slide operations for stories.
pub struct StoryRepo;

impl StoryRepo {
    // -----------------------------------------------------------------------
    // Story CRUD
    // -----------------------------------------------------------------------

    /// Insert a story skeleton and return the stored row.
    pub async fn create(pool: &PgPool, new: &NewStory) -> Result<Story, sqlx::Error> {
        let query = format!(
            "INSERT INTO stories (uuid, title, description, category_id, user_id, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {STORY_COLUMNS}"
        );
        sqlx::query_as::<_, Story>(&query)
            .bind(new.uuid)
            .bind(&new.title)
            .bind(&new.description)
            .bind(new.category_id)
            .bind(&new.user_id)
            .bind(new.status)
            .fetch_one(pool)
            .await
    }

    /// Whether a story with this exact (title, description) pair exists.
    pub async fn exists_with_title(
        pool: &PgPool,
        title: &str,
        description: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM stories WHERE title = $1 AND description = $2)",
        )
        .bind(title)
        .bind(description)
        .fetch_one(pool)
        .await
    }

    /// Find a story by its external UUID (row only, no relations).
    pub async fn find_by_uuid(pool: &PgPool, uuid: Uuid) -> Result<Option<Story>, sqlx::Error> {
        let query = format!("SELECT {STORY_COLUMNS} FROM stories WHERE uuid = $1");
        sqlx::query_as::<_, Story>(&query)
            .bind(uuid)
            .fetch_optional(pool)
            .await
    }

    /// Find a story with its category and sequence-ordered slides.
    pub async fn find_detail_by_uuid(
        pool: &PgPool,
        uuid: Uuid,
    ) -> Result<Option<StoryDetail>, sqlx::Error> {
        let Some(story) = Self::find_by_uuid(pool, uuid).await? else {
            return Ok(None);
        };

        let category: Option<Category> = sqlx::query_as(
            "SELECT id, uuid, name, image_url, dominant_color, created_at, updated_at \
             FROM categories WHERE id = $1",
        )
        .bind(story.category_id)
        .fetch_optional(pool)
        .await?;

        let slides = Self::slides_for_story(pool, story.id).await?;

        Ok(Some(StoryDetail {
            story,
            category,
            slides,
        }))
    }

    /// One page of stories in the given sort order.
    pub async fn list(
        pool: &PgPool,
        page: i64,
        limit: i64,
        sort: StorySort,
    ) -> Result<Vec<Story>, sqlx::Error> {
        let offset = (page - 1) * limit;
        // `sort` comes from a parsed whitelist, never from raw input.
        let query = format!(
            "SELECT {STORY_COLUMNS} FROM stories \
             ORDER BY {} \
             LIMIT $1 OFFSET $2",
            sort.as_sql()
        );
        sqlx::query_as::<_, Story>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive substring search on title and description.
    pub async fn search(pool: &PgPool, term: &str) -> Result<Vec<Story>, sqlx::Error> {
        let pattern = format!("%{term}%");
        let query = format!(
            "SELECT {STORY_COLUMNS} FROM stories \
             WHERE title ILIKE $1 OR description ILIKE $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Story>(&query)
            .bind(&pattern)
            .bind(SEARCH_LIMIT)
            .fetch_all(pool)
            .await
    }

    /// Persist field changes for an existing row.
    pub async fn update(pool: &PgPool, story: &Story) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE stories SET \
                 title = $2, description = $3, thumbnail_url = $4, \
                 dominant_color = $5, category_id = $6, status = $7, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(story.id)
        .bind(&story.title)
        .bind(&story.description)
        .bind(&story.thumbnail_url)
        .bind(&story.dominant_color)
        .bind(story.category_id)
        .bind(story.status)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a story by UUID. Its slides cascade at the database level.
    pub async fn delete_by_uuid(pool: &PgPool, uuid: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM stories WHERE uuid = $1")
            .bind(uuid)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete a story row by surrogate key. Used to roll back a
    /// pending skeleton when create-time asset processing fails.
    pub async fn delete_by_id(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM stories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Slides
    // -----------------------------------------------------------------------

    /// Slides of one story ordered by sequence.
    pub async fn slides_for_story(pool: &PgPool, story_id: DbId) -> Result<Vec<Slide>, sqlx::Error> {
        let query = format!(
            "SELECT {SLIDE_COLUMNS} FROM slides \
             WHERE story_id = $1 \
             ORDER BY sequence ASC"
        );
        sqlx::query_as::<_, Slide>(&query)
            .bind(story_id)
            .fetch_all(pool)
            .await
    }

    /// Denormalized slide count for one story.
    pub async fn slide_count(pool: &PgPool, story_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT slide_count::BIGINT FROM stories WHERE id = $1")
            .bind(story_id)
            .fetch_one(pool)
            .await
    }

    /// Insert a slide only if the story is still under `limit` slides,
    /// bumping `slide_count` in the same statement.
    ///
    /// Returns `None` when the quota is already full (or the story row is
    /// gone), the atomic backstop for concurrent `add_slide` calls that
    /// both passed the orchestration-layer count check.
    pub async fn insert_slide_guarded(
        pool: &PgPool,
        new: &NewSlide,
        limit: i64,
    ) -> Result<Option<Slide>, sqlx::Error> {
        let query = format!(
            "WITH parent AS ( \
                 SELECT id FROM stories \
                 WHERE id = $1 AND slide_count < $2 \
                 FOR UPDATE \
             ), bumped AS ( \
                 UPDATE stories \
                 SET slide_count = slide_count + 1, updated_at = NOW() \
                 WHERE id IN (SELECT id FROM parent) \
             ) \
             INSERT INTO slides (story_id, image_url, audio_url, content, sequence) \
             SELECT id, $3, $4, $5, $6 FROM parent \
             RETURNING {SLIDE_COLUMNS}"
        );
        sqlx::query_as::<_, Slide>(&query)
            .bind(new.story_id)
            .bind(limit)
            .bind(&new.image_url)
            .bind(&new.audio_url)
            .bind(&new.content)
            .bind(new.sequence)
            .fetch_optional(pool)
            .await
    }
}
