//! Repository for the `chapters` table and chapter-owned slides.

use sqlx::PgPool;
use storydeck_core::types::DbId;
use uuid::Uuid;

use crate::models::chapter::{Chapter, ChapterDetail, NewChapter};
use crate::models::slide::{NewSlide, Slide};

/// Column list for `chapters` queries.
const CHAPTER_COLUMNS: &str = "id, uuid, story_id, slide_count, created_at, updated_at";

/// Column list for `slides` queries.
const SLIDE_COLUMNS: &str = "\
    id, story_id, chapter_id, image_url, audio_url, content, sequence, \
    created_at, updated_at";

/// Provides CRUD and slide operations for chapters.
pub struct ChapterRepo;

impl ChapterRepo {
    /// Insert a chapter and return the stored row.
    pub async fn create(pool: &PgPool, new: &NewChapter) -> Result<Chapter, sqlx::Error> {
        let query = format!(
            "INSERT INTO chapters (uuid, story_id) \
             VALUES ($1, $2) \
             RETURNING {CHAPTER_COLUMNS}"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(new.uuid)
            .bind(new.story_id)
            .fetch_one(pool)
            .await
    }

    /// Find a chapter with its sequence-ordered slides.
    pub async fn find_detail_by_uuid(
        pool: &PgPool,
        uuid: Uuid,
    ) -> Result<Option<ChapterDetail>, sqlx::Error> {
        let query = format!("SELECT {CHAPTER_COLUMNS} FROM chapters WHERE uuid = $1");
        let Some(chapter) = sqlx::query_as::<_, Chapter>(&query)
            .bind(uuid)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let slides = Self::slides_for_chapter(pool, chapter.id).await?;
        Ok(Some(ChapterDetail { chapter, slides }))
    }

    /// Slides of one chapter ordered by sequence.
    pub async fn slides_for_chapter(
        pool: &PgPool,
        chapter_id: DbId,
    ) -> Result<Vec<Slide>, sqlx::Error> {
        let query = format!(
            "SELECT {SLIDE_COLUMNS} FROM slides \
             WHERE chapter_id = $1 \
             ORDER BY sequence ASC"
        );
        sqlx::query_as::<_, Slide>(&query)
            .bind(chapter_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a chapter by UUID. Its slides cascade at the database level.
    pub async fn delete_by_uuid(pool: &PgPool, uuid: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chapters WHERE uuid = $1")
            .bind(uuid)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Denormalized slide count for one chapter.
    pub async fn slide_count(pool: &PgPool, chapter_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT slide_count::BIGINT FROM chapters WHERE id = $1")
            .bind(chapter_id)
            .fetch_one(pool)
            .await
    }

    /// Guarded slide insert for chapters; see
    /// [`StoryRepo::insert_slide_guarded`](crate::repositories::StoryRepo::insert_slide_guarded).
    pub async fn insert_slide_guarded(
        pool: &PgPool,
        new: &NewSlide,
        limit: i64,
    ) -> Result<Option<Slide>, sqlx::Error> {
        let query = format!(
            "WITH parent AS ( \
                 SELECT id FROM chapters \
                 WHERE id = $1 AND slide_count < $2 \
                 FOR UPDATE \
             ), bumped AS ( \
                 UPDATE chapters \
                 SET slide_count = slide_count + 1, updated_at = NOW() \
                 WHERE id IN (SELECT id FROM parent) \
             ) \
             INSERT INTO slides (chapter_id, image_url, audio_url, content, sequence) \
             SELECT id, $3, $4, $5, $6 FROM parent \
             RETURNING {SLIDE_COLUMNS}"
        );
        sqlx::query_as::<_, Slide>(&query)
            .bind(new.chapter_id)
            .bind(limit)
            .bind(&new.image_url)
            .bind(&new.audio_url)
            .bind(&new.content)
            .bind(new.sequence)
            .fetch_optional(pool)
            .await
    }
}
