//! Repository for the `categories` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::category::{Category, NewCategory};

/// Column list for `categories` queries.
const CATEGORY_COLUMNS: &str =
    "id, uuid, name, image_url, dominant_color, created_at, updated_at";

/// Maximum hits returned by name search.
const SEARCH_LIMIT: i64 = 10;

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a category and return the stored row.
    ///
    /// Bubbles up the `uq_categories_name` unique violation when a
    /// concurrent writer claimed the name between the pre-check and here.
    pub async fn create(pool: &PgPool, new: &NewCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (uuid, name, image_url, dominant_color) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(new.uuid)
            .bind(&new.name)
            .bind(&new.image_url)
            .bind(&new.dominant_color)
            .fetch_one(pool)
            .await
    }

    /// Find a category by its external UUID.
    pub async fn find_by_uuid(pool: &PgPool, uuid: Uuid) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE uuid = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(uuid)
            .fetch_optional(pool)
            .await
    }

    /// Find a category by exact name (uniqueness pre-check fast path).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all categories in insertion order.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY id ASC");
        sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
    }

    /// Case-insensitive substring search on the category name.
    pub async fn search(pool: &PgPool, term: &str) -> Result<Vec<Category>, sqlx::Error> {
        let pattern = format!("%{term}%");
        let query = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE name ILIKE $1 \
             ORDER BY id ASC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&pattern)
            .bind(SEARCH_LIMIT)
            .fetch_all(pool)
            .await
    }

    /// Persist name/image/color changes for an existing row.
    ///
    /// Returns `false` if the row vanished underneath the caller.
    pub async fn update(pool: &PgPool, category: &Category) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE categories SET \
                 name = $2, image_url = $3, dominant_color = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.image_url)
        .bind(&category.dominant_color)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a category by UUID. Stories and slides cascade at the
    /// database level.
    pub async fn delete_by_uuid(pool: &PgPool, uuid: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE uuid = $1")
            .bind(uuid)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
