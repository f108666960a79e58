//! Repository for the `user_category_choices` table.

use sqlx::PgPool;

use crate::models::preference::NewChoice;

/// Provides replace-all persistence for a user's saved category choices.
pub struct PreferenceRepo;

impl PreferenceRepo {
    /// Replace every saved choice for `user_id` with `choices`, across all
    /// groups, in a single transaction.
    pub async fn replace_choices(
        pool: &PgPool,
        user_id: &str,
        choices: &[NewChoice],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM user_category_choices WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for choice in choices {
            // ON CONFLICT tolerates the same category appearing twice in
            // one request's group list.
            sqlx::query(
                "INSERT INTO user_category_choices (user_id, category_id, choice_group) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (user_id, category_id, choice_group) DO NOTHING",
            )
            .bind(user_id)
            .bind(choice.category_id)
            .bind(choice.group)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }
}
