//! Saved category preference orchestration.
//!
//! A user's preferences are three bounded lists of category choices that
//! are always replaced as a unit. Unknown category ids in a submission
//! are skipped rather than failing the whole save, so a category deleted
//! mid-flight doesn't wedge the client's preference screen.

use std::sync::Arc;

use storydeck_core::error::CoreError;
use storydeck_db::models::preference::{ChoiceGroup, NewChoice};
use uuid::Uuid;

use crate::config::ContentConfig;
use crate::ports::{CategoryStore, PreferenceStore};

/// One preference submission: category ids per choice group.
#[derive(Debug, Clone, Default)]
pub struct PreferenceSelection {
    pub stories: Vec<Uuid>,
    pub lessons: Vec<Uuid>,
    pub quotes: Vec<Uuid>,
}

/// Orchestrates preference saves.
pub struct PreferenceService {
    preferences: Arc<dyn PreferenceStore>,
    categories: Arc<dyn CategoryStore>,
    config: ContentConfig,
}

impl PreferenceService {
    pub fn new(
        preferences: Arc<dyn PreferenceStore>,
        categories: Arc<dyn CategoryStore>,
        config: ContentConfig,
    ) -> Self {
        Self {
            preferences,
            categories,
            config,
        }
    }

    /// Replace every saved choice for `user_id` with `selection`.
    ///
    /// Returns the number of choices actually stored, which can be lower
    /// than the number submitted when some categories no longer exist.
    pub async fn save(
        &self,
        user_id: &str,
        selection: PreferenceSelection,
    ) -> Result<usize, CoreError> {
        if user_id.trim().is_empty() {
            return Err(CoreError::Validation("user id is required".into()));
        }
        for (group, ids) in [
            ("stories", &selection.stories),
            ("lessons", &selection.lessons),
            ("quotes", &selection.quotes),
        ] {
            if ids.len() > self.config.max_selections_per_group {
                return Err(CoreError::LimitExceeded(format!(
                    "at most {} {group} choices are allowed, got {}",
                    self.config.max_selections_per_group,
                    ids.len()
                )));
            }
        }

        let mut choices = Vec::new();
        self.resolve(&selection.stories, ChoiceGroup::Stories, &mut choices)
            .await?;
        self.resolve(&selection.lessons, ChoiceGroup::Lessons, &mut choices)
            .await?;
        self.resolve(&selection.quotes, ChoiceGroup::Quotes, &mut choices)
            .await?;

        self.preferences.replace_choices(user_id, &choices).await?;
        Ok(choices.len())
    }

    async fn resolve(
        &self,
        uuids: &[Uuid],
        group: ChoiceGroup,
        out: &mut Vec<NewChoice>,
    ) -> Result<(), CoreError> {
        for uuid in uuids {
            match self.categories.find_by_uuid(*uuid).await? {
                Some(category) => out.push(NewChoice {
                    category_id: category.id,
                    group,
                }),
                None => {
                    tracing::warn!(category = %uuid, ?group, "Skipping unknown category choice");
                }
            }
        }
        Ok(())
    }
}
