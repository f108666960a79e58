//! User preference (saved category choices) models.

use serde::{Deserialize, Serialize};
use storydeck_core::types::DbId;

/// Which preference list a choice belongs to. The three groups are saved
/// and replaced together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "choice_group", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChoiceGroup {
    Stories,
    Lessons,
    Quotes,
}

/// Insert DTO for one saved category choice.
#[derive(Debug, Clone)]
pub struct NewChoice {
    pub category_id: DbId,
    pub group: ChoiceGroup,
}
