//! Orchestration configuration.
//!
//! Loaded once at process start and injected into every service
//! constructor as an immutable value; services never re-read the
//! environment themselves.

use std::time::Duration;

/// Configuration values the orchestration layer depends on.
#[derive(Debug, Clone)]
pub struct ContentConfig {
    /// Maximum slides per story or chapter (default: `20`).
    pub slide_limit: i64,
    /// Maximum saved category choices per preference group (default: `5`).
    pub max_selections_per_group: usize,
    /// Path prefix for story thumbnails inside their container.
    pub story_thumb_prefix: String,
    /// Path prefix for slide images inside their container.
    pub slide_image_prefix: String,
    /// Blob container per asset class.
    pub category_image_container: String,
    pub story_thumb_container: String,
    pub slide_image_container: String,
    pub slide_audio_container: String,
    /// TTL for cached story list pages.
    pub story_list_ttl: Duration,
    /// TTL for the cached category list.
    pub category_list_ttl: Duration,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            slide_limit: 20,
            max_selections_per_group: 5,
            story_thumb_prefix: "stories/thumbnails/".into(),
            slide_image_prefix: "stories/slides/".into(),
            category_image_container: "category-images".into(),
            story_thumb_container: "story-thumbnails".into(),
            slide_image_container: "slide-images".into(),
            slide_audio_container: "slide-audio".into(),
            story_list_ttl: Duration::from_secs(5 * 60),
            category_list_ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl ContentConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default             |
    /// |----------------------------|---------------------|
    /// | `SLIDE_LIMIT`              | `20`                |
    /// | `PREFERENCE_GROUP_LIMIT`   | `5`                 |
    /// | `STORY_THUMB_PREFIX`       | `stories/thumbnails/` |
    /// | `SLIDE_IMAGE_PREFIX`       | `stories/slides/`   |
    /// | `CATEGORY_IMAGE_CONTAINER` | `category-images`   |
    /// | `STORY_THUMB_CONTAINER`    | `story-thumbnails`  |
    /// | `SLIDE_IMAGE_CONTAINER`    | `slide-images`      |
    /// | `SLIDE_AUDIO_CONTAINER`    | `slide-audio`       |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let slide_limit: i64 = std::env::var("SLIDE_LIMIT")
            .ok()
            .map(|v| v.parse().expect("SLIDE_LIMIT must be a valid integer"))
            .unwrap_or(defaults.slide_limit);

        let max_selections_per_group: usize = std::env::var("PREFERENCE_GROUP_LIMIT")
            .ok()
            .map(|v| {
                v.parse()
                    .expect("PREFERENCE_GROUP_LIMIT must be a valid integer")
            })
            .unwrap_or(defaults.max_selections_per_group);

        let var_or = |name: &str, default: String| std::env::var(name).unwrap_or(default);

        Self {
            slide_limit,
            max_selections_per_group,
            story_thumb_prefix: var_or("STORY_THUMB_PREFIX", defaults.story_thumb_prefix),
            slide_image_prefix: var_or("SLIDE_IMAGE_PREFIX", defaults.slide_image_prefix),
            category_image_container: var_or(
                "CATEGORY_IMAGE_CONTAINER",
                defaults.category_image_container,
            ),
            story_thumb_container: var_or("STORY_THUMB_CONTAINER", defaults.story_thumb_container),
            slide_image_container: var_or("SLIDE_IMAGE_CONTAINER", defaults.slide_image_container),
            slide_audio_container: var_or("SLIDE_AUDIO_CONTAINER", defaults.slide_audio_container),
            story_list_ttl: defaults.story_list_ttl,
            category_list_ttl: defaults.category_list_ttl,
        }
    }
}
