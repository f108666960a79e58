//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod category_repo;
pub mod chapter_repo;
pub mod preference_repo;
pub mod story_repo;

pub use category_repo::CategoryRepo;
pub use chapter_repo::ChapterRepo;
pub use preference_repo::PreferenceRepo;
pub use story_repo::StoryRepo;
