//! Orchestration layer.
//!
//! Each service coordinates the relational store, the blob store, and the
//! read cache to implement one logical business operation, with explicit
//! compensation when a later step of a multi-step write fails. There is no
//! cross-system transaction: correctness comes from ordering (never delete
//! an old asset before the new one is durably referenced), database-level
//! guards (unique constraints, the guarded slide insert), and best-effort
//! cleanup of anything a failed call created itself.

pub mod category;
pub mod chapter;
mod cleanup;
pub mod config;
pub mod pg;
pub mod ports;
pub mod preference;
pub mod story;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use category::CategoryService;
pub use chapter::ChapterService;
pub use config::ContentConfig;
pub use preference::PreferenceService;
pub use story::StoryService;
