//! Row models and insert DTOs.
//!
//! Entity structs derive `FromRow` plus `Serialize`/`Deserialize` so that
//! lists round-trip through the cache as JSON. Internal surrogate keys are never
//! serialized; the external `uuid` is exposed as `"id"`.

pub mod category;
pub mod chapter;
pub mod preference;
pub mod slide;
pub mod story;
