pub mod category;
pub mod chapter;
pub mod health;
pub mod preference;
pub mod story;
