//! Domain layer types and invariants.

pub mod entities;
pub mod error;
pub mod messages;
pub mod posts;
pub mod projects;
pub mod reading_time;
pub mod resource;
pub mod settings;
pub mod slug;
pub mod types;
