//! Application services built on the resource stores.

pub mod assets;
pub mod contact;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod portfolio;
pub mod storage;
