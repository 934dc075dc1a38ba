//! Folio: the data layer behind a personal portfolio site.
//!
//! The crate keeps a cached, invalidation-aware view of four remote
//! collections (projects, posts, contact messages, site settings) hosted by a
//! PostgREST-style backend, and exposes the admin and public operations that
//! mutate them.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
