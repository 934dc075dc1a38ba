//! Infrastructure adapters and runtime bootstrap.

pub mod backend;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod rest;
pub mod storage;
pub mod telemetry;
