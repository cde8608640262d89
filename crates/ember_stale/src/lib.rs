//! Timestamp-based staleness for incremental builds.
//!
//! This crate derives intermediate target names from source names and decides,
//! by comparing filesystem modification times, whether a target has to be
//! rebuilt. There is no content hashing: a target is stale when it is missing
//! or older than any of its dependencies.

#![warn(missing_docs)]

pub mod error;
pub mod staleness;
pub mod target;

pub use error::StaleError;
pub use staleness::{evaluate, is_stale, modified_time, newest, Staleness};
pub use target::{derive_target, TargetDeriver};
