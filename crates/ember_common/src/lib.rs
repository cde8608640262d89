//! Shared foundational types used across the Ember build orchestrator.
//!
//! This crate provides the vocabulary passed between configuration, staleness
//! evaluation, and the pipeline: unresolved source descriptors, deduplicated
//! path sets, forwarded compiler parameters, and the pipeline mode.

#![warn(missing_docs)]

pub mod descriptor;
pub mod mode;
pub mod parameter;
pub mod path_set;

pub use descriptor::{DescriptorList, SourceDescriptor};
pub use mode::{Mode, ParseModeError};
pub use parameter::{Parameter, ParseParameterError};
pub use path_set::{normalize, ResolvedPathSet};
