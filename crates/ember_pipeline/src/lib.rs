//! The Ember build pipeline.
//!
//! Resolves source descriptors into files, compiles the sources whose
//! intermediate objects are out of date in a single batched tool call, then
//! relinks the final artifact if it is older than any object or auxiliary
//! source. Filesystem scanning and process execution sit behind the
//! [`FileScanner`] and [`ProcessInvoker`] traits.

#![warn(missing_docs)]

pub mod compile;
pub mod error;
pub mod invoker;
pub mod link;
pub mod orchestrator;
pub mod report;
pub mod resolver;
pub mod scanner;

#[cfg(test)]
mod test_support;

pub use compile::{compile, plan_compile, CompilePlan, StaleSource};
pub use error::{PipelineError, PipelineFailure, ResolveError, ToolError};
pub use invoker::{Invocation, ProcessInvoker, SystemInvoker};
pub use link::{link, plan_link, LinkPlan};
pub use orchestrator::{Pipeline, PipelineState};
pub use report::{CompileReport, LinkReport, PipelineReport, PlanReport};
pub use resolver::SourceResolver;
pub use scanner::{FileScanner, GlobScanner};
