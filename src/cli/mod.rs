//! Command-line facing workflow, independent of argument parsing.

pub mod orchestration;

pub use orchestration::{ReleaseArgs, ReleaseWorkflow, Stage, WorkflowResult};
