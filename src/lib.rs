pub mod atomic;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod publish;
pub mod runner;
pub mod ui;
pub mod version_file;

pub use error::{ReleaseError, Result};
