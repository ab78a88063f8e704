#![forbid(unsafe_code)]

//! Scenario replay harness for the mgrid engine.

pub mod cli;
pub mod error;
pub mod replay;
pub mod scenario;

pub use cli::run_from_env;
pub use error::{HarnessError, Result};
