//! Shared utilities for the verification pipeline.

pub mod logging;
pub mod process;

pub use logging::{init_logging, LogFormat};
pub use process::{run_with_input, ProcessError, ProcessOutput, DEFAULT_ENGINE_TIMEOUT};
