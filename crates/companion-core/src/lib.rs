//! # Companion Core
//!
//! Shared pieces used across the companion backend workspace:
//!
//! - [`error`] - FrameError
//! - [`logger`] - tracing initialization (console + log file)

pub mod error;
pub mod logger;

pub use error::*;
pub use logger::init_tracing;
