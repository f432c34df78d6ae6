//! Utilities shared by the roomcast binaries and tests.

pub mod logger;
pub mod time;
