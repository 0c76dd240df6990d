//! Error handling for PAK operations
//!
//! This module defines the error types used throughout the crate.
//! It uses thiserror for ergonomic error handling; every variant is fatal for
//! the archive being processed.

pub use crate::common::PakError;
pub use crate::common::Result;
