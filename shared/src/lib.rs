//! Shared types for the Synco booking platform
//!
//! Common types used across crates: the unified error system, booking
//! domain enums, and small utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};
