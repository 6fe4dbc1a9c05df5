//! Shared types for the outreach campaign system
//!
//! Holds the data model exchanged between the campaign engine, its storage and
//! its command line surface, together with the process-aware logging helpers.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
