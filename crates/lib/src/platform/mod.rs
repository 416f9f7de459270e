//! Platform-specific locations.
//!
//! # Modules
//!
//! - [`paths`] - Home and configuration directories

pub mod paths;
