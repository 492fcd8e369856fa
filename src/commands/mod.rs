//! Command implementations
//!
//! - `plan` - build request payloads from config, diff against recorded state
//! - `refresh` - read observed connectors, reconcile, record
//! - `show` - print recorded state

pub mod plan;
pub mod refresh;
pub mod show;
