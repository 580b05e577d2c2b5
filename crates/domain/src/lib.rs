//! # ExRelay Domain
//!
//! Business domain types and models for ExRelay.
//!
//! This crate contains:
//! - Wire-level types for the reporting gateway (envelopes, login and
//!   push responses)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Gateway protocol constants
//!
//! ## Architecture
//! - No dependencies on other ExRelay crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
