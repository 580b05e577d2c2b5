//! # ExRelay Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the gateway and metrics source
//! - Session, sequence, and publication services
//! - Per-tick metric collection
//!
//! ## Architecture Principles
//! - Only depends on `exrelay-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod collector;
pub mod ports;
pub mod publisher;
pub mod sequence;
pub mod session;

// Re-export specific items to avoid ambiguity
pub use collector::Collector;
pub use ports::{GatewayTransport, MetricsPublisher, MetricsSource};
pub use publisher::Publisher;
pub use sequence::SequenceTracker;
pub use session::SessionManager;
