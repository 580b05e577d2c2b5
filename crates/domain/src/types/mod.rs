//! Domain types and models
//!
//! Wire contracts for the reporting gateway plus the in-process types
//! that feed them.

pub mod category;
pub mod envelope;
pub mod gateway;
pub mod outcome;

pub use category::{MetricCategory, PayloadStyle};
pub use envelope::{Envelope, MetricData, MetricPayload, MetricSample, MetricValue};
pub use gateway::{GatewayEntryError, GatewayReply, GatewayResponse, LoginRequest, LoginResponse};
pub use outcome::PushOutcome;
