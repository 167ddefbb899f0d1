//! Shared types for the waitlist workspace
//!
//! Used by `waitlist-server` and `waitlist-client`:
//! - [`error`]: unified error codes and API response envelope
//! - [`models`]: store settings, classes, waiting entries, business days
//! - [`message`]: push-stream event taxonomy and wire framing
//! - [`util`]: time and id helpers

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use message::{EventData, EventKind, QueueEvent, SubscriberRole};
