//! Waitlist Client - 候位服务客户端
//!
//! - [`QueueHttpClient`]: REST API
//! - [`stream`]: SSE 推送流消费 (重连退避、事件分发、防抖重新拉取)

pub mod config;
pub mod error;
pub mod http;
pub mod stream;

pub use config::StreamClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::QueueHttpClient;
pub use stream::{
    BoardMirror, ConnectionState, EventClass, EventDispatcher, QueueStreamClient, QueueView,
    ReconnectBackoff,
};

// Re-export shared types for convenience
pub use shared::message::{EventKind, QueueEvent, SubscriberRole};
