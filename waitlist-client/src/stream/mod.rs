//! 推送流消费端
//!
//! - [`QueueStreamClient`]: 连接、重连与状态发布
//! - [`EventDispatcher`]: 按事件分类应用补丁或安排重新拉取
//! - [`BoardMirror`]: 基于 HTTP 的本地看板镜像

mod backoff;
mod client;
mod debounce;
mod decoder;
mod dispatcher;
mod view;

pub use backoff::ReconnectBackoff;
pub use client::{ConnectionState, QueueStreamClient};
pub use debounce::ClassRefetchDebouncer;
pub use decoder::{SseDecoder, SseFrame};
pub use dispatcher::{EventClass, EventDispatcher, EventHandler};
pub use view::{BoardMirror, QueueView};
