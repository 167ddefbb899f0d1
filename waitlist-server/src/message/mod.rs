//! 推送流广播
//!
//! - [`BroadcastHub`] - 按门店维护订阅者并扇出队列事件
//! - [`Subscription`] - 订阅句柄 (drop 时自动取消订阅)
//! - [`HeartbeatTicker`] - 周期性 `ping`，清理失联订阅者

mod heartbeat;
mod hub;

pub use heartbeat::HeartbeatTicker;
pub use hub::{BroadcastHub, HubConfig, SubscriberInfo, Subscription};
