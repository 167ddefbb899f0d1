//! 候位队列
//!
//! - [`QueueStore`] - 所有条目变更的入口 (按门店、班级加锁)
//! - [`ClassQueue`] - 单个班级的有序队列
//! - [`QueueError`] - 队列错误
//! - [`EventPublisher`] - 变更事件出口，由广播中心实现

mod class_queue;
mod error;
mod store;

#[cfg(test)]
mod tests;

pub use class_queue::ClassQueue;
pub use error::{QueueError, QueueResult};
pub use store::QueueStore;

use shared::message::QueueEvent;

/// 事件发布接口
///
/// 在班级锁内调用，实现方不得阻塞。发布失败只能记录日志，
/// 不能影响已提交的变更。
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: QueueEvent);
}
