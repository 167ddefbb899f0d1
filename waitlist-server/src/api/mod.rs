//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`stores`] - 门店配置、时段解析、全店看板
//! - [`business`] - 营业日开启/关闭/历史
//! - [`waiting`] - 候位登记与条目操作
//! - [`classes`] - 班级队列操作 (空位、关闭、批量出席)
//! - [`stream`] - SSE 推送流

pub mod business;
pub mod classes;
pub mod health;
pub mod stores;
pub mod stream;
pub mod waiting;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};
