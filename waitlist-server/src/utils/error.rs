//! 统一错误处理
//!
//! 错误类型定义在 `shared::error`，此处负责把服务端内部错误
//! ([`QueueError`], [`ArchiveError`]) 映射为带错误码的 [`AppError`]。
//!
//! # 使用示例
//!
//! ```ignore
//! let entry = state.queue.register(store_id, class_id, customer, 2, None).await?;
//! Ok(Json(ApiResponse::success(entry)))
//! ```

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use crate::archiving::ArchiveError;
use crate::queue::QueueError;

impl From<QueueError> for AppError {
    fn from(err: QueueError) -> Self {
        let message = err.to_string();
        match err {
            QueueError::StoreNotFound(store_id) => AppError::store_not_found(store_id),
            QueueError::ClassNotFound(class_id) => {
                AppError::with_message(ErrorCode::ClassNotFound, message)
                    .with_detail("class_id", class_id)
            }
            QueueError::EntryNotFound(entry_id) => {
                AppError::with_message(ErrorCode::EntryNotFound, message)
                    .with_detail("entry_id", entry_id)
            }
            QueueError::ClassFull { class_id, capacity } => {
                AppError::with_message(ErrorCode::ClassFull, message)
                    .with_detail("class_id", class_id)
                    .with_detail("capacity", capacity)
            }
            QueueError::ClassClosed(class_id) => {
                AppError::with_message(ErrorCode::ClassClosed, message)
                    .with_detail("class_id", class_id)
            }
            QueueError::CrossClassSwap { entry_a, entry_b } => {
                AppError::with_message(ErrorCode::CrossClassSwap, message)
                    .with_detail("entry_ids", vec![entry_a, entry_b])
            }
            QueueError::SequentialOrderViolation {
                class_id,
                open_earlier,
            } => AppError::with_message(ErrorCode::SequentialOrderViolation, message)
                .with_detail("class_id", class_id)
                .with_detail("open_earlier_classes", open_earlier),
            QueueError::InvalidStatus { entry_id, status } => {
                AppError::with_message(ErrorCode::EntryInvalidStatus, message)
                    .with_detail("entry_id", entry_id)
                    .with_detail("status", status.as_str())
            }
            QueueError::BusinessAlreadyOpen(_) => {
                AppError::with_message(ErrorCode::BusinessAlreadyOpen, message)
            }
            QueueError::BusinessNotOpen(_) => {
                AppError::with_message(ErrorCode::BusinessNotOpen, message)
            }
            QueueError::Validation(msg) => AppError::validation(msg),
        }
    }
}

impl From<ArchiveError> for AppError {
    fn from(err: ArchiveError) -> Self {
        AppError::database(err.to_string())
    }
}
