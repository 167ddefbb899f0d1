//! 服务器启动/运行错误
//!
//! HTTP 请求级错误使用 [`crate::utils::AppError`]，这里只覆盖进程级失败。

use thiserror::Error;

use crate::archiving::ArchiveError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("种子文件错误: {0}")]
    Seed(String),

    #[error("归档数据库错误: {0}")]
    Archive(#[from] ArchiveError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
