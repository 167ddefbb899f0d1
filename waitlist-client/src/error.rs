//! Client error types

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 服务端返回的业务错误 (ApiResponse.code != 0)
    #[error("API error {code}: {message}")]
    Api {
        code: u16,
        message: String,
        details: Option<HashMap<String, Value>>,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// 推送流连接失败或被服务端关闭
    #[error("Stream connection error: {0}")]
    Connection(String),

    /// 在空闲超时内没有收到任何帧 (包括心跳)
    #[error("No frame received within {0:?}")]
    IdleTimeout(Duration),

    /// 重连次数耗尽
    #[error("Reconnect attempts exhausted after {0} tries")]
    ReconnectExhausted(u32),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// 服务端错误码 (非 API 错误返回 None)
    pub fn api_code(&self) -> Option<u16> {
        match self {
            ClientError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
