//! Stream API 模块 (SSE 推送流)
//!
//! 每一帧都是未命名 (`message`) 事件，data 为
//! `{"event": ..., "data": {...}}` JSON；第一帧始终是 `connected`。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/stores/{store_id}/stream", get(handler::stream))
}
