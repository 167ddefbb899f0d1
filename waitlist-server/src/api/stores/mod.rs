//! Store API 模块 (门店配置、时段解析、看板)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stores/{store_id}", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/settings",
            get(handler::get_settings).put(handler::put_settings),
        )
        .route("/slot", get(handler::next_slot))
        .route("/board", get(handler::board))
        .route("/business", get(handler::business_status))
}
