//! Business day API 模块 (营业日)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stores/{store_id}/business", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/open", post(handler::open))
        .route("/close", post(handler::close))
        .route("/history", get(handler::history))
}
