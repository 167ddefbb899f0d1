//! Waiting API 模块 (候位登记与条目操作)

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stores/{store_id}/waiting", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::register))
        .route("/swap", post(handler::swap))
        .route("/{entry_id}", get(handler::get_by_id))
        .route("/{entry_id}/call", post(handler::call))
        .route("/{entry_id}/status", post(handler::set_status))
        .route("/{entry_id}/move", post(handler::move_to_class))
        .route("/{entry_id}/name", put(handler::rename))
        .route("/{entry_id}/member", put(handler::update_member))
}
