//! Class API 模块 (班级队列)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stores/{store_id}/classes", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{class_id}/entries", get(handler::list_entries))
        .route("/{class_id}/empty-seat", post(handler::insert_empty_seat))
        .route("/{class_id}/close-check", get(handler::close_check))
        .route("/{class_id}/close", post(handler::close))
        .route("/{class_id}/reopen", post(handler::reopen))
        .route("/{class_id}/batch-attendance", post(handler::batch_attendance))
}
