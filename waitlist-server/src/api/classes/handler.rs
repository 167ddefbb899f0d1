//! Class API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{
    BatchAttendanceRequest, BatchAttendanceResult, CloseCheck, CloseClassRequest,
    CloseClassResult, EmptySeatRequest, WaitingEntry,
};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// GET /api/stores/:store_id/classes/:class_id/entries - 班级当前队列
pub async fn list_entries(
    State(state): State<ServerState>,
    Path((store_id, class_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<Vec<WaitingEntry>>>> {
    let entries = state.queue.list_class(store_id, class_id).await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// POST /api/stores/:store_id/classes/:class_id/empty-seat - 插入空位
pub async fn insert_empty_seat(
    State(state): State<ServerState>,
    Path((store_id, class_id)): Path<(i64, i64)>,
    Json(req): Json<EmptySeatRequest>,
) -> AppResult<Json<ApiResponse<WaitingEntry>>> {
    let seat = state
        .queue
        .insert_empty_seat(store_id, class_id, req.position)
        .await?;
    Ok(Json(ApiResponse::success(seat)))
}

/// GET /api/stores/:store_id/classes/:class_id/close-check - 顺序关闭预检查
pub async fn close_check(
    State(state): State<ServerState>,
    Path((store_id, class_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<CloseCheck>>> {
    let check = state.queue.check_close_class(store_id, class_id).await?;
    Ok(Json(ApiResponse::success(check)))
}

/// POST /api/stores/:store_id/classes/:class_id/close?force=true
///
/// `force` 跳过顺序关闭检查 (用户已确认)。
pub async fn close(
    State(state): State<ServerState>,
    Path((store_id, class_id)): Path<(i64, i64)>,
    Query(req): Query<CloseClassRequest>,
) -> AppResult<Json<ApiResponse<CloseClassResult>>> {
    let result = state
        .queue
        .close_class(store_id, class_id, req.force)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

/// POST /api/stores/:store_id/classes/:class_id/reopen
pub async fn reopen(
    State(state): State<ServerState>,
    Path((store_id, class_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.queue.reopen_class(store_id, class_id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// POST /api/stores/:store_id/classes/:class_id/batch-attendance
pub async fn batch_attendance(
    State(state): State<ServerState>,
    Path((store_id, class_id)): Path<(i64, i64)>,
    Json(req): Json<BatchAttendanceRequest>,
) -> AppResult<Json<ApiResponse<BatchAttendanceResult>>> {
    let attended = state
        .queue
        .batch_attendance(store_id, class_id, &req.entry_ids)
        .await?;
    Ok(Json(ApiResponse::success(BatchAttendanceResult {
        class_id,
        attended,
    })))
}
