//! Waiting API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{
    MemberPatch, MoveRequest, RegisterRequest, RenameRequest, SetStatusRequest, SlotStatus,
    SlotUnavailable, SwapRequest, WaitingEntry,
};

use crate::core::ServerState;
use crate::queue::QueueError;
use crate::utils::validation::{
    MAX_NAME_LEN, validate_member_patch, validate_registration, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, time};

/// 自动分配班级时，班级在解析与登记之间被占满的重试次数
const AUTO_ASSIGN_ATTEMPTS: usize = 3;

fn slot_unavailable(reason: SlotUnavailable) -> AppError {
    let code = match reason {
        SlotUnavailable::BusinessNotOpen => ErrorCode::BusinessNotOpen,
        _ => ErrorCode::NoClassAvailable,
    };
    AppError::with_message(code, reason.message())
        .with_detail("reason", serde_json::to_value(reason).unwrap_or_default())
}

/// POST /api/stores/:store_id/waiting - 登记
///
/// 未指定 `class_id` 时按门店当地时间解析下一个可登记班级。
pub async fn register(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<WaitingEntry>>> {
    validate_registration(&req.customer, req.party_size)?;

    if let Some(class_id) = req.class_id {
        let entry = state
            .queue
            .register(
                store_id,
                class_id,
                req.customer,
                req.party_size,
                req.party_breakdown,
            )
            .await?;
        return Ok(Json(ApiResponse::success(entry)));
    }

    let tz = state.store_timezone(store_id)?;
    let mut last_err = None;
    for _ in 0..AUTO_ASSIGN_ATTEMPTS {
        let slot = match state
            .queue
            .resolve_next_slot(store_id, time::local_now(tz))
            .await?
        {
            SlotStatus::Available(slot) => slot,
            SlotStatus::Full { reason, .. } => return Err(slot_unavailable(reason)),
        };

        match state
            .queue
            .register(
                store_id,
                slot.class_id,
                req.customer.clone(),
                req.party_size,
                req.party_breakdown.clone(),
            )
            .await
        {
            Ok(entry) => return Ok(Json(ApiResponse::success(entry))),
            Err(e @ (QueueError::ClassFull { .. } | QueueError::ClassClosed(_))) => {
                tracing::debug!(store_id, class_id = slot.class_id, error = %e, "Resolved class taken, retrying");
                last_err = Some(e);
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(last_err
        .map(AppError::from)
        .unwrap_or_else(|| slot_unavailable(SlotUnavailable::AllClassesFull)))
}

/// GET /api/stores/:store_id/waiting/:entry_id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path((store_id, entry_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<WaitingEntry>>> {
    let entry = state.queue.get_entry(store_id, entry_id).await?;
    Ok(Json(ApiResponse::success(entry)))
}

/// POST /api/stores/:store_id/waiting/:entry_id/call - 呼叫
pub async fn call(
    State(state): State<ServerState>,
    Path((store_id, entry_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<WaitingEntry>>> {
    let entry = state.queue.call(store_id, entry_id).await?;
    Ok(Json(ApiResponse::success(entry)))
}

/// POST /api/stores/:store_id/waiting/:entry_id/status - 出席 / 取消
pub async fn set_status(
    State(state): State<ServerState>,
    Path((store_id, entry_id)): Path<(i64, i64)>,
    Json(req): Json<SetStatusRequest>,
) -> AppResult<Json<ApiResponse<WaitingEntry>>> {
    let entry = state
        .queue
        .set_status(store_id, entry_id, req.status)
        .await?;
    Ok(Json(ApiResponse::success(entry)))
}

/// POST /api/stores/:store_id/waiting/swap - 同班级内交换顺序
pub async fn swap(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Json(req): Json<SwapRequest>,
) -> AppResult<Json<ApiResponse<Vec<WaitingEntry>>>> {
    let entries = state
        .queue
        .swap_order(store_id, req.entry_a, req.entry_b)
        .await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// POST /api/stores/:store_id/waiting/:entry_id/move - 移动到其他班级队尾
pub async fn move_to_class(
    State(state): State<ServerState>,
    Path((store_id, entry_id)): Path<(i64, i64)>,
    Json(req): Json<MoveRequest>,
) -> AppResult<Json<ApiResponse<WaitingEntry>>> {
    let entry = state
        .queue
        .move_to_class(store_id, entry_id, req.target_class_id)
        .await?;
    Ok(Json(ApiResponse::success(entry)))
}

/// PUT /api/stores/:store_id/waiting/:entry_id/name
pub async fn rename(
    State(state): State<ServerState>,
    Path((store_id, entry_id)): Path<(i64, i64)>,
    Json(req): Json<RenameRequest>,
) -> AppResult<Json<ApiResponse<WaitingEntry>>> {
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    let entry = state
        .queue
        .rename_entry(store_id, entry_id, req.name.trim().to_string())
        .await?;
    Ok(Json(ApiResponse::success(entry)))
}

/// PUT /api/stores/:store_id/waiting/:entry_id/member - 更新电话 / 人数
pub async fn update_member(
    State(state): State<ServerState>,
    Path((store_id, entry_id)): Path<(i64, i64)>,
    Json(patch): Json<MemberPatch>,
) -> AppResult<Json<ApiResponse<WaitingEntry>>> {
    validate_member_patch(&patch)?;
    let entry = state
        .queue
        .update_member(store_id, entry_id, patch)
        .await?;
    Ok(Json(ApiResponse::success(entry)))
}
