//! Store API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{BoardSnapshot, BusinessStatus, SlotStatus, StoreSettings};

use crate::core::ServerState;
use crate::utils::validation::validate_store_settings;
use crate::utils::{ApiResponse, AppError, AppResult, time};

/// GET /api/stores/:store_id/settings
pub async fn get_settings(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
) -> AppResult<Json<ApiResponse<StoreSettings>>> {
    let settings = state.queue.settings(store_id)?;
    Ok(Json(ApiResponse::success(settings.as_ref().clone())))
}

/// PUT /api/stores/:store_id/settings - 新增或替换门店配置
///
/// 替换配置不影响当天已登记的条目。
pub async fn put_settings(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Json(settings): Json<StoreSettings>,
) -> AppResult<Json<ApiResponse<StoreSettings>>> {
    if settings.store_id != store_id {
        return Err(AppError::validation(format!(
            "store_id mismatch: path {} body {}",
            store_id, settings.store_id
        )));
    }
    validate_store_settings(&settings)?;

    let created = state.queue.configure_store(settings.clone());
    let message = if created { "Store created" } else { "Store updated" };
    Ok(Json(ApiResponse::success_with_message(message, settings)))
}

/// GET /api/stores/:store_id/slot - 下一个可登记班级 (门店当地时间)
pub async fn next_slot(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
) -> AppResult<Json<ApiResponse<SlotStatus>>> {
    let tz = state.store_timezone(store_id)?;
    let slot = state
        .queue
        .resolve_next_slot(store_id, time::local_now(tz))
        .await?;
    Ok(Json(ApiResponse::success(slot)))
}

/// GET /api/stores/:store_id/board - 全店快照 (重连后的全量刷新)
pub async fn board(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
) -> AppResult<Json<ApiResponse<BoardSnapshot>>> {
    let tz = state.store_timezone(store_id)?;
    let board = state.queue.board(store_id, time::local_today(tz)).await?;
    Ok(Json(ApiResponse::success(board)))
}

/// GET /api/stores/:store_id/business - 营业状态
pub async fn business_status(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
) -> AppResult<Json<ApiResponse<BusinessStatus>>> {
    let status = state.queue.business_status(store_id).await?;
    Ok(Json(ApiResponse::success(status)))
}
