//! Business day API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{BusinessDay, BusinessDaySummary};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, time};

const MAX_HISTORY: usize = 365;

#[derive(Debug, Deserialize)]
pub struct OpenQuery {
    /// 营业日期 (YYYY-MM-DD)，默认门店当地今天
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    30
}

/// POST /api/stores/:store_id/business/open
pub async fn open(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Query(query): Query<OpenQuery>,
) -> AppResult<Json<ApiResponse<BusinessDay>>> {
    let business_date = match query.date {
        Some(date) => time::parse_date(&date)?,
        None => time::local_today(state.store_timezone(store_id)?),
    };
    let day = state.queue.open_business_day(store_id, business_date).await?;
    Ok(Json(ApiResponse::success(day)))
}

/// POST /api/stores/:store_id/business/close - 强制结算并归档
pub async fn close(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
) -> AppResult<Json<ApiResponse<BusinessDaySummary>>> {
    let summary = state.queue.close_business_day(store_id).await?;
    state.archive_day(&summary);
    Ok(Json(ApiResponse::success(summary)))
}

/// GET /api/stores/:store_id/business/history - 已归档营业日 (最新在前)
pub async fn history(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<BusinessDaySummary>>>> {
    state.queue.settings(store_id)?;
    let summaries = state
        .archive
        .history(store_id, query.limit.clamp(1, MAX_HISTORY))?;
    Ok(Json(ApiResponse::success(summaries)))
}
