//! Stream API Handlers

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, Sse},
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use shared::message::SubscriberRole;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// board | reception | manage (默认 board)
    pub role: Option<String>,
}

/// GET /api/stores/:store_id/stream?role= - 订阅门店事件
///
/// 连接断开 (响应流被 drop) 时自动取消订阅；服务器关闭时流结束。
pub async fn stream(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Query(query): Query<StreamQuery>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    state.queue.settings(store_id)?;
    let role = match query.role.as_deref() {
        Some(role) => role.parse::<SubscriberRole>().map_err(AppError::validation)?,
        None => SubscriberRole::default(),
    };

    let subscription = state.hub.subscribe(store_id, role);
    let subscriber_id = subscription.id();

    let frames = subscription
        .map(move |event| {
            let frame = match serde_json::to_string(event.as_ref()) {
                Ok(json) => Event::default().data(json),
                Err(e) => {
                    tracing::warn!(store_id, %subscriber_id, error = %e, "Failed to encode event");
                    Event::default().comment("encode error")
                }
            };
            Ok(frame)
        })
        .take_until(state.shutdown.clone().cancelled_owned());

    Ok(Sse::new(frames))
}
