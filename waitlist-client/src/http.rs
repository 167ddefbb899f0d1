//! HTTP client for the waitlist REST API
//!
//! 推送流客户端用它作为权威数据源 (重新拉取看板 / 班级队列)，
//! 前台也可以直接用它登记和操作条目。

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::ApiResponse;
use shared::models::{
    BoardSnapshot, BusinessDay, BusinessStatus, RegisterRequest, SetStatusRequest, StoreSettings,
    WaitingEntry, WaitingStatus,
};

use crate::{ClientError, ClientResult};

/// 候位服务 HTTP 客户端
#[derive(Debug, Clone)]
pub struct QueueHttpClient {
    client: Client,
    base_url: String,
}

impl QueueHttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// 解析统一响应，非 0 错误码转换为 [`ClientError::Api`]
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;
        let body: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            ClientError::InvalidResponse(format!("HTTP {}: {} ({})", status, e, text))
        })?;

        if !status.is_success() || !body.is_success() {
            return Err(ClientError::Api {
                code: body.code.unwrap_or(1),
                message: body.message,
                details: body.details,
            });
        }
        body.data
            .ok_or_else(|| ClientError::InvalidResponse("Missing response data".into()))
    }

    // ========== Store API ==========

    pub async fn put_settings(&self, settings: &StoreSettings) -> ClientResult<StoreSettings> {
        self.put(&format!("/api/stores/{}/settings", settings.store_id), settings)
            .await
    }

    /// 全店看板快照
    pub async fn board(&self, store_id: i64) -> ClientResult<BoardSnapshot> {
        self.get(&format!("/api/stores/{}/board", store_id)).await
    }

    pub async fn business_status(&self, store_id: i64) -> ClientResult<BusinessStatus> {
        self.get(&format!("/api/stores/{}/business", store_id)).await
    }

    /// 开启营业日，`date` 为空时使用门店当地今天
    pub async fn open_business_day(
        &self,
        store_id: i64,
        date: Option<NaiveDate>,
    ) -> ClientResult<BusinessDay> {
        let path = match date {
            Some(date) => format!("/api/stores/{}/business/open?date={}", store_id, date),
            None => format!("/api/stores/{}/business/open", store_id),
        };
        self.post_empty(&path).await
    }

    // ========== Class API ==========

    /// 班级当前队列 (按 class_order)
    pub async fn class_entries(&self, store_id: i64, class_id: i64) -> ClientResult<Vec<WaitingEntry>> {
        self.get(&format!("/api/stores/{}/classes/{}/entries", store_id, class_id))
            .await
    }

    // ========== Waiting API ==========

    pub async fn entry(&self, store_id: i64, entry_id: i64) -> ClientResult<WaitingEntry> {
        self.get(&format!("/api/stores/{}/waiting/{}", store_id, entry_id))
            .await
    }

    pub async fn register(&self, store_id: i64, req: &RegisterRequest) -> ClientResult<WaitingEntry> {
        self.post(&format!("/api/stores/{}/waiting", store_id), req)
            .await
    }

    pub async fn call(&self, store_id: i64, entry_id: i64) -> ClientResult<WaitingEntry> {
        self.post_empty(&format!("/api/stores/{}/waiting/{}/call", store_id, entry_id))
            .await
    }

    pub async fn set_status(
        &self,
        store_id: i64,
        entry_id: i64,
        status: WaitingStatus,
    ) -> ClientResult<WaitingEntry> {
        self.post(
            &format!("/api/stores/{}/waiting/{}/status", store_id, entry_id),
            &SetStatusRequest { status },
        )
        .await
    }
}
