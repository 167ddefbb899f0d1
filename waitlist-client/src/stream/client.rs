//! 推送流客户端
//!
//! 连接生命周期：
//!
//! ```text
//! Connecting ──► Connected ──(错误/空闲超时/服务端关闭)──► Reconnecting{n} ──► Connected
//!                                                           │
//!                                                           └─(次数耗尽)──► Disconnected
//! ```
//!
//! 每次 (重)连接成功后都会做一次全量拉取，断线期间丢失的事件不补发。

use std::sync::Arc;

use futures::StreamExt;
use shared::message::{EventKind, QueueEvent};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::backoff::ReconnectBackoff;
use super::decoder::SseDecoder;
use super::dispatcher::EventDispatcher;
use super::view::QueueView;
use crate::{ClientError, ClientResult, StreamClientConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    /// 第 n 次重连 (从 1 开始)
    Reconnecting(u32),
    Disconnected,
}

pub struct QueueStreamClient {
    config: StreamClientConfig,
    client: reqwest::Client,
    dispatcher: EventDispatcher,
    state_tx: watch::Sender<ConnectionState>,
}

impl QueueStreamClient {
    pub fn new(config: StreamClientConfig, view: Arc<dyn QueueView>) -> ClientResult<Self> {
        // 流式响应不设整体超时，空闲检测由 idle_timeout 负责
        let client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout)
            .build()?;
        let dispatcher = EventDispatcher::new(view, config.refetch_debounce);
        let (state_tx, _) = watch::channel(ConnectionState::Connecting);
        Ok(Self {
            config,
            client,
            dispatcher,
            state_tx,
        })
    }

    /// 注册事件回调 (在 `run` 之前)
    pub fn on<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&QueueEvent) + Send + Sync + 'static,
    {
        self.dispatcher.on(kind, handler);
    }

    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub fn config(&self) -> &StreamClientConfig {
        &self.config
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            tracing::info!(store_id = self.config.store_id, from = ?*current, to = ?state, "Stream connection state changed");
            *current = state;
            true
        });
    }

    /// 运行直到 `shutdown` 被取消 (返回 Ok) 或重连次数耗尽
    pub async fn run(&self, shutdown: CancellationToken) -> ClientResult<()> {
        let mut backoff = ReconnectBackoff::from_config(&self.config);

        loop {
            let state = match backoff.attempts() {
                0 => ConnectionState::Connecting,
                n => ConnectionState::Reconnecting(n),
            };
            self.set_state(state);

            let outcome = tokio::select! {
                _ = shutdown.cancelled() => break,
                outcome = self.session(&mut backoff) => outcome,
            };
            if let Err(e) = outcome {
                tracing::warn!(store_id = self.config.store_id, error = %e, "Stream session ended");
            }

            let Some(delay) = backoff.next_delay() else {
                self.set_state(ConnectionState::Disconnected);
                return Err(ClientError::ReconnectExhausted(backoff.attempts()));
            };
            tracing::debug!(attempt = backoff.attempts(), ?delay, "Reconnecting after delay");

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.dispatcher.debouncer().cancel_all();
        self.set_state(ConnectionState::Disconnected);
        Ok(())
    }

    /// 单次连接：连接、全量拉取、读帧直到出错
    async fn session(&self, backoff: &mut ReconnectBackoff) -> ClientResult<()> {
        let response = self
            .client
            .get(self.config.stream_url())
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Connection(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        backoff.reset();
        self.set_state(ConnectionState::Connected);
        self.dispatcher.refetch_all(self.config.store_id).await;

        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        loop {
            let chunk = match tokio::time::timeout(self.config.idle_timeout, body.next()).await {
                Err(_) => return Err(ClientError::IdleTimeout(self.config.idle_timeout)),
                Ok(None) => return Err(ClientError::Connection("stream closed by server".into())),
                Ok(Some(chunk)) => chunk?,
            };

            for frame in decoder.push(&chunk) {
                match QueueEvent::from_json(&frame.data) {
                    Ok(event) if event.store_id() == self.config.store_id => {
                        self.dispatcher.dispatch(&event).await;
                    }
                    Ok(event) => {
                        tracing::debug!(store_id = event.store_id(), "Ignoring event for another store");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, data = %frame.data, "Malformed stream frame");
                    }
                }
            }
        }
    }
}
