//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;

use crate::core::{Config, Result, ServerState};
use crate::services::https::build_router;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let tasks = state.start_background_tasks();
        let app = build_router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            %addr,
            environment = %self.config.environment,
            stores = state.queue.store_ids().len(),
            "Waitlist server starting"
        );

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(state.shutdown.clone()))
            .await;

        // 运行期间已经退出的任务 (panic 或提前返回)
        let failed = tasks.check_health();
        if failed > 0 {
            tracing::warn!(failed, "Background tasks stopped before shutdown");
        }
        tasks.shutdown(self.config.shutdown_timeout()).await;
        served?;
        Ok(())
    }
}

/// Ctrl-C 或外部取消；取消令牌后 SSE 推送流随之结束，graceful shutdown 才能完成
async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                token.cancelled().await;
            }
        }
        _ = token.cancelled() => {}
    }
    tracing::info!("Shutting down...");
    token.cancel();
}
