//! 心跳调度器
//!
//! 按固定间隔向所有有订阅者的门店发送 `ping`。投递失败计入订阅者的
//! miss 次数，连续失败的订阅者在 [`BroadcastHub`] 内被移除。

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::BroadcastHub;

/// 心跳调度器
///
/// 由 [`BackgroundTasks`](crate::core::BackgroundTasks) 管理，在 `Server::run()` 中启动。
pub struct HeartbeatTicker {
    hub: BroadcastHub,
    interval: Duration,
    shutdown: CancellationToken,
}

impl HeartbeatTicker {
    pub fn new(hub: BroadcastHub, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            hub,
            interval,
            shutdown,
        }
    }

    /// 主循环：定时心跳 + 关机信号
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Heartbeat ticker started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval 的第一次 tick 立即完成
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.beat();
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Heartbeat ticker received shutdown signal");
                    return;
                }
            }
        }
    }

    fn beat(&self) {
        let before = self.hub.total_subscribers();
        if before == 0 {
            return;
        }
        let delivered = self.hub.heartbeat_all();
        let after = self.hub.total_subscribers();
        tracing::debug!(
            subscribers = after,
            delivered,
            evicted = before.saturating_sub(after),
            "Heartbeat sent"
        );
    }
}
