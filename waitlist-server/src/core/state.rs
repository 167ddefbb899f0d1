//! 服务器状态
//!
//! [`ServerState`] 在所有 HTTP handler 之间共享 (克隆成本低)：
//!
//! ```text
//! ServerState
//!   ├─ config   Config
//!   ├─ hub      BroadcastHub   订阅表 + 事件扇出
//!   ├─ queue    QueueStore     所有队列变更 (发布到 hub)
//!   ├─ archive  DayArchive     营业日汇总 (redb)
//!   └─ shutdown CancellationToken
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono_tz::Tz;
use shared::models::{BusinessDaySummary, StoreSettings};
use tokio_util::sync::CancellationToken;

use super::tasks::BackgroundTasks;
use super::{Config, Result, ServerError};
use crate::archiving::DayArchive;
use crate::message::{BroadcastHub, HeartbeatTicker};
use crate::queue::QueueStore;
use crate::utils::validation::validate_store_settings;
use crate::utils::{AppResult, time};

#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 事件广播中心
    pub hub: BroadcastHub,
    /// 候位队列
    pub queue: QueueStore,
    /// 营业日归档
    pub archive: DayArchive,
    /// 进程关闭信号，推送流据此结束
    pub shutdown: CancellationToken,
    started_at: Instant,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize()`] 方法代替
    pub fn new(config: Config, archive: DayArchive) -> Self {
        let hub = BroadcastHub::new(config.hub_config());
        let queue = QueueStore::new(Arc::new(hub.clone()));
        Self {
            config,
            hub,
            queue,
            archive,
            shutdown: CancellationToken::new(),
            started_at: Instant::now(),
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 归档数据库 (work_dir/database/waitlist.redb)
    /// 2. 队列与广播中心
    /// 3. 种子门店配置 (SEED_FILE)
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db_path = config.database_path();
        let archive = DayArchive::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Archive database opened");

        let state = Self::new(config.clone(), archive);
        if let Some(seed) = &config.seed_file {
            let count = state.load_seed_file(seed).await?;
            tracing::info!(seed = %seed, stores = count, "Seed store settings loaded");
        }
        Ok(state)
    }

    /// 使用内存归档 (测试)
    pub fn in_memory(config: Config) -> Result<Self> {
        Ok(Self::new(config, DayArchive::open_in_memory()?))
    }

    /// 从 JSON 文件加载门店配置，返回门店数量
    pub async fn load_seed_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let stores: Vec<StoreSettings> = serde_json::from_str(&content)
            .map_err(|e| ServerError::Seed(format!("{}: {}", path.display(), e)))?;

        for settings in &stores {
            validate_store_settings(settings).map_err(|e| {
                ServerError::Seed(format!("store {}: {}", settings.store_id, e.message))
            })?;
        }
        let count = stores.len();
        for settings in stores {
            self.queue.configure_store(settings);
        }
        Ok(count)
    }

    /// 门店时区 (无效时回退到服务器默认时区)
    pub fn store_timezone(&self, store_id: i64) -> AppResult<Tz> {
        let settings = self.queue.settings(store_id)?;
        Ok(time::store_timezone(&settings, self.config.timezone))
    }

    /// 归档营业日汇总，失败只记录日志
    pub fn archive_day(&self, summary: &BusinessDaySummary) {
        if let Err(e) = self.archive.append(summary) {
            tracing::error!(
                store_id = summary.store_id,
                business_date = %summary.business_date,
                error = %e,
                "Failed to archive business day"
            );
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// 启动后台任务
    ///
    /// - 心跳调度器
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();
        let ticker = HeartbeatTicker::new(
            self.hub.clone(),
            self.config.heartbeat_interval(),
            tasks.shutdown_token(),
        );
        tasks.spawn("heartbeat", ticker.run());
        tasks.log_summary();
        tasks
    }
}
