use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::message::HubConfig;

/// 服务器配置 - 候位服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (归档数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TIMEZONE | Asia/Seoul | 门店默认时区 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_DIR | - | 按天滚动的日志目录 |
/// | SEED_FILE | - | 启动时加载的门店配置 (StoreSettings JSON 数组) |
/// | HEARTBEAT_INTERVAL_SECS | 15 | 心跳间隔 (秒) |
/// | MAX_MISSED_HEARTBEATS | 3 | 连续投递失败多少次后移除订阅者 |
/// | SUBSCRIBER_BUFFER | 64 | 每个订阅者的事件缓冲 |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 关闭超时时间 (毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/waitlist HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储归档数据库等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 门店未配置有效时区时使用
    pub timezone: Tz,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub seed_file: Option<String>,
    pub heartbeat_interval_secs: u64,
    pub max_missed_heartbeats: u32,
    pub subscriber_buffer: usize,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::Asia::Seoul),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            seed_file: std::env::var("SEED_FILE").ok().filter(|f| !f.is_empty()),
            heartbeat_interval_secs: std::env::var("HEARTBEAT_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(15),
            max_missed_heartbeats: std::env::var("MAX_MISSED_HEARTBEATS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(3),
            subscriber_buffer: std::env::var("SUBSCRIBER_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(64),
            shutdown_timeout_ms: std::env::var("SHUTDOWN_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.seed_file = None;
        config
    }

    /// 归档数据库路径: `WORK_DIR/database/waitlist.redb`
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
            .join("database")
            .join("waitlist.redb")
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            subscriber_buffer: self.subscriber_buffer,
            max_missed: self.max_missed_heartbeats,
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_and_paths() {
        let config = Config::with_overrides("/tmp/waitlist", 8080);
        assert_eq!(config.http_port, 8080);
        assert!(config.seed_file.is_none());
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/waitlist/database/waitlist.redb")
        );
        assert_eq!(config.hub_config().subscriber_buffer, config.subscriber_buffer);
    }
}
