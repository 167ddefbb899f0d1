//! Client configuration

use std::time::Duration;

use shared::message::SubscriberRole;

/// 推送流客户端配置
///
/// 默认值 (同 [`StreamClientConfig::lan`])：
///
/// | 字段 | 默认值 |
/// |------|--------|
/// | initial_delay | 500 ms |
/// | max_delay | 10 s |
/// | max_attempts | 20 (0 = 不限) |
/// | idle_timeout | 45 s |
/// | refetch_debounce | 300 ms |
/// | request_timeout | 10 s |
#[derive(Debug, Clone)]
pub struct StreamClientConfig {
    /// Server base URL (e.g., "http://localhost:3000")
    pub base_url: String,
    pub store_id: i64,
    pub role: SubscriberRole,

    /// 第一次重连前的等待时间
    pub initial_delay: Duration,
    /// 重连等待时间上限
    pub max_delay: Duration,
    /// 连续失败多少次后放弃，0 表示不限
    pub max_attempts: u32,
    /// 超过该时间没有收到任何帧即视为连接已断开
    pub idle_timeout: Duration,
    /// 同一班级重新拉取的防抖时间
    pub refetch_debounce: Duration,
    /// 普通 HTTP 请求超时
    pub request_timeout: Duration,
}

impl StreamClientConfig {
    pub fn new(base_url: impl Into<String>, store_id: i64) -> Self {
        Self::lan(base_url, store_id)
    }

    /// 局域网 (店内大屏/前台)
    pub fn lan(base_url: impl Into<String>, store_id: i64) -> Self {
        Self {
            base_url: base_url.into(),
            store_id,
            role: SubscriberRole::Board,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            max_attempts: 20,
            idle_timeout: Duration::from_secs(45),
            refetch_debounce: Duration::from_millis(300),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// 公网 (店长移动端)：更长的退避，不限重连次数
    pub fn wan(base_url: impl Into<String>, store_id: i64) -> Self {
        Self {
            base_url: base_url.into(),
            store_id,
            role: SubscriberRole::Manage,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: 0,
            idle_timeout: Duration::from_secs(60),
            refetch_debounce: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_role(mut self, role: SubscriberRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_backoff(mut self, initial_delay: Duration, max_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self.max_delay = max_delay;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn with_refetch_debounce(mut self, debounce: Duration) -> Self {
        self.refetch_debounce = debounce;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 推送流地址
    pub fn stream_url(&self) -> String {
        format!(
            "{}/api/stores/{}/stream?role={}",
            self.base_url.trim_end_matches('/'),
            self.store_id,
            self.role.as_str()
        )
    }
}
