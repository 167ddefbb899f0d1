//! 指数退避
//!
//! `delay(attempt) = min(initial * 2^attempt, max)`，连续失败 `max_attempts`
//! 次后耗尽 (0 表示不限)。连接成功后调用 [`ReconnectBackoff::reset`]。

use std::time::Duration;

use crate::StreamClientConfig;

#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    max_attempts: u32,
    attempt: u32,
}

impl ReconnectBackoff {
    pub fn new(initial: Duration, max: Duration, max_attempts: u32) -> Self {
        Self {
            initial,
            max,
            max_attempts,
            attempt: 0,
        }
    }

    pub fn from_config(config: &StreamClientConfig) -> Self {
        Self::new(config.initial_delay, config.max_delay, config.max_attempts)
    }

    /// 第 `attempt` 次重连 (从 0 开始) 前的等待时间
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial
            .checked_mul(factor)
            .unwrap_or(self.max)
            .min(self.max)
    }

    /// 已连续失败的次数
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_attempts != 0 && self.attempt >= self.max_attempts
    }

    /// 记录一次失败并返回下次重连前的等待时间，耗尽时返回 None
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        let delay = self.delay(self.attempt);
        self.attempt += 1;
        Some(delay)
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
