//! 时间工具函数：门店时区转换
//!
//! 队列引擎只接收门店当地的 `NaiveDateTime` / `NaiveDate`，
//! 时区换算统一在 API handler 层完成。

use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use shared::models::StoreSettings;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析 IANA 时区名 (如 `Asia/Seoul`)
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| AppError::validation(format!("Unknown timezone: {}", name)))
}

/// 门店时区；配置无效时回退到服务器默认时区
pub fn store_timezone(settings: &StoreSettings, fallback: Tz) -> Tz {
    settings.timezone.parse().unwrap_or_else(|_| {
        tracing::warn!(
            store_id = settings.store_id,
            timezone = %settings.timezone,
            "Invalid store timezone, falling back to {}",
            fallback
        );
        fallback
    })
}

/// 指定时区的当前本地时间
pub fn local_now(tz: Tz) -> NaiveDateTime {
    chrono::Utc::now().with_timezone(&tz).naive_local()
}

/// 指定时区的今天
pub fn local_today(tz: Tz) -> NaiveDate {
    local_now(tz).date()
}
