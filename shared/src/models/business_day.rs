//! Business day model (营业日)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The currently open trading day of a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDay {
    pub store_id: i64,
    /// Store-local date the day was opened on
    pub business_date: NaiveDate,
    /// Unix millis
    pub opened_at: i64,
}

/// Aggregate counters captured when a business day closes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDayTotals {
    /// Every customer registration of the day (empty seats excluded)
    pub total_waiting: u32,
    pub total_attended: u32,
    pub total_cancelled: u32,
}

/// Archived record of a closed business day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDaySummary {
    pub store_id: i64,
    pub business_date: NaiveDate,
    pub opened_at: i64,
    pub closed_at: i64,
    #[serde(flatten)]
    pub totals: BusinessDayTotals,
}

/// `GET /business` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessStatus {
    pub store_id: i64,
    pub is_open: bool,
    #[serde(default)]
    pub business_day: Option<BusinessDay>,
}
