//! Read models served to board / reception clients

use serde::{Deserialize, Serialize};

use super::business_day::BusinessDay;
use super::waiting::WaitingEntry;

/// Next registrable slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInfo {
    pub class_id: i64,
    pub class_name: String,
    /// `class_order` the next registrant would receive
    pub class_order: u32,
    pub max_capacity: u32,
}

/// Why no slot is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotUnavailable {
    BusinessNotOpen,
    NoClassScheduled,
    AllClassesClosed,
    AllClassesFull,
}

impl SlotUnavailable {
    pub fn message(&self) -> &'static str {
        match self {
            Self::BusinessNotOpen => "Business day is not open",
            Self::NoClassScheduled => "No class is scheduled right now",
            Self::AllClassesClosed => "All classes are closed for today",
            Self::AllClassesFull => "All classes are full",
        }
    }
}

/// `GET /slot` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotStatus {
    Available(SlotInfo),
    Full { reason: SlotUnavailable, message: String },
}

impl From<SlotUnavailable> for SlotStatus {
    fn from(reason: SlotUnavailable) -> Self {
        Self::Full {
            reason,
            message: reason.message().to_string(),
        }
    }
}

/// One class on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardClass {
    pub class_id: i64,
    pub name: String,
    pub class_number: u32,
    pub max_capacity: u32,
    pub closed: bool,
    pub occupancy: u32,
    pub entries: Vec<WaitingEntry>,
}

/// Full authoritative state of a store's queues
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub store_id: i64,
    #[serde(default)]
    pub business_day: Option<BusinessDay>,
    pub classes: Vec<BoardClass>,
}

/// `close` result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseClassResult {
    pub class_id: i64,
    pub attended_count: u32,
}

/// Advisory sequential-closing pre-check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseCheck {
    pub class_id: i64,
    pub can_close: bool,
    /// Earlier classes of today that are still open
    #[serde(default)]
    pub open_earlier_classes: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmptySeatRequest {
    pub position: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloseClassRequest {
    /// Override the sequential closing guard
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAttendanceRequest {
    pub entry_ids: Vec<i64>,
}

/// `batch-attendance` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAttendanceResult {
    pub class_id: i64,
    pub attended: Vec<i64>,
}
