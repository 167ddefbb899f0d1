//! Waiting entry model (대기 접수)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Waiting entry status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitingStatus {
    Waiting,
    Called,
    Attended,
    Cancelled,
}

impl WaitingStatus {
    /// Waiting or called: the entry holds a `class_order` slot
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Waiting | Self::Called)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_live()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Called => "called",
            Self::Attended => "attended",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Itemized party composition, e.g. `{"adult": 2, "child": 1}`
pub type PartyBreakdown = BTreeMap<String, u32>;

/// One customer's place in a class queue for the current business day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitingEntry {
    pub id: i64,
    pub store_id: i64,
    pub class_id: i64,
    /// Store-day ticket number, never reused within a business day
    pub waiting_number: u64,
    /// 1-based dense position among live entries of the class
    pub class_order: u32,
    pub status: WaitingStatus,
    pub party_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_breakdown: Option<PartyBreakdown>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Placeholder reserving a slot without a real customer
    #[serde(default)]
    pub is_empty_seat: bool,
    #[serde(default)]
    pub revisit_count: u32,
    /// Unix millis
    pub registered_at: i64,
    #[serde(default)]
    pub called_at: Option<i64>,
    #[serde(default)]
    pub call_count: u32,
    /// Set when the entry leaves the live set (attended / cancelled)
    #[serde(default)]
    pub settled_at: Option<i64>,
}

impl WaitingEntry {
    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }
}

/// Who is registering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub revisit_count: u32,
}

/// Register payload. `class_id` absent means "next available slot".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(flatten)]
    pub customer: CustomerRef,
    pub party_size: u32,
    #[serde(default)]
    pub party_breakdown: Option<PartyBreakdown>,
}

/// Set status payload (attended / cancelled only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStatusRequest {
    pub status: WaitingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRequest {
    pub entry_a: i64,
    pub entry_b: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub target_class_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// Member info update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberPatch {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub party_size: Option<u32>,
    #[serde(default)]
    pub party_breakdown: Option<PartyBreakdown>,
}

impl MemberPatch {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.party_size.is_none() && self.party_breakdown.is_none()
    }
}
