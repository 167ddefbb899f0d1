use shared::models::WaitingStatus;
use thiserror::Error;

/// Queue store errors
///
/// Every variant is raised before any mutation is applied, so a failed
/// operation never leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Store not found: {0}")]
    StoreNotFound(i64),

    #[error("Class not found: {0}")]
    ClassNotFound(i64),

    #[error("Waiting entry not found: {0}")]
    EntryNotFound(i64),

    #[error("Class {class_id} is full (capacity {capacity})")]
    ClassFull { class_id: i64, capacity: u32 },

    #[error("Class {0} is closed for today")]
    ClassClosed(i64),

    #[error("Entries {entry_a} and {entry_b} belong to different classes")]
    CrossClassSwap { entry_a: i64, entry_b: i64 },

    #[error("Class {class_id} cannot close before classes {open_earlier:?}")]
    SequentialOrderViolation {
        class_id: i64,
        open_earlier: Vec<i64>,
    },

    #[error("Entry {entry_id} is {status:?}")]
    InvalidStatus {
        entry_id: i64,
        status: WaitingStatus,
    },

    #[error("Business day already open for store {0}")]
    BusinessAlreadyOpen(i64),

    #[error("Business day not open for store {0}")]
    BusinessNotOpen(i64),

    #[error("Validation failed: {0}")]
    Validation(String),
}

pub type QueueResult<T> = Result<T, QueueError>;
