//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 3xxx: Store errors
/// - 4xxx: Waiting entry errors
/// - 5xxx: Class errors
/// - 6xxx: Business day errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Store errors (3xxx)
    Store,
    /// Waiting entry errors (4xxx)
    Entry,
    /// Class errors (5xxx)
    Class,
    /// Business day errors (6xxx)
    BusinessDay,
    /// System errors (9xxx and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            3000..4000 => Self::Store,
            4000..5000 => Self::Entry,
            5000..6000 => Self::Class,
            6000..7000 => Self::BusinessDay,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Store => "store",
            Self::Entry => "entry",
            Self::Class => "class",
            Self::BusinessDay => "business_day",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
