//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 3xxx: Store errors
//! - 4xxx: Waiting entry errors
//! - 5xxx: Class errors
//! - 6xxx: Business day errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,

    // ==================== 3xxx: Store ====================
    /// Store not configured
    StoreNotFound = 3001,
    /// Store settings rejected
    StoreSettingsInvalid = 3002,

    // ==================== 4xxx: Waiting entry ====================
    /// Waiting entry not found
    EntryNotFound = 4001,
    /// Entry is not in a state that allows the operation
    EntryInvalidStatus = 4002,
    /// Swap requested between entries of different classes
    CrossClassSwap = 4003,

    // ==================== 5xxx: Class ====================
    /// Class not found
    ClassNotFound = 5001,
    /// Class has reached its capacity
    ClassFull = 5002,
    /// Class is closed for the current business day
    ClassClosed = 5003,
    /// An earlier class is still open (sequential closing policy)
    SequentialOrderViolation = 5004,
    /// No class can accept registrations right now
    NoClassAvailable = 5005,

    // ==================== 6xxx: Business day ====================
    /// Business day already open
    BusinessAlreadyOpen = 6001,
    /// No business day open
    BusinessNotOpen = 6002,

    // ==================== 9xxx: System ====================
    /// Storage error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check whether this code represents success
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default human-readable message
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",

            // Store
            ErrorCode::StoreNotFound => "Store not found",
            ErrorCode::StoreSettingsInvalid => "Store settings are invalid",

            // Waiting entry
            ErrorCode::EntryNotFound => "Waiting entry not found",
            ErrorCode::EntryInvalidStatus => "Waiting entry status does not allow this operation",
            ErrorCode::CrossClassSwap => "Cannot swap entries that belong to different classes",

            // Class
            ErrorCode::ClassNotFound => "Class not found",
            ErrorCode::ClassFull => "Class is full",
            ErrorCode::ClassClosed => "Class is closed for today",
            ErrorCode::SequentialOrderViolation => "An earlier class must be closed first",
            ErrorCode::NoClassAvailable => "No class is available for registration",

            // Business day
            ErrorCode::BusinessAlreadyOpen => "Business day is already open",
            ErrorCode::BusinessNotOpen => "Business day is not open",

            // System
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),

            // Store
            3001 => Ok(ErrorCode::StoreNotFound),
            3002 => Ok(ErrorCode::StoreSettingsInvalid),

            // Waiting entry
            4001 => Ok(ErrorCode::EntryNotFound),
            4002 => Ok(ErrorCode::EntryInvalidStatus),
            4003 => Ok(ErrorCode::CrossClassSwap),

            // Class
            5001 => Ok(ErrorCode::ClassNotFound),
            5002 => Ok(ErrorCode::ClassFull),
            5003 => Ok(ErrorCode::ClassClosed),
            5004 => Ok(ErrorCode::SequentialOrderViolation),
            5005 => Ok(ErrorCode::NoClassAvailable),

            // Business day
            6001 => Ok(ErrorCode::BusinessAlreadyOpen),
            6002 => Ok(ErrorCode::BusinessNotOpen),

            // System
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
