//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::StoreNotFound | Self::EntryNotFound | Self::ClassNotFound => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict
            Self::ClassFull
            | Self::ClassClosed
            | Self::SequentialOrderViolation
            | Self::NoClassAvailable
            | Self::BusinessAlreadyOpen
            | Self::BusinessNotOpen => StatusCode::CONFLICT,

            // 422 Unprocessable Entity
            Self::CrossClassSwap | Self::EntryInvalidStatus => StatusCode::UNPROCESSABLE_ENTITY,

            // 400 Bad Request
            Self::ValidationFailed | Self::StoreSettingsInvalid => {
                StatusCode::BAD_REQUEST
            }

            // 500 Internal Server Error
            Self::Unknown | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
