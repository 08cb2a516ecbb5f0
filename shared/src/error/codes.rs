//! Unified error codes for the storefront
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Catalog search errors
//! - 4xxx: Order and inquiry errors
//! - 5xxx: Notification errors
//! - 6xxx: Product and category errors
//! - 7xxx: Import/export errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values on the wire.
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
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Account is waiting for administrator approval
    AccountPendingApproval = 1008,
    /// Token subject has no operator account
    AccountNotRegistered = 1009,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Operators cannot demote or disable themselves
    CannotModifySelf = 2004,

    // ==================== 3xxx: Catalog ====================
    /// Product search failed
    SearchFailed = 3001,
    /// Catalog session not found or expired
    CatalogSessionNotFound = 3002,
    /// A newer search replaced this one before it finished
    SearchSuperseded = 3003,

    // ==================== 4xxx: Order / Inquiry ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no items
    OrderEmpty = 4007,
    /// Inquiry not found
    InquiryNotFound = 4101,

    // ==================== 5xxx: Notification ====================
    /// Chat notification could not be delivered
    NotificationFailed = 5001,
    /// Chat notifications are not configured
    NotificationDisabled = 5002,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price
    ProductInvalidPrice = 6002,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category parent is invalid (self or missing)
    CategoryParentInvalid = 6104,

    // ==================== 7xxx: Import / Export ====================
    /// Uploaded file could not be parsed
    ImportParseFailed = 7001,
    /// Unsupported import format
    ImportUnsupportedFormat = 7002,
    /// Strict import requires explicit confirmation
    ImportConfirmationRequired = 7003,
    /// Uploaded file is empty
    ImportEmptyFile = 7004,
    /// Export failed
    ExportFailed = 7101,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// User already registered
    UserAlreadyRegistered = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::AccountPendingApproval => "Account is waiting for approval",
            ErrorCode::AccountNotRegistered => "Account is not registered",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::CannotModifySelf => "Cannot change your own role or status",

            // Catalog
            ErrorCode::SearchFailed => "Product search failed",
            ErrorCode::CatalogSessionNotFound => "Catalog session not found",
            ErrorCode::SearchSuperseded => "Search superseded by a newer request",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::InquiryNotFound => "Inquiry not found",

            // Notification
            ErrorCode::NotificationFailed => "Notification delivery failed",
            ErrorCode::NotificationDisabled => "Notifications are not configured",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryParentInvalid => "Category parent is invalid",

            // Import / Export
            ErrorCode::ImportParseFailed => "Import file could not be parsed",
            ErrorCode::ImportUnsupportedFormat => "Unsupported import format",
            ErrorCode::ImportConfirmationRequired => "Strict import must be confirmed",
            ErrorCode::ImportEmptyFile => "Import file is empty",
            ErrorCode::ExportFailed => "Export failed",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UserAlreadyRegistered => "User is already registered",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
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
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::AccountPendingApproval),
            1009 => Ok(ErrorCode::AccountNotRegistered),

            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::CannotModifySelf),

            3001 => Ok(ErrorCode::SearchFailed),
            3002 => Ok(ErrorCode::CatalogSessionNotFound),
            3003 => Ok(ErrorCode::SearchSuperseded),

            4001 => Ok(ErrorCode::OrderNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4101 => Ok(ErrorCode::InquiryNotFound),

            5001 => Ok(ErrorCode::NotificationFailed),
            5002 => Ok(ErrorCode::NotificationDisabled),

            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6104 => Ok(ErrorCode::CategoryParentInvalid),

            7001 => Ok(ErrorCode::ImportParseFailed),
            7002 => Ok(ErrorCode::ImportUnsupportedFormat),
            7003 => Ok(ErrorCode::ImportConfirmationRequired),
            7004 => Ok(ErrorCode::ImportEmptyFile),
            7101 => Ok(ErrorCode::ExportFailed),

            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::UserAlreadyRegistered),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::AccountPendingApproval.code(), 1008);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::SearchFailed.code(), 3001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::NotificationFailed.code(), 5001);
        assert_eq!(ErrorCode::ProductNotFound.code(), 6001);
        assert_eq!(ErrorCode::ImportConfirmationRequired.code(), 7003);
        assert_eq!(ErrorCode::UserNotFound.code(), 8001);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_every_variant() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::RequiredField,
            ErrorCode::AccountNotRegistered,
            ErrorCode::CannotModifySelf,
            ErrorCode::CatalogSessionNotFound,
            ErrorCode::InquiryNotFound,
            ErrorCode::NotificationDisabled,
            ErrorCode::CategoryParentInvalid,
            ErrorCode::ExportFailed,
            ErrorCode::UserAlreadyRegistered,
            ErrorCode::ConfigError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::NotFound).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&ErrorCode::SearchFailed).unwrap(),
            "3001"
        );
        let code: ErrorCode = serde_json::from_str("7003").unwrap();
        assert_eq!(code, ErrorCode::ImportConfirmationRequired);
        assert!(serde_json::from_str::<ErrorCode>("999").is_err());
    }

    #[test]
    fn test_display_and_message() {
        assert_eq!(format!("{}", ErrorCode::InternalError), "9001");
        assert_eq!(ErrorCode::SearchFailed.message(), "Product search failed");
        assert_eq!(
            format!("{}", InvalidErrorCode(999)),
            "invalid error code: 999"
        );
    }
}
