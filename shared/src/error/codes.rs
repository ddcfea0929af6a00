//! Unified error codes for the POS service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Tenant errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Menu errors
//! - 7xxx: Floor errors (tables, waiter calls, valet)
//! - 8xxx: Staff errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire so the frontend can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 1,
    /// Resource not found
    NotFound = 2,
    /// Resource already exists
    AlreadyExists = 3,
    /// Required field missing
    RequiredField = 4,
    /// Too many requests from one client
    TooManyRequests = 5,

    // ==================== 1xxx: Auth ====================
    /// Invalid credentials (email/password)
    InvalidCredentials = 1001,
    /// Password too short
    PasswordTooShort = 1002,
    /// Verification code expired or never issued
    VerificationCodeExpired = 1003,
    /// Verification code does not match
    VerificationCodeInvalid = 1004,
    /// Too many verification attempts
    TooManyAttempts = 1005,
    /// No account registered for this email
    EmailNotRegistered = 1006,

    // ==================== 3xxx: Tenant ====================
    /// Restaurant not found
    RestaurantNotFound = 3001,
    /// Restaurant identifier is not a valid key
    InvalidRestaurantId = 3002,
    /// Subscription has expired
    SubscriptionExpired = 3003,
    /// Restaurant is on hold
    RestaurantOnHold = 3004,
    /// Restaurant is suspended
    RestaurantSuspended = 3005,
    /// GST number has an invalid shape
    InvalidGstNumber = 3006,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order has no items
    OrderEmpty = 4003,
    /// Unknown order status
    InvalidOrderStatus = 4004,
    /// Order field cannot be edited
    OrderFieldNotEditable = 4005,

    // ==================== 5xxx: Payment ====================
    /// Payment mode is required
    PaymentModeRequired = 5001,
    /// Amount must not be negative
    InvalidAmount = 5002,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Category not found
    CategoryNotFound = 6002,
    /// Category name already exists
    CategoryNameExists = 6003,
    /// Category cannot be deleted
    CategoryProtected = 6004,
    /// Poll not found
    PollNotFound = 6005,
    /// Poll option not found
    PollOptionNotFound = 6006,
    /// Inventory item not found
    InventoryItemNotFound = 6007,

    // ==================== 7xxx: Floor ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table has an unpaid order
    TableOccupied = 7002,
    /// Waiter call not found
    WaiterCallNotFound = 7003,
    /// Valet ticket not found
    ValetTicketNotFound = 7004,

    // ==================== 8xxx: Staff ====================
    /// Staff member not found
    StaffNotFound = 8001,
    /// Staff email already exists
    StaffEmailExists = 8002,
    /// Attendance record not found
    AttendanceNotFound = 8003,
    /// Attendance already checked out
    AlreadyCheckedOut = 8004,
    /// Expense not found
    ExpenseNotFound = 8005,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Outgoing email could not be delivered
    EmailDeliveryFailed = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::RequiredField => "Required field is missing",
            Self::TooManyRequests => "Too many requests, try again later",

            // Auth
            Self::InvalidCredentials => "Invalid email or password",
            Self::PasswordTooShort => "Password is too short",
            Self::VerificationCodeExpired => "Verification code has expired",
            Self::VerificationCodeInvalid => "Verification code is invalid",
            Self::TooManyAttempts => "Too many attempts",
            Self::EmailNotRegistered => "Email not registered",

            // Tenant
            Self::RestaurantNotFound => "Restaurant not found",
            Self::InvalidRestaurantId => "Invalid restaurant id",
            Self::SubscriptionExpired => "Subscription has expired",
            Self::RestaurantOnHold => "Restaurant account is on hold",
            Self::RestaurantSuspended => "Restaurant account is suspended",
            Self::InvalidGstNumber => "Invalid GST number",

            // Order
            Self::OrderNotFound => "Order not found",
            Self::OrderAlreadyPaid => "Order has already been paid",
            Self::OrderEmpty => "Order has no items",
            Self::InvalidOrderStatus => "Invalid order status",
            Self::OrderFieldNotEditable => "Field cannot be edited",

            // Payment
            Self::PaymentModeRequired => "Payment mode is required",
            Self::InvalidAmount => "Amount must not be negative",

            // Menu
            Self::MenuItemNotFound => "Menu item not found",
            Self::CategoryNotFound => "Category not found",
            Self::CategoryNameExists => "Category name already exists",
            Self::CategoryProtected => "Category cannot be deleted",
            Self::PollNotFound => "Poll not found",
            Self::PollOptionNotFound => "Poll option not found",
            Self::InventoryItemNotFound => "Inventory item not found",

            // Floor
            Self::TableNotFound => "Table not found",
            Self::TableOccupied => "Table has an unpaid order",
            Self::WaiterCallNotFound => "Waiter call not found",
            Self::ValetTicketNotFound => "Valet ticket not found",

            // Staff
            Self::StaffNotFound => "Staff member not found",
            Self::StaffEmailExists => "Staff email already exists",
            Self::AttendanceNotFound => "Attendance record not found",
            Self::AlreadyCheckedOut => "Already checked out",
            Self::ExpenseNotFound => "Expense not found",

            // System
            Self::InternalError => "Internal server error",
            Self::EmailDeliveryFailed => "Email could not be sent",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown u16 to ErrorCode
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
            1 => Ok(Self::ValidationFailed),
            2 => Ok(Self::NotFound),
            3 => Ok(Self::AlreadyExists),
            4 => Ok(Self::RequiredField),
            5 => Ok(Self::TooManyRequests),

            // Auth
            1001 => Ok(Self::InvalidCredentials),
            1002 => Ok(Self::PasswordTooShort),
            1003 => Ok(Self::VerificationCodeExpired),
            1004 => Ok(Self::VerificationCodeInvalid),
            1005 => Ok(Self::TooManyAttempts),
            1006 => Ok(Self::EmailNotRegistered),

            // Tenant
            3001 => Ok(Self::RestaurantNotFound),
            3002 => Ok(Self::InvalidRestaurantId),
            3003 => Ok(Self::SubscriptionExpired),
            3004 => Ok(Self::RestaurantOnHold),
            3005 => Ok(Self::RestaurantSuspended),
            3006 => Ok(Self::InvalidGstNumber),

            // Order
            4001 => Ok(Self::OrderNotFound),
            4002 => Ok(Self::OrderAlreadyPaid),
            4003 => Ok(Self::OrderEmpty),
            4004 => Ok(Self::InvalidOrderStatus),
            4005 => Ok(Self::OrderFieldNotEditable),

            // Payment
            5001 => Ok(Self::PaymentModeRequired),
            5002 => Ok(Self::InvalidAmount),

            // Menu
            6001 => Ok(Self::MenuItemNotFound),
            6002 => Ok(Self::CategoryNotFound),
            6003 => Ok(Self::CategoryNameExists),
            6004 => Ok(Self::CategoryProtected),
            6005 => Ok(Self::PollNotFound),
            6006 => Ok(Self::PollOptionNotFound),
            6007 => Ok(Self::InventoryItemNotFound),

            // Floor
            7001 => Ok(Self::TableNotFound),
            7002 => Ok(Self::TableOccupied),
            7003 => Ok(Self::WaiterCallNotFound),
            7004 => Ok(Self::ValetTicketNotFound),

            // Staff
            8001 => Ok(Self::StaffNotFound),
            8002 => Ok(Self::StaffEmailExists),
            8003 => Ok(Self::AttendanceNotFound),
            8004 => Ok(Self::AlreadyCheckedOut),
            8005 => Ok(Self::ExpenseNotFound),

            // System
            9001 => Ok(Self::InternalError),
            9004 => Ok(Self::EmailDeliveryFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::ValidationFailed.code(), 1);
        assert_eq!(ErrorCode::TooManyRequests.code(), 5);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1001);
        assert_eq!(ErrorCode::RestaurantNotFound.code(), 3001);
        assert_eq!(ErrorCode::OrderAlreadyPaid.code(), 4002);
        assert_eq!(ErrorCode::TableOccupied.code(), 7002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(4001), Ok(ErrorCode::OrderNotFound));
        assert_eq!(ErrorCode::try_from(6003), Ok(ErrorCode::CategoryNameExists));
        assert_eq!(ErrorCode::try_from(8004), Ok(ErrorCode::AlreadyCheckedOut));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
        assert_eq!(
            InvalidErrorCode(4999).to_string(),
            "invalid error code: 4999"
        );
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");
        let code: ErrorCode = serde_json::from_str("7002").unwrap();
        assert_eq!(code, ErrorCode::TableOccupied);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::RequiredField.to_string(), "E0004");
        assert_eq!(ErrorCode::OrderEmpty.to_string(), "E4003");
    }

    #[test]
    fn test_every_code_round_trips() {
        for raw in (0..10).chain(1000..10000) {
            if let Ok(code) = ErrorCode::try_from(raw) {
                assert_eq!(code.code(), raw);
                assert!(!code.message().is_empty());
            }
        }
    }
}
