//! Database value parsing utilities
//!
//! Provides error-safe parsing of stored values.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::types::Type;
use rusqlite::Error as SqlError;
use uuid::Uuid;

use crate::models::{BookingStatus, PaymentStatus, RefundStatus};

/// Parse a UUID from a database string column
pub fn parse_uuid(s: &str) -> Result<Uuid, SqlError> {
    Uuid::parse_str(s)
        .map_err(|e| SqlError::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// Parse a DateTime from an RFC3339 string
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, SqlError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SqlError::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// Parse a calendar date stored as YYYY-MM-DD
pub fn parse_date(s: &str) -> Result<NaiveDate, SqlError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| SqlError::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// Parse a time-of-day stored as HH:MM:SS
pub fn parse_time(s: &str) -> Result<NaiveTime, SqlError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .map_err(|e| SqlError::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

fn unknown_value(kind: &str, value: &str) -> SqlError {
    SqlError::FromSqlConversionFailure(
        0,
        Type::Text,
        format!("unknown {kind}: {value}").into(),
    )
}

/// Parse a booking status column. Unknown values are storage corruption
/// and surface as conversion errors, never as a default.
pub fn booking_status_from_str(s: &str) -> Result<BookingStatus, SqlError> {
    match s {
        "processing" => Ok(BookingStatus::Processing),
        "approved" => Ok(BookingStatus::Approved),
        "rejected" => Ok(BookingStatus::Rejected),
        "completed" => Ok(BookingStatus::Completed),
        "cancelled" => Ok(BookingStatus::Cancelled),
        other => Err(unknown_value("booking status", other)),
    }
}

/// Parse a payment status column
pub fn payment_status_from_str(s: &str) -> Result<PaymentStatus, SqlError> {
    match s {
        "unpaid" => Ok(PaymentStatus::Unpaid),
        "pending" => Ok(PaymentStatus::Pending),
        "paid" => Ok(PaymentStatus::Paid),
        "expired" => Ok(PaymentStatus::Expired),
        "failed" => Ok(PaymentStatus::Failed),
        other => Err(unknown_value("payment status", other)),
    }
}

/// Parse a refund status column
pub fn refund_status_from_str(s: &str) -> Result<RefundStatus, SqlError> {
    match s {
        "pending" => Ok(RefundStatus::Pending),
        "succeeded" => Ok(RefundStatus::Succeeded),
        "failed" => Ok(RefundStatus::Failed),
        other => Err(unknown_value("refund status", other)),
    }
}

/// Extension trait for converting rusqlite Results to Option
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, SqlError>;
}

impl<T> OptionalExt<T> for Result<T, SqlError> {
    fn optional(self) -> Result<Option<T>, SqlError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(SqlError::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(parse_date(&date.format("%Y-%m-%d").to_string()).unwrap(), date);
    }

    #[test]
    fn test_parse_time_roundtrip() {
        let time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        assert_eq!(parse_time(&time.format("%H:%M:%S").to_string()).unwrap(), time);
    }

    #[test]
    fn test_unknown_status_is_error() {
        assert!(booking_status_from_str("PROCESSING").is_err());
        assert!(payment_status_from_str("settled").is_err());
        assert!(refund_status_from_str("").is_err());
    }

    #[test]
    fn test_status_strings_roundtrip() {
        for status in BookingStatus::all() {
            assert_eq!(booking_status_from_str(status.as_str()).unwrap(), *status);
        }
    }
}
