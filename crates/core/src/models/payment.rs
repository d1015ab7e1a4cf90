//! Payment model and settlement states

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Settlement states of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Opened at approval, no gateway session yet
    Unpaid,
    /// Gateway session opened, awaiting confirmation
    Pending,
    /// Settled. Irreversible except through a refund.
    Paid,
    /// Gateway session expired before settlement
    Expired,
    /// Gateway reported failure
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Failed => "failed",
        }
    }

    /// An active payment still counts against the one-payment-per-booking
    /// rule. Expired and Failed payments free the slot for a new attempt.
    pub fn is_active(&self) -> bool {
        !matches!(self, PaymentStatus::Expired | PaymentStatus::Failed)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Monetary settlement for an approved booking.
///
/// Amounts are in minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: i64,
    /// Gateway payment method, known once the session opens
    pub method: Option<String>,
    pub status: PaymentStatus,
    /// Gateway transaction reference, recorded at session open and checked
    /// on settlement for webhook-retry idempotence
    pub external_transaction_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(booking_id: Uuid, amount: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            booking_id,
            amount,
            method: None,
            status: PaymentStatus::Unpaid,
            external_transaction_ref: None,
            created_at: now,
            updated_at: now,
        }
    }
}
