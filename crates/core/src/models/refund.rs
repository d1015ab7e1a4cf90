//! Refund model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Refund states. Succeeded and Failed are terminal; a Failed refund is
/// retried by creating a fresh record, never by mutating the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    Pending,
    Succeeded,
    Failed,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::Pending => "pending",
            RefundStatus::Succeeded => "succeeded",
            RefundStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RefundStatus::Succeeded | RefundStatus::Failed)
    }
}

impl std::fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome reported by the refund gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundResolution {
    Succeeded,
    Failed,
}

/// A reversal of a settled payment.
///
/// A payment is considered refunded when a Succeeded refund exists for it;
/// the payment itself stays Paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub id: Uuid,
    pub payment_id: Uuid,
    /// Never exceeds the payment amount
    pub amount: i64,
    pub reason: String,
    pub status: RefundStatus,
    pub external_refund_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Refund {
    pub fn new(payment_id: Uuid, amount: i64, reason: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            payment_id,
            amount,
            reason,
            status: RefundStatus::Pending,
            external_refund_ref: None,
            created_at: now,
            updated_at: now,
        }
    }
}
