//! Booking model and lifecycle states

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BookingInterval;

/// Lifecycle states of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Submitted, awaiting admin decision
    Processing,
    /// Accepted; a payment has been opened for it
    Approved,
    /// Declined with a reason
    Rejected,
    /// Interval elapsed with a settled payment
    Completed,
    /// Withdrawn by the user or an admin before completion
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Processing => "processing",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Blocking statuses reserve the slot and participate in conflict checks.
    /// Processing blocks optimistically so two concurrent requests cannot
    /// both reach approval for the same slot.
    pub fn is_blocking(&self) -> bool {
        matches!(self, BookingStatus::Processing | BookingStatus::Approved)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Completed | BookingStatus::Cancelled
        )
    }

    /// All states, for exhaustive transition checks
    pub fn all() -> &'static [BookingStatus] {
        &[
            BookingStatus::Processing,
            BookingStatus::Approved,
            BookingStatus::Rejected,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ]
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who initiated a cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelActor {
    User,
    Admin,
}

impl CancelActor {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelActor::User => "user",
            CancelActor::Admin => "admin",
        }
    }
}

/// A request to reserve a building for an activity during an interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub building_id: Uuid,
    pub activity_name: String,
    pub interval: BookingInterval,
    pub status: BookingStatus,
    /// Present iff status is Rejected
    pub rejection_reason: Option<String>,
    /// Opaque reference to the uploaded proposal letter
    pub proposal_document_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        user_id: Uuid,
        building_id: Uuid,
        interval: BookingInterval,
        activity_name: String,
        proposal_document_ref: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            building_id,
            activity_name,
            interval,
            status: BookingStatus::Processing,
            rejection_reason: None,
            proposal_document_ref,
            created_at: now,
            updated_at: now,
        }
    }
}
