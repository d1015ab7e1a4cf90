//! Notification dispatch seam
//!
//! Events are dispatched strictly after the owning transaction commits and
//! are fire-and-forget: a notifier must never fail the transition that
//! produced the event. Delivery guarantees are owned by the collaborator
//! behind the trait.

use serde::Serialize;
use uuid::Uuid;

use crate::models::CancelActor;

/// Status-transition events emitted by the core
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BookingEvent {
    BookingSubmitted {
        booking_id: Uuid,
    },
    BookingApproved {
        booking_id: Uuid,
        payment_id: Uuid,
    },
    BookingRejected {
        booking_id: Uuid,
    },
    BookingCancelled {
        booking_id: Uuid,
        actor: CancelActor,
        refund_id: Option<Uuid>,
    },
    BookingCompleted {
        booking_id: Uuid,
    },
    PaymentPending {
        payment_id: Uuid,
        booking_id: Uuid,
    },
    PaymentPaid {
        payment_id: Uuid,
        booking_id: Uuid,
    },
    PaymentExpired {
        payment_id: Uuid,
        booking_id: Uuid,
    },
    PaymentFailed {
        payment_id: Uuid,
        booking_id: Uuid,
    },
    RefundRequested {
        refund_id: Uuid,
        payment_id: Uuid,
    },
    RefundSucceeded {
        refund_id: Uuid,
    },
    RefundFailed {
        refund_id: Uuid,
    },
}

/// One-way notification dispatcher
pub trait Notifier {
    fn notify(&self, user_id: Uuid, event: &BookingEvent);
}

/// Default dispatcher: logs the event payload via tracing
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, user_id: Uuid, event: &BookingEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => tracing::info!(%user_id, %payload, "notification dispatched"),
            Err(e) => tracing::warn!(%user_id, error = %e, "notification payload not serializable"),
        }
    }
}
