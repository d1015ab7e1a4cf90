//! Payment ledger operations
//!
//! Settlement follows Unpaid -> Pending -> Paid | Expired | Failed. Paid is
//! reached once; the gateway's webhook may retry, so settling again with the
//! identical transaction ref is a no-op while a different ref is a conflict.
//! Settling a payment does not complete its booking; completion additionally
//! waits for the interval to elapse.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::invariants::assert_payment_invariants;
use crate::lifecycle::BookingService;
use crate::models::{Payment, PaymentStatus};
use crate::notify::BookingEvent;
use crate::storage::{BookingStore, PaymentStore};

impl BookingService {
    /// Record that a gateway session opened for the payment
    #[instrument(skip(self, method, external_ref))]
    pub fn record_payment_pending(
        &mut self,
        payment_id: Uuid,
        method: &str,
        external_ref: &str,
    ) -> Result<Payment> {
        let retries = self.config.busy_retries;
        let (payment, user_id) = self.db.immediate(retries, |tx| {
            let payments = PaymentStore::new(tx);
            let mut payment = require_payment(&payments, payment_id)?;

            if payment.status != PaymentStatus::Unpaid {
                return Err(invalid_payment_transition(payment.status, "mark pending"));
            }

            payment.status = PaymentStatus::Pending;
            payment.method = Some(method.to_string());
            payment.external_transaction_ref = Some(external_ref.to_string());
            payment.updated_at = Utc::now();
            payments.update(&payment)?;

            let user_id = booking_owner(tx, payment.booking_id)?;
            Ok((payment, user_id))
        })?;

        info!(%payment_id, "payment pending");
        self.notifier.notify(
            user_id,
            &BookingEvent::PaymentPending {
                payment_id,
                booking_id: payment.booking_id,
            },
        );
        Ok(payment)
    }

    /// Record gateway settlement. Idempotent for webhook retries carrying
    /// the same transaction ref.
    ///
    /// Settlement is accepted even when the booking was cancelled after the
    /// gateway session opened; the webhook races the cancellation and the
    /// money has already moved. Such a payment is Paid on a cancelled
    /// booking and is recovered through `request_refund`.
    #[instrument(skip(self, external_ref))]
    pub fn record_payment_paid(&mut self, payment_id: Uuid, external_ref: &str) -> Result<Payment> {
        let retries = self.config.busy_retries;
        let (payment, user_id, newly_paid) = self.db.immediate(retries, |tx| {
            let payments = PaymentStore::new(tx);
            let mut payment = require_payment(&payments, payment_id)?;

            match payment.status {
                PaymentStatus::Paid => {
                    // Webhook retry. Same ref: already settled, nothing to do.
                    if payment.external_transaction_ref.as_deref() == Some(external_ref) {
                        let user_id = booking_owner(tx, payment.booking_id)?;
                        return Ok((payment, user_id, false));
                    }
                    Err(Error::Conflict(payment.id))
                }
                PaymentStatus::Pending => {
                    if let Some(recorded) = payment.external_transaction_ref.as_deref() {
                        if recorded != external_ref {
                            return Err(Error::Conflict(payment.id));
                        }
                    }

                    payment.status = PaymentStatus::Paid;
                    payment.external_transaction_ref = Some(external_ref.to_string());
                    payment.updated_at = Utc::now();
                    payments.update(&payment)?;
                    assert_payment_invariants(&payment);

                    let user_id = booking_owner(tx, payment.booking_id)?;
                    Ok((payment, user_id, true))
                }
                other => Err(invalid_payment_transition(other, "mark paid")),
            }
        })?;

        if newly_paid {
            info!(%payment_id, "payment settled");
            self.notifier.notify(
                user_id,
                &BookingEvent::PaymentPaid {
                    payment_id,
                    booking_id: payment.booking_id,
                },
            );
        }
        Ok(payment)
    }

    /// Record that the gateway session expired before settlement
    #[instrument(skip(self))]
    pub fn record_payment_expired(&mut self, payment_id: Uuid) -> Result<Payment> {
        self.close_pending_payment(payment_id, PaymentStatus::Expired, "mark expired")
    }

    /// Record a gateway failure
    #[instrument(skip(self))]
    pub fn record_payment_failed(&mut self, payment_id: Uuid) -> Result<Payment> {
        self.close_pending_payment(payment_id, PaymentStatus::Failed, "mark failed")
    }

    fn close_pending_payment(
        &mut self,
        payment_id: Uuid,
        to: PaymentStatus,
        action: &'static str,
    ) -> Result<Payment> {
        let retries = self.config.busy_retries;
        let (payment, user_id) = self.db.immediate(retries, |tx| {
            let payments = PaymentStore::new(tx);
            let mut payment = require_payment(&payments, payment_id)?;

            if payment.status != PaymentStatus::Pending {
                return Err(invalid_payment_transition(payment.status, action));
            }

            payment.status = to;
            payment.updated_at = Utc::now();
            payments.update(&payment)?;

            let user_id = booking_owner(tx, payment.booking_id)?;
            Ok((payment, user_id))
        })?;

        info!(%payment_id, status = %to, "payment closed without settlement");
        let event = match to {
            PaymentStatus::Expired => BookingEvent::PaymentExpired {
                payment_id,
                booking_id: payment.booking_id,
            },
            _ => BookingEvent::PaymentFailed {
                payment_id,
                booking_id: payment.booking_id,
            },
        };
        self.notifier.notify(user_id, &event);
        Ok(payment)
    }
}

fn require_payment(store: &PaymentStore<'_>, payment_id: Uuid) -> Result<Payment> {
    store
        .find_by_id(payment_id)?
        .ok_or_else(|| Error::NotFound(format!("payment {payment_id}")))
}

fn invalid_payment_transition(from: PaymentStatus, action: &'static str) -> Error {
    Error::InvalidTransition {
        entity: "payment",
        from: from.as_str(),
        action,
    }
}

fn booking_owner(tx: &rusqlite::Transaction<'_>, booking_id: Uuid) -> Result<Uuid> {
    let booking = BookingStore::new(tx)
        .find_by_id(booking_id)?
        .ok_or_else(|| Error::NotFound(format!("booking {booking_id}")))?;
    Ok(booking.user_id)
}
