//! Refund processor
//!
//! Refunds reverse settled payments of cancelled (or rejected-after-payment)
//! bookings. The stock policy is full refunds; partial amounts are accepted
//! only when enabled in CoreConfig. A Failed refund is retried by requesting
//! again, which inserts a fresh record; the payment stays Paid throughout,
//! and readers derive "refunded" from the existence of a Succeeded refund.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::invariants::assert_refund_invariants;
use crate::lifecycle::BookingService;
use crate::models::{BookingStatus, PaymentStatus, Refund, RefundResolution, RefundStatus};
use crate::notify::BookingEvent;
use crate::storage::{BookingStore, PaymentStore, RefundStore};

impl BookingService {
    /// Open a Pending refund for a settled payment.
    ///
    /// `amount = None` refunds the full payment amount. An explicit amount
    /// is only accepted when partial refunds are enabled.
    #[instrument(skip(self, reason))]
    pub fn request_refund(
        &mut self,
        payment_id: Uuid,
        reason: &str,
        amount: Option<i64>,
    ) -> Result<Refund> {
        if reason.trim().is_empty() {
            return Err(Error::Validation("refund reason must not be empty".into()));
        }

        let allow_partial = self.config.allow_partial_refunds;
        let retries = self.config.busy_retries;

        let (refund, user_id) = self.db.immediate(retries, |tx| {
            let payments = PaymentStore::new(tx);
            let payment = payments
                .find_by_id(payment_id)?
                .ok_or_else(|| Error::NotFound(format!("payment {payment_id}")))?;

            if payment.status != PaymentStatus::Paid {
                return Err(Error::IneligibleForRefund(format!(
                    "payment {payment_id} is {}, only settled payments can be refunded",
                    payment.status
                )));
            }

            let booking = BookingStore::new(tx)
                .find_by_id(payment.booking_id)?
                .ok_or_else(|| Error::NotFound(format!("booking {}", payment.booking_id)))?;

            if !matches!(
                booking.status,
                BookingStatus::Cancelled | BookingStatus::Rejected
            ) {
                return Err(Error::IneligibleForRefund(format!(
                    "booking {} is {}, refunds require a cancelled or rejected booking",
                    booking.id, booking.status
                )));
            }

            let refunds = RefundStore::new(tx);
            if refunds.has_settling_refund(payment_id)? {
                return Err(Error::IneligibleForRefund(format!(
                    "payment {payment_id} already has a pending or succeeded refund"
                )));
            }

            let amount = match amount {
                None => payment.amount,
                Some(_) if !allow_partial => {
                    return Err(Error::Validation(
                        "partial refunds are disabled by policy".into(),
                    ))
                }
                Some(a) if a <= 0 || a > payment.amount => {
                    return Err(Error::Validation(format!(
                        "refund amount {a} outside payment amount {}",
                        payment.amount
                    )))
                }
                Some(a) => a,
            };

            let refund = Refund::new(payment_id, amount, reason.to_string());
            refunds.create(&refund)?;
            assert_refund_invariants(&refund, &payment);

            Ok((refund, booking.user_id))
        })?;

        info!(refund_id = %refund.id, %payment_id, "refund requested");
        self.notifier.notify(
            user_id,
            &BookingEvent::RefundRequested {
                refund_id: refund.id,
                payment_id,
            },
        );
        Ok(refund)
    }

    /// Record the gateway's terminal verdict for a Pending refund
    #[instrument(skip(self, external_ref))]
    pub fn resolve_refund(
        &mut self,
        refund_id: Uuid,
        resolution: RefundResolution,
        external_ref: Option<&str>,
    ) -> Result<Refund> {
        let retries = self.config.busy_retries;
        let (refund, user_id) = self.db.immediate(retries, |tx| {
            let refunds = RefundStore::new(tx);
            let mut refund = refunds
                .find_by_id(refund_id)?
                .ok_or_else(|| Error::NotFound(format!("refund {refund_id}")))?;

            if refund.status != RefundStatus::Pending {
                return Err(Error::InvalidTransition {
                    entity: "refund",
                    from: refund.status.as_str(),
                    action: "resolve",
                });
            }

            refund.status = match resolution {
                RefundResolution::Succeeded => RefundStatus::Succeeded,
                RefundResolution::Failed => RefundStatus::Failed,
            };
            // The gateway ref is kept for failed attempts too; it identifies
            // the attempt when the failure is taken up with the gateway.
            refund.external_refund_ref = external_ref.map(str::to_string);
            refund.updated_at = Utc::now();
            refunds.update(&refund)?;

            let payment = PaymentStore::new(tx)
                .find_by_id(refund.payment_id)?
                .ok_or_else(|| Error::NotFound(format!("payment {}", refund.payment_id)))?;
            let booking = BookingStore::new(tx)
                .find_by_id(payment.booking_id)?
                .ok_or_else(|| Error::NotFound(format!("booking {}", payment.booking_id)))?;

            Ok((refund, booking.user_id))
        })?;

        info!(%refund_id, status = %refund.status, "refund resolved");
        let event = match refund.status {
            RefundStatus::Succeeded => BookingEvent::RefundSucceeded { refund_id },
            _ => BookingEvent::RefundFailed { refund_id },
        };
        self.notifier.notify(user_id, &event);
        Ok(refund)
    }
}
