//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use crate::models::{Booking, BookingStatus, Payment, PaymentStatus, Refund};

/// The core safety property: no two blocking bookings for the same building
/// may overlap.
pub fn assert_no_blocking_overlap(bookings: &[Booking]) {
    for (i, a) in bookings.iter().enumerate() {
        if !a.status.is_blocking() {
            continue;
        }
        for b in bookings.iter().skip(i + 1) {
            if !b.status.is_blocking() || a.building_id != b.building_id {
                continue;
            }
            debug_assert!(
                !a.interval.overlaps(&b.interval),
                "Blocking bookings {} and {} overlap on building {}",
                a.id,
                b.id,
                a.building_id
            );
        }
    }
}

/// Validate that a booking's record is internally consistent
pub fn assert_booking_invariants(booking: &Booking) {
    debug_assert!(
        (booking.status == BookingStatus::Rejected) == booking.rejection_reason.is_some(),
        "Booking {} has status {} but rejection_reason {:?}",
        booking.id,
        booking.status,
        booking.rejection_reason
    );

    debug_assert!(
        booking.interval.validate().is_ok(),
        "Booking {} carries a malformed interval",
        booking.id
    );

    debug_assert!(
        !booking.activity_name.trim().is_empty(),
        "Booking {} has empty activity name",
        booking.id
    );
}

/// Validate that a payment's record is internally consistent
pub fn assert_payment_invariants(payment: &Payment) {
    debug_assert!(
        payment.amount > 0,
        "Payment {} has non-positive amount {}",
        payment.id,
        payment.amount
    );

    debug_assert!(
        payment.status != PaymentStatus::Paid || payment.external_transaction_ref.is_some(),
        "Payment {} is paid without a transaction ref",
        payment.id
    );
}

/// Validate that a refund stays within its payment
pub fn assert_refund_invariants(refund: &Refund, payment: &Payment) {
    debug_assert!(
        refund.payment_id == payment.id,
        "Refund {} checked against wrong payment {}",
        refund.id,
        payment.id
    );

    debug_assert!(
        refund.amount > 0 && refund.amount <= payment.amount,
        "Refund {} amount {} outside payment amount {}",
        refund.id,
        refund.amount,
        payment.amount
    );
}
