//! Storage repository traits
//!
//! These traits define the read/write interface the surrounding application
//! consumes, allowing for different implementations (SQLite, mock). State
//! transitions go through the service layer, which composes the same stores
//! inside a write transaction.

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Booking, Payment, Refund};

/// Booking repository operations
pub trait BookingRepository {
    /// Insert a new booking
    fn create_booking(&self, booking: &Booking) -> Result<()>;

    /// Find booking by ID
    fn find_booking_by_id(&self, id: Uuid) -> Result<Option<Booking>>;

    /// Update a booking's mutable columns
    fn update_booking(&self, booking: &Booking) -> Result<()>;

    /// List bookings submitted by a user
    fn list_bookings_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>>;

    /// List bookings for a building, history included
    fn list_bookings_for_building(&self, building_id: Uuid) -> Result<Vec<Booking>>;
}

/// Payment repository operations
pub trait PaymentRepository {
    /// Insert a new payment
    fn create_payment(&self, payment: &Payment) -> Result<()>;

    /// Find payment by ID
    fn find_payment_by_id(&self, id: Uuid) -> Result<Option<Payment>>;

    /// Update a payment's mutable columns
    fn update_payment(&self, payment: &Payment) -> Result<()>;

    /// The active payment for a booking, if any
    fn find_active_payment_for_booking(&self, booking_id: Uuid) -> Result<Option<Payment>>;

    /// All payment attempts for a booking
    fn list_payments_for_booking(&self, booking_id: Uuid) -> Result<Vec<Payment>>;
}

/// Refund repository operations
pub trait RefundRepository {
    /// Insert a new refund
    fn create_refund(&self, refund: &Refund) -> Result<()>;

    /// Find refund by ID
    fn find_refund_by_id(&self, id: Uuid) -> Result<Option<Refund>>;

    /// Update a refund's mutable columns
    fn update_refund(&self, refund: &Refund) -> Result<()>;

    /// All refund attempts for a payment
    fn list_refunds_for_payment(&self, payment_id: Uuid) -> Result<Vec<Refund>>;
}

/// Combined storage interface
pub trait Storage: BookingRepository + PaymentRepository + RefundRepository {}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where T: BookingRepository + PaymentRepository + RefundRepository {}
