//! Payment storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, payment_status_from_str, OptionalExt};
use crate::error::Result;
use crate::models::Payment;

const PAYMENT_COLUMNS: &str =
    "id, booking_id, amount, method, status, external_transaction_ref, created_at, updated_at";

fn read_payment(row: &Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        booking_id: parse_uuid(&row.get::<_, String>(1)?)?,
        amount: row.get(2)?,
        method: row.get(3)?,
        status: payment_status_from_str(&row.get::<_, String>(4)?)?,
        external_transaction_ref: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(7)?)?,
    })
}

pub struct PaymentStore<'a> {
    conn: &'a Connection,
}

impl<'a> PaymentStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new payment
    #[instrument(skip(self, payment), fields(payment_id = %payment.id, booking_id = %payment.booking_id))]
    pub fn create(&self, payment: &Payment) -> Result<()> {
        self.conn.execute(
            "INSERT INTO payments (id, booking_id, amount, method, status,
                 external_transaction_ref, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                payment.id.to_string(),
                payment.booking_id.to_string(),
                payment.amount,
                payment.method,
                payment.status.as_str(),
                payment.external_transaction_ref,
                payment.created_at.to_rfc3339(),
                payment.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find payment by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"
        ))?;

        let payment = stmt
            .query_row(params![id.to_string()], read_payment)
            .optional()?;

        Ok(payment)
    }

    /// Update mutable columns: method, status, transaction ref, timestamp
    #[instrument(skip(self, payment), fields(payment_id = %payment.id, status = %payment.status))]
    pub fn update(&self, payment: &Payment) -> Result<()> {
        self.conn.execute(
            "UPDATE payments SET method = ?1, status = ?2, external_transaction_ref = ?3,
                 updated_at = ?4
             WHERE id = ?5",
            params![
                payment.method,
                payment.status.as_str(),
                payment.external_transaction_ref,
                payment.updated_at.to_rfc3339(),
                payment.id.to_string(),
            ],
        )?;
        Ok(())
    }

    /// The active (non-expired, non-failed) payment for a booking, if any.
    /// The ledger guarantees there is at most one.
    #[instrument(skip(self))]
    pub fn find_active_for_booking(&self, booking_id: Uuid) -> Result<Option<Payment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments
             WHERE booking_id = ?1 AND status NOT IN ('expired', 'failed')
             ORDER BY created_at DESC
             LIMIT 1"
        ))?;

        let payment = stmt
            .query_row(params![booking_id.to_string()], read_payment)
            .optional()?;

        Ok(payment)
    }

    /// All payment attempts for a booking, oldest first
    #[instrument(skip(self))]
    pub fn list_for_booking(&self, booking_id: Uuid) -> Result<Vec<Payment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE booking_id = ?1 ORDER BY created_at ASC"
        ))?;

        let payments = stmt
            .query_map(params![booking_id.to_string()], read_payment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(payments)
    }
}
