//! Refund storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, refund_status_from_str, OptionalExt};
use crate::error::Result;
use crate::models::Refund;

const REFUND_COLUMNS: &str =
    "id, payment_id, amount, reason, status, external_refund_ref, created_at, updated_at";

fn read_refund(row: &Row<'_>) -> rusqlite::Result<Refund> {
    Ok(Refund {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        payment_id: parse_uuid(&row.get::<_, String>(1)?)?,
        amount: row.get(2)?,
        reason: row.get(3)?,
        status: refund_status_from_str(&row.get::<_, String>(4)?)?,
        external_refund_ref: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(7)?)?,
    })
}

pub struct RefundStore<'a> {
    conn: &'a Connection,
}

impl<'a> RefundStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new refund
    #[instrument(skip(self, refund), fields(refund_id = %refund.id, payment_id = %refund.payment_id))]
    pub fn create(&self, refund: &Refund) -> Result<()> {
        self.conn.execute(
            "INSERT INTO refunds (id, payment_id, amount, reason, status,
                 external_refund_ref, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                refund.id.to_string(),
                refund.payment_id.to_string(),
                refund.amount,
                refund.reason,
                refund.status.as_str(),
                refund.external_refund_ref,
                refund.created_at.to_rfc3339(),
                refund.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find refund by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Refund>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REFUND_COLUMNS} FROM refunds WHERE id = ?1"
        ))?;

        let refund = stmt
            .query_row(params![id.to_string()], read_refund)
            .optional()?;

        Ok(refund)
    }

    /// Update status, gateway ref, and timestamp
    #[instrument(skip(self, refund), fields(refund_id = %refund.id, status = %refund.status))]
    pub fn update(&self, refund: &Refund) -> Result<()> {
        self.conn.execute(
            "UPDATE refunds SET status = ?1, external_refund_ref = ?2, updated_at = ?3
             WHERE id = ?4",
            params![
                refund.status.as_str(),
                refund.external_refund_ref,
                refund.updated_at.to_rfc3339(),
                refund.id.to_string(),
            ],
        )?;
        Ok(())
    }

    /// All refund attempts for a payment, oldest first
    #[instrument(skip(self))]
    pub fn list_for_payment(&self, payment_id: Uuid) -> Result<Vec<Refund>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REFUND_COLUMNS} FROM refunds WHERE payment_id = ?1 ORDER BY created_at ASC"
        ))?;

        let refunds = stmt
            .query_map(params![payment_id.to_string()], read_refund)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(refunds)
    }

    /// True if a refund for this payment is still pending or has succeeded.
    /// Only a Failed trail leaves the payment open for another attempt.
    #[instrument(skip(self))]
    pub fn has_settling_refund(&self, payment_id: Uuid) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM refunds
             WHERE payment_id = ?1 AND status IN ('pending', 'succeeded')",
            params![payment_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
