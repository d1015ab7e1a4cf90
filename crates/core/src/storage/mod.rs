//! SQLite storage layer for Balai

mod bookings;
mod migrations;
mod parse;
mod payments;
mod refunds;
mod traits;

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Booking, Payment, Refund};

pub use bookings::BookingStore;
pub use payments::PaymentStore;
pub use refunds::RefundStore;
pub use traits::{BookingRepository, PaymentRepository, RefundRepository, Storage};

/// Pause between retries of a busy transaction, long enough for a
/// competing write transaction to commit
const BUSY_RETRY_DELAY: Duration = Duration::from_millis(25);

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get booking store
    pub fn bookings(&self) -> BookingStore<'_> {
        BookingStore::new(&self.conn)
    }

    /// Get payment store
    pub fn payments(&self) -> PaymentStore<'_> {
        PaymentStore::new(&self.conn)
    }

    /// Get refund store
    pub fn refunds(&self) -> RefundStore<'_> {
        RefundStore::new(&self.conn)
    }

    /// Run `f` inside a BEGIN IMMEDIATE transaction.
    ///
    /// Immediate mode takes the write lock up front, so the reads `f` does
    /// (conflict checks, status guards) and its writes commit as one unit
    /// against a single consistent snapshot. Busy/locked failures are the
    /// one transient class: retried up to `retries` times, then surfaced as
    /// StoreUnavailable. Any error from `f` rolls the transaction back.
    pub(crate) fn immediate<T>(
        &mut self,
        retries: u32,
        mut f: impl FnMut(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut attempt = 0;
        loop {
            let tx = match self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
            {
                Ok(tx) => tx,
                Err(e) if is_busy(&e) => {
                    if attempt >= retries {
                        return Err(Error::StoreUnavailable(retries));
                    }
                    attempt += 1;
                    warn!(attempt, "store busy, retrying transaction");
                    std::thread::sleep(BUSY_RETRY_DELAY);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            match f(&tx) {
                Ok(value) => match tx.commit() {
                    Ok(()) => return Ok(value),
                    Err(e) if is_busy(&e) => {
                        if attempt >= retries {
                            return Err(Error::StoreUnavailable(retries));
                        }
                        attempt += 1;
                        warn!(attempt, "commit hit busy store, retrying transaction");
                        std::thread::sleep(BUSY_RETRY_DELAY);
                    }
                    Err(e) => return Err(e.into()),
                },
                Err(Error::Database(e)) if is_busy(&e) => {
                    if attempt >= retries {
                        return Err(Error::StoreUnavailable(retries));
                    }
                    attempt += 1;
                    warn!(attempt, "store busy mid-transaction, retrying");
                    std::thread::sleep(BUSY_RETRY_DELAY);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::DatabaseBusy
                || e.code == rusqlite::ErrorCode::DatabaseLocked
    )
}

// Repository trait implementations for Database.
// This enables using Database through the trait interface.

impl BookingRepository for Database {
    fn create_booking(&self, booking: &Booking) -> Result<()> {
        self.bookings().create(booking)
    }

    fn find_booking_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        self.bookings().find_by_id(id)
    }

    fn update_booking(&self, booking: &Booking) -> Result<()> {
        self.bookings().update(booking)
    }

    fn list_bookings_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>> {
        self.bookings().list_for_user(user_id)
    }

    fn list_bookings_for_building(&self, building_id: Uuid) -> Result<Vec<Booking>> {
        self.bookings().list_for_building(building_id)
    }
}

impl PaymentRepository for Database {
    fn create_payment(&self, payment: &Payment) -> Result<()> {
        self.payments().create(payment)
    }

    fn find_payment_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        self.payments().find_by_id(id)
    }

    fn update_payment(&self, payment: &Payment) -> Result<()> {
        self.payments().update(payment)
    }

    fn find_active_payment_for_booking(&self, booking_id: Uuid) -> Result<Option<Payment>> {
        self.payments().find_active_for_booking(booking_id)
    }

    fn list_payments_for_booking(&self, booking_id: Uuid) -> Result<Vec<Payment>> {
        self.payments().list_for_booking(booking_id)
    }
}

impl RefundRepository for Database {
    fn create_refund(&self, refund: &Refund) -> Result<()> {
        self.refunds().create(refund)
    }

    fn find_refund_by_id(&self, id: Uuid) -> Result<Option<Refund>> {
        self.refunds().find_by_id(id)
    }

    fn update_refund(&self, refund: &Refund) -> Result<()> {
        self.refunds().update(refund)
    }

    fn list_refunds_for_payment(&self, payment_id: Uuid) -> Result<Vec<Refund>> {
        self.refunds().list_for_payment(payment_id)
    }
}
