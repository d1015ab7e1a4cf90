//! Booking storage operations

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{
    booking_status_from_str, parse_date, parse_datetime, parse_time, parse_uuid, OptionalExt,
};
use crate::error::Result;
use crate::models::{Booking, BookingInterval};

const BOOKING_COLUMNS: &str = "id, user_id, building_id, activity_name, start_date, end_date, \
     start_time, end_time, status, rejection_reason, proposal_document_ref, created_at, updated_at";

fn read_booking(row: &Row<'_>) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        user_id: parse_uuid(&row.get::<_, String>(1)?)?,
        building_id: parse_uuid(&row.get::<_, String>(2)?)?,
        activity_name: row.get(3)?,
        interval: BookingInterval {
            start_date: parse_date(&row.get::<_, String>(4)?)?,
            end_date: parse_date(&row.get::<_, String>(5)?)?,
            start_time: parse_time(&row.get::<_, String>(6)?)?,
            end_time: parse_time(&row.get::<_, String>(7)?)?,
        },
        status: booking_status_from_str(&row.get::<_, String>(8)?)?,
        rejection_reason: row.get(9)?,
        proposal_document_ref: row.get(10)?,
        created_at: parse_datetime(&row.get::<_, String>(11)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(12)?)?,
    })
}

pub struct BookingStore<'a> {
    conn: &'a Connection,
}

impl<'a> BookingStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new booking
    #[instrument(skip(self, booking), fields(booking_id = %booking.id, building_id = %booking.building_id))]
    pub fn create(&self, booking: &Booking) -> Result<()> {
        self.conn.execute(
            "INSERT INTO bookings (id, user_id, building_id, activity_name, start_date, end_date,
                 start_time, end_time, status, rejection_reason, proposal_document_ref, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                booking.id.to_string(),
                booking.user_id.to_string(),
                booking.building_id.to_string(),
                booking.activity_name,
                booking.interval.start_date.format("%Y-%m-%d").to_string(),
                booking.interval.end_date.format("%Y-%m-%d").to_string(),
                booking.interval.start_time.format("%H:%M:%S").to_string(),
                booking.interval.end_time.format("%H:%M:%S").to_string(),
                booking.status.as_str(),
                booking.rejection_reason,
                booking.proposal_document_ref,
                booking.created_at.to_rfc3339(),
                booking.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find booking by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"
        ))?;

        let booking = stmt
            .query_row(params![id.to_string()], read_booking)
            .optional()?;

        Ok(booking)
    }

    /// Update status, rejection reason, and the updated-at timestamp.
    /// Identity and interval columns are immutable after insert.
    #[instrument(skip(self, booking), fields(booking_id = %booking.id, status = %booking.status))]
    pub fn update(&self, booking: &Booking) -> Result<()> {
        self.conn.execute(
            "UPDATE bookings SET status = ?1, rejection_reason = ?2, updated_at = ?3
             WHERE id = ?4",
            params![
                booking.status.as_str(),
                booking.rejection_reason,
                booking.updated_at.to_rfc3339(),
                booking.id.to_string(),
            ],
        )?;
        Ok(())
    }

    /// List all bookings submitted by a user, newest first
    #[instrument(skip(self))]
    pub fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = ?1 ORDER BY created_at DESC"
        ))?;

        let bookings = stmt
            .query_map(params![user_id.to_string()], read_booking)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(bookings)
    }

    /// List all bookings for a building, oldest first
    #[instrument(skip(self))]
    pub fn list_for_building(&self, building_id: Uuid) -> Result<Vec<Booking>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE building_id = ?1 ORDER BY created_at ASC"
        ))?;

        let bookings = stmt
            .query_map(params![building_id.to_string()], read_booking)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(bookings)
    }

    /// Blocking bookings for a building whose date range intersects the given
    /// one. The time-window comparison happens in the conflict checker; this
    /// query narrows the candidate set with the indexed date columns.
    #[instrument(skip(self))]
    pub fn blocking_for_building(
        &self,
        building_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Booking>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
             WHERE building_id = ?1
               AND status IN ('processing', 'approved')
               AND start_date <= ?3
               AND end_date >= ?2
             ORDER BY created_at ASC"
        ))?;

        let bookings = stmt
            .query_map(
                params![
                    building_id.to_string(),
                    start_date.format("%Y-%m-%d").to_string(),
                    end_date.format("%Y-%m-%d").to_string(),
                ],
                read_booking,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(bookings)
    }
}
