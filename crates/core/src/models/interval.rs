//! Booking interval value type and overlap comparison

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A reservation window: an inclusive date range with a daily time window.
///
/// Multi-day bookings repeat the same time window on every day of the date
/// range. The time window is half-open, so a booking ending at 11:00 does
/// not collide with one starting at 11:00 on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInterval {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl BookingInterval {
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            start_date,
            end_date,
            start_time,
            end_time,
        }
    }

    /// Single-day interval
    pub fn single_day(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self::new(date, date, start_time, end_time)
    }

    /// Check that the interval is well-formed: start date not after end date,
    /// daily window strictly positive.
    pub fn validate(&self) -> Result<()> {
        if self.start_date > self.end_date {
            return Err(Error::Validation(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        if self.end_time <= self.start_time {
            return Err(Error::Validation(format!(
                "end time {} is not after start time {}",
                self.end_time, self.start_time
            )));
        }
        Ok(())
    }

    /// True iff the date ranges intersect and, on any shared date, the daily
    /// time windows intersect. Time comparison is half-open on the end.
    pub fn overlaps(&self, other: &BookingInterval) -> bool {
        let dates_intersect =
            self.start_date <= other.end_date && other.start_date <= self.end_date;
        let times_intersect =
            self.start_time < other.end_time && other.start_time < self.end_time;
        dates_intersect && times_intersect
    }

    /// True once the whole interval lies strictly in the past of `today`.
    pub fn has_elapsed(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }
}
