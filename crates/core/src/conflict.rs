//! Booking interval conflict detection
//!
//! Called from inside the same write transaction that commits the booking
//! insert or approval, so the check and the write are not separated by a
//! race window. Blocking bookings (processing, approved) reserve the slot;
//! rejected, cancelled and completed bookings never block.

use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::models::BookingInterval;
use crate::storage::BookingStore;

/// Returns the id of the first blocking booking whose interval overlaps the
/// candidate, or None if the slot is free. `exclude` skips one booking id,
/// used when a booking re-checks itself at approval time.
#[instrument(skip(store, interval))]
pub fn find_conflict(
    store: &BookingStore<'_>,
    building_id: Uuid,
    interval: &BookingInterval,
    exclude: Option<Uuid>,
) -> Result<Option<Uuid>> {
    let candidates =
        store.blocking_for_building(building_id, interval.start_date, interval.end_date)?;

    for existing in candidates {
        if Some(existing.id) == exclude {
            continue;
        }
        if existing.interval.overlaps(interval) {
            return Ok(Some(existing.id));
        }
    }

    Ok(None)
}

/// Convenience wrapper over find_conflict
pub fn has_conflict(
    store: &BookingStore<'_>,
    building_id: Uuid,
    interval: &BookingInterval,
    exclude: Option<Uuid>,
) -> Result<bool> {
    Ok(find_conflict(store, building_id, interval, exclude)?.is_some())
}
