//! Balai Core Library
//!
//! Booking lifecycle, conflict detection, payment ledger, refund processing,
//! and SQLite storage for the Balai rental platform.

pub mod clock;
pub mod config;
pub mod conflict;
pub mod error;
pub mod invariants;
mod ledger;
pub mod lifecycle;
pub mod models;
pub mod notify;
mod refund;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CoreConfig;
pub use conflict::{find_conflict, has_conflict};
pub use error::{Error, Result};
pub use lifecycle::BookingService;
pub use models::*;
pub use notify::{BookingEvent, LogNotifier, Notifier};
pub use storage::{
    BookingRepository, BookingStore, Database, PaymentRepository, PaymentStore, RefundRepository,
    RefundStore, Storage,
};
