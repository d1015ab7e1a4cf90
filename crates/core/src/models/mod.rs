//! Data models for Balai

mod booking;
mod interval;
mod payment;
mod refund;

pub use booking::*;
pub use interval::*;
pub use payment::*;
pub use refund::*;
