use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::slot::SlotTime;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Covers both "no such slot" and "slot already booked". The external
    /// booking API reports a single merged signal and callers must not
    /// distinguish the two, so neither do we.
    #[error("Slot not available for {date} at {time}")]
    SlotNotAvailable { date: NaiveDate, time: SlotTime },
    #[error("duplicate slot seeded for {date} at {time}")]
    DuplicateSlot { date: NaiveDate, time: SlotTime },
    #[error("invalid slot time `{value}` (expected HH:MM AM/PM)")]
    InvalidSlotTime { value: String },
}
