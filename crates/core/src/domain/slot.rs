use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::DomainError;

/// Wire format for slot times, shared with the booking backend API.
pub const SLOT_TIME_FORMAT: &str = "%I:%M %p";

/// Minute-precision time of day rendered as `HH:MM AM/PM` (e.g. `03:00 PM`).
///
/// The same convention is applied to stored slot times and to the reference
/// instant used for availability filtering, so comparisons never mix formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(pub NaiveTime);

impl SlotTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SLOT_TIME_FORMAT))
    }
}

impl FromStr for SlotTime {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(value.trim(), SLOT_TIME_FORMAT)
            .map(Self)
            .map_err(|_| DomainError::InvalidSlotTime { value: value.to_string() })
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(DeError::custom)
    }
}

/// A bookable (date, time) unit. Identity is the `(date, time)` pair; the
/// store guarantees no two slots share both fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub time: SlotTime,
    pub available: bool,
}

impl Slot {
    pub fn available(date: NaiveDate, time: SlotTime) -> Self {
        Self { date, time, available: true }
    }
}
