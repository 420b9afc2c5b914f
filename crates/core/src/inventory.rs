//! In-memory slot inventory.
//!
//! The store is the single writer for slot availability. All state sits in
//! one `BTreeMap` keyed by `(date, time)` behind a mutex, which gives both
//! the atomic check-and-flip that `reserve` requires and the deterministic
//! ascending iteration order that `list_available` promises.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::slot::{Slot, SlotTime};
use crate::errors::DomainError;

pub struct SlotStore {
    slots: Mutex<BTreeMap<(NaiveDate, SlotTime), bool>>,
}

impl SlotStore {
    /// Builds a store from the seed set. Seeding rejects duplicate
    /// `(date, time)` keys: slot identity is the pair, and a second entry for
    /// the same pair has no meaning.
    pub fn seed<I>(seed: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = Slot>,
    {
        let mut slots = BTreeMap::new();
        for slot in seed {
            match slots.entry((slot.date, slot.time)) {
                Entry::Vacant(entry) => {
                    entry.insert(slot.available);
                }
                Entry::Occupied(_) => {
                    return Err(DomainError::DuplicateSlot { date: slot.date, time: slot.time });
                }
            }
        }
        Ok(Self { slots: Mutex::new(slots) })
    }

    /// Available slots, filtered against the reference instant: on the
    /// reference's own date only strictly-later times remain (a slot at
    /// exactly the reference time is already in the past for booking
    /// purposes); slots on any other date are never time-filtered.
    pub fn list_available(
        &self,
        reference: NaiveDateTime,
        date_filter: Option<NaiveDate>,
    ) -> Vec<Slot> {
        let slots = self.slots.lock().expect("slot store mutex poisoned");
        slots
            .iter()
            .filter(|(_, available)| **available)
            .filter(|((date, time), _)| *date != reference.date() || time.0 > reference.time())
            .filter(|((date, _), _)| date_filter.map_or(true, |wanted| *date == wanted))
            .map(|((date, time), _)| Slot { date: *date, time: *time, available: true })
            .collect()
    }

    /// Atomically reserves the slot at `(date, time)`. Exactly one concurrent
    /// caller can win; everyone else, along with callers naming a slot that
    /// was never seeded, gets the merged `SlotNotAvailable` signal.
    pub fn reserve(&self, date: NaiveDate, time: SlotTime) -> Result<Slot, DomainError> {
        let mut slots = self.slots.lock().expect("slot store mutex poisoned");
        match slots.get_mut(&(date, time)) {
            Some(available) if *available => {
                *available = false;
                Ok(Slot { date, time, available: false })
            }
            _ => Err(DomainError::SlotNotAvailable { date, time }),
        }
    }
}
