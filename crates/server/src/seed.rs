use chrono::{Days, NaiveDate};

use carbot_core::{Slot, SlotTime};

const HORIZON_DAYS: u64 = 3;
const DAILY_TIMES: [(u32, u32); 5] = [(9, 0), (11, 0), (13, 0), (15, 0), (17, 0)];

/// Demo inventory: a fixed horizon of days starting at `start`, five slots
/// each (9 AM through 5 PM, every two hours), all open.
pub fn demo_slots(start: NaiveDate) -> Vec<Slot> {
    let mut slots = Vec::with_capacity(HORIZON_DAYS as usize * DAILY_TIMES.len());
    for offset in 0..HORIZON_DAYS {
        let Some(date) = start.checked_add_days(Days::new(offset)) else {
            continue;
        };
        for (hour, minute) in DAILY_TIMES {
            if let Some(time) = SlotTime::from_hm(hour, minute) {
                slots.push(Slot::available(date, time));
            }
        }
    }
    slots
}
