//! Ticket identifier generation.
//!
//! Wire format is 8 characters over `[A-Z0-9]`. Picking all 8 at random
//! leans on birthday bounds, so instead the leading 3 characters encode a
//! process-wide monotonic counter in base 36. Sequential tickets issued by
//! one process can never collide, and the trailing 5 stay random so ids are
//! not guessable.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

use crate::domain::booking::TicketId;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const COUNTER_CHARS: usize = 3;
const RANDOM_CHARS: usize = 5;
const COUNTER_SPACE: u64 = 36u64.pow(COUNTER_CHARS as u32);

#[derive(Debug, Default)]
pub struct TicketGenerator {
    counter: AtomicU64,
}

impl TicketGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> TicketId {
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed) % COUNTER_SPACE;
        let mut id = String::with_capacity(COUNTER_CHARS + RANDOM_CHARS);

        let mut remaining = sequence;
        let mut prefix = [0u8; COUNTER_CHARS];
        for digit in prefix.iter_mut().rev() {
            *digit = ALPHABET[(remaining % 36) as usize];
            remaining /= 36;
        }
        id.extend(prefix.iter().map(|byte| *byte as char));

        let mut rng = rand::thread_rng();
        for _ in 0..RANDOM_CHARS {
            id.push(ALPHABET[rng.gen_range(0..ALPHABET.len())] as char);
        }

        TicketId(id)
    }
}
