//! Time-ordered identifiers for attempt records.

use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use uuid::Uuid;

/// Generates 26-character, lexicographically sortable identifiers.
///
/// Layout: 12 hex digits of Unix milliseconds, 4 hex digits of an in-process
/// sequence, 10 random hex digits. Ids from one generator are strictly
/// increasing even when the wall clock stalls or steps backwards.
#[derive(Debug, Default)]
pub struct AttemptIdGenerator {
    state: Mutex<IdState>,
}

#[derive(Debug, Default)]
struct IdState {
    last_ms: i64,
    seq: u16,
}

impl AttemptIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next identifier.
    pub fn next_id(&self) -> String {
        self.next_at(Utc::now().timestamp_millis())
    }

    fn next_at(&self, now_ms: i64) -> String {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if now_ms > state.last_ms {
            state.last_ms = now_ms;
            state.seq = 0;
        } else if state.seq == u16::MAX {
            state.last_ms += 1;
            state.seq = 0;
        } else {
            state.seq += 1;
        }
        let random = Uuid::new_v4().simple().to_string();
        format!(
            "{:012x}{:04x}{}",
            state.last_ms.max(0),
            state.seq,
            &random[..10]
        )
    }
}
