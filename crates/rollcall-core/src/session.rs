//! Ephemeral broadcast sessions.
//!
//! When a teacher starts an attendance broadcast, the beacon id they are
//! advertising becomes the "live" beacon for that class and date for a fixed
//! time-to-live. The store is purely in-memory: it is rebuilt empty on
//! restart, and expiry is the only teardown path besides overwrite.
//!
//! Each `start` bumps a generation counter and spawns one detached expiry
//! timer that only removes the entry if the stored generation still matches.
//! Without the generation guard, a stale timer from an earlier `start` could
//! delete the value written by a later one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::types::ClassId;

/// Key of an active broadcast session: one per class per calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    /// The class the broadcast belongs to.
    pub class_id: ClassId,
    /// The calendar date the broadcast is valid for.
    pub date: NaiveDate,
}

#[derive(Debug)]
struct SessionEntry {
    beacon_id: String,
    generation: u64,
    deadline: Instant,
}

/// In-memory store of active broadcast sessions.
///
/// Cloning is cheap; clones share the same underlying map. All reads and
/// writes serialize through a single lock, which is never held across an
/// await point.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<SessionKey, SessionEntry>>>,
    generation: Arc<AtomicU64>,
}

impl SessionStore {
    /// Create an empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite the active beacon for `(class_id, date)` and schedule
    /// its expiry at `now + ttl`.
    ///
    /// Overwriting resets the expiry clock: the previous timer becomes stale
    /// and is ignored when it fires, because the generation no longer matches.
    ///
    /// Must be called from within a tokio runtime (the expiry timer is a
    /// spawned task).
    pub fn start(&self, class_id: ClassId, date: NaiveDate, beacon_id: String, ttl: Duration) {
        let key = SessionKey { class_id, date };
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        {
            let mut sessions = self.sessions.lock().expect("session lock poisoned");
            sessions.insert(
                key.clone(),
                SessionEntry {
                    beacon_id,
                    generation,
                    deadline: Instant::now() + ttl,
                },
            );
        }

        debug!(class_id, date = %key.date, generation, ttl_secs = ttl.as_secs(), "broadcast session started");

        let sessions = Arc::clone(&self.sessions);
        tokio::spawn(async move {
            sleep(ttl).await;
            let mut sessions = sessions.lock().expect("session lock poisoned");
            // Only remove the entry this timer was scheduled for. A later
            // `start` call owns a newer generation and a newer deadline.
            if sessions
                .get(&key)
                .is_some_and(|entry| entry.generation == generation)
            {
                sessions.remove(&key);
                debug!(class_id = key.class_id, date = %key.date, generation, "broadcast session expired");
            }
        });
    }

    /// The currently active beacon id for `(class_id, date)`, or `None`.
    ///
    /// An entry past its deadline is never returned, even if its expiry
    /// timer has not fired yet.
    #[must_use]
    pub fn get(&self, class_id: ClassId, date: NaiveDate) -> Option<String> {
        let sessions = self.sessions.lock().expect("session lock poisoned");
        sessions
            .get(&SessionKey { class_id, date })
            .filter(|entry| entry.deadline > Instant::now())
            .map(|entry| entry.beacon_id.clone())
    }
}
