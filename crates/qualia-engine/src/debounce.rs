// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation message debouncing.
//!
//! Contacts on messaging platforms send thoughts as bursts of short
//! messages. The [`MessageDebouncer`] defers the processing pipeline until
//! a quiet period has elapsed for a `(contact, channel)` key: every new
//! message aborts and replaces the pending timer, so only the last call of
//! a burst fires, with the last call's closure.
//!
//! The registry is an owned object, not a process-wide singleton; hosts
//! inject one instance and tests create isolated ones. Entries live only in
//! memory: a restart loses pending timers, and the next inbound message
//! re-arms the funnel from persisted flags.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use qualia_core::types::{ChannelKind, ContactId};
use qualia_core::QualiaError;

/// Default quiet period before a coalesced burst is processed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(10_000);

/// Key identifying one debounced conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DebounceKey {
    pub contact: ContactId,
    pub channel: ChannelKind,
}

/// Snapshot of a pending registration, as returned by [`MessageDebouncer::peek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebouncePending {
    /// Number of schedule calls coalesced into the pending job.
    pub coalesced: u32,
    /// Timestamp of the most recent schedule call.
    pub last_scheduled_at: DateTime<Utc>,
}

struct Entry {
    generation: u64,
    coalesced: u32,
    last_scheduled_at: DateTime<Utc>,
    handle: JoinHandle<()>,
}

type Registry = Arc<Mutex<HashMap<DebounceKey, Entry>>>;

/// Timer registry coalescing message bursts into single job executions.
///
/// At most one timer is pending per key. The debouncer never talks to the
/// repository or the model backend itself; all of that lives inside the
/// scheduled job.
pub struct MessageDebouncer {
    entries: Registry,
    next_generation: AtomicU64,
}

impl MessageDebouncer {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Schedules `job` with the default quiet period.
    pub async fn schedule<F, Fut>(&self, key: DebounceKey, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), QualiaError>> + Send + 'static,
    {
        self.schedule_after(key, DEFAULT_DEBOUNCE, job).await;
    }

    /// Schedules `job` to run after `delay` of inactivity for `key`.
    ///
    /// A pending registration for the same key is aborted and replaced;
    /// the delay restarts from this call, and this call's closure is the
    /// one that runs. Errors returned by the job are caught and logged
    /// here, never retried.
    pub async fn schedule_after<F, Fut>(&self, key: DebounceKey, delay: Duration, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), QualiaError>> + Send + 'static,
    {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.entries.lock().await;

        let coalesced = match entries.remove(&key) {
            Some(previous) => {
                previous.handle.abort();
                previous.coalesced + 1
            }
            None => 1,
        };

        let handle = tokio::spawn(fire_after(
            Arc::clone(&self.entries),
            key.clone(),
            generation,
            delay,
            job,
        ));

        debug!(
            contact = %key.contact.0,
            channel = %key.channel,
            coalesced = coalesced,
            delay_ms = delay.as_millis() as u64,
            "debounce timer armed"
        );

        entries.insert(
            key,
            Entry {
                generation,
                coalesced,
                last_scheduled_at: Utc::now(),
                handle,
            },
        );
    }

    /// Removes a pending registration without running it.
    ///
    /// Returns whether one existed; after a fire this is a no-op returning
    /// false.
    pub async fn cancel(&self, key: &DebounceKey) -> bool {
        match self.entries.lock().await.remove(key) {
            Some(entry) => {
                entry.handle.abort();
                debug!(contact = %key.contact.0, channel = %key.channel, "debounce cancelled");
                true
            }
            None => false,
        }
    }

    /// Returns the coalesced-call count and last schedule time for a
    /// pending key, or `None` when nothing is pending.
    pub async fn peek(&self, key: &DebounceKey) -> Option<DebouncePending> {
        self.entries.lock().await.get(key).map(|entry| DebouncePending {
            coalesced: entry.coalesced,
            last_scheduled_at: entry.last_scheduled_at,
        })
    }

    /// Number of keys with a pending timer.
    pub async fn pending_count(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl Default for MessageDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

async fn fire_after<F, Fut>(
    entries: Registry,
    key: DebounceKey,
    generation: u64,
    delay: Duration,
    job: F,
) where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), QualiaError>> + Send + 'static,
{
    tokio::time::sleep(delay).await;

    // The entry must still be ours: a cancel or re-schedule racing the end
    // of the sleep leaves a missing or newer-generation entry, and the
    // stale fire is a no-op.
    {
        let mut map = entries.lock().await;
        match map.get(&key) {
            Some(entry) if entry.generation == generation => {
                map.remove(&key);
            }
            _ => {
                debug!(
                    contact = %key.contact.0,
                    channel = %key.channel,
                    "stale debounce fire ignored"
                );
                return;
            }
        }
    }

    if let Err(e) = job().await {
        error!(
            contact = %key.contact.0,
            channel = %key.channel,
            error = %e,
            "debounced job failed"
        );
    }
}
