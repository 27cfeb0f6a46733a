//! Notification state for one watch session.
//!
//! Pure bookkeeping: no timers, no I/O. The pipeline task owns a single
//! [`NotifierState`] and drives it one event at a time.

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::fingerprint::Fingerprint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No watch session; artifact events are dropped
    #[default]
    Idle,
    /// Session active, nothing waiting to be sent
    Watching,
    /// At least one changed file waits for the debounce window to close
    Pending,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        !matches!(self, SessionState::Idle)
    }
}

/// Outcome of recording one emitted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// No session is active
    Dropped,
    /// Content identical to the last emission of the same file
    Unchanged,
    /// Fingerprint stored and file added to the pending batch
    Queued,
}

#[derive(Debug, Default)]
pub struct NotifierState {
    session: SessionState,
    fingerprints: HashMap<String, Fingerprint>,
    pending: IndexSet<String>,
}

impl NotifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn fingerprint(&self, file: &str) -> Option<&Fingerprint> {
        self.fingerprints.get(file)
    }

    /// Begin a session. Returns `false` if one is already running, in which
    /// case nothing changes: the bundler reports every rebuild of a watch
    /// session as a new run.
    pub fn start_session(&mut self) -> bool {
        if self.session.is_active() {
            return false;
        }
        self.fingerprints.clear();
        self.pending.clear();
        self.session = SessionState::Watching;
        true
    }

    pub fn record(&mut self, file: &str, fingerprint: Fingerprint) -> Recorded {
        if !self.session.is_active() {
            return Recorded::Dropped;
        }
        if self.fingerprints.get(file) == Some(&fingerprint) {
            return Recorded::Unchanged;
        }

        self.fingerprints.insert(file.to_string(), fingerprint);
        self.pending.insert(file.to_string());
        self.session = SessionState::Pending;
        Recorded::Queued
    }

    /// Drain the pending batch, in first-change order.
    ///
    /// Returns `None` unless the state is [`SessionState::Pending`].
    pub fn take_batch(&mut self) -> Option<Vec<String>> {
        if self.session != SessionState::Pending {
            return None;
        }
        self.session = SessionState::Watching;
        Some(self.pending.drain(..).collect())
    }

    /// End the session, discarding unsent changes. Returns how many were
    /// discarded.
    pub fn end_session(&mut self) -> usize {
        let discarded = self.pending.len();
        self.pending.clear();
        self.fingerprints.clear();
        self.session = SessionState::Idle;
        discarded
    }
}
