//! Acknowledgment correlation: matching replies to the keystrokes that caused
//! them.
//!
//! # How it works (for beginners)
//!
//! The client sends keystrokes without waiting for replies, so at any moment
//! several keystrokes may be "in flight".  Each one is registered here under
//! a fresh [`SequenceId`] before it is sent.  When a reply arrives, the
//! correlator removes the matching entry and reports `(id, success)` so the
//! UI can turn that keystroke's history card green or red.
//!
//! # Two matching modes
//!
//! - **Keyed** – the reply echoes the id (`{"success":true,"id":7}`).  The
//!   entry with that id is removed, whatever its position.
//! - **FIFO** – the reply carries no id.  The *oldest* pending entry is
//!   removed.  This is only correct because the transport delivers replies in
//!   send order and exactly once per keystroke.
//!
//! Both modes share one `BTreeMap` keyed by id.  Ids increase monotonically,
//! so the map's first entry is always the oldest registration.
//!
//! # Connection loss
//!
//! Replies for keystrokes sent on a dropped connection never arrive.  The
//! owner calls [`AckCorrelator::abandon_all`] on disconnect so that FIFO
//! replies on the next connection line up with that connection's keystrokes.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::protocol::messages::KeystrokeAck;
use crate::protocol::sequence::{SequenceCounter, SequenceId};

/// Anomalies detected while matching an acknowledgment.
///
/// Neither is fatal: the caller logs and carries on processing events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationError {
    /// An acknowledgment arrived while nothing was pending.
    #[error("acknowledgment received with no pending keystroke")]
    ExhaustedQueue,

    /// An acknowledgment named an id that is not pending (already resolved
    /// or never sent).
    #[error("acknowledgment for unknown sequence id {0}")]
    UnknownSequence(SequenceId),
}

/// One registered, not yet acknowledged keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingEntry {
    /// History-card label; `None` when no card was shown for this keystroke.
    label: Option<String>,
}

/// The outcome of a matched acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub id: SequenceId,
    pub success: bool,
    /// Whether a history card was registered for this id.
    pub has_card: bool,
}

/// A pending keystroke dropped by [`AckCorrelator::abandon_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abandoned {
    pub id: SequenceId,
    pub has_card: bool,
}

/// Ordered set of pending keystrokes.
#[derive(Debug, Default)]
pub struct AckCorrelator {
    counter: SequenceCounter,
    pending: BTreeMap<SequenceId, PendingEntry>,
}

impl AckCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next id and appends it to the pending set.
    ///
    /// `label` is the history-card label, if the caller shows one.
    pub fn register(&mut self, label: Option<String>) -> SequenceId {
        let id = self.counter.next();
        self.pending.insert(id, PendingEntry { label });
        id
    }

    /// Matches an acknowledgment, by id when it carries one, else FIFO.
    ///
    /// # Errors
    ///
    /// - [`CorrelationError::ExhaustedQueue`] if nothing is pending.
    /// - [`CorrelationError::UnknownSequence`] if the echoed id is not pending.
    pub fn acknowledge(&mut self, ack: KeystrokeAck) -> Result<Resolved, CorrelationError> {
        match ack.id {
            Some(id) => {
                if self.pending.is_empty() {
                    return Err(CorrelationError::ExhaustedQueue);
                }
                let entry = self
                    .pending
                    .remove(&id)
                    .ok_or(CorrelationError::UnknownSequence(id))?;
                Ok(Resolved {
                    id,
                    success: ack.success,
                    has_card: entry.label.is_some(),
                })
            }
            None => self.on_acknowledgment(ack.success),
        }
    }

    /// Pops the oldest pending id (strict FIFO).
    ///
    /// # Errors
    ///
    /// Returns [`CorrelationError::ExhaustedQueue`] if nothing is pending.
    pub fn on_acknowledgment(&mut self, success: bool) -> Result<Resolved, CorrelationError> {
        let (id, entry) = self
            .pending
            .pop_first()
            .ok_or(CorrelationError::ExhaustedQueue)?;
        Ok(Resolved {
            id,
            success,
            has_card: entry.label.is_some(),
        })
    }

    /// Number of keystrokes still awaiting acknowledgment.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Empties the pending set, oldest first.  Ids keep increasing
    /// afterwards; none is handed out twice.
    pub fn abandon_all(&mut self) -> Vec<Abandoned> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(id, entry)| Abandoned {
                id,
                has_card: entry.label.is_some(),
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
