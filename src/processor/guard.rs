//! Per-note request serialization.
//!
//! Two overlapping generation requests against the same note would race on
//! its field values, so each note gets at most one in-flight request at a
//! time. Unrelated notes are unaffected - the registry is keyed by note
//! id, not a single global flag.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;

use crate::core::{NoteId, SmartFieldsError};

/// Registry of notes with a generation request in flight.
#[derive(Debug, Clone, Default)]
pub struct RequestGuard {
    in_flight: Arc<DashMap<NoteId, ()>>,
}

impl RequestGuard {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the note for a new request.
    ///
    /// The returned permit releases the claim when dropped, including on
    /// early returns and panics. Fails with
    /// [`SmartFieldsError::RequestInProgress`] when the note is already
    /// claimed.
    pub fn try_begin(&self, note: NoteId) -> Result<RequestPermit, SmartFieldsError> {
        match self.in_flight.entry(note) {
            Entry::Occupied(_) => {
                info!("a generation request is already in progress for note {note}");
                Err(SmartFieldsError::RequestInProgress { note })
            }
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(RequestPermit {
                    note,
                    in_flight: Arc::clone(&self.in_flight),
                })
            }
        }
    }

    /// Whether the note currently has a request in flight.
    pub fn is_busy(&self, note: NoteId) -> bool {
        self.in_flight.contains_key(&note)
    }
}

/// RAII claim on one note; dropping it releases the note.
#[derive(Debug)]
pub struct RequestPermit {
    note: NoteId,
    in_flight: Arc<DashMap<NoteId, ()>>,
}

impl Drop for RequestPermit {
    fn drop(&mut self) {
        self.in_flight.remove(&self.note);
    }
}
