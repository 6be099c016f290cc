//! Host note accessor.
//!
//! The engine never talks to the host's collection directly. It reads and
//! writes fields through the [`NoteFields`] trait, which the host adapter
//! implements over its own note object. Field names are case-sensitive as
//! stored; all graph logic operates on lowercased keys internally and maps
//! back to the canonical casing for writes.
//!
//! [`InMemoryNote`] is a plain implementation used by tests and by
//! embedders that want to drive the engine without a host.

use crate::core::NoteId;

/// Read/write access to one note's fields.
pub trait NoteFields: Send {
    /// The host's identifier for this note. `NoteId::UNSAVED` for notes
    /// that exist only in the editor.
    fn id(&self) -> NoteId;

    /// The note type (model) name.
    fn note_type(&self) -> &str;

    /// All field names on the note type, in canonical casing.
    fn field_names(&self) -> Vec<String>;

    /// Whether a field with this exact name exists.
    fn has_field(&self, name: &str) -> bool;

    /// The current value of a field, by exact name.
    fn get_field(&self, name: &str) -> Option<String>;

    /// Overwrite a field's value, by exact name.
    fn set_field(&mut self, name: &str, value: &str);
}

/// Look up a field value by lowercase name, mapping through the note's
/// canonical casing. Returns an empty string for unknown fields, which is
/// what prompt interpolation substitutes for them.
pub fn field_value_ci(note: &dyn NoteFields, lower_name: &str) -> String {
    note.field_names()
        .iter()
        .find(|name| name.to_lowercase() == lower_name)
        .and_then(|name| note.get_field(name))
        .unwrap_or_default()
}

/// A self-contained note, useful for tests and hostless embedding.
///
/// Preserves field insertion order, like the host's note types do.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNote {
    id: NoteId,
    note_type: String,
    fields: Vec<(String, String)>,
}

impl InMemoryNote {
    /// Create an empty note of the given type.
    pub fn new(note_type: impl Into<String>, id: NoteId) -> Self {
        Self {
            id,
            note_type: note_type.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style helper to add a field with an initial value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }
}

impl NoteFields for InMemoryNote {
    fn id(&self) -> NoteId {
        self.id
    }

    fn note_type(&self) -> &str {
        &self.note_type
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|(name, _)| name.clone()).collect()
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    fn get_field(&self, name: &str) -> Option<String> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone())
    }

    fn set_field(&mut self, name: &str, value: &str) {
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value.to_string();
        } else {
            self.fields.push((name.to_string(), value.to_string()));
        }
    }
}
