//! Field type and identifier primitives.
//!
//! Smart fields come in three flavors, distinguished by which external
//! generation capability fills them. The tag decides which resolver branch
//! runs and which per-field configuration overrides apply.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of generation backing a smart field.
///
/// Serialized with lowercase string representations (`"chat"`, `"tts"`,
/// `"image"`) to match the host's JSON configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmartFieldType {
    /// Text generated by a chat completion model.
    Chat,
    /// Audio generated by a text-to-speech model; the field stores a
    /// sound reference into the host's media collection.
    Tts,
    /// An image generated from a text prompt; the field stores an image
    /// reference into the host's media collection.
    Image,
}

impl SmartFieldType {
    /// Whether fields of this type may be referenced as inputs by other
    /// prompts. Only chat fields produce interpolatable text.
    pub const fn is_referenceable(self) -> bool {
        matches!(self, Self::Chat)
    }
}

impl fmt::Display for SmartFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Chat => "chat",
            Self::Tts => "tts",
            Self::Image => "image",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SmartFieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "tts" => Ok(Self::Tts),
            "image" => Ok(Self::Image),
            other => Err(format!("unknown smart field type: {other}")),
        }
    }
}

/// Host-assigned note identifier.
///
/// The host uses `0` for notes that have been created in the editor but
/// never saved; such notes can still have their in-memory fields filled,
/// the host just cannot persist them yet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct NoteId(pub u64);

impl NoteId {
    /// The id of a note that does not exist in the host's database yet.
    pub const UNSAVED: Self = Self(0);

    /// Whether this note has never been saved by the host.
    pub const fn is_unsaved(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-assigned deck identifier, used to scope per-deck prompt overrides.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct DeckId(pub i64);

impl DeckId {
    /// The synthetic "all decks" scope. Prompts configured here apply to
    /// every deck that has no deck-specific override.
    pub const GLOBAL: Self = Self(0);
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
