//! Core types and error handling for the smartfields engine.
//!
//! This module defines the identifiers and enumerations shared by every
//! other module, along with the crate's error types:
//!
//! - [`SmartFieldType`] - the kind of generation a field performs (chat,
//!   text-to-speech, or image)
//! - [`NoteId`] / [`DeckId`] - host-assigned identifiers carried through
//!   graph construction and scheduling
//! - [`SmartFieldsError`] - the typed error enum for engine operations
//! - [`ResolveError`] - failures raised by external field resolvers
//! - [`ErrorContext`] / [`user_friendly_error`] - user-facing error
//!   presentation with actionable suggestions

pub mod error;
pub mod field;

pub use error::{ErrorContext, ResolveError, SmartFieldsError, user_friendly_error};
pub use field::{DeckId, NoteId, SmartFieldType};
