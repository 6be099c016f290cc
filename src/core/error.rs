//! Error handling for the smartfields engine.
//!
//! The error system is built around two types:
//! - [`SmartFieldsError`] - enumerated error types for engine operations
//! - [`ErrorContext`] - wrapper that adds user-friendly messages and
//!   suggestions for display by the host
//!
//! Most failure modes in this crate are deliberately *not* errors:
//! a note type with no configured prompts is "zero work", a manual field
//! blocking its descendants is a normal outcome, and a single resolver
//! failure is isolated to its node and reported in the schedule result.
//! Only configuration mistakes that must block an operation before any
//! work starts (cycles, unknown target fields, overlapping requests)
//! surface as `Err` values.
//!
//! Resolver failures carry an HTTP-class status where one exists so that
//! [`user_friendly_error`] can map them to actionable messages: a 401 is
//! an API-key problem, a 402 means the subscription is out of credits, a
//! 429 is a provider rate limit, and so on.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use super::field::NoteId;

/// The main error type for smartfields operations.
#[derive(Error, Debug)]
pub enum SmartFieldsError {
    /// A dependency cycle exists among generated fields.
    ///
    /// Raised at prompt-validation time, before any scheduling begins.
    /// The scheduler is never invoked on a cyclic graph.
    #[error("smart fields referencing other smart fields cannot form a cycle")]
    CircularPrompts,

    /// Target mode named a field that has no configured prompt.
    #[error("no smart field named '{field}' is configured for this note type")]
    TargetNotFound {
        /// The requested target field (lowercase).
        field: String,
    },

    /// A generation request is already running for this note.
    ///
    /// Requests are serialized per note; unrelated notes may generate
    /// concurrently.
    #[error("a generation request is already in progress for note {note}")]
    RequestInProgress {
        /// The note whose permit was already taken.
        note: NoteId,
    },

    /// Unexpected failure while constructing the field graph.
    ///
    /// Callers treat this as "nothing to generate" after logging - a
    /// broken configuration must never crash the host.
    #[error("failed to build the field graph: {reason}")]
    GraphBuild {
        /// Description of what went wrong.
        reason: String,
    },

    /// A resolver failure, carried per node in schedule reports.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Failure raised by an external field resolver for a single node.
///
/// Resolver errors are always isolated to the node that raised them:
/// siblings in the same frontier keep their results and the note is
/// still updated for every node that succeeded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The provider returned an HTTP error status.
    #[error("provider returned HTTP {status} while resolving '{field}'")]
    Http {
        /// HTTP status code from the provider.
        status: u16,
        /// The field being resolved (lowercase).
        field: String,
    },

    /// The provider request timed out.
    #[error("provider request timed out while resolving '{field}'")]
    Timeout {
        /// The field being resolved (lowercase).
        field: String,
    },

    /// Any other provider-side failure.
    #[error("provider error while resolving '{field}': {message}")]
    Provider {
        /// The field being resolved (lowercase).
        field: String,
        /// Description of the provider failure.
        message: String,
    },
}

impl ResolveError {
    /// Wrap an arbitrary provider-client error for one field.
    ///
    /// Resolver implementations sit on top of HTTP clients that surface
    /// `anyhow`-style errors; this flattens the whole chain into the
    /// message so nothing is lost when the error crosses the resolver
    /// boundary.
    pub fn provider(field: impl Into<String>, error: anyhow::Error) -> Self {
        Self::Provider {
            field: field.into(),
            message: format!("{error:#}"),
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The field whose resolution failed.
    pub fn field(&self) -> &str {
        match self {
            Self::Http { field, .. } | Self::Timeout { field } | Self::Provider { field, .. } => {
                field
            }
        }
    }
}

/// An error wrapped with user-friendly context for host display.
///
/// The host shows the error message, optional details, and an optional
/// actionable suggestion. [`display`](Self::display) renders all three to
/// stderr with terminal colors; [`fmt::Display`] renders them plainly for
/// logs and message boxes.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying engine error.
    pub error: SmartFieldsError,
    /// Optional suggestion for resolving the error.
    pub suggestion: Option<String>,
    /// Optional additional details about the error.
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: SmartFieldsError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add an actionable suggestion, displayed in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add explanatory details, displayed in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details, and suggestion to stderr with colors.
    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.error);
        if let Some(details) = &self.details {
            eprintln!("  {}", details.yellow());
        }
        if let Some(suggestion) = &self.suggestion {
            eprintln!("  {}", suggestion.green());
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(details) = &self.details {
            write!(f, "\n{details}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n{suggestion}")?;
        }
        Ok(())
    }
}

/// Convert an engine error into a user-friendly [`ErrorContext`].
///
/// Resolver failures with a known HTTP status class get specific,
/// actionable messaging; everything else passes through with generic
/// context.
#[must_use]
pub fn user_friendly_error(error: SmartFieldsError) -> ErrorContext {
    let (details, suggestion): (Option<&str>, Option<&str>) = match &error {
        SmartFieldsError::Resolve(e) => match e.status() {
            Some(401) => (
                Some("The provider rejected the configured API key."),
                Some("Check the API key in the add-on settings."),
            ),
            Some(402) => (
                Some("The subscription is out of generation credits."),
                Some("Upgrade the plan or wait for the usage window to reset."),
            ),
            Some(404) => (
                Some("The API key exists but has no paid quota attached."),
                Some("Ensure the provider account has billing enabled; a chat-only subscription is not sufficient."),
            ),
            Some(429) => (
                Some("The provider rate limit was exceeded."),
                Some("Wait a few minutes and try again, or generate in smaller batches."),
            ),
            Some(s) if s >= 500 => (
                Some("The provider reported an internal error."),
                Some("This is usually transient; try again shortly."),
            ),
            _ => (None, None),
        },
        SmartFieldsError::CircularPrompts => {
            (None, Some("Remove one of the field references so prompts no longer loop."))
        }
        SmartFieldsError::RequestInProgress { .. } => {
            (None, Some("Wait for the current generation to finish before starting another."))
        }
        _ => (None, None),
    };

    let mut context = ErrorContext::new(error);
    if let Some(details) = details {
        context = context.with_details(details);
    }
    if let Some(suggestion) = suggestion {
        context = context.with_suggestion(suggestion);
    }
    context
}
