//! The external field-resolution capability.
//!
//! The engine does not talk to any AI provider itself. Each graph node
//! carries a [`FieldPayload`] - a tagged union over the generation kind
//! with the provider options already resolved (per-field override or
//! global default). At dispatch time the scheduler interpolates the
//! payload's text against the note and hands a [`ResolveRequest`] to the
//! injected [`FieldResolver`].
//!
//! The resolver contract:
//! - `Ok(Some(value))` - the field was generated; the scheduler writes the
//!   value and marks the node updated.
//! - `Ok(None)` - the resolver declined (no capacity, feature locked).
//!   The field stays unfilled; the node is *not* aborted and descendants
//!   still run.
//! - `Err(_)` - an unrecoverable provider failure. Isolated to this node;
//!   siblings in the same frontier are unaffected.
//!
//! Timeouts and retries are owned by resolver implementations, not the
//! scheduler. Implementations are expected to retry rate-limit responses
//! with bounded exponential backoff; see
//! [`resolver_retry_strategy`](crate::utils::backoff::resolver_retry_strategy).

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{ChatProvider, ImageProvider, TtsProvider};
use crate::core::{NoteId, ResolveError, SmartFieldType};

/// The per-kind generation request carried by a graph node.
///
/// Inside the graph, `prompt`/`input` holds the raw template; the
/// scheduler swaps in the interpolated text via [`with_text`](Self::with_text)
/// before dispatch.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldPayload {
    /// Chat completion request.
    Chat {
        prompt: String,
        provider: ChatProvider,
        model: String,
        temperature: u8,
    },
    /// Text-to-speech request. The resolver is expected to write the audio
    /// into the host's media collection and return a sound reference.
    Tts {
        input: String,
        provider: TtsProvider,
        model: String,
        voice: String,
    },
    /// Image generation request. The resolver returns an image reference
    /// after storing the bytes in the host's media collection.
    Image {
        prompt: String,
        provider: ImageProvider,
        model: String,
    },
}

impl FieldPayload {
    /// The generation kind of this payload.
    pub const fn field_type(&self) -> SmartFieldType {
        match self {
            Self::Chat { .. } => SmartFieldType::Chat,
            Self::Tts { .. } => SmartFieldType::Tts,
            Self::Image { .. } => SmartFieldType::Image,
        }
    }

    /// The template or interpolated text this payload carries.
    pub fn text(&self) -> &str {
        match self {
            Self::Chat { prompt, .. } | Self::Image { prompt, .. } => prompt,
            Self::Tts { input, .. } => input,
        }
    }

    /// A copy of this payload with its text replaced, used by the
    /// scheduler to substitute the interpolated prompt.
    #[must_use]
    pub fn with_text(&self, text: String) -> Self {
        let mut payload = self.clone();
        match &mut payload {
            Self::Chat { prompt, .. } | Self::Image { prompt, .. } => *prompt = text,
            Self::Tts { input, .. } => *input = text,
        }
        payload
    }
}

/// One resolution request, dispatched once per graph node.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    /// Lowercase field identifier being resolved.
    pub field: String,
    /// The note being generated, for media naming and provider metering.
    pub note_id: NoteId,
    /// The note type name, for media naming.
    pub note_type: String,
    /// The interpolated generation request.
    pub payload: FieldPayload,
}

/// Asynchronous field-resolution capability, injected by the host.
///
/// Implementations wrap the provider HTTP clients. The scheduler treats
/// any returned error as that node's failure only.
#[async_trait]
pub trait FieldResolver: Send + Sync {
    /// Produce a value for one field, or decline.
    async fn resolve(&self, request: ResolveRequest) -> Result<Option<String>, ResolveError>;
}
