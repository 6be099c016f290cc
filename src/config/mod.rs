//! Engine configuration.
//!
//! [`EngineConfig`] holds the global generation defaults that apply when a
//! field has no per-field override, plus the policy switches the scheduler
//! consults (`allow_empty_fields`, `batch_limit`). The host owns
//! persistence; this crate only defines the serializable model and its
//! defaults, so a host can deserialize its stored JSON configuration
//! straight into [`EngineConfig`] with unknown-key tolerance.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    DEFAULT_CHAT_MODEL, DEFAULT_CHAT_TEMPERATURE, DEFAULT_IMAGE_MODEL, DEFAULT_TTS_MODEL,
    DEFAULT_TTS_VOICE, STANDARD_BATCH_LIMIT,
};

/// Chat completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatProvider {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "anthropic")]
    Anthropic,
}

/// Text-to-speech providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TtsProvider {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "elevenLabs")]
    ElevenLabs,
    #[serde(rename = "google")]
    Google,
}

/// Image generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageProvider {
    #[serde(rename = "replicate")]
    Replicate,
}

impl fmt::Display for ChatProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::ElevenLabs => write!(f, "elevenLabs"),
            Self::Google => write!(f, "google"),
        }
    }
}

impl fmt::Display for ImageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replicate => write!(f, "replicate"),
        }
    }
}

/// Global generation settings.
///
/// Per-field overrides in
/// [`FieldExtras`](crate::prompts::FieldExtras) take precedence over these
/// defaults when a field opts into a custom model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default chat provider.
    pub chat_provider: ChatProvider,
    /// Default chat model identifier.
    pub chat_model: String,
    /// Default chat sampling temperature.
    pub chat_temperature: u8,

    /// Default text-to-speech provider.
    pub tts_provider: TtsProvider,
    /// Default text-to-speech model identifier.
    pub tts_model: String,
    /// Default text-to-speech voice.
    pub tts_voice: String,

    /// Default image provider.
    pub image_provider: ImageProvider,
    /// Default image model identifier.
    pub image_model: String,

    /// Whether prompts may be sent with some referenced fields empty.
    ///
    /// When false, a prompt whose substitution leaves any referenced field
    /// empty is skipped entirely. A prompt where *every* referenced field
    /// is empty is always skipped, regardless of this switch.
    pub allow_empty_fields: bool,

    /// Maximum notes dispatched concurrently per batch wave.
    pub batch_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chat_provider: ChatProvider::OpenAi,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            chat_temperature: DEFAULT_CHAT_TEMPERATURE,
            tts_provider: TtsProvider::OpenAi,
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            tts_voice: DEFAULT_TTS_VOICE.to_string(),
            image_provider: ImageProvider::Replicate,
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            allow_empty_fields: false,
            batch_limit: STANDARD_BATCH_LIMIT,
        }
    }
}
