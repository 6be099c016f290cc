//! Global constants used throughout the smartfields codebase.
//!
//! This module contains generation defaults, retry parameters, and other
//! numeric constants that are used across multiple modules. Defining
//! them centrally improves maintainability and makes magic numbers
//! more discoverable.

/// Maximum number of notes dispatched in a single batch wave.
///
/// Batch generation runs notes concurrently in waves of this size so a
/// large browser selection cannot exceed provider rate limits in a single
/// burst. Overridable via [`EngineConfig::batch_limit`](crate::config::EngineConfig).
pub const STANDARD_BATCH_LIMIT: usize = 500;

/// Default chat model used when a field has no custom model override.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature for chat generation.
pub const DEFAULT_CHAT_TEMPERATURE: u8 = 1;

/// Default text-to-speech model.
pub const DEFAULT_TTS_MODEL: &str = "tts-1";

/// Default text-to-speech voice.
pub const DEFAULT_TTS_VOICE: &str = "alloy";

/// Default image generation model.
pub const DEFAULT_IMAGE_MODEL: &str = "flux-schnell";

/// Maximum retry attempts a resolver should make on rate-limit responses.
///
/// Retries are owned by resolver implementations, not the scheduler; see
/// [`resolver_retry_strategy`](crate::utils::backoff::resolver_retry_strategy).
pub const MAX_RESOLVER_RETRIES: usize = 3;

/// Starting delay for resolver retry backoff (1 second).
///
/// Doubles on each retry attempt.
pub const STARTING_RETRY_DELAY_MS: u64 = 1_000;

/// Maximum delay for resolver retry backoff (8 seconds).
pub const MAX_RETRY_DELAY_MS: u64 = 8_000;

/// Minimum similarity score for "did you mean" field-name suggestions
/// in prompt validation errors.
pub const FIELD_SUGGESTION_THRESHOLD: f64 = 0.8;
