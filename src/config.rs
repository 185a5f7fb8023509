//! Configuration for notes generation.
//!
//! All pipeline behaviour is controlled through [`GenerationConfig`], built
//! via its [`GenerationConfigBuilder`]. Keeping every knob in one struct
//! makes it trivial to share a config across requests, serialise it for
//! logging, and diff two runs to understand why their outputs differ.
//!
//! The caller's API key is deliberately **not** part of the config: it is
//! request-scoped and travels with each [`crate::request::NotesRequest`],
//! so concurrent callers never share a credential.

use crate::error::NotesError;
use serde::{Deserialize, Serialize};

/// Default byte budget for the source text sent to the model.
///
/// Roughly 6k tokens of source — ample headroom under gpt-4o-mini's context
/// window for the instruction preamble and the generated notes, and well
/// above what a typical multi-page assignment extracts to.
pub const DEFAULT_MAX_SOURCE_CHARS: usize = 24_000;

/// Configuration for a notes-generation run.
///
/// Built via [`GenerationConfig::builder()`] or using
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use jigsaw_notes::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .model("gpt-4o-mini")
///     .max_source_chars(16_000)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// LLM model identifier. Default: "gpt-4o-mini".
    pub model: String,

    /// Base URL of the OpenAI-style API. Default: "https://api.openai.com/v1".
    ///
    /// Overridable so tests and self-hosted gateways can point the invoker
    /// at a different endpoint; the two request shapes are appended to it
    /// (`/responses`, `/chat/completions`).
    pub api_base: String,

    /// Maximum bytes of extracted source text included in the prompt.
    /// Default: [`DEFAULT_MAX_SOURCE_CHARS`].
    ///
    /// Longer documents are truncated at a whitespace boundary and the
    /// truncation is recorded in [`crate::output::GenerationStats`]; it is
    /// a diagnostic, not an error.
    pub max_source_chars: usize,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Low temperature keeps the notes faithful to the source text rather
    /// than inventive.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 1024.
    pub max_output_tokens: u32,

    /// Per-call timeout in seconds for the outbound backend request.
    /// Default: 60.
    ///
    /// This is the only timeout the pipeline itself enforces; anything
    /// stricter comes from the hosting layer.
    pub api_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            max_source_chars: DEFAULT_MAX_SOURCE_CHARS,
            temperature: 0.2,
            max_output_tokens: 1024,
            api_timeout_secs: 60,
        }
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        // Trailing slash would double up when the shape paths are appended.
        self.config.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn max_source_chars(mut self, n: usize) -> Self {
        self.config.max_source_chars = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.max_output_tokens = n.max(1);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, NotesError> {
        let c = &self.config;
        if c.model.is_empty() {
            return Err(NotesError::InvalidConfig("model must not be empty".into()));
        }
        if c.api_base.is_empty() {
            return Err(NotesError::InvalidConfig(
                "api_base must not be empty".into(),
            ));
        }
        if c.max_source_chars < 1_000 {
            return Err(NotesError::InvalidConfig(format!(
                "max_source_chars must be >= 1000, got {}",
                c.max_source_chars
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = GenerationConfig::default();
        assert_eq!(c.model, "gpt-4o-mini");
        assert_eq!(c.max_source_chars, DEFAULT_MAX_SOURCE_CHARS);
        assert_eq!(c.api_timeout_secs, 60);
    }

    #[test]
    fn builder_trims_api_base_slash() {
        let c = GenerationConfig::builder()
            .api_base("http://localhost:8080/v1/")
            .build()
            .unwrap();
        assert_eq!(c.api_base, "http://localhost:8080/v1");
    }

    #[test]
    fn builder_rejects_tiny_budget() {
        let err = GenerationConfig::builder()
            .max_source_chars(100)
            .build()
            .unwrap_err();
        assert_eq!(err.category(), "invalid_input");
    }

    #[test]
    fn temperature_is_clamped() {
        let c = GenerationConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }
}
