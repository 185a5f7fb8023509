//! Error types for the jigsaw-notes library.
//!
//! Two distinct error types reflect two distinct layers:
//!
//! * [`NotesError`] — what the caller of [`crate::generate_notes`] sees.
//!   Every variant maps onto one of the caller-facing categories
//!   (`invalid_input`, `no_extractable_text`, `auth`, `rate_limited`,
//!   `backend_failure`, `capability_fallback_exhausted`) via
//!   [`NotesError::category`], which the hosting layer uses to pick an
//!   HTTP status.
//!
//! * [`BackendError`] — the invoker-level classification of a single LLM
//!   API attempt. [`crate::pipeline::backend`] uses it to decide whether a
//!   failed attempt means "try the legacy request shape" or "stop and
//!   surface". The orchestrator folds it into [`NotesError`] at the end.

use thiserror::Error;

/// All errors returned by the notes pipeline.
#[derive(Debug, Error)]
pub enum NotesError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A request field failed validation (empty topic, empty PDF, missing
    /// key, unknown notes style).
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The uploaded bytes are not a parseable PDF container.
    #[error("Unreadable PDF: {detail}\nThe upload must be a syntactically valid PDF file.")]
    UnreadablePdf { detail: String },

    /// The PDF parsed fine but carries no text layer at all.
    ///
    /// Terminal for the pipeline: the backend is never invoked. The caller
    /// should run OCR on the document and resubmit.
    #[error(
        "No extractable text in the PDF ({page_count} pages scanned).\n\
         This usually means a scanned document; run OCR and resubmit."
    )]
    NoExtractableText { page_count: usize },

    // ── Backend errors ────────────────────────────────────────────────────
    /// The LLM provider rejected the caller-supplied credential.
    #[error("Authentication failed at the LLM backend: {detail}")]
    Auth { detail: String },

    /// The LLM provider returned HTTP 429 — the caller decides whether to
    /// resubmit; the pipeline never retries this itself.
    #[error("LLM backend rate limit or quota exceeded")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Transport-level or provider-side failure with no more specific
    /// category.
    #[error("LLM backend failure: {detail}")]
    BackendFailure { detail: String },

    /// The primary request shape was unsupported and the legacy shape then
    /// failed too.
    #[error(
        "Both LLM request shapes failed.\nPrimary (responses): {primary}\nFallback (chat completions): {fallback}"
    )]
    FallbackExhausted { primary: String, fallback: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotesError {
    /// The caller-facing error category, as a stable snake_case token.
    ///
    /// The hosting layer keys its HTTP status and error payload off this
    /// value rather than matching variants itself.
    pub fn category(&self) -> &'static str {
        match self {
            NotesError::InvalidInput { .. }
            | NotesError::UnreadablePdf { .. }
            | NotesError::InvalidConfig(_) => "invalid_input",
            NotesError::NoExtractableText { .. } => "no_extractable_text",
            NotesError::Auth { .. } => "auth",
            NotesError::RateLimited { .. } => "rate_limited",
            NotesError::FallbackExhausted { .. } => "capability_fallback_exhausted",
            NotesError::BackendFailure { .. } | NotesError::Internal(_) => "backend_failure",
        }
    }
}

/// Classified outcome of a single LLM API attempt.
///
/// Produced by [`crate::pipeline::backend`], one value per outbound call.
/// Only [`BackendError::CapabilityMismatch`] on the primary shape triggers
/// the one-shot fallback; everything else stops the invoker immediately.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP 401/403 — invalid or access-restricted credential. Never
    /// retried, never falls back.
    #[error("authentication rejected by provider: {detail}")]
    Auth { detail: String },

    /// HTTP 429 — rate limit or exhausted quota. Surfaced as-is.
    #[error("provider rate limit or quota exceeded")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The request shape is not served at this endpoint (HTTP 404/405) —
    /// the provider deployment predates the primary interface.
    #[error("request shape unsupported by provider: {detail}")]
    CapabilityMismatch { detail: String },

    /// Network or proxy failure reaching the provider.
    #[error("transport failure reaching provider: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    /// Any other provider-side failure, with the provider's message kept
    /// for diagnostics.
    #[error("provider error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The provider answered 2xx but the body did not match the expected
    /// response shape.
    #[error("malformed provider response: {detail}")]
    Malformed { detail: String },

    /// The primary shape was unsupported and the legacy shape then failed
    /// for its own reason.
    #[error("fallback exhausted — primary: {primary}; fallback: {fallback}")]
    FallbackExhausted { primary: String, fallback: String },
}

impl From<BackendError> for NotesError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Auth { detail } => NotesError::Auth { detail },
            BackendError::RateLimited { retry_after_secs } => {
                NotesError::RateLimited { retry_after_secs }
            }
            BackendError::FallbackExhausted { primary, fallback } => {
                NotesError::FallbackExhausted { primary, fallback }
            }
            other => NotesError::BackendFailure {
                detail: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_stable() {
        let cases: Vec<(NotesError, &str)> = vec![
            (
                NotesError::InvalidInput {
                    reason: "topic is empty".into(),
                },
                "invalid_input",
            ),
            (
                NotesError::UnreadablePdf {
                    detail: "bad xref".into(),
                },
                "invalid_input",
            ),
            (
                NotesError::NoExtractableText { page_count: 3 },
                "no_extractable_text",
            ),
            (
                NotesError::Auth {
                    detail: "bad key".into(),
                },
                "auth",
            ),
            (
                NotesError::RateLimited {
                    retry_after_secs: Some(30),
                },
                "rate_limited",
            ),
            (
                NotesError::BackendFailure {
                    detail: "boom".into(),
                },
                "backend_failure",
            ),
            (
                NotesError::FallbackExhausted {
                    primary: "404".into(),
                    fallback: "500".into(),
                },
                "capability_fallback_exhausted",
            ),
        ];
        for (err, category) in cases {
            assert_eq!(err.category(), category, "for: {err}");
        }
    }

    #[test]
    fn fallback_exhausted_display_names_both_shapes() {
        let e = NotesError::FallbackExhausted {
            primary: "HTTP 404".into(),
            fallback: "HTTP 500".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("HTTP 404"), "got: {msg}");
        assert!(msg.contains("HTTP 500"), "got: {msg}");
    }

    #[test]
    fn backend_auth_maps_to_auth() {
        let e = NotesError::from(BackendError::Auth {
            detail: "invalid key".into(),
        });
        assert_eq!(e.category(), "auth");
        assert!(e.to_string().contains("invalid key"));
    }

    #[test]
    fn backend_mismatch_maps_to_backend_failure() {
        // A mismatch that escapes the invoker means fallback never ran
        // (single-shape deployments); it is a plain backend failure.
        let e = NotesError::from(BackendError::CapabilityMismatch {
            detail: "HTTP 404".into(),
        });
        assert_eq!(e.category(), "backend_failure");
    }
}
