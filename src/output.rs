//! Result-side types: what the pipeline hands back to its caller.

use crate::request::NotesStyle;
use serde::{Deserialize, Serialize};

/// Which backend request shape produced the notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// The modern single-shot "responses" interface answered.
    Primary,
    /// The legacy chat-completions interface answered after the primary
    /// shape proved unsupported.
    Fallback,
}

/// The product of one successful pipeline run.
///
/// Produced exactly once per request and never cached; the hosting layer
/// serialises it into the response body and drops it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesOutput {
    /// The generated notes, verbatim from the backend.
    pub notes_text: String,

    /// The style that conditioned the instruction.
    pub style_used: NotesStyle,

    /// Which request shape ultimately served the call.
    pub backend_mode: BackendMode,

    /// Size diagnostics for the run.
    pub stats: GenerationStats,
}

/// Caller-visible size diagnostics.
///
/// `truncated` in particular is informational, not an error: callers use it
/// to warn that very long documents were cut to the input budget.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Pages in the uploaded PDF.
    pub page_count: usize,
    /// Bytes of text extracted from the PDF before truncation.
    pub source_chars: usize,
    /// Whether the source text was cut to the input budget.
    pub truncated: bool,
    /// Bytes in the assembled instruction sent to the backend.
    pub prompt_chars: usize,
    /// Bytes in the generated notes.
    pub notes_chars: usize,
}
