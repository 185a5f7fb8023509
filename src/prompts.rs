//! Instruction text for the notes backend.
//!
//! Centralising every prompt fragment here serves two purposes:
//!
//! 1. **Single source of truth** — changing the assistant's role or a
//!    style's structural guidance means editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the fragments directly
//!    without a live backend, so prompt regressions are easy to catch.
//!
//! Assembly of the full instruction (topic, student, style, source text)
//! lives in [`crate::pipeline::prepare`]; this module only owns the fixed
//! wording.

use crate::request::NotesStyle;

/// Fixed directive describing the assistant's role.
///
/// The assistant produces study notes over the supplied source text, never
/// a transcript of it. Sent at the top of every instruction.
pub const SYSTEM_DIRECTIVE: &str = "You are a student completing a jigsaw research assignment. \
Read the provided document and return study notes in the selected style \
(bulleted, outline, or summary), not a transcript. Notes should cover each \
article or source in the document; if a source is inaccessible, write \
'Unable to access source.' in its place. Return between seven and ten lines \
of notes per source, depending on its length. Use natural, informal note \
formatting with some variation in capitalisation and punctuation.";

/// Structural guidance embedded in the instruction for the given style.
pub fn style_guidance(style: NotesStyle) -> &'static str {
    match style {
        NotesStyle::Bulleted => {
            "Return clear bullet points. Include sub-bullets as needed to appear natural."
        }
        NotesStyle::Outline => "Return an outline using I., A., 1., a. structure.",
        NotesStyle::Summary => {
            "Return a concise multi-paragraph summary highlighting main ideas and definitions."
        }
    }
}
