//! Content preparation: truncate the extracted text and assemble the
//! instruction sent to the backend.
//!
//! Pure transformation — no I/O. The one policy decision here is the
//! truncation rule: source text beyond the configured budget (UTF-8
//! bytes) is cut at the last whitespace boundary at or before it (nearest
//! prior `char` boundary when the window has no whitespace), and the cut
//! is recorded so callers can tell the model saw a shortened document.
//! Truncation is a diagnostic, never an error.

use crate::error::NotesError;
use crate::prompts::{style_guidance, SYSTEM_DIRECTIVE};
use crate::request::NotesStyle;
use tracing::debug;

/// The assembled instruction for one backend call.
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    /// Full instruction text: directive, topic, optional student, style
    /// guidance, then the (possibly truncated) source text.
    pub instruction_text: String,
    /// Whether the source text was cut to the budget.
    pub truncated: bool,
    /// The parsed style that conditioned the instruction.
    pub style: NotesStyle,
    /// Length in bytes of the source text before truncation.
    pub source_chars: usize,
}

/// Build the instruction for the backend.
///
/// Fails only on an unrecognised `style_token`; everything else (including
/// over-budget source text) succeeds.
pub fn prepare(
    extracted_text: &str,
    topic: &str,
    student_name: Option<&str>,
    style_token: &str,
    max_source_chars: usize,
) -> Result<PreparedPrompt, NotesError> {
    let style: NotesStyle = style_token.parse()?;

    let source_chars = extracted_text.len();
    let (source, truncated) = truncate_on_whitespace(extracted_text, max_source_chars);
    if truncated {
        debug!(
            "source text truncated: {} -> {} bytes (budget {})",
            source_chars,
            source.len(),
            max_source_chars
        );
    }

    let mut instruction = String::with_capacity(source.len() + 512);
    instruction.push_str(SYSTEM_DIRECTIVE);
    instruction.push_str("\n\n");
    instruction.push_str(&format!("Topic: {topic}\n"));
    if let Some(name) = student_name {
        if !name.trim().is_empty() {
            instruction.push_str(&format!("Student: {name}\n"));
        }
    }
    instruction.push_str(&format!("Desired style: {style}\n"));
    instruction.push_str(&format!("Instructions: {}\n", style_guidance(style)));
    instruction.push_str("\nSource text:\n");
    instruction.push_str(source);

    Ok(PreparedPrompt {
        instruction_text: instruction,
        truncated,
        style,
        source_chars,
    })
}

/// Cut `text` to at most `budget` bytes, preferring the last whitespace
/// at or before the boundary so the model never sees half a word.
///
/// Falls back to the nearest prior `char` boundary when the window holds a
/// single unbroken run. Returns the (possibly shortened) slice and whether
/// a cut happened.
fn truncate_on_whitespace(text: &str, budget: usize) -> (&str, bool) {
    if text.len() <= budget {
        return (text, false);
    }

    // Walk back to a char boundary first; slicing mid-codepoint panics.
    let mut end = budget;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }

    let window = &text[..end];
    match window.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => (&text[..pos], true),
        _ => (window, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_all_sections() {
        let p = prepare(
            "Cell walls are rigid.",
            "Photosynthesis",
            Some("Riley"),
            "outline",
            24_000,
        )
        .unwrap();

        assert_eq!(p.style, NotesStyle::Outline);
        assert!(!p.truncated);
        assert!(p.instruction_text.starts_with(SYSTEM_DIRECTIVE));
        assert!(p.instruction_text.contains("Topic: Photosynthesis"));
        assert!(p.instruction_text.contains("Student: Riley"));
        assert!(p.instruction_text.contains("Desired style: outline"));
        assert!(p.instruction_text.contains("I., A., 1., a."));
        assert!(p.instruction_text.ends_with("Cell walls are rigid."));
    }

    #[test]
    fn student_line_omitted_when_absent() {
        let p = prepare("text", "Topic", None, "bulleted", 24_000).unwrap();
        assert!(!p.instruction_text.contains("Student:"));

        let p = prepare("text", "Topic", Some("   "), "bulleted", 24_000).unwrap();
        assert!(!p.instruction_text.contains("Student:"));
    }

    #[test]
    fn unknown_style_is_rejected() {
        let err = prepare("text", "Topic", None, "freeform", 24_000).unwrap_err();
        assert_eq!(err.category(), "invalid_input");
        assert!(err.to_string().contains("freeform"));
    }

    #[test]
    fn over_budget_source_is_truncated_with_flag() {
        let source = "word ".repeat(1_000); // 5000 chars
        let p = prepare(&source, "Topic", None, "summary", 1_000).unwrap();

        assert!(p.truncated);
        assert_eq!(p.source_chars, source.len());
        // The portion of instruction after the marker respects the budget.
        let sent = p
            .instruction_text
            .split("Source text:\n")
            .nth(1)
            .expect("source section");
        assert!(sent.len() <= 1_000, "sent {} chars", sent.len());
        assert!(!sent.ends_with("wor"), "cut mid-word: ...{sent:?}");
    }

    #[test]
    fn truncation_prefers_whitespace_boundary() {
        let (cut, truncated) = truncate_on_whitespace("alpha beta gamma", 12);
        assert!(truncated);
        assert_eq!(cut, "alpha beta");
    }

    #[test]
    fn truncation_without_whitespace_cuts_at_char_boundary() {
        let text = "éééééééééé"; // 2 bytes per char
        let (cut, truncated) = truncate_on_whitespace(text, 7);
        assert!(truncated);
        assert_eq!(cut, "ééé");
    }

    #[test]
    fn under_budget_source_untouched() {
        let (cut, truncated) = truncate_on_whitespace("short", 100);
        assert!(!truncated);
        assert_eq!(cut, "short");
    }
}
