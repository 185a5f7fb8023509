//! Request-side types: what a caller hands the pipeline.

use crate::error::NotesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Structural template applied when instructing the backend.
///
/// Parsed from the request's `notes_style` field; `Bulleted` is the default
/// when the field is absent. An *unrecognised* value is rejected rather
/// than silently defaulted — a typo like `"outlnie"` should fail loudly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotesStyle {
    /// Flat list of key points. (default)
    #[default]
    Bulleted,
    /// Hierarchical headings and sub-points (I., A., 1., a.).
    Outline,
    /// Short prose synthesis.
    Summary,
}

impl NotesStyle {
    /// Wire token for this style, as it appears in requests and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotesStyle::Bulleted => "bulleted",
            NotesStyle::Outline => "outline",
            NotesStyle::Summary => "summary",
        }
    }
}

impl fmt::Display for NotesStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotesStyle {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bulleted" => Ok(NotesStyle::Bulleted),
            "outline" => Ok(NotesStyle::Outline),
            "summary" => Ok(NotesStyle::Summary),
            other => Err(NotesError::InvalidInput {
                reason: format!(
                    "unknown notes style '{other}' (expected bulleted, outline or summary)"
                ),
            }),
        }
    }
}

/// A single notes-generation request.
///
/// Entirely request-scoped: the PDF buffer and the API key are owned by
/// this value and dropped when the response is produced. Nothing here is
/// cached or shared between requests.
#[derive(Debug, Clone)]
pub struct NotesRequest {
    /// The assignment topic the notes should focus on. Required, non-empty.
    pub topic: String,

    /// Student name for personalisation; omitted from the prompt if absent.
    pub student_name: Option<String>,

    /// Requested notes style token; `None` means [`NotesStyle::Bulleted`].
    pub notes_style: Option<String>,

    /// Raw bytes of the uploaded PDF. Required, non-empty.
    pub pdf_bytes: Vec<u8>,

    /// Caller-supplied LLM API key. Required; format is not validated
    /// locally — the provider rejects bad keys itself.
    pub api_key: String,
}

impl NotesRequest {
    /// Check the field invariants the rest of the pipeline relies on.
    ///
    /// Style validity is *not* checked here; the Content Preparer owns
    /// style parsing and rejects unknown values there.
    pub fn validate(&self) -> Result<(), NotesError> {
        if self.topic.trim().is_empty() {
            return Err(NotesError::InvalidInput {
                reason: "topic must not be empty".into(),
            });
        }
        if self.pdf_bytes.is_empty() {
            return Err(NotesError::InvalidInput {
                reason: "pdf upload is empty".into(),
            });
        }
        if self.api_key.trim().is_empty() {
            return Err(NotesError::InvalidInput {
                reason: "api key is required".into(),
            });
        }
        Ok(())
    }

    /// The style token to be parsed by the preparer, defaulted when absent.
    pub fn style_token(&self) -> &str {
        self.notes_style
            .as_deref()
            .unwrap_or(NotesStyle::Bulleted.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NotesRequest {
        NotesRequest {
            topic: "Photosynthesis".into(),
            student_name: None,
            notes_style: None,
            pdf_bytes: b"%PDF-1.5 stub".to_vec(),
            api_key: "sk-test".into(),
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn blank_topic_rejected() {
        let mut r = request();
        r.topic = "   ".into();
        let err = r.validate().unwrap_err();
        assert_eq!(err.category(), "invalid_input");
        assert!(err.to_string().contains("topic"));
    }

    #[test]
    fn empty_pdf_rejected() {
        let mut r = request();
        r.pdf_bytes.clear();
        assert!(r.validate().is_err());
    }

    #[test]
    fn missing_key_rejected() {
        let mut r = request();
        r.api_key = String::new();
        assert!(r.validate().is_err());
    }

    #[test]
    fn style_parsing() {
        assert_eq!("outline".parse::<NotesStyle>().unwrap(), NotesStyle::Outline);
        assert_eq!("summary".parse::<NotesStyle>().unwrap(), NotesStyle::Summary);
        assert!("narrative".parse::<NotesStyle>().is_err());
        // Matching is exact: no case folding, no trimming.
        assert!("Bulleted".parse::<NotesStyle>().is_err());
    }

    #[test]
    fn style_token_defaults_to_bulleted() {
        assert_eq!(request().style_token(), "bulleted");
        let mut r = request();
        r.notes_style = Some("summary".into());
        assert_eq!(r.style_token(), "summary");
    }
}
