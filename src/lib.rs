//! # jigsaw-notes
//!
//! Turn an uploaded PDF into style-conditioned study notes via an LLM
//! backend.
//!
//! ## Why this crate?
//!
//! Research assignments routinely arrive as a PDF of collected articles.
//! This crate owns the document-to-notes pipeline behind that workflow:
//! pull the PDF's text layer, fit it into the backend's input budget,
//! build a style-conditioned instruction (bulleted / outline / summary),
//! and drive an OpenAI-style API — transparently falling back from the
//! modern `responses` request shape to the legacy chat-completions shape
//! when a deployment only serves the latter. Scanned PDFs with no text
//! layer are detected and reported, never OCR'd.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Validate  topic / pdf / api key present
//!  ├─ 2. Extract   text layer per page, document order (lopdf)
//!  ├─ 3. Prepare   truncate to budget + assemble instruction
//!  ├─ 4. Invoke    /responses, falling back once to /chat/completions
//!  └─ 5. Output    notes text + style / backend-mode / size stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jigsaw_notes::{generate_notes, GenerationConfig, NotesRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = NotesRequest {
//!         topic: "Photosynthesis".into(),
//!         student_name: Some("Riley".into()),
//!         notes_style: Some("outline".into()),
//!         pdf_bytes: std::fs::read("assignment.pdf")?,
//!         api_key: std::env::var("OPENAI_API_KEY")?,
//!     };
//!     let output = generate_notes(&request, &GenerationConfig::default()).await?;
//!     println!("{}", output.notes_text);
//!     eprintln!("{} pages, truncated: {}", output.stats.page_count, output.stats.truncated);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | Enables the `notes-server` binary (axum + clap + tracing-subscriber) |
//!
//! Disable `server` when using only the library:
//! ```toml
//! jigsaw-notes = { version = "0.3", default-features = false }
//! ```
//!
//! Every request carries its own API key and owns its PDF buffer; nothing
//! is cached or shared between requests.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationConfig, GenerationConfigBuilder, DEFAULT_MAX_SOURCE_CHARS};
pub use error::{BackendError, NotesError};
pub use generate::generate_notes;
pub use output::{BackendMode, GenerationStats, NotesOutput};
pub use pipeline::backend::{BackendInvoker, BackendReply};
pub use pipeline::extract::ExtractedDocument;
pub use pipeline::prepare::PreparedPrompt;
pub use request::{NotesRequest, NotesStyle};
