//! Pipeline stages for PDF-to-notes generation.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap an
//! implementation (e.g. a different PDF parser) without touching the
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ prepare ──▶ backend
//! (lopdf)     (truncate   (LLM call,
//!              + prompt)   shape fallback)
//! ```
//!
//! 1. [`extract`] — parse the uploaded PDF bytes and pull the text layer,
//!    page by page, in document order; pure
//! 2. [`prepare`] — truncate to the input budget and assemble the
//!    style-conditioned instruction; pure
//! 3. [`backend`] — drive the provider call with the one-shot shape
//!    fallback; the only stage with network I/O

pub mod backend;
pub mod extract;
pub mod prepare;
