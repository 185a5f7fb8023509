//! The pipeline orchestrator: one request in, one notes document out.
//!
//! Strictly linear — validate, extract, prepare, invoke — with no state
//! carried between requests and no orchestrator-level retries. The single
//! primary→fallback retry lives inside the invoker; everything that fails
//! here is deterministic given the same input and retrying it locally
//! would only repeat the failure.

use crate::config::GenerationConfig;
use crate::error::NotesError;
use crate::output::{GenerationStats, NotesOutput};
use crate::pipeline::backend::BackendInvoker;
use crate::pipeline::{extract, prepare};
use crate::request::NotesRequest;
use std::time::Instant;
use tracing::info;

/// Run the full document-to-notes pipeline.
///
/// # Errors
/// * `invalid_input` — empty topic/PDF/key, unreadable container, or an
///   unknown notes style
/// * `no_extractable_text` — valid PDF with no text layer (scanned
///   document); the backend is never invoked
/// * `auth` / `rate_limited` / `backend_failure` /
///   `capability_fallback_exhausted` — classified backend outcomes
pub async fn generate_notes(
    request: &NotesRequest,
    config: &GenerationConfig,
) -> Result<NotesOutput, NotesError> {
    let start = Instant::now();

    // ── Step 1: Validate ─────────────────────────────────────────────────
    request.validate()?;
    info!("generating {} notes for topic '{}'", request.style_token(), request.topic);

    // ── Step 2: Extract ──────────────────────────────────────────────────
    let document = extract::extract(&request.pdf_bytes)?;
    if !document.has_text {
        return Err(NotesError::NoExtractableText {
            page_count: document.page_count,
        });
    }
    info!(
        "extracted {} chars from {} pages",
        document.raw_text.len(),
        document.page_count
    );

    // ── Step 3: Prepare ──────────────────────────────────────────────────
    let prompt = prepare::prepare(
        &document.raw_text,
        &request.topic,
        request.student_name.as_deref(),
        request.style_token(),
        config.max_source_chars,
    )?;

    // ── Step 4: Invoke ───────────────────────────────────────────────────
    let invoker = BackendInvoker::new(config)?;
    let reply = invoker
        .generate(&prompt.instruction_text, &request.api_key)
        .await
        .map_err(NotesError::from)?;

    // ── Step 5: Assemble ─────────────────────────────────────────────────
    let stats = GenerationStats {
        page_count: document.page_count,
        source_chars: prompt.source_chars,
        truncated: prompt.truncated,
        prompt_chars: prompt.instruction_text.len(),
        notes_chars: reply.text.len(),
    };
    info!(
        "notes generated via {:?} backend in {}ms ({} chars)",
        reply.mode,
        start.elapsed().as_millis(),
        stats.notes_chars
    );

    Ok(NotesOutput {
        notes_text: reply.text,
        style_used: prompt.style,
        backend_mode: reply.mode,
        stats,
    })
}
