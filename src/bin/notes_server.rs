//! HTTP server binary for jigsaw-notes.
//!
//! A thin hosting layer over the library crate: serves the upload form,
//! decodes the multipart request into a [`NotesRequest`], runs the
//! pipeline, and maps [`NotesError`] categories onto HTTP statuses. All
//! pipeline contracts live in the library; nothing here retries, caches,
//! or shares state between requests beyond the immutable config.

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::Multipart;
use clap::Parser;
use jigsaw_notes::{generate_notes, GenerationConfig, NotesError, NotesRequest};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Uploads are mostly multi-page article packets; 25 MiB covers them with
/// room to spare while keeping abuse bounded.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "notes-server", version, about = "PDF → study-notes generation service")]
struct Args {
    /// Address to bind.
    #[arg(long, env = "NOTES_BIND", default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// LLM model identifier.
    #[arg(long, env = "NOTES_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Base URL of the OpenAI-style API.
    #[arg(long, env = "NOTES_API_BASE", default_value = "https://api.openai.com/v1")]
    api_base: String,
}

#[derive(Clone)]
struct AppState {
    config: Arc<GenerationConfig>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = GenerationConfig::builder()
        .model(&args.model)
        .api_base(&args.api_base)
        .build()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let state = AppState {
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/", get(upload_form))
        .route("/jigsaw/annotate", post(annotate))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("listening on http://{}", args.bind);
    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn upload_form() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Decode the multipart form, run the pipeline, and serialise the result.
async fn annotate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut topic: Option<String> = None;
    let mut student_name: Option<String> = None;
    let mut notes_style: Option<String> = None;
    let mut pdf_bytes: Option<Vec<u8>> = None;
    let mut pdf_filename: Option<String> = None;
    let mut api_key: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("multipart decode failed: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "topic" => topic = Some(read_text(field).await?),
            "student_name" => {
                let v = read_text(field).await?;
                if !v.trim().is_empty() {
                    student_name = Some(v);
                }
            }
            "notes_style" => {
                let v = read_text(field).await?;
                if !v.trim().is_empty() {
                    notes_style = Some(v);
                }
            }
            "openai_key" => api_key = Some(read_text(field).await?),
            "pdf" => {
                if let Some(ct) = field.content_type() {
                    if ct != "application/pdf" && ct != "application/octet-stream" {
                        return Err(AppError::BadRequest(format!(
                            "only PDF uploads are accepted, got content type '{ct}'"
                        )));
                    }
                }
                pdf_filename = field.file_name().map(str::to_string);
                pdf_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("pdf upload failed: {e}")))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let request = NotesRequest {
        topic: topic.unwrap_or_default(),
        student_name,
        notes_style,
        pdf_bytes: pdf_bytes.unwrap_or_default(),
        api_key: api_key.unwrap_or_default(),
    };
    let n_bytes = request.pdf_bytes.len();

    let output = generate_notes(&request, &state.config).await?;

    Ok(Json(json!({
        "received": {
            "filename": pdf_filename,
            "n_bytes": n_bytes,
        },
        "payload": {
            "topic": request.topic,
            "student_name": request.student_name,
            "notes_style": output.style_used,
        },
        "notes": output.notes_text,
        "backend_mode": output.backend_mode,
        "stats": output.stats,
    })))
}

async fn read_text(field: axum_extra::extract::multipart::Field) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("form field decode failed: {e}")))
}

// ── Error mapping ────────────────────────────────────────────────────────

/// Server-level error wrapper: pipeline failures plus request-decoding
/// problems the library never sees.
enum AppError {
    Pipeline(NotesError),
    BadRequest(String),
}

impl From<NotesError> for AppError {
    fn from(err: NotesError) -> Self {
        AppError::Pipeline(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, category, detail) = match self {
            AppError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "invalid_input", detail)
            }
            AppError::Pipeline(err) => {
                error!("pipeline failure [{}]: {err}", err.category());
                let status = match err.category() {
                    "invalid_input" | "no_extractable_text" => StatusCode::UNPROCESSABLE_ENTITY,
                    "auth" => StatusCode::UNAUTHORIZED,
                    "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, err.category(), err.to_string())
            }
        };
        (status, Json(json!({ "error": category, "detail": detail }))).into_response()
    }
}

// ── Frontend ─────────────────────────────────────────────────────────────

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Upload Jigsaw Assignment PDF</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 900px; margin: 2rem auto; padding: 0 1rem; }
    form > div { margin: 0.75rem 0; }
    input[type="text"], select { padding: 0.45rem 0.6rem; width: 420px; }
    button { padding: 0.7rem 1.1rem; border-radius: 10px; border: 1px solid #222; background: #222; color: #fff; cursor: pointer; }
    pre#out { white-space: pre-wrap; border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-top: 1.25rem; }
    .muted { color: #666; font-size: 0.9rem; margin-top: 0.5rem; }
  </style>
</head>
<body>
  <h1>Upload Jigsaw Assignment PDF</h1>
  <form id="jigsaw-form" action="/jigsaw/annotate" method="post" enctype="multipart/form-data">
    <div><label>Topic</label><br/><input type="text" name="topic" required /></div>
    <div><label>Student Name</label><br/><input type="text" name="student_name" /></div>
    <div><label>Notes Style</label><br/>
      <select name="notes_style">
        <option value="bulleted">Bulleted</option>
        <option value="outline">Outline</option>
        <option value="summary">Summary</option>
      </select>
    </div>
    <div><label>Upload PDF</label><br/><input type="file" name="pdf" accept=".pdf" required /></div>
    <div><label>OpenAI API Key</label><br/><input type="text" name="openai_key" placeholder="sk-..." required /></div>
    <button type="submit">Generate Notes</button>
    <div class="muted">Your key is used only for this request and not stored.</div>
  </form>

  <pre id="out"></pre>

  <script>
    const form = document.getElementById('jigsaw-form');
    const outEl = document.getElementById('out');
    form.addEventListener('submit', async (e) => {
      e.preventDefault();
      outEl.textContent = "Working…";
      const res = await fetch('/jigsaw/annotate', { method: 'POST', body: new FormData(form) });
      const raw = await res.text();
      if (!res.ok) {
        try {
          const err = JSON.parse(raw);
          outEl.textContent = `Error ${res.status} (${err.error || "server"}): ${err.detail || raw}`;
        } catch {
          outEl.textContent = `Error ${res.status}: ${raw}`;
        }
        return;
      }
      const json = JSON.parse(raw);
      outEl.textContent = json.notes || JSON.stringify(json, null, 2);
    });
  </script>
</body>
</html>
"#;
