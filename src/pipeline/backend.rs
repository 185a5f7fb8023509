//! Backend invocation: send the instruction to the LLM provider, falling
//! back between two request shapes.
//!
//! ## Dual-shape capability negotiation
//!
//! OpenAI-style deployments expose the modern single-shot `/responses`
//! interface, the legacy `/chat/completions` interface, or both. Rather
//! than hard-coding one, the invoker walks an ordered list of shapes:
//! the primary shape is tried first, and only a *capability mismatch*
//! (the endpoint does not exist at this deployment — HTTP 404/405) moves
//! on to the legacy shape, exactly once. Authentication and rate-limit
//! failures stop immediately: a bad key is bad for both shapes, and a
//! throttled caller should not be hit with a second request.
//!
//! ## Proxy policy
//!
//! Ambient `HTTP_PROXY`/`HTTPS_PROXY` variables are a recurring cause of
//! spurious transport failures in constrained networks, so the client is
//! built with `no_proxy()`. This is a construction-time policy of the
//! invoker, not a per-request option.

use crate::config::GenerationConfig;
use crate::error::{BackendError, NotesError};
use crate::output::BackendMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// The request shapes the provider may support, in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiShape {
    /// Modern single-shot generation: `POST {base}/responses`.
    Responses,
    /// Legacy conversational completion: `POST {base}/chat/completions`.
    ChatCompletions,
}

impl ApiShape {
    fn path(self) -> &'static str {
        match self {
            ApiShape::Responses => "/responses",
            ApiShape::ChatCompletions => "/chat/completions",
        }
    }
}

/// Fallback order: primary first, legacy second.
const SHAPE_ORDER: [ApiShape; 2] = [ApiShape::Responses, ApiShape::ChatCompletions];

/// Text returned by a successful invocation, tagged with the shape that
/// served it.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub text: String,
    pub mode: BackendMode,
}

/// One outbound connection to the LLM provider.
///
/// Holds the HTTP client and the request parameters that are fixed per
/// run; the caller's API key stays request-scoped and is passed to
/// [`BackendInvoker::generate`] on every call, so concurrent requests
/// never share a credential.
#[derive(Debug, Clone)]
pub struct BackendInvoker {
    client: reqwest::Client,
    api_base: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl BackendInvoker {
    /// Build an invoker from the run configuration.
    ///
    /// The underlying client ignores proxy environment variables and
    /// enforces the configured per-call timeout.
    pub fn new(config: &GenerationConfig) -> Result<Self, NotesError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .no_proxy()
            .build()
            .map_err(|e| NotesError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Send the instruction, trying each shape in [`SHAPE_ORDER`].
    ///
    /// At most two outbound calls are made: the primary shape, plus the
    /// legacy shape iff the primary failed with a capability mismatch.
    /// When the fallback also fails, `Auth` and `RateLimited` surface as
    /// themselves (a bad credential is bad regardless of shape); any other
    /// fallback failure becomes [`BackendError::FallbackExhausted`]
    /// carrying both shapes' causes.
    pub async fn generate(
        &self,
        instruction: &str,
        api_key: &str,
    ) -> Result<BackendReply, BackendError> {
        let mut primary_mismatch: Option<String> = None;

        for (attempt, shape) in SHAPE_ORDER.iter().enumerate() {
            match self.call_shape(*shape, instruction, api_key).await {
                Ok(text) => {
                    let mode = if attempt == 0 {
                        BackendMode::Primary
                    } else {
                        BackendMode::Fallback
                    };
                    debug!("backend answered via {shape:?} ({} chars)", text.len());
                    return Ok(BackendReply { text, mode });
                }
                Err(BackendError::CapabilityMismatch { detail })
                    if attempt + 1 < SHAPE_ORDER.len() =>
                {
                    warn!("{shape:?} shape unsupported ({detail}); trying legacy shape");
                    primary_mismatch = Some(detail);
                }
                Err(err) => {
                    return Err(match (primary_mismatch, err) {
                        // Auth / rate-limit verdicts hold for both shapes.
                        (Some(_), e @ BackendError::Auth { .. }) => e,
                        (Some(_), e @ BackendError::RateLimited { .. }) => e,
                        (Some(primary), e) => BackendError::FallbackExhausted {
                            primary,
                            fallback: e.to_string(),
                        },
                        (None, e) => e,
                    });
                }
            }
        }

        // SHAPE_ORDER is non-empty; every iteration returns.
        unreachable!("shape loop exited without a verdict")
    }

    /// One HTTP attempt against one shape.
    async fn call_shape(
        &self,
        shape: ApiShape,
        instruction: &str,
        api_key: &str,
    ) -> Result<String, BackendError> {
        let url = format!("{}{}", self.api_base, shape.path());
        debug!("POST {url} (model {})", self.model);

        let request = self.client.post(&url).bearer_auth(api_key);
        let request = match shape {
            ApiShape::Responses => request.json(&ResponsesRequest {
                model: &self.model,
                input: instruction,
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            }),
            ApiShape::ChatCompletions => request.json(&ChatRequest {
                model: &self.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: instruction,
                }],
                temperature: self.temperature,
                max_tokens: self.max_output_tokens,
            }),
        };

        let response = request
            .send()
            .await
            .map_err(|source| BackendError::Transport { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_failure(shape, response).await);
        }

        match shape {
            ApiShape::Responses => {
                let body: ResponsesReply =
                    response.json().await.map_err(|e| BackendError::Malformed {
                        detail: format!("responses body: {e}"),
                    })?;
                let text = body.output_text();
                if text.is_empty() {
                    return Err(BackendError::Malformed {
                        detail: "responses body carried no output_text content".into(),
                    });
                }
                Ok(text)
            }
            ApiShape::ChatCompletions => {
                let body: ChatReply =
                    response.json().await.map_err(|e| BackendError::Malformed {
                        detail: format!("chat completions body: {e}"),
                    })?;
                body.choices
                    .into_iter()
                    .next()
                    .map(|c| c.message.content)
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| BackendError::Malformed {
                        detail: "chat completions body carried no choices".into(),
                    })
            }
        }
    }
}

/// Classify a non-2xx provider response.
///
/// Status code decides the kind; the body's `error.message` (the OpenAI
/// error envelope) only enriches the detail. 404/405 mean the shape's
/// endpoint does not exist at this deployment — the HTTP analogue of an
/// SDK lacking the method.
async fn classify_failure(shape: ApiShape, response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let retry_after_secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let body = response.text().await.unwrap_or_default();
    let provider_message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty());

    let detail = match provider_message {
        Some(msg) => format!("HTTP {status} from {}: {msg}", shape.path()),
        None => format!("HTTP {status} from {}", shape.path()),
    };

    match status {
        401 | 403 => BackendError::Auth { detail },
        429 => BackendError::RateLimited { retry_after_secs },
        404 | 405 => BackendError::CapabilityMismatch { detail },
        code => BackendError::Api {
            status: code,
            message: detail,
        },
    }
}

// ── Wire shapes ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output: Vec<ResponsesOutputItem>,
}

#[derive(Deserialize)]
struct ResponsesOutputItem {
    #[serde(default)]
    content: Vec<ResponsesContentPart>,
}

#[derive(Deserialize)]
struct ResponsesContentPart {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

impl ResponsesReply {
    /// Concatenate every `output_text` part, in order.
    fn output_text(&self) -> String {
        self.output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .map(|part| part.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: String,
}

/// OpenAI-style error envelope: `{"error": {"message": ...}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_reply_joins_output_text_parts() {
        let body = r#"{
            "output": [
                {"content": [{"type": "reasoning", "text": "hmm"}]},
                {"content": [
                    {"type": "output_text", "text": "- point one\n"},
                    {"type": "output_text", "text": "- point two"}
                ]}
            ]
        }"#;
        let reply: ResponsesReply = serde_json::from_str(body).unwrap();
        assert_eq!(reply.output_text(), "- point one\n- point two");
    }

    #[test]
    fn responses_reply_tolerates_missing_fields() {
        let reply: ResponsesReply = serde_json::from_str("{}").unwrap();
        assert!(reply.output_text().is_empty());
    }

    #[test]
    fn chat_reply_takes_first_choice() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "notes"}}]}"#;
        let reply: ChatReply = serde_json::from_str(body).unwrap();
        assert_eq!(reply.choices[0].message.content, "notes");
    }

    #[test]
    fn error_envelope_parses_provider_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        let env: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(env.error.message, "Incorrect API key provided");
    }

    #[test]
    fn shape_paths() {
        assert_eq!(ApiShape::Responses.path(), "/responses");
        assert_eq!(ApiShape::ChatCompletions.path(), "/chat/completions");
        assert_eq!(SHAPE_ORDER[0], ApiShape::Responses);
    }
}
