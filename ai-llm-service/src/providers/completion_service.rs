//! Text-completion client for a llama.cpp / OpenAI-style `/v1/completions` endpoint.
//!
//! - POST {base}/v1/completions with `{"prompt", "n_predict", "temperature"}`
//! - Reads `choices[0].text` from the response.
//!
//! Temperature is fixed at [`COMPLETION_TEMPERATURE`].

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use services::{HttpRequest, Transport};
use tracing::{debug, error, info, instrument};

use crate::error_handler::{AiLlmError, Result, make_snippet};

/// Path of the completions endpoint relative to the service base URL.
pub const COMPLETIONS_PATH: &str = "/v1/completions";

/// Sampling temperature sent with every completion request.
pub const COMPLETION_TEMPERATURE: f32 = 0.7;

/// Thin completions client over a [`Transport`].
#[derive(Clone)]
pub struct CompletionService {
    transport: Arc<dyn Transport>,
}

impl CompletionService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Generates up to `max_tokens` tokens for `prompt` and returns the raw text.
    ///
    /// # Errors
    /// - [`AiLlmError::Transport`] on non-2xx status or connection failure
    /// - [`AiLlmError::InvalidResponseFormat`] if `choices[0].text` is absent
    #[instrument(level = "debug", skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn generate_completion(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let started = Instant::now();
        let body = serde_json::to_string(&CompletionRequest {
            prompt,
            n_predict: max_tokens,
            temperature: COMPLETION_TEMPERATURE,
        })?;

        debug!(max_tokens, "POST {}", COMPLETIONS_PATH);
        let resp = self
            .transport
            .send(HttpRequest::post(COMPLETIONS_PATH, body))
            .await?;

        if !resp.is_success() {
            error!(
                method = %resp.request_method,
                url = %resp.request_url,
                status = resp.status,
                snippet = %make_snippet(&resp.body),
                latency_ms = started.elapsed().as_millis(),
                "{} returned non-success status", COMPLETIONS_PATH
            );
        }
        let resp = resp.error_for_status()?;

        let text = parse_completion(&resp.body).map_err(|e| {
            error!(
                method = %resp.request_method,
                url = %resp.request_url,
                snippet = %make_snippet(&resp.body),
                "failed to decode {} response", COMPLETIONS_PATH
            );
            e
        })?;

        info!(
            output_len = text.len(),
            latency_ms = started.elapsed().as_millis(),
            "completion finished"
        );
        Ok(text)
    }
}

fn parse_completion(body: &str) -> Result<String> {
    const EXPECTED: &str = "non-empty `choices` array with string `choices[0].text`";

    let out: CompletionResponse =
        serde_json::from_str(body).map_err(|_| AiLlmError::invalid_format(EXPECTED, body))?;

    out.choices
        .into_iter()
        .next()
        .and_then(|c| c.text)
        .ok_or_else(|| AiLlmError::invalid_format(EXPECTED, body))
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::TransportError;
    use services::testing::ScriptedTransport;

    fn service(t: &ScriptedTransport) -> CompletionService {
        CompletionService::new(Arc::new(t.clone()))
    }

    #[tokio::test]
    async fn posts_prompt_budget_and_fixed_temperature() {
        let t = ScriptedTransport::replying(200, r#"{"choices":[{"text":" Paris.","index":0}]}"#);
        let out = service(&t)
            .generate_completion("Capital of \"France\"?", 64)
            .await
            .unwrap();
        assert_eq!(out, " Paris.");

        let calls = t.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method.as_str(), "POST");
        assert_eq!(calls[0].path, COMPLETIONS_PATH);
        let sent: serde_json::Value = serde_json::from_str(calls[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["prompt"], "Capital of \"France\"?");
        assert_eq!(sent["n_predict"], 64);
        assert!((sent["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn malformed_choices_are_invalid_format() {
        for body in [
            r#"{}"#,
            r#"{"choices":[]}"#,
            r#"{"choices":{"text":"x"}}"#,
            r#"{"choices":[{"message":"x"}]}"#,
            r#"{"choices":[{"text":42}]}"#,
        ] {
            let t = ScriptedTransport::replying(200, body);
            let err = service(&t).generate_completion("p", 8).await.unwrap_err();
            assert!(
                matches!(err, AiLlmError::InvalidResponseFormat { .. }),
                "body {body} gave {err}"
            );
        }
    }

    #[tokio::test]
    async fn non_success_status_is_transport_error() {
        let t = ScriptedTransport::replying(500, "model not loaded");
        let err = service(&t).generate_completion("p", 8).await.unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Transport(TransportError::Status { status: 500, .. })
        ));
    }
}
