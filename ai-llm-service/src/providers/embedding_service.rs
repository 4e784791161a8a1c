//! Embedding client for an OpenAI-compatible `/v1/embeddings` endpoint.
//!
//! - POST {base}/v1/embeddings with `{"input": text}`
//! - Reads `data[0].embedding` from the response.
//!
//! No caching: every call hits the backend, even for repeated text.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use services::{HttpRequest, Transport};
use tracing::{debug, error, info, instrument};

use crate::error_handler::{AiLlmError, Result, make_snippet};

/// Path of the embeddings endpoint relative to the service base URL.
pub const EMBEDDINGS_PATH: &str = "/v1/embeddings";

/// Thin embeddings client over a [`Transport`].
#[derive(Clone)]
pub struct EmbeddingService {
    transport: Arc<dyn Transport>,
}

impl EmbeddingService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Returns the embedding vector for `text`.
    ///
    /// # Errors
    /// - [`AiLlmError::Transport`] on non-2xx status or connection failure
    /// - [`AiLlmError::InvalidResponseFormat`] if `data[0].embedding` is absent
    ///   or not an array of numbers
    #[instrument(level = "debug", skip(self, text), fields(input_len = text.len()))]
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let started = Instant::now();
        let body = serde_json::to_string(&EmbeddingsRequest { input: text })?;

        debug!("POST {}", EMBEDDINGS_PATH);
        let resp = self
            .transport
            .send(HttpRequest::post(EMBEDDINGS_PATH, body))
            .await?;

        if !resp.is_success() {
            error!(
                method = %resp.request_method,
                url = %resp.request_url,
                status = resp.status,
                snippet = %make_snippet(&resp.body),
                latency_ms = started.elapsed().as_millis(),
                "{} returned non-success status", EMBEDDINGS_PATH
            );
        }
        let resp = resp.error_for_status()?;

        let embedding = parse_embedding(&resp.body).map_err(|e| {
            error!(
                method = %resp.request_method,
                url = %resp.request_url,
                snippet = %make_snippet(&resp.body),
                "failed to decode {} response", EMBEDDINGS_PATH
            );
            e
        })?;

        info!(
            dim = embedding.len(),
            latency_ms = started.elapsed().as_millis(),
            "embedding completed"
        );
        Ok(embedding)
    }
}

/// Extracts `data[0].embedding` from an embeddings response body.
fn parse_embedding(body: &str) -> Result<Vec<f32>> {
    const EXPECTED: &str = "non-empty `data` array with `data[0].embedding`";

    let out: EmbeddingsResponse =
        serde_json::from_str(body).map_err(|_| AiLlmError::invalid_format(EXPECTED, body))?;

    out.data
        .into_iter()
        .next()
        .map(|item| item.embedding)
        .ok_or_else(|| AiLlmError::invalid_format(EXPECTED, body))
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `/v1/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    input: &'a str,
}

/// Response body for `/v1/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::TransportError;
    use services::testing::ScriptedTransport;

    fn service(t: &ScriptedTransport) -> EmbeddingService {
        EmbeddingService::new(Arc::new(t.clone()))
    }

    #[tokio::test]
    async fn sends_input_and_parses_first_embedding() {
        let t = ScriptedTransport::replying(
            200,
            r#"{"data":[{"embedding":[0.5, -1, 2.25],"index":0},{"embedding":[9]}],"model":"m"}"#,
        );
        let v = service(&t).embed("he said \"hi\"").await.unwrap();
        assert_eq!(v, vec![0.5, -1.0, 2.25]);

        let calls = t.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method.as_str(), "POST");
        assert_eq!(calls[0].path, "/v1/embeddings");
        let sent: serde_json::Value = serde_json::from_str(calls[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, serde_json::json!({"input": "he said \"hi\""}));
    }

    #[tokio::test]
    async fn missing_data_is_invalid_format() {
        let t = ScriptedTransport::replying(200, r#"{"object":"list"}"#);
        let err = service(&t).embed("x").await.unwrap_err();
        match err {
            AiLlmError::InvalidResponseFormat { body, .. } => assert_eq!(body, r#"{"object":"list"}"#),
            other => panic!("unexpected: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_or_non_array_data_is_invalid_format() {
        for body in [
            r#"{"data":[]}"#,
            r#"{"data":{"embedding":[1]}}"#,
            r#"{"data":[{"vector":[1]}]}"#,
            r#"{"data":[{"embedding":"nope"}]}"#,
            "not json",
        ] {
            let t = ScriptedTransport::replying(200, body);
            let err = service(&t).embed("x").await.unwrap_err();
            assert!(
                matches!(err, AiLlmError::InvalidResponseFormat { .. }),
                "body {body} gave {err}"
            );
        }
    }

    #[tokio::test]
    async fn non_success_status_is_transport_error() {
        let t = ScriptedTransport::replying(503, "overloaded");
        let err = service(&t).embed("x").await.unwrap_err();
        match err {
            AiLlmError::Transport(TransportError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected: {other}"),
        }
        assert_eq!(t.calls().len(), 1);
    }

    #[tokio::test]
    async fn repeated_text_is_not_cached() {
        let t = ScriptedTransport::replying(200, r#"{"data":[{"embedding":[1,2]}]}"#);
        let svc = service(&t);
        let a = svc.embed("same").await.unwrap();
        let b = svc.embed("same").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(t.calls().len(), 2);
    }
}
