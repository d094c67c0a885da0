use ratescan_core::{CompletionBackend, Error, Result};
use serde::{Deserialize, Serialize};

/// Explicit client configuration; nothing here is read from the process
/// environment, the caller owns the values.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    /// Overall ceiling for one generate call. Local inference on a tariff
    /// excerpt can legitimately take minutes.
    pub timeout_ms: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "qwen2.5:7b-instruct".to_string(),
            timeout_ms: 300_000,
        }
    }
}

/// Non-streaming client for Ollama's `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(client: reqwest::Client, config: OllamaConfig) -> Self {
        Self { client, config }
    }

    fn endpoint_generate(&self) -> String {
        format!(
            "{}/api/generate",
            self.config.base_url.trim_end_matches('/')
        )
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait::async_trait]
impl CompletionBackend for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let req = GenerateRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            stream: Some(false),
        };

        log::info!(
            "calling ollama model={} prompt_chars={}",
            self.config.model,
            prompt.len()
        );
        let t0 = std::time::Instant::now();
        let resp = self
            .client
            .post(self.endpoint_generate())
            .timeout(std::time::Duration::from_millis(self.config.timeout_ms))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::Llm(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Llm(format!("ollama generate HTTP {status}")));
        }

        let parsed: GenerateResponse = resp.json().await.map_err(|e| Error::Llm(e.to_string()))?;
        log::info!(
            "ollama reply received in {:.1}s ({} chars)",
            t0.elapsed().as_secs_f64(),
            parsed.response.len()
        );
        Ok(parsed.response)
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use std::net::SocketAddr;

    async fn spawn_stub(reply: &'static str) -> SocketAddr {
        let app = Router::new().route(
            "/api/generate",
            post(move |Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["stream"], false);
                assert!(body["prompt"].as_str().is_some());
                Json(serde_json::json!({
                    "model": body["model"],
                    "response": reply,
                    "done": true,
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn complete_returns_response_field() {
        let addr = spawn_stub("{\"schedules\": []}").await;
        let client = OllamaClient::new(
            reqwest::Client::new(),
            OllamaConfig {
                base_url: format!("http://{addr}/"),
                model: "test-model".to_string(),
                timeout_ms: 2_000,
            },
        );
        let out = client.complete("extract the schedule").await.unwrap();
        assert_eq!(out, "{\"schedules\": []}");
    }

    #[tokio::test]
    async fn complete_surfaces_http_errors() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = OllamaClient::new(
            reqwest::Client::new(),
            OllamaConfig {
                base_url: format!("http://{addr}"),
                model: "test-model".to_string(),
                timeout_ms: 2_000,
            },
        );
        let err = client.complete("p").await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)), "unexpected error: {err}");
    }
}
