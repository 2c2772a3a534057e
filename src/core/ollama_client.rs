// src/core/ollama_client.rs
//! HTTP client for a local Ollama server

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::config_manager::OllamaConfig;
use crate::error::ExtractionError;
use crate::intake::JobExtractor;
use crate::parsing::{self, prompts, ExtractedJob};
use crate::types::response::{
    ChatMessage, ChatOptions, ChatRequest, ChatResponse, OllamaErrorBody, TagsResponse,
};

const CHAT_ENDPOINT: &str = "/api/chat";
const TAGS_ENDPOINT: &str = "/api/tags";

const TEMPERATURE: f32 = 0.1;
const MAX_PREDICT_TOKENS: u32 = 1000;

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One non-streaming chat completion; returns the assistant message text
    pub async fn chat(&self, system: &str, user: &str) -> Result<String, ExtractionError> {
        let url = format!("{}{}", self.base_url, CHAT_ENDPOINT);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: TEMPERATURE,
                num_predict: MAX_PREDICT_TOKENS,
            },
        };

        info!("Calling Ollama chat: {} (model: {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| ExtractionError::Connection {
                url: self.base_url.clone(),
                source,
            })?;

        let chat: ChatResponse = self.read_json(response).await?;
        debug!("Ollama chat finished (done: {})", chat.done);

        let content = chat.message.map(|m| m.content).unwrap_or_default();
        if content.trim().is_empty() {
            return Err(ExtractionError::EmptyContent);
        }
        Ok(content)
    }

    /// Names of the models installed on the server
    pub async fn list_models(&self) -> Result<Vec<String>, ExtractionError> {
        let url = format!("{}{}", self.base_url, TAGS_ENDPOINT);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ExtractionError::Connection {
                url: self.base_url.clone(),
                source,
            })?;

        let tags: TagsResponse = self.read_json(response).await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// True if the configured model (any tag) is installed. Never fails.
    pub async fn check_model_available(&self) -> bool {
        match self.list_models().await {
            Ok(models) => model_matches(&self.model, &models),
            Err(e) => {
                warn!("Model availability check failed: {}", e);
                false
            }
        }
    }

    async fn read_json<R: DeserializeOwned>(&self, response: Response) -> Result<R, ExtractionError> {
        let status = response.status();
        let body = response.text().await.map_err(|source| ExtractionError::Connection {
            url: self.base_url.clone(),
            source,
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<OllamaErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            warn!("Ollama returned {}: {}", status, message);
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ExtractionError::Parse(format!("unexpected response from Ollama: {e}")))
    }
}

#[async_trait]
impl JobExtractor for OllamaClient {
    async fn extract(&self, raw_text: &str) -> Result<ExtractedJob, ExtractionError> {
        let system = prompts::extraction_system_prompt();
        let user = prompts::extraction_user_prompt(raw_text);

        let content = self.chat(&system, &user).await?;
        parsing::parse_reply(&content)
    }
}

/// `llama3.1` matches `llama3.1:latest`; `llama3.1:8b` also matches `llama3.1:latest`
fn model_matches(wanted: &str, installed: &[String]) -> bool {
    let base = wanted.split(':').next().unwrap_or(wanted);
    installed
        .iter()
        .any(|name| name.contains(wanted) || name.starts_with(base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one canned HTTP response, then closes
    async fn one_shot_server(status: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{addr}")
    }

    /// Reads headers plus `Content-Length` bytes of body
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (key, value) = line.split_once(':')?;
                        key.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    return;
                }
            }
        }
    }

    fn client_for(base_url: String) -> OllamaClient {
        OllamaClient::new(&OllamaConfig {
            base_url,
            model: "llama3.1".to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_extract_success() {
        let reply = serde_json::json!({
            "model": "llama3.1",
            "message": {
                "role": "assistant",
                "content": "{\"title\": \"Web Scraper Developer\", \"category\": \"Web Scraping\", \"skills\": [\"Python\"]}"
            },
            "done": true
        });
        let url = one_shot_server("200 OK", reply.to_string()).await;

        let extracted = client_for(url).extract("Need a scraper").await.unwrap();
        assert_eq!(extracted.title, "Web Scraper Developer");
        assert_eq!(extracted.category.as_ref().and_then(|c| c.as_str()), Some("Web Scraping"));
    }

    #[tokio::test]
    async fn test_extract_non_json_reply_is_parse_error() {
        let reply = serde_json::json!({
            "message": {"role": "assistant", "content": "This is not valid JSON at all"},
            "done": true
        });
        let url = one_shot_server("200 OK", reply.to_string()).await;

        let err = client_for(url).extract("Some job text").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Parse(_)));
    }

    #[tokio::test]
    async fn test_empty_content() {
        let reply = serde_json::json!({"message": {"role": "assistant", "content": ""}, "done": true});
        let url = one_shot_server("200 OK", reply.to_string()).await;

        let err = client_for(url).extract("text").await.unwrap_err();
        assert!(matches!(err, ExtractionError::EmptyContent));
    }

    #[tokio::test]
    async fn test_missing_model_is_api_error() {
        let body = r#"{"error": "model \"llama3.1\" not found, try pulling it first"}"#.to_string();
        let url = one_shot_server("404 Not Found", body).await;

        match client_for(url).extract("text").await.unwrap_err() {
            ExtractionError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{addr}"));
        let err = client.extract("text").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Connection { .. }));
        assert!(!client.check_model_available().await);
    }

    #[tokio::test]
    async fn test_list_models_and_availability() {
        let body = serde_json::json!({
            "models": [{"name": "llama3.1:latest"}, {"name": "codellama:7b"}]
        })
        .to_string();
        let url = one_shot_server("200 OK", body.clone()).await;
        let models = client_for(url).list_models().await.unwrap();
        assert_eq!(models, vec!["llama3.1:latest", "codellama:7b"]);

        let url = one_shot_server("200 OK", body).await;
        assert!(client_for(url).check_model_available().await);
    }

    #[test]
    fn test_model_matches() {
        let installed = vec!["llama3.1:latest".to_string(), "codellama:7b".to_string()];
        assert!(model_matches("llama3.1", &installed));
        assert!(model_matches("llama3.1:8b", &installed));
        assert!(!model_matches("mistral", &installed));
        assert!(!model_matches("llama3.1", &["codellama:7b".to_string()]));
    }
}
