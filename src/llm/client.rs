use crate::llm::config::ModelConfig;
use crate::{Result, VocalisError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

/// Single-prompt client for the `generateContent` endpoint
///
/// Each call is independent; no conversation history is sent.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: ModelConfig,
}

impl GeminiClient {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Send `prompt` and return the completion text
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!("POST {} ({} chars)", self.config.generate_url(), prompt.len());

        let response = self
            .client
            .post(self.config.generate_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VocalisError::RequestError(format!(
                "Model API error {}: {}",
                status, body
            )));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| VocalisError::ResponseError(format!("Malformed response: {}", e)))?;

        extract_text(payload)
    }
}

fn extract_text(payload: GenerateResponse) -> Result<String> {
    let block_reason = payload.prompt_feedback.and_then(|f| f.block_reason);

    let text: String = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(VocalisError::ResponseError(match block_reason {
            Some(reason) => format!("Prompt blocked: {}", reason),
            None => "Response contained no text".to_string(),
        }));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(ModelConfig::new("test-key").with_base_url(server.uri()))
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-pro:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_json(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Hi there" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Hello" }, { "text": ", friend" }] }
                }]
            })))
            .mount(&server)
            .await;

        let reply = client_for(&server).generate("Hi there").await.unwrap();
        assert_eq!(reply, "Hello, friend");
    }

    #[tokio::test]
    async fn test_generate_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key invalid"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("Hi").await.unwrap_err();
        assert!(matches!(err, VocalisError::RequestError(ref m) if m.contains("403")));
    }

    #[tokio::test]
    async fn test_generate_malformed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("Hi").await.unwrap_err();
        assert!(matches!(err, VocalisError::ResponseError(_)));
    }

    #[tokio::test]
    async fn test_generate_blocked_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("Hi").await.unwrap_err();
        assert!(matches!(err, VocalisError::ResponseError(ref m) if m.contains("SAFETY")));
    }
}
