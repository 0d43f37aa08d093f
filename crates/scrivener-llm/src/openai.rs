use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::json;

use crate::{ContentItem, GenerationClient, GenerationRequest, GenerationResponse, Usage};
use scrivener_types::ScrivenerError;

// ---------------------------------------------------------------------------
// OpenAiAdapter
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl OpenAiAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: "https://api.openai.com".to_string(),
            default_model: "gpt-4.1-mini".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Missing credentials are a startup failure, not a per-request one.
    pub fn from_env() -> Result<Self, ScrivenerError> {
        let key = std::env::var("OPENAI_API_KEY").map_err(|_| ScrivenerError::AuthError {
            provider: "openai".into(),
        })?;
        Ok(Self::new(key))
    }
}

// ---------------------------------------------------------------------------
// Request translation (contract → Responses API JSON)
// ---------------------------------------------------------------------------

fn build_request_body(request: &GenerationRequest) -> serde_json::Value {
    let content: Vec<serde_json::Value> = request
        .content
        .iter()
        .map(|item| match item {
            ContentItem::Text { text } => json!({
                "type": "input_text",
                "text": text,
            }),
            ContentItem::InlineImage { media_type, data } => json!({
                "type": "input_image",
                "image_url": format!("data:{};base64,{}", media_type, BASE64.encode(data)),
            }),
        })
        .collect();

    json!({
        "model": request.model,
        "instructions": request.instructions,
        "input": [{ "role": "user", "content": content }],
    })
}

// ---------------------------------------------------------------------------
// Response translation (Responses API JSON → GenerationResponse)
// ---------------------------------------------------------------------------

fn parse_response(body: &serde_json::Value) -> GenerationResponse {
    let id = body["id"].as_str().unwrap_or("").to_string();
    let model = body["model"].as_str().unwrap_or("").to_string();

    // Prefer the aggregated output_text; older payloads only carry the
    // per-message output chunks.
    let mut text = body["output_text"].as_str().unwrap_or("").to_string();
    if text.is_empty() {
        if let Some(output) = body["output"].as_array() {
            let mut parts: Vec<String> = Vec::new();
            for item in output {
                if item["type"] == "message" {
                    if let Some(content) = item["content"].as_array() {
                        for block in content {
                            if block["type"] == "output_text" {
                                if let Some(t) = block["text"].as_str() {
                                    parts.push(t.to_string());
                                }
                            }
                        }
                    }
                }
            }
            text = parts.join("");
        }
    }

    let usage_obj = &body["usage"];
    let input_tokens = usage_obj["input_tokens"].as_u64().unwrap_or(0);
    let output_tokens = usage_obj["output_tokens"].as_u64().unwrap_or(0);
    let total_tokens = usage_obj["total_tokens"]
        .as_u64()
        .unwrap_or(input_tokens + output_tokens);

    GenerationResponse {
        id,
        text: text.trim().to_string(),
        model,
        usage: Usage {
            input_tokens,
            output_tokens,
            total_tokens,
        },
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn map_error(status: reqwest::StatusCode, body: &str) -> ScrivenerError {
    let status_u16 = status.as_u16();
    match status_u16 {
        401 => ScrivenerError::AuthError {
            provider: "openai".into(),
        },
        429 | 500 | 502 | 503 => ScrivenerError::ProviderError {
            provider: "openai".into(),
            status: status_u16,
            message: extract_error_message(body),
            retryable: true,
        },
        _ => ScrivenerError::ProviderError {
            provider: "openai".into(),
            status: status_u16,
            message: extract_error_message(body),
            retryable: false,
        },
    }
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

// ---------------------------------------------------------------------------
// GenerationClient implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl GenerationClient for OpenAiAdapter {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> scrivener_types::Result<GenerationResponse> {
        let body = build_request_body(request);

        let resp = self
            .client
            .post(format!("{}/v1/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ScrivenerError::ProviderError {
                provider: "openai".into(),
                status: 0,
                message: e.to_string(),
                retryable: true,
            })?;

        let status = resp.status();
        let response_body = resp
            .text()
            .await
            .map_err(|e| ScrivenerError::ProviderError {
                provider: "openai".into(),
                status: 0,
                message: e.to_string(),
                retryable: true,
            })?;

        if !status.is_success() {
            return Err(map_error(status, &response_body));
        }

        let json: serde_json::Value =
            serde_json::from_str(&response_body).map_err(|e| ScrivenerError::ProviderError {
                provider: "openai".into(),
                status: status.as_u16(),
                message: format!("Failed to parse response JSON: {e}"),
                retryable: false,
            })?;

        Ok(parse_response(&json))
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_body_text_only() {
        let req = GenerationRequest::text("Summarize.", "The task text.", "gpt-4.1-mini");
        let body = build_request_body(&req);

        assert_eq!(body["model"], "gpt-4.1-mini");
        assert_eq!(body["instructions"], "Summarize.");
        let content = body["input"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "input_text");
        assert_eq!(content[0]["text"], "The task text.");
    }

    #[test]
    fn build_body_encodes_inline_images_as_data_urls() {
        let mut req = GenerationRequest::text("Read the brief.", "text", "gpt-4.1");
        req.push(ContentItem::inline_image("image/png", vec![1, 2, 3]));
        let body = build_request_body(&req);

        let content = body["input"][0]["content"].as_array().unwrap();
        assert_eq!(content[1]["type"], "input_image");
        let url = content[1]["image_url"].as_str().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.ends_with(&BASE64.encode([1u8, 2, 3])));
    }

    #[test]
    fn parse_response_prefers_output_text() {
        let body = json!({
            "id": "resp_abc",
            "model": "gpt-4.1-mini",
            "output_text": "  Hello world  ",
            "usage": { "input_tokens": 5, "output_tokens": 7, "total_tokens": 12 }
        });
        let resp = parse_response(&body);
        assert_eq!(resp.id, "resp_abc");
        assert_eq!(resp.text, "Hello world");
        assert_eq!(resp.usage.total_tokens, 12);
    }

    #[test]
    fn parse_response_walks_output_messages() {
        let body = json!({
            "id": "resp_xyz",
            "model": "gpt-4.1",
            "output": [
                { "type": "reasoning" },
                {
                    "type": "message",
                    "content": [
                        { "type": "output_text", "text": "part one " },
                        { "type": "output_text", "text": "part two" }
                    ]
                }
            ],
            "usage": { "input_tokens": 1, "output_tokens": 2 }
        });
        let resp = parse_response(&body);
        assert_eq!(resp.text, "part one part two");
        assert_eq!(resp.usage.total_tokens, 3);
    }

    #[test]
    fn parse_response_tolerates_missing_text() {
        let body = json!({ "id": "resp_0", "model": "m" });
        let resp = parse_response(&body);
        assert!(resp.text.is_empty());
    }

    #[test]
    fn map_error_401_is_auth() {
        let err = map_error(reqwest::StatusCode::UNAUTHORIZED, "{}");
        assert!(matches!(err, ScrivenerError::AuthError { .. }));
    }

    #[test]
    fn map_error_429_is_retryable() {
        let err = map_error(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"rate limited"}}"#,
        );
        match err {
            ScrivenerError::ProviderError {
                status,
                retryable,
                message,
                ..
            } => {
                assert_eq!(status, 429);
                assert!(retryable);
                assert_eq!(message, "rate limited");
            }
            other => panic!("expected ProviderError, got {other:?}"),
        }
    }

    #[test]
    fn map_error_400_is_not_retryable() {
        let err = map_error(reqwest::StatusCode::BAD_REQUEST, "bad request");
        match err {
            ScrivenerError::ProviderError {
                status, retryable, ..
            } => {
                assert_eq!(status, 400);
                assert!(!retryable);
            }
            other => panic!("expected ProviderError, got {other:?}"),
        }
    }

    #[test]
    fn extract_error_message_falls_back_to_body() {
        assert_eq!(extract_error_message("plain text"), "plain text");
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"boom"}}"#),
            "boom"
        );
    }
}
