//! HTTP client for the vision analyzer.
//!
//! Talks to any OpenAI-compatible chat-completions endpoint using
//! [`reqwest`]: one user message per image, carrying the fixed analysis
//! prompt plus the image as a base64 data URL, with a JSON response format
//! so the reply body is a bare JSON document.

use std::time::Duration;

use base64::prelude::*;
use serde::Deserialize;

use wheelway_core::annotation::ImageAnnotation;

use crate::parser::parse_annotation;
use crate::prompt::ANALYSIS_PROMPT;

/// Connection settings for the analyzer endpoint.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Base URL of the API, e.g. `https://api.openai.com/v1`.
    pub api_url: String,
    /// Bearer token sent with every request.
    pub api_key: String,
    /// Model name, e.g. `gpt-4o`.
    pub model: String,
    /// Completion token cap per image.
    pub max_tokens: u32,
    /// Whole-request timeout, covering upload and inference.
    pub timeout: Duration,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o".to_string(),
            max_tokens: 4096,
            timeout: Duration::from_secs(120),
        }
    }
}

/// HTTP client for a single analyzer endpoint.
pub struct VisionClient {
    client: reqwest::Client,
    config: VisionConfig,
}

/// Errors from the analyzer client.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The analyzer returned a non-2xx status code.
    #[error("analyzer API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The completion came back with no content to parse.
    #[error("analyzer returned an empty response")]
    EmptyResponse,

    /// The completion content was not valid JSON.
    #[error("analyzer response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl VisionClient {
    /// Create a new client with the configured request timeout.
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful in
    /// tests and for connection pooling).
    pub fn with_client(client: reqwest::Client, config: VisionConfig) -> Self {
        Self { client, config }
    }

    /// Model name this client sends requests for.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Analyze one image for accessibility barriers.
    ///
    /// Sends a `POST {api_url}/chat/completions` request with the analysis
    /// prompt and the image inlined as a data URL, then leniently decodes
    /// the returned JSON document into an [`ImageAnnotation`].
    pub async fn analyze_image(
        &self,
        image_bytes: &[u8],
        content_type: &str,
    ) -> Result<ImageAnnotation, VisionError> {
        tracing::debug!(
            model = %self.config.model,
            bytes = image_bytes.len(),
            "Requesting image analysis"
        );

        let data_url = format!(
            "data:{content_type};base64,{}",
            BASE64_STANDARD.encode(image_bytes)
        );
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        {"type": "text", "text": ANALYSIS_PROMPT},
                        {
                            "type": "image_url",
                            "image_url": {"url": data_url, "detail": "high"},
                        },
                    ],
                }
            ],
            "max_tokens": self.config.max_tokens,
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let completion: ChatCompletion = Self::parse_response(response).await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(VisionError::EmptyResponse)?;

        let document: serde_json::Value = serde_json::from_str(&content)?;
        Ok(parse_annotation(&document))
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or a [`VisionError::ApiError`] containing the
    /// status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, VisionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(VisionError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, VisionError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_decodes_content() {
        let completion: ChatCompletion = serde_json::from_str(
            r#"{"id":"cmpl-1","choices":[{"index":0,"message":{"role":"assistant","content":"{}"}}]}"#,
        )
        .unwrap();
        assert_eq!(completion.choices[0].message.content.as_deref(), Some("{}"));
    }

    #[test]
    fn completion_tolerates_missing_choices() {
        let completion: ChatCompletion = serde_json::from_str(r#"{"id":"cmpl-2"}"#).unwrap();
        assert!(completion.choices.is_empty());
    }

    #[test]
    fn completion_tolerates_null_content() {
        let completion: ChatCompletion = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        )
        .unwrap();
        assert_eq!(completion.choices[0].message.content, None);
    }
}
