use crate::config::Config;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Text completion service. One user message in, one completion out. Used
/// for chapter generation and for scene descriptions.
#[async_trait]
pub trait CompletionClient: Send + Sync + Debug {
    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String>;
}

pub fn create_completion_client(config: &Config) -> Result<Box<dyn CompletionClient>> {
    if config.services.api_key.trim().is_empty() {
        return Err(anyhow!(
            "No API credential configured. Set services.api_key in config.yml."
        ));
    }
    Ok(Box::new(OpenAiCompletionClient::new(
        &config.services.api_key,
        &config.services.chapter_model,
        &config.services.base_url,
    )))
}

#[derive(Debug)]
struct OpenAiCompletionClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiCompletionClient {
    fn new(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    error: Option<ApiError>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request_body = CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens,
            temperature,
        };

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await?;
            return Err(anyhow!("Completion API error: {}", error_text));
        }

        let result: CompletionResponse = resp.json().await?;

        if let Some(err) = result.error {
            return Err(anyhow!("Completion API returned error: {}", err.message));
        }

        if let Some(choice) = result.choices.first() {
            if let Some(content) = &choice.message.content {
                return Ok(content.clone());
            }
        }

        Err(anyhow!("Completion response empty or missing content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing_success() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Chapter 1: Dawn\nOnce upon a time."
                },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 9, "completion_tokens": 12, "total_tokens": 21 }
        }"#;

        let result: CompletionResponse = serde_json::from_str(json).unwrap();
        assert!(result.error.is_none());
        assert_eq!(
            result.choices[0].message.content.as_deref(),
            Some("Chapter 1: Dawn\nOnce upon a time.")
        );
    }

    #[test]
    fn test_response_parsing_error_object() {
        let json = r#"{
            "error": {
                "message": "You exceeded your current quota.",
                "type": "insufficient_quota",
                "code": "insufficient_quota"
            }
        }"#;

        let result: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            result.error.unwrap().message,
            "You exceeded your current quota."
        );
        assert!(result.choices.is_empty());
    }

    #[test]
    fn test_response_parsing_missing_content() {
        let json = r#"{
            "choices": [{
                "index": 0,
                "message": { "role": "assistant" },
                "finish_reason": "content_filter"
            }]
        }"#;

        let result: CompletionResponse = serde_json::from_str(json).unwrap();
        assert!(result.choices[0].message.content.is_none());
    }

    #[test]
    fn test_factory_rejects_missing_credential() {
        let config = Config::default();
        assert!(config.services.api_key.is_empty());
        assert!(create_completion_client(&config).is_err());
    }

    #[test]
    fn test_request_shape() {
        let request = CompletionRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
            max_tokens: 1000,
            temperature: 0.8,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-3.5-turbo");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["max_tokens"], 1000);
    }
}
