use crate::config::Provider;
use crate::models::{
    ChatMessage, ChatRequest, ChatResponse, OllamaOptions, OllamaRequest, OllamaResponse,
};
use reqwest::{header::AUTHORIZATION, Client};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request to text generation service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("text generation service returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("text generation service returned no text")]
    Empty,
}

/// Talks to the third-party text generation service on behalf of the relay.
pub struct CompletionClient {
    client: Client,
    provider: Provider,
    max_tokens: u32,
}

impl CompletionClient {
    pub fn new(provider: Provider, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            provider,
            max_tokens,
        }
    }

    pub async fn complete(
        &self,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<String, CompletionError> {
        let text = match &self.provider {
            Provider::OpenAi {
                api_key,
                base_url,
                model,
            } => {
                self.chat_completion(api_key, base_url, model, system_prompt, user_input)
                    .await?
            }
            Provider::Ollama { endpoint, model } => {
                self.generate(endpoint, model, system_prompt, user_input)
                    .await?
            }
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(CompletionError::Empty);
        }
        Ok(text.to_string())
    }

    async fn chat_completion(
        &self,
        api_key: &str,
        base_url: &str,
        model: &str,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_input.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
        };

        let res = self
            .client
            .post(format!("{}/chat/completions", base_url.trim_end_matches('/')))
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(CompletionError::Upstream { status, body });
        }

        let body: ChatResponse = res.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CompletionError::Empty)
    }

    async fn generate(
        &self,
        endpoint: &str,
        model: &str,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<String, CompletionError> {
        let request = OllamaRequest {
            model: model.to_string(),
            prompt: user_input.to_string(),
            stream: false,
            system: system_prompt.to_string(),
            options: OllamaOptions {
                num_predict: self.max_tokens,
            },
        };

        let res = self
            .client
            .post(format!("{}/api/generate", endpoint.trim_end_matches('/')))
            .json(&request)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(CompletionError::Upstream { status, body });
        }

        let body: OllamaResponse = res.json().await?;
        Ok(body.response)
    }
}
