use crate::models::{AdviceRequest, AdviceResponse, ErrorResponse};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error};

pub const ADVICE_PATH: &str = "/api/dance-advice";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("HTTP error! status: {status}{}", detail(.message))]
    Status { status: u16, message: Option<String> },
    #[error("{0}")]
    Transport(String),
    #[error("unexpected relay response: {0}")]
    Decode(String),
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" ({})", m))
        .unwrap_or_default()
}

/// Client side of the advice relay. One request per call, no retries.
pub struct AdviceClient {
    client: Client,
    base_url: String,
}

impl AdviceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn request_advice(&self, prompt: &str) -> Result<String, RelayError> {
        let request = AdviceRequest {
            prompt: prompt.to_string(),
        };

        let res = self
            .client
            .post(format!("{}{}", self.base_url, ADVICE_PATH))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Advice relay unreachable: {}", e);
                RelayError::Transport(e.to_string())
            })?;

        let status = res.status();
        if !status.is_success() {
            let message = res
                .json::<ErrorResponse>()
                .await
                .ok()
                .map(|body| body.error);
            error!("Advice relay answered {}: {:?}", status, message);
            return Err(RelayError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: AdviceResponse = res
            .json()
            .await
            .map_err(|e| RelayError::Decode(e.to_string()))?;
        debug!("Advice received for '{}'", prompt);
        Ok(body.advice)
    }
}
