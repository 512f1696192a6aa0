use crate::catalog::{advice_instruction, SYSTEM_PROMPT};
use crate::completion::{CompletionClient, CompletionError};
use crate::guard::{normalize_prompt, GuardError};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum RelayFailure {
    #[error(transparent)]
    Rejected(#[from] GuardError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Server side of the advice relay: validates the prompt, fills the
/// instruction template and forwards it to the completion service.
pub struct AdviceRelay {
    completion: CompletionClient,
}

impl AdviceRelay {
    pub fn new(completion: CompletionClient) -> Self {
        Self { completion }
    }

    pub async fn advise(&self, prompt: &str) -> Result<String, RelayFailure> {
        let prompt = normalize_prompt(prompt)?;

        let advice = match self
            .completion
            .complete(SYSTEM_PROMPT, &advice_instruction(&prompt))
            .await
        {
            Ok(advice) => advice,
            Err(e) => {
                error!("Text generation failed for '{}': {}", prompt, e);
                return Err(e.into());
            }
        };
        info!("Relayed advice for '{}' ({} chars)", prompt, advice.len());

        Ok(advice)
    }
}
