use crate::advice::RelayError;
use crate::catalog::{embed_url, Prompt};
use crate::history::SelectionEvent;
use crate::selector::Selector;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum AdviceText {
    Advice(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("an advice request is already in flight")]
    Busy,
}

/// Identifies the prompt an advice request was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceTicket {
    label: &'static str,
}

impl AdviceTicket {
    pub fn label(&self) -> &'static str {
        self.label
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceOutcome {
    Shown,
    Discarded,
}

/// State behind the prompt card: the selector, the two visibility toggles,
/// the advice display and the single busy flag.
pub struct PromptCard {
    selector: Selector,
    tips_visible: bool,
    resources_visible: bool,
    advice: Option<AdviceText>,
    pending: Option<AdviceTicket>,
}

#[derive(Debug, Serialize)]
pub struct ResourceView {
    pub title: &'static str,
    pub url: &'static str,
    pub embed_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CardView<'a> {
    pub number: usize,
    pub label: &'static str,
    pub tips_visible: bool,
    pub resources_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<&'static [&'static str]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<ResourceView>>,
    pub advice: Option<&'a AdviceText>,
    pub busy: bool,
    pub history: Vec<&'a SelectionEvent>,
}

impl PromptCard {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            tips_visible: false,
            resources_visible: false,
            advice: None,
            pending: None,
        }
    }

    pub fn current(&self) -> &'static Prompt {
        self.selector.current()
    }

    pub fn tips_visible(&self) -> bool {
        self.tips_visible
    }

    pub fn resources_visible(&self) -> bool {
        self.resources_visible
    }

    pub fn advice(&self) -> Option<&AdviceText> {
        self.advice.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Picks a new prompt and hides everything tied to the previous one.
    /// An in-flight advice request keeps the card busy until it resolves.
    pub fn spin(&mut self) -> &'static Prompt {
        self.tips_visible = false;
        self.resources_visible = false;
        self.advice = None;
        let (prompt, _) = self.selector.spin();
        prompt
    }

    pub fn toggle_tips(&mut self) -> bool {
        self.tips_visible = !self.tips_visible;
        self.tips_visible
    }

    pub fn toggle_resources(&mut self) -> bool {
        self.resources_visible = !self.resources_visible;
        self.resources_visible
    }

    pub fn clear_history(&mut self) {
        self.selector.clear_history();
    }

    pub fn begin_advice(&mut self) -> Result<AdviceTicket, CardError> {
        if self.pending.is_some() {
            return Err(CardError::Busy);
        }
        let ticket = AdviceTicket {
            label: self.current().label,
        };
        self.advice = None;
        self.pending = Some(ticket.clone());
        Ok(ticket)
    }

    /// Settles a request started by [`begin_advice`](Self::begin_advice).
    /// Results for a prompt that is no longer shown are dropped.
    pub fn complete_advice(
        &mut self,
        ticket: AdviceTicket,
        result: Result<String, RelayError>,
    ) -> AdviceOutcome {
        self.pending = None;
        if ticket.label != self.current().label {
            debug!(
                "Dropping advice for '{}', card now shows '{}'",
                ticket.label,
                self.current().label
            );
            return AdviceOutcome::Discarded;
        }

        self.advice = Some(match result {
            Ok(text) => AdviceText::Advice(text),
            Err(e) => AdviceText::Error(error_text(&e)),
        });
        AdviceOutcome::Shown
    }

    pub fn view(&self) -> CardView<'_> {
        let prompt = self.current();
        CardView {
            number: self.selector.current_index() + 1,
            label: prompt.label,
            tips_visible: self.tips_visible,
            resources_visible: self.resources_visible,
            tips: self.tips_visible.then_some(prompt.tips),
            resources: self.resources_visible.then(|| {
                prompt
                    .links
                    .iter()
                    .map(|link| ResourceView {
                        title: link.title,
                        url: link.url,
                        embed_url: embed_url(link.url),
                    })
                    .collect()
            }),
            advice: self.advice.as_ref(),
            busy: self.is_busy(),
            history: self.selector.history().iter().collect(),
        }
    }
}

pub fn error_text(err: &RelayError) -> String {
    format!("Error: {}. Make sure the backend server is reachable.", err)
}
