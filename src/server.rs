use crate::activity_log::ActivityLog;
use crate::advice::{AdviceClient, ADVICE_PATH};
use crate::card::{AdviceOutcome, AdviceTicket, CardError, PromptCard};
use crate::catalog::{Catalog, Prompt};
use crate::models::{AdviceRequest, AdviceResponse, ErrorResponse};
use crate::relay::{AdviceRelay, RelayFailure};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use axum_macros::debug_handler;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::cors::CorsLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<AdviceRelay>,
    pub advice: Arc<AdviceClient>,
    pub card: Arc<Mutex<PromptCard>>,
    pub catalog: Catalog,
    pub activity: Option<Arc<ActivityLog>>,
}

impl AppState {
    fn card(&self) -> MutexGuard<'_, PromptCard> {
        self.card.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn activity(&self, record: impl FnOnce(&ActivityLog)) {
        if let Some(log) = &self.activity {
            record(log);
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(ADVICE_PATH, post(handle_dance_advice))
        .route("/api/catalog", get(handle_catalog))
        .route("/api/card", get(handle_card))
        .route("/api/card/spin", post(handle_spin))
        .route("/api/card/tips", post(handle_toggle_tips))
        .route("/api/card/resources", post(handle_toggle_resources))
        .route("/api/card/ask", post(handle_ask))
        .route("/api/card/history", delete(handle_clear_history))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn render(card: &PromptCard) -> Response {
    Json(card.view()).into_response()
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

#[debug_handler]
async fn handle_dance_advice(
    State(state): State<AppState>,
    Json(request): Json<AdviceRequest>,
) -> Response {
    match state.relay.advise(&request.prompt).await {
        Ok(advice) => Json(AdviceResponse { advice }).into_response(),
        Err(RelayFailure::Rejected(e)) => error_body(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e @ RelayFailure::Completion(_)) => {
            error!("Relay failure: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn handle_catalog(State(state): State<AppState>) -> Json<&'static [Prompt]> {
    Json(state.catalog.prompts())
}

async fn handle_card(State(state): State<AppState>) -> Response {
    render(&state.card())
}

async fn handle_spin(State(state): State<AppState>) -> Response {
    let mut card = state.card();
    let prompt = card.spin();
    let number = card.selector().current_index() + 1;
    state.activity(|log| log.log_spin(number, prompt.label));
    render(&card)
}

async fn handle_toggle_tips(State(state): State<AppState>) -> Response {
    let mut card = state.card();
    card.toggle_tips();
    render(&card)
}

async fn handle_toggle_resources(State(state): State<AppState>) -> Response {
    let mut card = state.card();
    card.toggle_resources();
    render(&card)
}

async fn handle_clear_history(State(state): State<AppState>) -> Response {
    let mut card = state.card();
    card.clear_history();
    state.activity(|log| log.log_clear());
    render(&card)
}

/// The card lock is released while the relay call is outstanding so spins
/// and toggles stay responsive. The call runs on its own task so the card
/// is settled even when the caller hangs up before the relay answers.
#[debug_handler]
async fn handle_ask(State(state): State<AppState>) -> Response {
    let begun = state.card().begin_advice();
    let ticket = match begun {
        Ok(ticket) => ticket,
        Err(e @ CardError::Busy) => return error_body(StatusCode::CONFLICT, e.to_string()),
    };

    let task = tokio::spawn(settle_advice(state.clone(), ticket));
    if let Err(e) = task.await {
        error!("Advice task failed: {}", e);
    }
    render(&state.card())
}

async fn settle_advice(state: AppState, ticket: AdviceTicket) {
    let result = state.advice.request_advice(ticket.label()).await;
    if let Err(e) = &result {
        let message = e.to_string();
        state.activity(|log| log.log_error(&message));
    }

    let label = ticket.label();
    let outcome = state.card().complete_advice(ticket, result);
    match outcome {
        AdviceOutcome::Shown => state.activity(|log| log.log_advice(label)),
        AdviceOutcome::Discarded => state.activity(|log| log.log_discarded(label)),
    }
}
