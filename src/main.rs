mod activity_log;
mod advice;
mod card;
mod catalog;
mod completion;
mod config;
mod guard;
mod history;
mod models;
mod relay;
mod selector;
mod server;

use crate::activity_log::ActivityLog;
use crate::advice::AdviceClient;
use crate::card::PromptCard;
use crate::catalog::Catalog;
use crate::completion::CompletionClient;
use crate::config::Config;
use crate::history::{FileHistoryStore, HistoryStore, MemoryHistoryStore};
use crate::relay::AdviceRelay;
use crate::selector::{LocalClock, Selector, ThreadRngSource};
use crate::server::AppState;
use dotenv::dotenv;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let catalog = Catalog::builtin();
    catalog.validate()?;

    let store: Box<dyn HistoryStore> = match &config.history_dir {
        Some(dir) => {
            let store = FileHistoryStore::new(dir);
            info!("Persisting prompt history to {}", store.path().display());
            Box::new(store)
        }
        None => {
            warn!("HISTORY_DIR is off; prompt history lives in memory only");
            Box::new(MemoryHistoryStore::new())
        }
    };
    let selector = Selector::new(
        catalog,
        store,
        Box::new(ThreadRngSource),
        Box::new(LocalClock),
    );

    let activity = match &config.activity_log {
        Some(path) => Some(Arc::new(ActivityLog::new(path)?)),
        None => None,
    };

    let state = AppState {
        relay: Arc::new(AdviceRelay::new(CompletionClient::new(
            config.provider.clone(),
            config.max_tokens,
        ))),
        advice: Arc::new(AdviceClient::new(&config.advice_relay_url)),
        card: Arc::new(Mutex::new(PromptCard::new(selector))),
        catalog,
        activity,
    };

    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "Freestyle coach listening on {} (advice relay at {})",
        addr, config.advice_relay_url
    );

    axum::serve(listener, server::router(state)).await?;
    Ok(())
}
