pub mod config;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod models;
pub mod services;
pub mod startup;
pub mod ui;

use config::ConsoleSettings;
use services::BackendClient;
use std::sync::Arc;

/// Shared application state: the REST API client and the screen settings.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<BackendClient>,
    pub console: Arc<ConsoleSettings>,
}

impl AppState {
    pub fn new(api: Arc<BackendClient>, console: ConsoleSettings) -> Self {
        Self {
            api,
            console: Arc::new(console),
        }
    }
}
