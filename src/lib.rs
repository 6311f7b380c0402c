pub mod config;
pub mod models;
pub mod services;
pub mod handlers;
pub mod database;
pub mod utils;
pub mod error;

pub use error::types::*;

use std::sync::Arc;

use crate::services::account_metrics::AccountMetricsService;
use crate::services::history::HistoryService;

/// Shared state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub account_metrics: Arc<AccountMetricsService>,
    pub history: Arc<HistoryService>,
}
