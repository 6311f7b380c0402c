pub mod risk_engine;
pub mod metrics_cache;
pub mod account_metrics;
pub mod history;

pub use risk_engine::*;
pub use metrics_cache::*;
pub use account_metrics::*;
pub use history::*;
