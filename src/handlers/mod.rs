pub mod accounts;
pub mod health;

pub use accounts::{account_history, list_accounts, risk_summary};
pub use health::health_check;
