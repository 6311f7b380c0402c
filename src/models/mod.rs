pub mod account;
pub mod history;

pub use account::*;
pub use history::*;
