pub mod connection;
pub mod executor;
pub mod warehouse;

pub use connection::*;
pub use executor::*;
pub use warehouse::*;
