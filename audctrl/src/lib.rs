pub mod client;
pub mod conf;
pub mod error;
pub mod flow;
pub mod listing;
pub mod query;
pub mod state;
