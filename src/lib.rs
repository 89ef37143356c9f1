pub mod apis;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod observability;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod types;

// Layered boundaries: ports the scrapers depend on, adapters that implement them
pub mod app;
pub mod infra;
