//! Personal sports-betting tracker: bet records kept in local JSON files,
//! with derived statistics, charts and CSV/PDF exports.

pub mod chart;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod output;
pub mod stats;
pub mod store;
