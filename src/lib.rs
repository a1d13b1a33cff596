//! Baserow chatbot-CRM dashboard engine
//!
//! This library provides tools to:
//! - Fetch complete paginated tables from a Baserow database
//! - Aggregate timestamped records into time-bucketed chart series
//! - Compute current vs previous-period metrics with percentage deltas
//! - List, search and export dashboard records
//! - Apply partial settings updates with the remote field-name mapping

pub mod aggregate;
pub mod baserow;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;

// Re-export common types
pub use baserow::{BaserowClient, DashboardData, DashboardLoad};
pub use config::{Config, TableIds, DEFAULT_PAGE_SIZE};
pub use error::{Error, Result};
pub use models::{
    ClientRecord, ConversionRecord, InteractionRecord, SettingsRecord, SettingsUpdate, TimeFilter,
};
