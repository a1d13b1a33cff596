//! Record types for the Baserow tables
//!
//! Baserow returns loosely-typed rows with user field names passed through
//! as-is; each collection is parsed once into a typed struct here. Every
//! record carries a "created on" timestamp string that may be absent or
//! unparseable, in which case the record is excluded from time-based views.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Page envelope returned by the Baserow rows endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RowPage<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Client (cadastro) row.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientRecord {
    pub id: i64,
    #[serde(rename = "created on", default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    /// Registration-completed flag; only `true` counts as completed.
    #[serde(default)]
    pub registropronto: Option<bool>,
}

impl ClientRecord {
    pub fn completed(&self) -> bool {
        self.registropronto == Some(true)
    }
}

/// Chat interaction row.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InteractionRecord {
    pub id: i64,
    #[serde(rename = "created on", default)]
    pub created_on: Option<String>,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(rename = "chatInput", default)]
    pub chat_input: Option<String>,
}

/// Conversion row.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConversionRecord {
    pub id: i64,
    #[serde(rename = "created on", default)]
    pub created_on: Option<String>,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    #[serde(rename = "conversionType", default)]
    pub conversion_type: Option<String>,
    #[serde(rename = "conversionValue", default)]
    pub conversion_value: Option<f64>,
}

/// Single-row bot configuration. Field names on the read side are the
/// remote ones (`nomeBot`, `link`, `Active`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettingsRecord {
    pub id: i64,
    #[serde(rename = "created on", default)]
    pub created_on: Option<String>,
    #[serde(rename = "nomeBot", default)]
    pub bot_name: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(rename = "Active", default)]
    pub auto_reply: Option<bool>,
    #[serde(default)]
    pub working_hours_start: Option<String>,
    #[serde(default)]
    pub working_hours_end: Option<String>,
}

/// Records that carry a "created on" timestamp.
pub trait Timestamped {
    fn created_on(&self) -> Option<&str>;

    /// Parsed timestamp; `None` when the field is missing or unparseable.
    fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_on().and_then(parse_created_on)
    }
}

impl Timestamped for ClientRecord {
    fn created_on(&self) -> Option<&str> {
        self.created_on.as_deref()
    }
}

impl Timestamped for InteractionRecord {
    fn created_on(&self) -> Option<&str> {
        self.created_on.as_deref()
    }
}

impl Timestamped for ConversionRecord {
    fn created_on(&self) -> Option<&str> {
        self.created_on.as_deref()
    }
}

impl Timestamped for SettingsRecord {
    fn created_on(&self) -> Option<&str> {
        self.created_on.as_deref()
    }
}

/// Lenient timestamp parsing for Baserow "created on" values.
///
/// Offset-bearing values are converted to the local wall clock, so they
/// bucket against the same frame as `Local::now().naive_local()`.
pub fn parse_created_on(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    None
}

/// Time granularity selecting bucket count and width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Day,
    Month,
    Year,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Day => "day",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
        }
    }
}

impl Default for TimeFilter {
    fn default() -> Self {
        TimeFilter::Month
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" | "dia" => Ok(TimeFilter::Day),
            "month" | "mes" | "mês" => Ok(TimeFilter::Month),
            "year" | "ano" => Ok(TimeFilter::Year),
            other => Err(Error::InvalidArgument(format!(
                "unknown granularity: {} (expected day, month or year)",
                other
            ))),
        }
    }
}

/// Partial settings update. All fields are optional; only the fields the
/// remote write path maps (`bot_name`, `welcome_message`, `auto_reply`)
/// ever reach the PATCH body. The working-hours fields are accepted by the
/// form but not persisted by this path.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub bot_name: Option<String>,
    pub welcome_message: Option<String>,
    pub auto_reply: Option<bool>,
    pub working_hours_start: Option<String>,
    pub working_hours_end: Option<String>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.bot_name.is_none()
            && self.welcome_message.is_none()
            && self.auto_reply.is_none()
            && self.working_hours_start.is_none()
            && self.working_hours_end.is_none()
    }

    /// Fields the caller supplied that the write path will silently drop.
    pub fn has_unpersisted_fields(&self) -> bool {
        self.working_hours_start.is_some() || self.working_hours_end.is_some()
    }

    /// Translate local field names to the remote schema. Absent fields
    /// produce no key in the outgoing payload.
    pub fn remote_payload(&self) -> serde_json::Value {
        let mut payload = serde_json::Map::new();
        if let Some(name) = &self.bot_name {
            payload.insert("nomeBot".to_string(), serde_json::json!(name));
        }
        if let Some(message) = &self.welcome_message {
            payload.insert("link".to_string(), serde_json::json!(message));
        }
        if let Some(flag) = self.auto_reply {
            payload.insert("Active".to_string(), serde_json::json!(flag));
        }
        serde_json::Value::Object(payload)
    }
}
