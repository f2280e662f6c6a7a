//! WAF log records, log queries and aggregated attack events.
//!
//! Log records are written by the inspection engine. The management plane
//! only reads them: [`LogQuery`] filters individual records and
//! [`EventQuery`] groups matching records into [`AttackEvent`]s keyed by
//! source address, domain and destination port.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use simplewaf_core::{Paginated, PaginationParams};
use simplewaf_core::serde::{
    deserialize_optional_datetime, deserialize_optional_i64, deserialize_optional_string,
    deserialize_optional_u16,
};

/// An attack whose most recent record is younger than this is still ongoing.
pub const ONGOING_WINDOW_MINUTES: i64 = 30;

/// One rule match inside a log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WafLogDetail {
    pub rule_id: i64,
    pub message: String,
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub phase: i32,
    #[serde(default)]
    pub severity: i32,
    #[serde(default)]
    pub accuracy: i32,
    #[serde(default)]
    pub sec_mark: String,
    #[serde(default)]
    pub sec_lang_raw: String,
    #[serde(default)]
    pub log_raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WafLog {
    pub id: Uuid,
    pub rule_id: i64,
    pub src_ip: String,
    pub src_port: i32,
    pub dst_ip: String,
    pub dst_port: i32,
    pub domain: String,
    pub uri: String,
    pub request_id: String,
    pub message: String,
    pub payload: String,
    pub phase: i32,
    pub severity: i32,
    pub accuracy: i32,
    pub sec_mark: String,
    pub sec_lang_raw: String,
    pub request: String,
    pub response: String,
    #[sqlx(json)]
    pub logs: Vec<WafLogDetail>,
    pub created_at: DateTime<Utc>,
}

/// Filters for `GET /logs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub rule_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub src_ip: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub dst_ip: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub domain: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_u16")]
    pub src_port: Option<u16>,
    #[serde(default, deserialize_with = "deserialize_optional_u16")]
    pub dst_port: Option<u16>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub request_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page_size: Option<i64>,
}

impl LogQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }

    /// `startTime` must not be after `endTime`.
    pub fn has_valid_range(&self) -> bool {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }

    pub fn matches(&self, log: &WafLog) -> bool {
        self.rule_id.is_none_or(|id| log.rule_id == id)
            && self.src_ip.as_deref().is_none_or(|ip| log.src_ip == ip)
            && self.dst_ip.as_deref().is_none_or(|ip| log.dst_ip == ip)
            && self.domain.as_deref().is_none_or(|d| log.domain == d)
            && self.src_port.is_none_or(|p| log.src_port == i32::from(p))
            && self.dst_port.is_none_or(|p| log.dst_port == i32::from(p))
            && self.request_id.as_deref().is_none_or(|id| log.request_id == id)
            && self.start_time.is_none_or(|t| log.created_at >= t)
            && self.end_time.is_none_or(|t| log.created_at <= t)
    }
}

/// Filters for `GET /logs/events`. Same as [`LogQuery`] without the
/// per-record identifiers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub src_ip: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub dst_ip: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub domain: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_u16")]
    pub src_port: Option<u16>,
    #[serde(default, deserialize_with = "deserialize_optional_u16")]
    pub dst_port: Option<u16>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page_size: Option<i64>,
}

impl From<EventQuery> for LogQuery {
    fn from(q: EventQuery) -> Self {
        Self {
            rule_id: None,
            src_ip: q.src_ip,
            dst_ip: q.dst_ip,
            domain: q.domain,
            src_port: q.src_port,
            dst_port: q.dst_port,
            request_id: None,
            start_time: q.start_time,
            end_time: q.end_time,
            page: q.page,
            page_size: q.page_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackEvent {
    pub src_ip: String,
    pub domain: String,
    pub dst_port: i32,
    pub count: i64,
    pub first_attack_time: DateTime<Utc>,
    pub last_attack_time: DateTime<Utc>,
    pub duration_in_minutes: i64,
    pub is_ongoing: bool,
}

impl AttackEvent {
    /// Starts an event from its first record.
    pub fn start(log: &WafLog) -> Self {
        Self {
            src_ip: log.src_ip.clone(),
            domain: log.domain.clone(),
            dst_port: log.dst_port,
            count: 0,
            first_attack_time: log.created_at,
            last_attack_time: log.created_at,
            duration_in_minutes: 0,
            is_ongoing: false,
        }
    }

    pub fn record(&mut self, at: DateTime<Utc>) {
        self.count += 1;
        self.first_attack_time = self.first_attack_time.min(at);
        self.last_attack_time = self.last_attack_time.max(at);
    }

    /// Fills in the derived fields relative to `now`.
    pub fn finish(mut self, now: DateTime<Utc>) -> Self {
        self.duration_in_minutes = (self.last_attack_time - self.first_attack_time).num_minutes();
        self.is_ongoing = now - self.last_attack_time < Duration::minutes(ONGOING_WINDOW_MINUTES);
        self
    }
}

/// A page of attack events.
///
/// `truncated` is set when more records matched than a single aggregation
/// scans, in which case counts and first attack times only cover the newest
/// records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    #[serde(flatten)]
    pub page: Paginated<AttackEvent>,
    pub truncated: bool,
}
