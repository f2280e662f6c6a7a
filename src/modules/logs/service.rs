use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{instrument, warn};

use simplewaf_core::{AppError, Paginated};
use simplewaf_db::waf_logs::MAX_SCAN;
use simplewaf_models::waf_logs::{AttackEvent, EventPage, EventQuery, LogQuery, WafLog};

use crate::state::AppState;

fn check_range(query: &LogQuery) -> Result<(), AppError> {
    if !query.has_valid_range() {
        return Err(AppError::bad_request("startTime must not be after endTime"));
    }
    Ok(())
}

/// Groups log records by `(src_ip, domain, dst_port)` into attack events,
/// most recently active first.
pub fn aggregate_events(logs: &[WafLog], now: DateTime<Utc>) -> Vec<AttackEvent> {
    let mut groups: HashMap<(&str, &str, i32), AttackEvent> = HashMap::new();

    for log in logs {
        groups
            .entry((log.src_ip.as_str(), log.domain.as_str(), log.dst_port))
            .or_insert_with(|| AttackEvent::start(log))
            .record(log.created_at);
    }

    let mut events: Vec<AttackEvent> = groups
        .into_values()
        .map(|event| event.finish(now))
        .collect();
    events.sort_by(|a, b| {
        b.last_attack_time
            .cmp(&a.last_attack_time)
            .then_with(|| a.src_ip.cmp(&b.src_ip))
            .then_with(|| a.domain.cmp(&b.domain))
            .then_with(|| a.dst_port.cmp(&b.dst_port))
    });
    events
}

pub struct LogService;

impl LogService {
    #[instrument(skip(state))]
    pub async fn list_logs(
        state: &AppState,
        query: LogQuery,
    ) -> Result<Paginated<WafLog>, AppError> {
        check_range(&query)?;
        Ok(state.repos.waf_logs.query(&query).await?)
    }

    #[instrument(skip(state))]
    pub async fn list_events(state: &AppState, query: EventQuery) -> Result<EventPage, AppError> {
        Self::scan_events(state, LogQuery::from(query), MAX_SCAN).await
    }

    /// Aggregates at most `limit` of the newest matching records.
    pub(crate) async fn scan_events(
        state: &AppState,
        query: LogQuery,
        limit: i64,
    ) -> Result<EventPage, AppError> {
        check_range(&query)?;

        let mut logs = state
            .repos
            .waf_logs
            .matching(&query, limit.saturating_add(1))
            .await?;
        let truncated = logs.len() as i64 > limit;
        if truncated {
            logs.truncate(limit.max(0) as usize);
            warn!(limit, "event aggregation hit the scan limit, results are partial");
        }

        let events = aggregate_events(&logs, Utc::now());
        Ok(EventPage {
            page: Paginated::from_vec(events, &query.pagination()),
            truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn log(src_ip: &str, domain: &str, dst_port: i32, at: DateTime<Utc>) -> WafLog {
        WafLog {
            id: Uuid::new_v4(),
            rule_id: 942100,
            src_ip: src_ip.to_string(),
            src_port: 40000,
            dst_ip: "10.0.0.2".to_string(),
            dst_port,
            domain: domain.to_string(),
            uri: "/".to_string(),
            request_id: Uuid::new_v4().to_string(),
            message: "SQL Injection Attack Detected".to_string(),
            payload: String::new(),
            phase: 2,
            severity: 2,
            accuracy: 0,
            sec_mark: String::new(),
            sec_lang_raw: String::new(),
            request: String::new(),
            response: String::new(),
            logs: vec![],
            created_at: at,
        }
    }

    #[test]
    fn test_groups_by_source_domain_and_port() {
        let now = Utc::now();
        let logs = vec![
            log("1.1.1.1", "a.example.com", 443, now - Duration::minutes(50)),
            log("1.1.1.1", "a.example.com", 443, now - Duration::minutes(10)),
            log("1.1.1.1", "a.example.com", 80, now - Duration::minutes(5)),
            log("2.2.2.2", "a.example.com", 443, now - Duration::minutes(90)),
        ];

        let events = aggregate_events(&logs, now);
        assert_eq!(events.len(), 3);

        let first = &events[0];
        assert_eq!((first.src_ip.as_str(), first.dst_port), ("1.1.1.1", 80));
        assert_eq!(first.count, 1);

        let second = &events[1];
        assert_eq!((second.src_ip.as_str(), second.dst_port), ("1.1.1.1", 443));
        assert_eq!(second.count, 2);
        assert_eq!(second.duration_in_minutes, 40);
        assert!(second.is_ongoing);

        let stale = &events[2];
        assert_eq!(stale.src_ip, "2.2.2.2");
        assert!(!stale.is_ongoing);
    }

    #[test]
    fn test_no_logs_no_events() {
        assert!(aggregate_events(&[], Utc::now()).is_empty());
    }

    #[tokio::test]
    async fn test_scan_limit_marks_events_truncated() {
        use simplewaf_db::WafLogRepository;

        let state = AppState::for_tests();
        let now = Utc::now();
        for minutes in [30, 20, 10] {
            state
                .repos
                .waf_logs
                .insert(log("3.3.3.3", "a.example.com", 443, now - Duration::minutes(minutes)))
                .await
                .unwrap();
        }

        let partial = LogService::scan_events(&state, LogQuery::default(), 2)
            .await
            .unwrap();
        assert!(partial.truncated);
        assert_eq!(partial.page.results[0].count, 2);
        assert_eq!(partial.page.results[0].duration_in_minutes, 10);

        let full = LogService::scan_events(&state, LogQuery::default(), 3)
            .await
            .unwrap();
        assert!(!full.truncated);
        assert_eq!(full.page.results[0].count, 3);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let query = LogQuery {
            start_time: Some("2024-05-02T00:00:00Z".parse().unwrap()),
            end_time: Some("2024-05-01T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        assert_eq!(check_range(&query).unwrap_err().status.as_u16(), 400);
    }
}
