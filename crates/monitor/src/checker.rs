use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use lambda_runtime::tracing;
use model::config::MonitorConfig;
use model::timestamp::{is_stale, parse_timestamp};
use model::{CheckOutcome, MAILBOX_RECORD_KEY};
use service::{Notification, Notifier};
use state::{TimestampRecord, TimestampStore};
use std::sync::Arc;

/// Looks up an environment variable by name.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Checks the mailbox keepalive record and raises an alert when it is stale.
///
/// Holds no state between checks. The store and notifier are supplied by the
/// caller; configuration is re-read from the environment on every check.
pub struct MailboxMonitor {
    state_store: Arc<dyn TimestampStore>,
    notifier: Arc<dyn Notifier>,
    env: EnvLookup,
}

impl MailboxMonitor {
    pub fn new(state_store: Arc<dyn TimestampStore>, notifier: Arc<dyn Notifier>) -> Self {
        MailboxMonitor {
            state_store,
            notifier,
            env: Arc::new(|name: &str| std::env::var(name).ok()),
        }
    }

    /// Read configuration through `env` instead of the process environment.
    pub fn with_env<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(env);
        self
    }

    pub async fn check(&self) -> CheckOutcome {
        self.check_at(Utc::now()).await
    }

    /// Run a check as if the current time were `now`.
    pub async fn check_at(&self, now: DateTime<Utc>) -> CheckOutcome {
        let config: MonitorConfig = match MonitorConfig::from_lookup(|name| (self.env)(name)) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Refusing to check: {err}");
                return err.into();
            }
        };

        self.check_config(&config, now).await
    }

    /// Run a check against an already loaded config.
    pub async fn check_config(&self, config: &MonitorConfig, now: DateTime<Utc>) -> CheckOutcome {
        let record: Option<TimestampRecord> = match self
            .state_store
            .get_record(&config.table_name, MAILBOX_RECORD_KEY)
            .await
        {
            Ok(record) => record,
            Err(err) => {
                tracing::error!(
                    table_name = config.table_name.as_str(),
                    "Failed to read keepalive record: {err}"
                );
                return CheckOutcome::BackendError;
            }
        };

        let Some(raw) = record.and_then(|record| record.timestamp) else {
            tracing::info!("No keepalive timestamp in {}", config.table_name);
            return CheckOutcome::MissingTimestamp;
        };

        let timestamp: DateTime<Tz> = match parse_timestamp(&raw) {
            Ok(timestamp) => timestamp,
            Err(err) => {
                tracing::error!("Malformed keepalive timestamp: {err}");
                return CheckOutcome::InvalidTimestamp(raw);
            }
        };

        if !is_stale(&timestamp, now, config.threshold_hours) {
            tracing::debug!(%timestamp, "Keepalive within threshold");
            return CheckOutcome::WithinThreshold;
        }

        tracing::warn!(
            %timestamp,
            age_minutes = now.signed_duration_since(timestamp).num_minutes(),
            threshold_hours = config.threshold_hours,
            "Keepalive is stale, sending alert"
        );

        let notification: Notification = Notification::stale_mailbox(config.threshold_hours);

        match self.notifier.publish(&config.topic_arn, notification).await {
            Ok(()) => CheckOutcome::NotificationSent,
            Err(err) => {
                tracing::error!(
                    notifier = self.notifier.name(),
                    "Failed to publish alert: {err}"
                );
                CheckOutcome::BackendError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::env::{DDB_TABLE_NAME, SNS_ARN, THRESHOLD_HOURS};
    use state::TimestampRecord;
    use state_in_memory::InMemoryTimestampStore;
    use std::collections::HashMap;
    use test_utils::{lookup, test_env, LogCapture, RecordingNotifier, TEST_TABLE, TEST_TOPIC};

    // 2024-01-15 12:00 CST
    const TIMESTAMP: &str = "20240115120000";

    fn at(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("Test date should be valid")
            .with_timezone(&Utc)
    }

    fn store_with(timestamp: Option<&str>) -> Arc<InMemoryTimestampStore> {
        Arc::new(
            InMemoryTimestampStore::default()
                .with_record(TEST_TABLE, TimestampRecord::new("open", timestamp)),
        )
    }

    fn monitor(
        store: &Arc<InMemoryTimestampStore>,
        notifier: &Arc<RecordingNotifier>,
        env: HashMap<String, String>,
    ) -> MailboxMonitor {
        MailboxMonitor::new(store.clone(), notifier.clone()).with_env(lookup(env))
    }

    #[tokio::test]
    async fn missing_env_var_skips_all_calls() {
        for name in [DDB_TABLE_NAME, SNS_ARN, THRESHOLD_HOURS] {
            let store = store_with(Some(TIMESTAMP));
            let notifier = Arc::new(RecordingNotifier::default());

            let mut env: HashMap<String, String> = test_env("2");
            env.remove(name);

            let outcome: CheckOutcome = monitor(&store, &notifier, env)
                .check_at(at("2024-01-15T21:00:00Z"))
                .await;

            assert_eq!(CheckOutcome::MissingConfig, outcome, "without {name}");
            assert_eq!(0, store.reads());
            assert!(notifier.sent().is_empty());
        }
    }

    #[tokio::test]
    async fn invalid_threshold_skips_store() {
        let store = store_with(Some(TIMESTAMP));
        let notifier = Arc::new(RecordingNotifier::default());

        let outcome: CheckOutcome = monitor(&store, &notifier, test_env("abc"))
            .check_at(at("2024-01-15T21:00:00Z"))
            .await;

        assert_eq!(CheckOutcome::InvalidThreshold("abc".to_string()), outcome);
        assert_eq!(0, store.reads());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_record_reports_no_timestamp() {
        let store = Arc::new(InMemoryTimestampStore::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let outcome: CheckOutcome = monitor(&store, &notifier, test_env("2"))
            .check_at(at("2024-01-15T21:00:00Z"))
            .await;

        assert_eq!(CheckOutcome::MissingTimestamp, outcome);
        assert_eq!("No timestamp found in DynamoDB", outcome.to_string());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn record_without_timestamp_reports_no_timestamp() {
        let store = store_with(None);
        let notifier = Arc::new(RecordingNotifier::default());

        let outcome: CheckOutcome = monitor(&store, &notifier, test_env("2"))
            .check_at(at("2024-01-15T21:00:00Z"))
            .await;

        assert_eq!(CheckOutcome::MissingTimestamp, outcome);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn stale_timestamp_sends_one_alert() {
        let store = store_with(Some(TIMESTAMP));
        let notifier = Arc::new(RecordingNotifier::default());

        // Three hours after the timestamp
        let outcome: CheckOutcome = monitor(&store, &notifier, test_env("2"))
            .check_at(at("2024-01-15T21:00:00Z"))
            .await;

        assert_eq!(CheckOutcome::NotificationSent, outcome);
        assert_eq!("SNS notification sent", outcome.to_string());

        let sent = notifier.sent();
        assert_eq!(1, sent.len());
        assert_eq!(TEST_TOPIC, sent[0].0);
        assert_eq!("Mailbox State Alert", sent[0].1.subject);
        assert_eq!(
            "The timestamp in DynamoDB is over 2 hours old.",
            sent[0].1.message
        );
    }

    #[tokio::test]
    async fn recent_timestamp_is_within_threshold() {
        let store = store_with(Some(TIMESTAMP));
        let notifier = Arc::new(RecordingNotifier::default());

        let outcome: CheckOutcome = monitor(&store, &notifier, test_env("2"))
            .check_at(at("2024-01-15T19:00:00Z"))
            .await;

        assert_eq!(CheckOutcome::WithinThreshold, outcome);
        assert_eq!("Timestamp is within the threshold", outcome.to_string());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn age_equal_to_threshold_does_not_alert() {
        let store = store_with(Some(TIMESTAMP));
        let notifier = Arc::new(RecordingNotifier::default());

        let outcome: CheckOutcome = monitor(&store, &notifier, test_env("2"))
            .check_at(at("2024-01-15T20:00:00Z"))
            .await;

        assert_eq!(CheckOutcome::WithinThreshold, outcome);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_logged_and_reported() {
        let capture = LogCapture::default();
        let _guard = capture.install();

        let store = Arc::new(InMemoryTimestampStore::failing());
        let notifier = Arc::new(RecordingNotifier::default());

        let outcome: CheckOutcome = monitor(&store, &notifier, test_env("2"))
            .check_at(at("2024-01-15T21:00:00Z"))
            .await;

        assert_eq!(CheckOutcome::BackendError, outcome);
        assert_eq!("Error occurred", outcome.to_string());
        assert!(notifier.sent().is_empty());
        assert!(capture.contents().contains("Failed to read keepalive record"));
    }

    #[tokio::test]
    async fn malformed_timestamp_is_reported_without_alerting() {
        let store = store_with(Some("2024-01-15 12:00"));
        let notifier = Arc::new(RecordingNotifier::default());

        let outcome: CheckOutcome = monitor(&store, &notifier, test_env("2"))
            .check_at(at("2024-01-15T21:00:00Z"))
            .await;

        assert_eq!(
            CheckOutcome::InvalidTimestamp("2024-01-15 12:00".to_string()),
            outcome
        );
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_is_reported() {
        let store = store_with(Some(TIMESTAMP));
        let notifier = Arc::new(RecordingNotifier::failing());

        let outcome: CheckOutcome = monitor(&store, &notifier, test_env("2"))
            .check_at(at("2024-01-15T21:00:00Z"))
            .await;

        assert_eq!(CheckOutcome::BackendError, outcome);
    }

    #[tokio::test]
    async fn repeated_checks_alert_every_time() {
        let store = store_with(Some(TIMESTAMP));
        let notifier = Arc::new(RecordingNotifier::default());
        let monitor: MailboxMonitor = monitor(&store, &notifier, test_env("2"));

        for _ in 0..3 {
            let outcome: CheckOutcome = monitor.check_at(at("2024-01-15T21:00:00Z")).await;
            assert_eq!(CheckOutcome::NotificationSent, outcome);
        }

        assert_eq!(3, notifier.sent().len());
        assert_eq!(3, store.reads());
    }

    #[tokio::test]
    async fn compares_in_central_daylight_time() {
        // 12:00 CDT is 17:00 UTC, so 19:30 UTC is two and a half hours later
        let store = store_with(Some("20240715120000"));
        let notifier = Arc::new(RecordingNotifier::default());

        let outcome: CheckOutcome = monitor(&store, &notifier, test_env("2"))
            .check_at(at("2024-07-15T19:30:00Z"))
            .await;

        assert_eq!(CheckOutcome::NotificationSent, outcome);
    }
}
