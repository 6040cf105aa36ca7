use async_trait::async_trait;
use aws_lambda_events::eventbridge::EventBridgeEvent;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::types::error::ResourceNotFoundException;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_sns::operation::publish::PublishError;
use aws_sdk_sns::types::error::AuthorizationErrorException;
use aws_smithy_mocks::{mock, Rule};
use chrono::{DateTime, Utc};
use model::env::{DDB_TABLE_NAME, SNS_ARN, THRESHOLD_HOURS};
use service::{Notification, Notifier, ServiceError};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Test resource values
pub const TEST_TABLE: &str = "mailbox-state";
pub const TEST_TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:mailbox-alerts";

/// Environment for a complete config with the given threshold.
pub fn test_env(threshold_hours: &str) -> HashMap<String, String> {
    HashMap::from([
        (DDB_TABLE_NAME.to_string(), TEST_TABLE.to_string()),
        (SNS_ARN.to_string(), TEST_TOPIC.to_string()),
        (THRESHOLD_HOURS.to_string(), threshold_hours.to_string()),
    ])
}

/// Wrap a map as an environment lookup.
pub fn lookup(env: HashMap<String, String>) -> impl Fn(&str) -> Option<String> {
    move |name: &str| env.get(name).cloned()
}

/// A keepalive item as the mailbox process writes it.
pub fn keepalive_item(timestamp: Option<&str>) -> HashMap<String, AttributeValue> {
    let mut item: HashMap<String, AttributeValue> =
        HashMap::from([("id".to_string(), AttributeValue::S("open".to_string()))]);

    if let Some(timestamp) = timestamp {
        item.insert(
            "timestamp".to_string(),
            AttributeValue::S(timestamp.to_string()),
        );
    }

    item
}

/// Format an instant the way the mailbox process does, in US Central time.
pub fn mailbox_timestamp(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&model::timestamp::MAILBOX_TIMEZONE)
        .format(model::timestamp::TIMESTAMP_FORMAT)
        .to_string()
}

/// A DynamoDB client rule which fails as if the table doesn't exist
pub fn mock_get_item_error() -> Rule {
    mock!(aws_sdk_dynamodb::Client::get_item).then_error(|| {
        GetItemError::ResourceNotFoundException(
            ResourceNotFoundException::builder()
                .message("Requested resource not found")
                .build(),
        )
    })
}

/// An SNS client rule which always fails with an authorization error
pub fn mock_publish_error() -> Rule {
    mock!(aws_sdk_sns::Client::publish).then_error(|| {
        PublishError::AuthorizationErrorException(
            AuthorizationErrorException::builder()
                .message("Not authorized to publish")
                .build(),
        )
    })
}

/// A scheduled EventBridge event as delivered to the lambda.
pub fn scheduled_event() -> serde_json::Value {
    let event: EventBridgeEvent<serde_json::Value> = serde_json::from_value(serde_json::json!({
        "version": "0",
        "id": "53dc4d37-cffa-4f76-80c9-8b7d4a4d2eaa",
        "detail-type": "Scheduled Event",
        "source": "aws.events",
        "account": "123456789012",
        "time": "2024-01-15T18:00:00Z",
        "region": "us-east-1",
        "resources": ["arn:aws:events:us-east-1:123456789012:rule/mailbox-monitor"],
        "detail": {}
    }))
    .expect("Scheduled event fixture should match the EventBridge shape");

    serde_json::to_value(event).expect("Scheduled event should serialize")
}

/// Records every notification instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, Notification)>>,
    fail: bool,
}

impl RecordingNotifier {
    /// A notifier whose publishes always fail.
    pub fn failing() -> Self {
        RecordingNotifier {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, Notification)> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "RecordingNotifier"
    }

    async fn publish(
        &self,
        topic_arn: &str,
        notification: Notification,
    ) -> Result<(), ServiceError> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((topic_arn.to_string(), notification));

        if self.fail {
            return Err(ServiceError::Backend("topic unavailable".into()));
        }

        Ok(())
    }
}

/// Captures formatted log output for the current thread.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Route this thread's logs into the capture until the guard drops.
    /// Only reliable on the current-thread runtime `#[tokio::test]` uses by default.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();

        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        let buffer = self
            .buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(buf);

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
