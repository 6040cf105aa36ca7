use std::fmt::{Display, Formatter};

pub mod config;
pub mod env;
pub mod timestamp;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Key of the single record touched by the mailbox process.
pub const MAILBOX_RECORD_KEY: &str = "open";

pub const ALERT_SUBJECT: &str = "Mailbox State Alert";

/// Result of a single staleness check.
/// The `Display` form is what the lambda returns to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    MissingConfig,
    InvalidThreshold(String),
    // The record is missing or has no timestamp attribute
    MissingTimestamp,
    InvalidTimestamp(String),
    NotificationSent,
    WithinThreshold,
    // Either the store or the notification topic failed
    BackendError,
}

impl Display for CheckOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckOutcome::MissingConfig => write!(
                f,
                "Error: Environment variables {}, {}, and {} must be set.",
                env::DDB_TABLE_NAME,
                env::SNS_ARN,
                env::THRESHOLD_HOURS
            ),
            CheckOutcome::InvalidThreshold(value) => write!(
                f,
                "Error: Invalid value for {}: '{}'. It must be a positive integer.",
                env::THRESHOLD_HOURS,
                value
            ),
            CheckOutcome::MissingTimestamp => f.write_str("No timestamp found in DynamoDB"),
            CheckOutcome::InvalidTimestamp(value) => {
                write!(f, "Error: Invalid timestamp '{}' found in DynamoDB.", value)
            }
            CheckOutcome::NotificationSent => f.write_str("SNS notification sent"),
            CheckOutcome::WithinThreshold => f.write_str("Timestamp is within the threshold"),
            CheckOutcome::BackendError => f.write_str("Error occurred"),
        }
    }
}

/// Body of the alert published when the timestamp is stale.
pub fn alert_message(threshold_hours: u32) -> String {
    format!("The timestamp in DynamoDB is over {threshold_hours} hours old.")
}
