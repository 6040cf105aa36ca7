use async_trait::async_trait;
use model::{alert_message, Error, ALERT_SUBJECT};
use std::fmt::{Display, Formatter};

/// A message sent to the alert topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub message: String,
}

impl Notification {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Notification {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// The alert raised when the mailbox timestamp is older than `threshold_hours`.
    pub fn stale_mailbox(threshold_hours: u32) -> Self {
        Notification::new(ALERT_SUBJECT, alert_message(threshold_hours))
    }
}

/// Publishes notifications to a pub/sub topic.
/// Most common is an `SnsNotifier` implementation.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn publish(
        &self,
        topic_arn: &str,
        notification: Notification,
    ) -> Result<(), ServiceError>;
}

/// Errors arising from publishing a notification.
#[derive(Debug)]
pub enum ServiceError {
    // The request was rejected before being sent
    BadRequest(String),
    // An error from the underlying messaging service
    Backend(Error),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::BadRequest(msg) => write!(f, "Bad notification request: {msg}"),
            ServiceError::Backend(err) => write!(f, "Notification backend failure: {err}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Backend(err) => Some(err.as_ref()),
            ServiceError::BadRequest(_) => None,
        }
    }
}
