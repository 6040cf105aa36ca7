use async_trait::async_trait;
use aws_sdk_sns::operation::publish::PublishOutput;
use lambda_runtime::tracing;
use service::{Notification, Notifier, ServiceError};

/// Publishes notifications to an SNS topic.
pub struct SnsNotifier {
    sns: aws_sdk_sns::Client,
}

impl SnsNotifier {
    pub fn new(sns: aws_sdk_sns::Client) -> Self {
        Self { sns }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    fn name(&self) -> &'static str {
        "SnsNotifier"
    }

    async fn publish(
        &self,
        topic_arn: &str,
        notification: Notification,
    ) -> Result<(), ServiceError> {
        if topic_arn.is_empty() {
            return Err(ServiceError::BadRequest("topic ARN is empty".to_string()));
        }

        let output: PublishOutput = self
            .sns
            .publish()
            .topic_arn(topic_arn)
            .subject(notification.subject)
            .message(notification.message)
            .send()
            .await
            .map_err(|err| ServiceError::Backend(err.into()))?;

        tracing::debug!(
            topic_arn,
            message_id = output.message_id().unwrap_or_default(),
            "Published notification"
        );

        Ok(())
    }
}
