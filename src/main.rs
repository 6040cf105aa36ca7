use aws_config::BehaviorVersion;
use lambda_runtime::{service_fn, tracing};
use model::Error;
use monitor::checker::MailboxMonitor;
use monitor::{monitor_fn, MonitorLambdaEvent};
use service_sns::SnsNotifier;
use state_dynamodb::DynamoDbTimestampStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

    let monitor: MailboxMonitor = MailboxMonitor::new(
        Arc::new(DynamoDbTimestampStore::new(aws_sdk_dynamodb::Client::new(
            &aws_config,
        ))),
        Arc::new(SnsNotifier::new(aws_sdk_sns::Client::new(&aws_config))),
    );

    lambda_runtime::run(service_fn(|event: MonitorLambdaEvent| {
        monitor_fn(&monitor, event)
    }))
    .await
}
