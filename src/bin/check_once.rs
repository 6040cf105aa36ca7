//! Run a single mailbox check from a shell, using the current environment and
//! AWS credentials, and print the outcome.

use aws_config::BehaviorVersion;
use lambda_runtime::tracing;
use model::{CheckOutcome, Error};
use monitor::checker::MailboxMonitor;
use service_sns::SnsNotifier;
use state_dynamodb::DynamoDbTimestampStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

    let monitor: MailboxMonitor = MailboxMonitor::new(
        Arc::new(
            DynamoDbTimestampStore::new(aws_sdk_dynamodb::Client::new(&aws_config))
                .with_consistent_read(true),
        ),
        Arc::new(SnsNotifier::new(aws_sdk_sns::Client::new(&aws_config))),
    );

    let outcome: CheckOutcome = monitor.check().await;
    println!("{outcome}");

    Ok(())
}
