use crate::checker::MailboxMonitor;
use lambda_runtime::{tracing, Error, LambdaEvent};
use model::CheckOutcome;

pub mod checker;

/// Handler for the scheduled lambda, designed for use with `lambda_runtime::run()`.
///
/// The event payload is only logged. Every check result, failures included, is
/// returned as the outcome string so the invocation itself never errors.
///
/// ```no_compile
/// let monitor: MailboxMonitor = MailboxMonitor::new(Arc::new(store), Arc::new(notifier));
///
/// lambda_runtime::run(service_fn(async |event: MonitorLambdaEvent| {
///     monitor_fn(&monitor, event).await
/// }))
/// .await
/// ```
pub async fn monitor_fn(
    monitor: &MailboxMonitor,
    event: MonitorLambdaEvent,
) -> Result<String, Error> {
    let (payload, context) = event.into_parts();

    tracing::info!(request_id = context.request_id.as_str(), "Received event {payload}");

    let outcome: CheckOutcome = monitor.check().await;

    tracing::info!("Mailbox check finished: {outcome}");

    Ok(outcome.to_string())
}

pub type MonitorLambdaEvent = LambdaEvent<serde_json::Value>;
