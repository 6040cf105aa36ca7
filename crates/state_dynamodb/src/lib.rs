use async_trait::async_trait;
use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::get_item::{GetItemError, GetItemOutput};
use aws_sdk_dynamodb::types::AttributeValue;
use lambda_runtime::tracing;
use state::StateErrorReason::{BackendFailure, BadState};
use state::StateOperation::GetRecord;
use state::{StateError, TimestampRecord, TimestampStore};
use std::collections::HashMap;

/// Partition key attribute of the mailbox table.
pub(crate) const ID: &str = "id";

/// Reads the keepalive record from DynamoDB.
/// The client is injected so tests can substitute a mocked one.
pub struct DynamoDbTimestampStore {
    dynamodb_client: aws_sdk_dynamodb::Client,
    consistent_read: bool,
}

impl DynamoDbTimestampStore {
    pub fn new(dynamodb_client: aws_sdk_dynamodb::Client) -> Self {
        DynamoDbTimestampStore {
            dynamodb_client,
            consistent_read: false,
        }
    }

    /// Use strongly consistent reads rather than the DynamoDB default.
    pub fn with_consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }

    async fn get_item(
        &self,
        table_name: &str,
        key_parts: &[(&str, &str)],
    ) -> Result<GetItemOutput, SdkError<GetItemError, HttpResponse>> {
        let key: HashMap<String, AttributeValue> = key_parts
            .iter()
            .map(|&(k, v)| (k.to_string(), AttributeValue::S(v.to_string())))
            .collect();

        self.dynamodb_client
            .get_item()
            .table_name(table_name)
            .consistent_read(self.consistent_read)
            .set_key(Some(key))
            .send()
            .await
    }
}

#[async_trait]
impl TimestampStore for DynamoDbTimestampStore {
    async fn get_record(
        &self,
        table_name: &str,
        key: &str,
    ) -> Result<Option<TimestampRecord>, StateError> {
        tracing::debug!(table_name, key, "Reading keepalive record");

        let output: GetItemOutput = self
            .get_item(table_name, &[(ID, key)])
            .await
            .map_err(|err| {
                StateError::new(key.to_string(), GetRecord, BackendFailure(err.into()))
            })?;

        let Some(item) = output.item else {
            return Ok(None);
        };

        let record: TimestampRecord = serde_dynamo::from_item(item).map_err(|err| {
            StateError::new(key.to_string(), GetRecord, BadState(err.to_string()))
        })?;

        Ok(Some(record))
    }
}
