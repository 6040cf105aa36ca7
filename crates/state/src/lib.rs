use ::model::Error;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::{Debug, Display, Formatter};

/// Read access to the table holding the mailbox keepalive record.
///
/// Implementations never write; the record is owned by the mailbox process.
#[async_trait]
pub trait TimestampStore: Send + Sync {
    /// Fetch the record stored under `key`, or `None` if there isn't one.
    async fn get_record(
        &self,
        table_name: &str,
        key: &str,
    ) -> Result<Option<TimestampRecord>, StateError>;
}

/// Shape of the keepalive item, e.g. `{ "id": "open", "timestamp": "20240115120000" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimestampRecord {
    pub id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl TimestampRecord {
    pub fn new(id: impl Into<String>, timestamp: Option<&str>) -> Self {
        TimestampRecord {
            id: id.into(),
            timestamp: timestamp.map(str::to_string),
        }
    }
}

/// Errors arising from reading state.
#[derive(Debug)]
pub struct StateError {
    pub state_key: String,

    pub operation: StateOperation,
    pub reason: StateErrorReason,
}

#[derive(Debug)]
pub enum StateErrorReason {
    // The stored item didn't have the expected shape
    BadState(String),
    // An error from the underlying state store
    BackendFailure(Error),
}

#[derive(Debug, Clone)]
pub enum StateOperation {
    GetRecord,
}

impl StateError {
    pub fn new(state_key: String, operation: StateOperation, reason: StateErrorReason) -> Self {
        StateError {
            state_key,
            operation,
            reason,
        }
    }
}

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            StateErrorReason::BadState(msg) => write!(
                f,
                "{:?} [{}] returned a malformed item: {}",
                self.operation, self.state_key, msg
            ),
            StateErrorReason::BackendFailure(err) => write!(
                f,
                "{:?} [{}] failed: {}",
                self.operation, self.state_key, err
            ),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.reason {
            StateErrorReason::BackendFailure(err) => Some(err.as_ref()),
            StateErrorReason::BadState(_) => None,
        }
    }
}
