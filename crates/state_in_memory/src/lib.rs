use async_trait::async_trait;
use state::StateErrorReason::BackendFailure;
use state::StateOperation::GetRecord;
use state::{StateError, TimestampRecord, TimestampStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Table name -> key -> record.
type Tables = HashMap<String, HashMap<String, TimestampRecord>>;

/// A store backed by a map, for use in testing.
/// Counts reads so callers can assert the store was never touched.
#[derive(Default)]
pub struct InMemoryTimestampStore {
    tables: Arc<Mutex<Tables>>,
    fail_reads: bool,
    reads: AtomicUsize,
}

impl InMemoryTimestampStore {
    /// A store where every read fails with a backend error.
    pub fn failing() -> Self {
        InMemoryTimestampStore {
            fail_reads: true,
            ..Default::default()
        }
    }

    pub fn with_record(self, table_name: &str, record: TimestampRecord) -> Self {
        self.put_record(table_name, record);
        self
    }

    pub fn put_record(&self, table_name: &str, record: TimestampRecord) {
        let mut tables = self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        tables
            .entry(table_name.to_string())
            .or_default()
            .insert(record.id.clone(), record);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimestampStore for InMemoryTimestampStore {
    async fn get_record(
        &self,
        table_name: &str,
        key: &str,
    ) -> Result<Option<TimestampRecord>, StateError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if self.fail_reads {
            return Err(StateError::new(
                key.to_string(),
                GetRecord,
                BackendFailure(format!("table {table_name} is unavailable").into()),
            ));
        }

        let tables = self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        Ok(tables
            .get(table_name)
            .and_then(|table| table.get(key))
            .cloned())
    }
}
