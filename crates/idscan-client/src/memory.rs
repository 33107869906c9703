//! In-memory [`RecordBackend`] for tests and offline demos.
//!
//! Behaves like the HTTP backend but keeps records in process. Failures and
//! per-operation latency can be injected to exercise the session layer's
//! error paths and response races.

use crate::backend::RecordBackend;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use idscan_core::{ImageFile, Record, RecordField, RecordId};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Backend operations, used to target injected failures and latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Image upload
    Upload,
    /// Record listing
    List,
    /// Full-record update
    Update,
    /// Record deletion
    Delete,
}

/// How an injected failure presents itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Non-success status without a structured message
    Status(u16),
    /// 400 with a structured `{ "error": message }` body
    Rejected(String),
}

impl Failure {
    fn to_error(&self) -> ClientError {
        match self {
            Self::Status(status) => ClientError::Api {
                status: *status,
                message: "injected failure".to_string(),
            },
            Self::Rejected(message) => ClientError::Rejected {
                message: message.clone(),
            },
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<Record>,
    upload_responses: VecDeque<Record>,
    failures: HashMap<Operation, Failure>,
    latency: HashMap<Operation, Duration>,
    calls: HashMap<Operation, usize>,
    next_id: u64,
}

/// In-memory backend. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend already holding `records`.
    #[must_use]
    pub fn with_records(records: Vec<Record>) -> Self {
        let backend = Self::new();
        backend.lock().records = records;
        backend
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the stored records.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.lock().records.clone()
    }

    /// Replace the stored records.
    pub fn set_records(&self, records: Vec<Record>) {
        self.lock().records = records;
    }

    /// Record returned by the next successful upload instead of a generated one.
    pub fn push_upload_response(&self, record: Record) {
        self.lock().upload_responses.push_back(record);
    }

    /// Make every call of `operation` fail until [`clear_failure`](Self::clear_failure).
    pub fn fail(&self, operation: Operation, failure: Failure) {
        self.lock().failures.insert(operation, failure);
    }

    /// Stop failing `operation`.
    pub fn clear_failure(&self, operation: Operation) {
        self.lock().failures.remove(&operation);
    }

    /// Delay responses to `operation`. The response content is captured
    /// before the delay.
    pub fn set_latency(&self, operation: Operation, latency: Duration) {
        self.lock().latency.insert(operation, latency);
    }

    /// Number of calls made for `operation`, including failed ones.
    #[must_use]
    pub fn calls(&self, operation: Operation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Count the call and return its configured latency and failure.
    fn begin(&self, operation: Operation) -> (Option<Duration>, Option<ClientError>) {
        let mut state = self.lock();
        *state.calls.entry(operation).or_insert(0) += 1;
        (
            state.latency.get(&operation).copied(),
            state.failures.get(&operation).map(Failure::to_error),
        )
    }

    fn generated_record(state: &mut MemoryState, image: &ImageFile) -> Record {
        state.next_id += 1;
        let stem = image
            .file_name
            .rsplit_once('.')
            .map_or(image.file_name.as_str(), |(stem, _)| stem);
        Record::new(format!("mem-{}", state.next_id)).with_field(RecordField::Name, stem)
    }
}

async fn delay(latency: Option<Duration>) {
    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    async fn upload_image(&self, image: &ImageFile) -> Result<Record> {
        let (latency, failure) = self.begin(Operation::Upload);
        delay(latency).await;
        if let Some(err) = failure {
            return Err(err);
        }

        let mut state = self.lock();
        let queued = state.upload_responses.pop_front();
        let record = match queued {
            Some(record) => record,
            None => Self::generated_record(&mut state, image),
        };
        state.records.push(record.clone());
        Ok(record)
    }

    async fn list_records(&self) -> Result<Vec<Record>> {
        let (latency, failure) = self.begin(Operation::List);
        let snapshot = self.records();
        delay(latency).await;
        match failure {
            Some(err) => Err(err),
            None => Ok(snapshot),
        }
    }

    async fn update_record(&self, record: &Record) -> Result<()> {
        let (latency, failure) = self.begin(Operation::Update);
        delay(latency).await;
        if let Some(err) = failure {
            return Err(err);
        }

        let mut state = self.lock();
        match state.records.iter_mut().find(|r| r.id == record.id) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(Failure::Status(404).to_error()),
        }
    }

    async fn delete_record(&self, id: &RecordId) -> Result<()> {
        let (latency, failure) = self.begin(Operation::Delete);
        delay(latency).await;
        if let Some(err) = failure {
            return Err(err);
        }

        let mut state = self.lock();
        let before = state.records.len();
        state.records.retain(|r| &r.id != id);
        if state.records.len() < before {
            Ok(())
        } else {
            Err(Failure::Status(404).to_error())
        }
    }

    fn backend_id(&self) -> &str {
        "memory"
    }
}
