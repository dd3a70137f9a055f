//! In-process layout store for host and editor tests

#![allow(dead_code)]

use blockpage_control::{LayoutStore, Result, StoreError, StoreOperation};
use blockpage_core::{BlockId, BlockLayoutRecord, Geometry};
use parking_lot::Mutex;
use std::collections::HashSet;
use tokio::sync::oneshot;

/// A store call as seen by the store
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(BlockId),
    Update(BlockLayoutRecord),
    List(String),
    Delete(BlockId),
}

struct Gate {
    operation: StoreOperation,
    key: Option<String>,
    release: oneshot::Receiver<()>,
}

/// Records every call, keeps records in memory and can hold responses back
#[derive(Default)]
pub struct RecordingStore {
    records: Mutex<Vec<BlockLayoutRecord>>,
    calls: Mutex<Vec<Call>>,
    gates: Mutex<Vec<Gate>>,
    failing: Mutex<HashSet<StoreOperation>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<BlockLayoutRecord>) -> Self {
        let store = Self::new();
        *store.records.lock() = records;
        store
    }

    /// Hold back the next `operation` call (matching `key` if given) until
    /// the returned sender fires or is dropped
    pub fn gate(&self, operation: StoreOperation, key: Option<&str>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().push(Gate {
            operation,
            key: key.map(str::to_string),
            release: rx,
        });
        tx
    }

    /// Make every `operation` call fail with a 500
    pub fn fail(&self, operation: StoreOperation) {
        self.failing.lock().insert(operation);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn records(&self) -> Vec<BlockLayoutRecord> {
        self.records.lock().clone()
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().push(call);
    }

    async fn pass_gate(&self, operation: StoreOperation, key: &str) {
        let gate = {
            let mut gates = self.gates.lock();
            gates
                .iter()
                .position(|g| {
                    g.operation == operation && g.key.as_deref().map_or(true, |k| k == key)
                })
                .map(|index| gates.remove(index))
        };
        if let Some(gate) = gate {
            let _ = gate.release.await;
        }
    }

    fn check(&self, operation: StoreOperation) -> Result<()> {
        if self.failing.lock().contains(&operation) {
            return Err(StoreError::Status {
                status: 500,
                message: format!("{} refused", operation),
            });
        }
        Ok(())
    }
}

impl LayoutStore for RecordingStore {
    async fn create(&self, record: BlockLayoutRecord) -> Result<BlockLayoutRecord> {
        self.record_call(Call::Create(record.uuid.clone()));
        self.pass_gate(StoreOperation::Create, record.uuid.as_str())
            .await;
        self.check(StoreOperation::Create)?;
        self.records.lock().push(record.clone());
        Ok(record)
    }

    async fn update_by_uuid(&self, record: BlockLayoutRecord) -> Result<BlockLayoutRecord> {
        self.record_call(Call::Update(record.clone()));
        self.pass_gate(StoreOperation::Update, record.uuid.as_str())
            .await;
        self.check(StoreOperation::Update)?;
        let mut records = self.records.lock();
        match records.iter_mut().find(|r| r.uuid == record.uuid) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record)
            }
            None => Err(StoreError::Status {
                status: 404,
                message: String::new(),
            }),
        }
    }

    async fn list_by_page_path(&self, page_path: &str) -> Result<Vec<BlockLayoutRecord>> {
        self.record_call(Call::List(page_path.to_string()));
        self.pass_gate(StoreOperation::List, page_path).await;
        self.check(StoreOperation::List)?;
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| r.page_path == page_path)
            .cloned()
            .collect())
    }

    async fn delete_by_uuid(&self, uuid: &BlockId) -> Result<()> {
        self.record_call(Call::Delete(uuid.clone()));
        self.pass_gate(StoreOperation::Delete, uuid.as_str()).await;
        self.check(StoreOperation::Delete)?;
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|r| &r.uuid != uuid);
        if records.len() == before {
            return Err(StoreError::Status {
                status: 404,
                message: String::new(),
            });
        }
        Ok(())
    }
}

pub fn record(uuid: &str, page: &str, kind: &str, geometry: Geometry) -> BlockLayoutRecord {
    BlockLayoutRecord::new(BlockId::new(uuid), page, kind, geometry)
}

/// The two-cup home page
pub fn home_records() -> Vec<BlockLayoutRecord> {
    vec![
        record("a", "/home", "cup_preview", Geometry::new(10, 10, 200, 150)),
        record("b", "/home", "cup_preview", Geometry::new(300, 10, 200, 150)),
    ]
}
