use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::info;

use crate::catalog::{self, FileKind};
use crate::record::FileRecord;
use crate::service::{FileService, ServiceError};

#[derive(Clone)]
pub struct AppState {
    pub files: Arc<DashMap<i64, StoredFile>>,
    next_id: Arc<AtomicI64>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            files: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    pub fn store(&self, name: &str, bytes: Bytes) -> Result<FileRecord, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Rejected("File name is required".into()));
        }
        let kind = FileKind::from_name(name).ok_or_else(|| {
            ServiceError::Rejected(format!(
                "Unsupported file type. Supported formats: {}",
                catalog::supported_formats_label()
            ))
        })?;

        let record = FileRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            kind,
            size: bytes.len() as u64,
            created_at: Utc::now(),
        };
        self.files.insert(
            record.id,
            StoredFile {
                record: record.clone(),
                bytes,
            },
        );
        info!(file_id = record.id, filename = %record.name, size = record.size, "file stored");
        Ok(record)
    }

    pub fn list(&self) -> Vec<FileRecord> {
        let mut records: Vec<FileRecord> =
            self.files.iter().map(|entry| entry.record.clone()).collect();
        records.sort_by_key(|r| r.id);
        records
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl FileService for AppState {
    async fn list_all(&self) -> Result<Vec<FileRecord>, ServiceError> {
        Ok(self.list())
    }

    async fn upload(&self, bytes: Bytes, name: &str) -> Result<FileRecord, ServiceError> {
        self.store(name, bytes)
    }
}

#[derive(Clone)]
pub struct StoredFile {
    pub record: FileRecord,
    pub bytes: Bytes,
}
