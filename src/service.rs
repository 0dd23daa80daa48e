use std::future::Future;

use bytes::Bytes;
use thiserror::Error;

use crate::record::FileRecord;

/// Failure reported by a file service. Only its message reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Rejected(String),
}

impl ServiceError {
    /// The error text, or `fallback` when the service gave none.
    pub fn message_or(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

/// Remote store of uploaded files. Either call fully succeeds or fails.
pub trait FileService: Send + Sync + 'static {
    fn list_all(&self) -> impl Future<Output = Result<Vec<FileRecord>, ServiceError>> + Send;

    fn upload(
        &self,
        bytes: Bytes,
        name: &str,
    ) -> impl Future<Output = Result<FileRecord, ServiceError>> + Send;
}
