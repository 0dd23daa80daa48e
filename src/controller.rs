//! Upload dialog flow: file selection, submission and the list refetch that
//! follows a successful upload.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::catalog::FileKind;
use crate::record::{FileRecord, UploadCandidate};
use crate::service::FileService;
use crate::store::{FileAction, FileStore};

const UPLOAD_FALLBACK: &str = "Failed to upload file";
const LIST_FALLBACK: &str = "Failed to fetch files";

type UploadedCallback = Box<dyn Fn(&FileRecord) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Accepted(FileKind),
    /// The file type is not accepted. Nothing is stored, no error is recorded.
    Rejected { name: String },
    /// The picker closed without a file.
    Unchanged,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    NoCandidate,
    /// The refetch runs on its own task; awaiting `refresh` is optional.
    Uploaded {
        record: FileRecord,
        refresh: JoinHandle<()>,
    },
    Failed(String),
}

/// Fetch the full list into the store: `RequestList`, then success or failure.
pub async fn load_files<S: FileService>(store: &FileStore, service: &S) {
    store.dispatch(FileAction::RequestList);
    complete_list(store, service).await;
}

async fn complete_list<S: FileService>(store: &FileStore, service: &S) {
    match service.list_all().await {
        Ok(records) => {
            info!(count = records.len(), "file list refreshed");
            store.dispatch(FileAction::ListSucceeded(records));
        }
        Err(e) => {
            warn!(error = %e, "file list fetch failed");
            store.dispatch(FileAction::ListFailed(e.message_or(LIST_FALLBACK)));
        }
    }
}

pub struct UploadFlow<S> {
    store: FileStore,
    service: Arc<S>,
    candidate: Option<UploadCandidate>,
    open: bool,
    on_uploaded: Option<UploadedCallback>,
}

impl<S: FileService> UploadFlow<S> {
    pub fn new(store: FileStore, service: Arc<S>) -> Self {
        Self {
            store,
            service,
            candidate: None,
            open: false,
            on_uploaded: None,
        }
    }

    /// Called with each confirmed record before the refetch starts.
    pub fn on_uploaded(mut self, callback: impl Fn(&FileRecord) + Send + Sync + 'static) -> Self {
        self.on_uploaded = Some(Box::new(callback));
        self
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn candidate(&self) -> Option<&UploadCandidate> {
        self.candidate.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Closing discards the selection and both stored errors.
    pub fn set_open(&mut self, open: bool) {
        if !open {
            self.candidate = None;
            self.store.dispatch(FileAction::ClearErrors);
        }
        self.open = open;
    }

    /// Only accepted types become the candidate. Accepting clears stored
    /// errors; rejecting leaves them as they were.
    pub fn select(&mut self, file: Option<UploadCandidate>) -> Selection {
        let Some(file) = file else {
            return Selection::Unchanged;
        };
        match file.kind() {
            Some(kind) => {
                self.candidate = Some(file);
                self.store.dispatch(FileAction::ClearErrors);
                Selection::Accepted(kind)
            }
            None => {
                self.candidate = None;
                Selection::Rejected { name: file.name }
            }
        }
    }

    pub fn can_submit(&self) -> bool {
        self.candidate.is_some() && !self.store.select(|s| s.upload_loading)
    }

    /// Upload the held candidate. On success the candidate is dropped, the
    /// dialog closes and a list refetch is started without waiting for it.
    /// The new record is not shown until that refetch lands.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let Some(candidate) = self.candidate.as_ref() else {
            return SubmitOutcome::NoCandidate;
        };

        self.store.dispatch(FileAction::RequestUpload);
        let result = self
            .service
            .upload(candidate.bytes.clone(), &candidate.name)
            .await;

        match result {
            Ok(record) => {
                info!(file_id = record.id, filename = %record.name, "upload complete");
                self.store.dispatch(FileAction::UploadSucceeded(record.clone()));
                self.candidate = None;
                self.open = false;
                if let Some(callback) = &self.on_uploaded {
                    callback(&record);
                }

                self.store.dispatch(FileAction::RequestList);
                let store = self.store.clone();
                let service = Arc::clone(&self.service);
                let refresh = tokio::spawn(async move {
                    complete_list(&store, service.as_ref()).await;
                });
                SubmitOutcome::Uploaded { record, refresh }
            }
            Err(e) => {
                warn!(filename = %candidate.name, error = %e, "upload failed");
                let message = e.message_or(UPLOAD_FALLBACK);
                self.store.dispatch(FileAction::UploadFailed(message.clone()));
                SubmitOutcome::Failed(message)
            }
        }
    }
}
