//! Client-side file state container.
//!
//! All mutation goes through [`FileAction`]s applied by [`FilesState::apply`].
//! The store performs no I/O; the upload flow in `controller` does.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::record::FileRecord;

const ACTION_BUFFER: usize = 64;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilesState {
    /// Replaced wholesale by each successful list fetch.
    pub files: Vec<FileRecord>,
    pub list_loading: bool,
    pub list_error: Option<String>,
    pub upload_loading: bool,
    pub upload_error: Option<String>,
    pub last_refreshed: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileAction {
    RequestList,
    ListSucceeded(Vec<FileRecord>),
    ListFailed(String),
    RequestUpload,
    /// The record is not merged into `files`; only a refetch updates the list.
    UploadSucceeded(FileRecord),
    UploadFailed(String),
    ClearErrors,
    RemoveLocal(i64),
    ClearFiles,
}

impl FilesState {
    pub fn apply(&mut self, action: FileAction, now: DateTime<Utc>) {
        match action {
            FileAction::RequestList => {
                self.list_loading = true;
                self.list_error = None;
            }
            FileAction::ListSucceeded(records) => {
                self.list_loading = false;
                self.files = records;
                self.last_refreshed = Some(match self.last_refreshed {
                    Some(prev) if now <= prev => prev + TimeDelta::microseconds(1),
                    _ => now,
                });
                self.list_error = None;
            }
            FileAction::ListFailed(message) => {
                self.list_loading = false;
                self.list_error = Some(message);
            }
            FileAction::RequestUpload => {
                self.upload_loading = true;
                self.upload_error = None;
            }
            FileAction::UploadSucceeded(_) => {
                self.upload_loading = false;
                self.upload_error = None;
            }
            FileAction::UploadFailed(message) => {
                self.upload_loading = false;
                self.upload_error = Some(message);
            }
            FileAction::ClearErrors => {
                self.list_error = None;
                self.upload_error = None;
            }
            FileAction::RemoveLocal(id) => self.files.retain(|f| f.id != id),
            FileAction::ClearFiles => self.files.clear(),
        }
    }
}

/// Shared handle to the single file state. Clones see the same state.
#[derive(Clone)]
pub struct FileStore {
    state: Arc<watch::Sender<FilesState>>,
    actions: broadcast::Sender<FileAction>,
}

impl FileStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(FilesState::default());
        let (actions, _) = broadcast::channel(ACTION_BUFFER);
        Self {
            state: Arc::new(state),
            actions,
        }
    }

    pub fn dispatch(&self, action: FileAction) {
        debug!(?action, "dispatch");
        let now = Utc::now();
        // publish under the state lock so the stream matches apply order
        self.state.send_modify(|state| {
            self.actions.send(action.clone()).ok();
            state.apply(action, now);
        });
    }

    pub fn snapshot(&self) -> FilesState {
        self.state.borrow().clone()
    }

    pub fn select<T>(&self, selector: impl FnOnce(&FilesState) -> T) -> T {
        selector(&self.state.borrow())
    }

    /// Latest-state subscription.
    pub fn subscribe(&self) -> watch::Receiver<FilesState> {
        self.state.subscribe()
    }

    /// Every action dispatched after this call, in order.
    pub fn actions(&self) -> broadcast::Receiver<FileAction> {
        self.actions.subscribe()
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}
