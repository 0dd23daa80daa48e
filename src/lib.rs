pub mod catalog;
pub mod client;
pub mod controller;
pub mod record;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use catalog::FileKind;
pub use controller::{Selection, SubmitOutcome, UploadFlow, load_files};
pub use record::{FileRecord, UploadCandidate};
pub use service::{FileService, ServiceError};
pub use store::{FileAction, FileStore, FilesState};
