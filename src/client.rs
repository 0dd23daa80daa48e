use bytes::Bytes;
use reqwest::header;
use tracing::warn;

use crate::catalog::FileKind;
use crate::record::FileRecord;
use crate::service::{FileService, ServiceError};

/// [`FileService`] backed by the file server's JSON API.
pub struct HttpFileService {
    client: reqwest::Client,
    base_url: String,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpFileService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn files_url(&self) -> String {
        format!("{}/api/files", self.base_url)
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| format!("server returned status {status}"));
    Err(ServiceError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Rows that do not parse as a record are dropped rather than failing the list.
fn parse_listing(rows: Vec<serde_json::Value>) -> Vec<FileRecord> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<FileRecord>(row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "skipping unreadable file row");
                None
            }
        })
        .collect()
}

fn transport(e: reqwest::Error) -> ServiceError {
    ServiceError::Transport(format!("request failed: {e}"))
}

impl FileService for HttpFileService {
    async fn list_all(&self) -> Result<Vec<FileRecord>, ServiceError> {
        let resp = self
            .client
            .get(self.files_url())
            .send()
            .await
            .map_err(transport)?;
        let rows = check(resp)
            .await?
            .json::<Vec<serde_json::Value>>()
            .await
            .map_err(|e| ServiceError::Transport(format!("invalid file list: {e}")))?;
        Ok(parse_listing(rows))
    }

    async fn upload(&self, bytes: Bytes, name: &str) -> Result<FileRecord, ServiceError> {
        let content_type = FileKind::from_name(name).map_or("application/octet-stream", FileKind::mime);
        let resp = self
            .client
            .post(self.files_url())
            .query(&[("name", name)])
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(transport)?;
        check(resp)
            .await?
            .json::<FileRecord>()
            .await
            .map_err(|e| ServiceError::Transport(format!("invalid upload response: {e}")))
    }
}
