use axum::{
    Router,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Json},
    routing::get,
};
use bytes::Bytes;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::service::ServiceError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct UploadParams {
    #[serde(default)]
    name: String,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/files", get(list_files).post(upload_file))
        .route("/api/files/{id}", get(download_file))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn list_files(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.list())
}

pub async fn upload_file(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> impl IntoResponse {
    if params.name.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Missing file name".into());
    }
    match state.store(&params.name, body) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(ServiceError::Rejected(message)) => {
            warn!(filename = %params.name, "rejected upload");
            error_response(StatusCode::UNSUPPORTED_MEDIA_TYPE, message)
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

pub async fn download_file(Path(id): Path<i64>, State(state): State<AppState>) -> impl IntoResponse {
    let entry = match state.files.get(&id) {
        Some(e) => e,
        None => return error_response(StatusCode::NOT_FOUND, "File not found".into()),
    };

    let mime_type = entry.record.kind.mime();
    let disposition = format!(
        "attachment; filename=\"{}\"",
        entry.record.name.replace('"', "\\\"")
    );
    let bytes = entry.bytes.clone();
    drop(entry);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

fn error_response(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(ErrorBody { error })).into_response()
}
