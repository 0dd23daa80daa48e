use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use content_manager::catalog::{self, format_megabytes};
use content_manager::client::HttpFileService;
use content_manager::routes;
use content_manager::state::AppState;
use content_manager::{FileStore, FilesState, Selection, SubmitOutcome, UploadCandidate, UploadFlow, load_files};

const DEFAULT_PORT: u16 = 4020;

#[derive(Parser)]
#[command(name = "content_manager", about = "Upload and manage course content files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the file server.
    Serve {
        /// Falls back to $PORT, then 4020.
        #[arg(long, env = "API_PORT")]
        port: Option<u16>,
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
        #[arg(long, default_value_t = 1024 * 1024 * 1024)]
        max_upload_bytes: usize,
    },
    /// Show uploaded files.
    List {
        #[arg(long, env = "CONTENT_MANAGER_URL", default_value = "http://127.0.0.1:4020")]
        server: String,
    },
    /// Upload one file, then show the refreshed list.
    Upload {
        path: PathBuf,
        #[arg(long, env = "CONTENT_MANAGER_URL", default_value = "http://127.0.0.1:4020")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "content_manager=info".into()),
        )
        .init();

    match Cli::parse().command {
        Command::Serve {
            port,
            bind,
            max_upload_bytes,
        } => serve(port, &bind, max_upload_bytes).await,
        Command::List { server } => list(&server).await,
        Command::Upload { path, server } => upload(path, &server).await,
    }
}

async fn serve(port: Option<u16>, bind: &str, max_upload_bytes: usize) -> anyhow::Result<()> {
    let port = match port {
        Some(port) => port,
        None => match std::env::var("PORT") {
            Ok(value) => value.parse().context("PORT is not a valid port")?,
            Err(_) => DEFAULT_PORT,
        },
    };
    let app = routes::router(AppState::new(), max_upload_bytes);

    let addr = format!("{bind}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("content manager listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn list(server: &str) -> anyhow::Result<()> {
    let store = FileStore::new();
    let service = HttpFileService::new(server);
    load_files(&store, &service).await;
    print_files(&store.snapshot())
}

async fn upload(path: PathBuf, server: &str) -> anyhow::Result<()> {
    let candidate = UploadCandidate::from_path(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let store = FileStore::new();
    let mut flow = UploadFlow::new(store.clone(), Arc::new(HttpFileService::new(server)));
    flow.set_open(true);

    match flow.select(Some(candidate)) {
        Selection::Accepted(kind) => {
            if let Some(candidate) = flow.candidate() {
                println!(
                    "{}  Type: {} • Size: {}",
                    candidate.name,
                    kind.label(),
                    format_megabytes(candidate.size)
                );
            }
        }
        Selection::Rejected { name } => anyhow::bail!(
            "{name}: unsupported file type. Supported formats: {}",
            catalog::supported_formats_label()
        ),
        Selection::Unchanged => anyhow::bail!("no file selected"),
    }

    match flow.submit().await {
        SubmitOutcome::Uploaded { record, refresh } => {
            println!("uploaded {} (id {})", record.name, record.id);
            refresh.await.context("file list refresh task failed")?;
            print_files(&store.snapshot())
        }
        SubmitOutcome::Failed(message) => anyhow::bail!("upload failed: {message}"),
        SubmitOutcome::NoCandidate => anyhow::bail!("no file selected"),
    }
}

fn print_files(state: &FilesState) -> anyhow::Result<()> {
    if let Some(error) = &state.list_error {
        anyhow::bail!("could not load files: {error}");
    }
    if state.files.is_empty() {
        println!("no files uploaded yet");
        return Ok(());
    }
    for file in &state.files {
        println!(
            "{:>5}  {:<5} {:>12}  {}  {}",
            file.id,
            file.kind.label(),
            format_megabytes(file.size),
            file.created_at.format("%Y-%m-%d %H:%M"),
            file.name
        );
    }
    if let Some(at) = state.last_refreshed {
        println!("refreshed {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}
