#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::{Multipart, Path, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use chrono::{TimeZone, Utc};
use file_vault_client::{FileRecord, StorageSavings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    #[default]
    Normal,
    ServerError,
    Malformed,
}

/// In-memory stand-in for the file backend.
#[derive(Default)]
pub struct StubBackend {
    pub files: Mutex<Vec<FileRecord>>,
    pub queries: Mutex<Vec<Option<String>>>,
    pub delete_requests: Mutex<Vec<String>>,
    pub list_mode: Mutex<ListMode>,
    pub savings: Mutex<Option<StorageSavings>>,
    pub list_calls: AtomicUsize,
    pub next_id: AtomicUsize,
    pub base: Mutex<String>,
}

impl StubBackend {
    pub fn last_query(&self) -> Option<String> {
        self.queries.lock().unwrap().last().cloned().flatten()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn set_list_mode(&self, mode: ListMode) {
        *self.list_mode.lock().unwrap() = mode;
    }
}

pub fn record(id: &str, filename: &str, file_type: &str, size: u64) -> FileRecord {
    FileRecord {
        id: id.to_string(),
        original_filename: filename.to_string(),
        file_type: file_type.to_string(),
        size,
        uploaded_at: Utc.with_ymd_and_hms(2025, 2, 1, 9, 30, 0).unwrap(),
        file: format!("/media/{}", filename),
        hash: Some(format!("hash-{}", id)),
    }
}

pub struct StubServer {
    pub addr: SocketAddr,
    pub backend: Arc<StubBackend>,
}

impl StubServer {
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn media_url(&self, name: &str) -> String {
        format!("http://{}/media/{}", self.addr, name)
    }

    /// Stores records whose `file` field points at this server.
    pub fn seed(&self, records: Vec<FileRecord>) {
        let seeded = records
            .into_iter()
            .map(|mut r| {
                r.file = format!("http://{}{}", self.addr, r.file);
                r
            })
            .collect();
        *self.backend.files.lock().unwrap() = seeded;
    }
}

pub async fn spawn_stub() -> StubServer {
    let backend = Arc::new(StubBackend::default());
    let app = Router::new()
        .route("/api/files/", get(list_files).post(upload_file))
        .route("/api/files/{id}/", delete(delete_file))
        .route("/api/storage-savings/total_savings/", get(total_savings))
        .route("/media/{name}", get(media))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    *backend.base.lock().unwrap() = format!("http://{}", addr);
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    StubServer { addr, backend }
}

async fn list_files(
    State(backend): State<Arc<StubBackend>>,
    RawQuery(query): RawQuery,
) -> Response {
    backend.list_calls.fetch_add(1, Ordering::SeqCst);
    backend.queries.lock().unwrap().push(query.clone());

    let params: HashMap<String, String> = query
        .as_deref()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    // Lets tests hold a response back to exercise out-of-order completion.
    if params.get("search").is_some_and(|s| s.starts_with("slow")) {
        tokio::time::sleep(Duration::from_millis(400)).await;
    }

    let mode = *backend.list_mode.lock().unwrap();
    match mode {
        ListMode::ServerError => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
        }
        ListMode::Malformed => {
            return Json(serde_json::json!([{ "id": "x", "size": "big" }])).into_response()
        }
        ListMode::Normal => {}
    }

    let files: Vec<FileRecord> = backend
        .files
        .lock()
        .unwrap()
        .iter()
        .filter(|f| {
            params
                .get("search")
                .map_or(true, |s| f.original_filename.contains(s.as_str()))
        })
        .filter(|f| params.get("file_type").map_or(true, |t| &f.file_type == t))
        .filter(|f| {
            params
                .get("min_size")
                .and_then(|v| v.parse::<u64>().ok())
                .map_or(true, |min| f.size >= min)
        })
        .filter(|f| {
            params
                .get("max_size")
                .and_then(|v| v.parse::<u64>().ok())
                .map_or(true, |max| f.size <= max)
        })
        .cloned()
        .collect();

    Json(files).into_response()
}

async fn upload_file(
    State(backend): State<Arc<StubBackend>>,
    mut multipart: Multipart,
) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("unnamed").to_string();
        let file_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let Ok(bytes) = field.bytes().await else {
            return StatusCode::BAD_REQUEST.into_response();
        };

        let n = backend.next_id.fetch_add(1, Ordering::SeqCst);
        let mut stored = record(
            &format!("up-{}", n),
            &filename,
            &file_type,
            bytes.len() as u64,
        );
        stored.file = format!("{}/media/{}", backend.base.lock().unwrap(), filename);
        backend.files.lock().unwrap().push(stored.clone());
        return (StatusCode::CREATED, Json(stored)).into_response();
    }
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": "No file provided" })),
    )
        .into_response()
}

async fn delete_file(State(backend): State<Arc<StubBackend>>, Path(id): Path<String>) -> StatusCode {
    backend.delete_requests.lock().unwrap().push(id.clone());
    let mut files = backend.files.lock().unwrap();
    let before = files.len();
    files.retain(|f| f.id != id);
    if files.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn total_savings(State(backend): State<Arc<StubBackend>>) -> Response {
    match *backend.savings.lock().unwrap() {
        Some(savings) => Json(savings).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn media(Path(name): Path<String>) -> Response {
    if name == "missing.bin" {
        return StatusCode::NOT_FOUND.into_response();
    }
    (
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"server-chosen.bin\"",
        )],
        format!("contents of {}", name),
    )
        .into_response()
}
