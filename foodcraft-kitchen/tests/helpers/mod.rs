//! Shared fixtures for foodcraft-kitchen integration tests
//!
//! `StubProvider` is a local axum server that plays back scripted provider
//! responses and records what it was sent.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use foodcraft_common::config::{
    ImageProviderConfig, ImageProviderFamily, TextProviderConfig, TextProviderFamily,
};
use foodcraft_kitchen::db::{DiscoveryStore, SqliteDiscoveryStore};
use foodcraft_kitchen::providers::{ImageGenerator, TextGenerator};
use foodcraft_kitchen::services::{CombinationResolver, ShortcutTable};

/// One scripted reply
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl StubResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: "application/json",
            body: body.to_string().into_bytes(),
        }
    }

    pub fn raw(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            content_type,
            body: body.into(),
        }
    }

    /// OpenAI-family success carrying `content` as the generated text
    pub fn openai(content: &str) -> Self {
        Self::json(
            200,
            json!({
                "choices": [ { "message": { "role": "assistant", "content": content } } ]
            }),
        )
    }

    /// Gemini-family success carrying `text` as the generated text
    pub fn gemini(text: &str) -> Self {
        Self::json(
            200,
            json!({
                "candidates": [ { "content": { "role": "model", "parts": [ { "text": text } ] } } ]
            }),
        )
    }

    pub fn rate_limited() -> Self {
        Self::json(429, json!({ "error": { "message": "rate limit exceeded" } }))
    }
}

/// What the stub saw for one request
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub goog_api_key: Option<String>,
    pub body: Value,
}

struct StubInner {
    script: Vec<StubResponse>,
    calls: AtomicUsize,
    seen: Mutex<Vec<SeenRequest>>,
}

/// Scripted provider on 127.0.0.1
///
/// Call N gets `script[N]`; calls past the end repeat the last entry.
pub struct StubProvider {
    pub base_url: String,
    inner: Arc<StubInner>,
}

impl StubProvider {
    pub async fn start(script: Vec<StubResponse>) -> Self {
        assert!(!script.is_empty(), "stub needs at least one response");

        let inner = Arc::new(StubInner {
            script,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(respond).with_state(Arc::clone(&inner));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            inner,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.inner.seen.lock().unwrap().clone()
    }
}

async fn respond(
    State(inner): State<Arc<StubInner>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let index = inner.calls.fetch_add(1, Ordering::SeqCst);

    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    inner.seen.lock().unwrap().push(SeenRequest {
        path: uri.path().to_string(),
        authorization: header_value("authorization"),
        goog_api_key: header_value("x-goog-api-key"),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let reply = inner
        .script
        .get(index)
        .or_else(|| inner.script.last())
        .cloned()
        .unwrap();

    (
        reply.status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response()
}

/// Raw HTTP server that answers 200 with a `content-length` it never
/// delivers, then closes the connection
///
/// Returns the base URL and a per-connection counter.
pub async fn start_truncated_body_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&connections);
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                read_request(&mut socket).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\n\
                          content-type: application/json\r\n\
                          content-length: 4096\r\n\r\n\
                          {\"choices\": [",
                    )
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), connections)
}

/// Consume one request (headers plus `content-length` body)
async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }
}

/// Fresh in-memory database with the schema applied
pub async fn memory_pool() -> SqlitePool {
    // One connection: every connection to :memory: is a separate database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    foodcraft_common::db::create_tables(&pool).await.unwrap();
    pool
}

pub fn openai_config(endpoint: String) -> TextProviderConfig {
    TextProviderConfig {
        family: TextProviderFamily::OpenAi,
        endpoint,
        model: "test-model".to_string(),
        api_keys: Vec::new(),
        timeout_secs: 5,
    }
}

pub fn gemini_config(endpoint: String) -> TextProviderConfig {
    TextProviderConfig {
        family: TextProviderFamily::Gemini,
        endpoint,
        model: "gemini-test".to_string(),
        api_keys: Vec::new(),
        timeout_secs: 5,
    }
}

pub fn image_config(family: ImageProviderFamily, endpoint: String) -> ImageProviderConfig {
    ImageProviderConfig {
        family,
        endpoint,
        api_key: None,
        timeout_secs: 5,
    }
}

pub fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

/// Resolver over `store` talking to the given text provider, default shortcuts
pub fn resolver_with(
    store: Arc<dyn DiscoveryStore>,
    text_config: &TextProviderConfig,
    credentials: Vec<String>,
    image: Option<ImageGenerator>,
) -> CombinationResolver {
    let text = TextGenerator::new(text_config, credentials).unwrap();
    CombinationResolver::new(store, text, image, ShortcutTable::with_defaults())
}

/// Resolver on a fresh in-memory store, OpenAI family, one credential
pub async fn openai_resolver(stub: &StubProvider) -> (SqlitePool, CombinationResolver) {
    let pool = memory_pool().await;
    let store: Arc<dyn DiscoveryStore> = Arc::new(SqliteDiscoveryStore::new(pool.clone()));
    let resolver = resolver_with(
        store,
        &openai_config(stub.url("/v1/chat/completions")),
        keys(&["key-primary"]),
        None,
    );
    (pool, resolver)
}
