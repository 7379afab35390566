//! Shared test utilities for fob-fetch tests
//!
//! Provides an in-memory transport with a route table and call log, URL
//! builders for the default endpoints, and listing fixtures.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fob_fetch::{
    FetchConfig, HttpResponse, Manifest, ModuleFetcher, Transport, TransportError,
    transport::TransportResult,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::time::Instant;

pub const CDN: &str = "https://cdn.jsdelivr.net";
pub const DATA: &str = "https://data.jsdelivr.com/v1/package";
pub const UNPKG: &str = "https://unpkg.com";
pub const GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Clone)]
enum Route {
    Body(String),
    Status(u16),
    /// Answer 503 `remaining` more times, then serve `body`
    Flaky { remaining: u32, body: String },
    Unreachable,
}

/// In-memory [`Transport`]. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<(String, Instant)>>,
    latency: Mutex<Option<Duration>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, url: impl Into<String>, body: impl Into<String>) {
        self.routes.lock().insert(url.into(), Route::Body(body.into()));
    }

    pub fn route_json(&self, url: impl Into<String>, body: &Value) {
        self.route(url, body.to_string());
    }

    pub fn fail(&self, url: impl Into<String>, status: u16) {
        self.routes.lock().insert(url.into(), Route::Status(status));
    }

    pub fn unreachable(&self, url: impl Into<String>) {
        self.routes.lock().insert(url.into(), Route::Unreachable);
    }

    pub fn flaky(&self, url: impl Into<String>, failures: u32, body: impl Into<String>) {
        self.routes.lock().insert(
            url.into(),
            Route::Flaky {
                remaining: failures,
                body: body.into(),
            },
        );
    }

    /// Delay every response by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|(u, _)| u == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    /// Start instants of every request to `url`, in order.
    pub fn call_starts(&self, url: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(u, _)| u.clone()).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> TransportResult<HttpResponse> {
        self.calls.lock().push((url.to_string(), Instant::now()));

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut routes = self.routes.lock();
        match routes.get_mut(url) {
            Some(Route::Body(body)) => Ok(HttpResponse::ok(body.clone())),
            Some(Route::Status(status)) => Ok(HttpResponse {
                status: *status,
                body: String::new(),
            }),
            Some(Route::Flaky { remaining, body }) => {
                if *remaining > 0 {
                    *remaining -= 1;
                    Ok(HttpResponse {
                        status: 503,
                        body: String::new(),
                    })
                } else {
                    Ok(HttpResponse::ok(body.clone()))
                }
            }
            Some(Route::Unreachable) => Err(TransportError::Request(format!(
                "connection refused: {url}"
            ))),
            None => Ok(HttpResponse {
                status: 404,
                body: format!("Couldn't find the requested file: {url}"),
            }),
        }
    }
}

/// Default endpoints with fast, bounded retries.
pub fn test_config() -> FetchConfig {
    FetchConfig {
        max_attempts: 2,
        retry_spacing_ms: 0,
        ..FetchConfig::default()
    }
}

pub fn test_fetcher(transport: &Arc<MockTransport>, manifest: Manifest) -> ModuleFetcher {
    ModuleFetcher::builder()
        .config(test_config())
        .transport(transport.clone())
        .manifest(manifest)
        .build()
        .expect("test fetcher should build")
}

pub fn npm_meta_url(name: &str, version: &str) -> String {
    format!("{DATA}/npm/{name}@{version}/flat")
}

pub fn npm_file_url(name: &str, version: &str, path: &str) -> String {
    format!("{CDN}/npm/{name}@{version}{path}")
}

pub fn unpkg_meta_url(name: &str, version: &str) -> String {
    format!("{UNPKG}/{name}@{version}/?meta")
}

pub fn unpkg_file_url(name: &str, version: &str, path: &str) -> String {
    format!("{UNPKG}/{name}@{version}{path}")
}

/// jsDelivr-style flat listing.
pub fn flat_listing<S: AsRef<str>>(files: &[S]) -> Value {
    let files: Vec<Value> = files
        .iter()
        .map(|file| json!({ "name": file.as_ref(), "hash": "", "size": 0 }))
        .collect();
    json!({ "default": "/index.js", "files": files })
}

/// unpkg-style nested listing with real directory nodes.
pub fn tree_listing<S: AsRef<str>>(files: &[S]) -> Value {
    fn build(dir: &str, files: &[Vec<String>], depth: usize) -> Value {
        let mut children = Vec::new();
        let mut subdirs: BTreeMap<String, Vec<Vec<String>>> = BTreeMap::new();
        for segments in files {
            let path = format!("{}/{}", dir.trim_end_matches('/'), segments[depth]);
            if segments.len() == depth + 1 {
                children.push(json!({ "path": path, "type": "file", "size": 0 }));
            } else {
                subdirs.entry(path).or_default().push(segments.clone());
            }
        }
        for (path, nested) in subdirs {
            children.push(build(&path, &nested, depth + 1));
        }
        json!({ "path": dir, "type": "directory", "files": children })
    }

    let split: Vec<Vec<String>> = files
        .iter()
        .map(|file| {
            file.as_ref()
                .trim_start_matches('/')
                .split('/')
                .map(String::from)
                .collect()
        })
        .collect();
    build("/", &split, 0)
}

/// Serve an npm package from the primary backend: its flat listing plus the
/// content of every file.
pub fn serve_npm_package(
    transport: &MockTransport,
    name: &str,
    version: &str,
    files: &[(&str, &str)],
) {
    let paths: Vec<&str> = files.iter().map(|(path, _)| *path).collect();
    transport.route_json(npm_meta_url(name, version), &flat_listing(&paths));
    for (path, content) in files {
        transport.route(npm_file_url(name, version, path), *content);
    }
}

/// `package.json` source with a name, version and optional extra fields.
pub fn package_json(name: &str, version: &str, extra: Value) -> String {
    let mut doc = json!({ "name": name, "version": version });
    if let (Some(doc), Some(extra)) = (doc.as_object_mut(), extra.as_object()) {
        doc.extend(extra.clone());
    }
    doc.to_string()
}
