use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::*;
use crate::error::FetchError;
use crate::paths::EMPTY_SHIM_PATH;

/// In-memory filesystem. Files listed in `remote` exist but their content is
/// only available through `read_file`, like paths known from a listing.
#[derive(Default)]
struct MemoryFs {
    files: HashMap<String, String>,
    remote: HashMap<String, String>,
    reads: AtomicUsize,
}

impl MemoryFs {
    fn new() -> Self {
        Self::default()
    }

    fn file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }

    fn remote(mut self, path: &str, content: &str) -> Self {
        self.remote.insert(path.to_string(), content.to_string());
        self
    }
}

#[async_trait]
impl VirtualFs for MemoryFs {
    fn is_file(&self, path: &str) -> bool {
        self.files.contains_key(path) || self.remote.contains_key(path)
    }

    async fn read_file(&self, path: &str) -> FetchResult<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(path)
            .or_else(|| self.remote.get(path))
            .cloned()
            .ok_or_else(|| FetchError::miss(path, "memory"))
    }

    fn cached_content(&self, path: &str) -> Option<String> {
        self.files.get(path).cloned()
    }
}

fn resolver() -> PathResolver {
    PathResolver::new(["js", "jsx", "json", "mjs"], ["node_modules"])
}

#[tokio::test]
async fn test_bare_package_falls_back_to_index() {
    let fs = MemoryFs::new().file("/node_modules/pkg/index.js", "");

    let resolved = resolver().resolve("pkg", "/src/index.js", &fs).await.unwrap();
    assert_eq!(resolved, "/node_modules/pkg/index.js");
}

#[tokio::test]
async fn test_missing_subpath_is_resolution_miss() {
    let fs = MemoryFs::new().file("/node_modules/pkg/index.js", "");

    let err = resolver()
        .resolve("pkg/lib/x", "/src/index.js", &fs)
        .await
        .unwrap_err();
    assert!(err.is_resolution_miss());
}

#[tokio::test]
async fn test_extension_probing_order() {
    let fs = MemoryFs::new()
        .file("/src/util.jsx", "")
        .file("/src/util.json", "")
        .file("/src/exact", "");

    let r = resolver();
    assert_eq!(r.resolve("./util", "/src/index.js", &fs).await.unwrap(), "/src/util.jsx");
    assert_eq!(r.resolve("./exact", "/src/index.js", &fs).await.unwrap(), "/src/exact");
    assert_eq!(
        r.resolve("../src/util.json", "/src/index.js", &fs).await.unwrap(),
        "/src/util.json"
    );
}

#[tokio::test]
async fn test_main_field_and_directory_main() {
    let fs = MemoryFs::new()
        .remote("/node_modules/a/package.json", r#"{"main": "lib/main"}"#)
        .file("/node_modules/a/lib/main.js", "")
        .file("/node_modules/a/index.js", "")
        .remote("/node_modules/b/package.json", r#"{"main": "dist"}"#)
        .file("/node_modules/b/dist/index.mjs", "")
        .remote("/node_modules/c/package.json", r#"{"main": "./"}"#)
        .file("/node_modules/c/index.json", "");

    let r = resolver();
    assert_eq!(r.resolve("a", "/index.js", &fs).await.unwrap(), "/node_modules/a/lib/main.js");
    assert_eq!(r.resolve("b", "/index.js", &fs).await.unwrap(), "/node_modules/b/dist/index.mjs");
    assert_eq!(r.resolve("c", "/index.js", &fs).await.unwrap(), "/node_modules/c/index.json");
}

#[tokio::test]
async fn test_module_field_and_browser_entry() {
    let fs = MemoryFs::new()
        .remote("/node_modules/m/package.json", r#"{"module": "es/index.js"}"#)
        .file("/node_modules/m/es/index.js", "")
        .remote(
            "/node_modules/w/package.json",
            r#"{"main": "node.js", "browser": "browser.js"}"#,
        )
        .file("/node_modules/w/node.js", "")
        .file("/node_modules/w/browser.js", "");

    let r = resolver();
    assert_eq!(r.resolve("m", "/index.js", &fs).await.unwrap(), "/node_modules/m/es/index.js");
    assert_eq!(r.resolve("w", "/index.js", &fs).await.unwrap(), "/node_modules/w/browser.js");
}

#[tokio::test]
async fn test_broken_main_falls_back_to_index() {
    let fs = MemoryFs::new()
        .remote("/node_modules/a/package.json", r#"{"main": "missing.js"}"#)
        .file("/node_modules/a/index.js", "")
        .remote("/node_modules/b/package.json", "{ not json")
        .file("/node_modules/b/index.js", "");

    let r = resolver();
    assert_eq!(r.resolve("a", "/index.js", &fs).await.unwrap(), "/node_modules/a/index.js");
    assert_eq!(r.resolve("b", "/index.js", &fs).await.unwrap(), "/node_modules/b/index.js");
}

#[tokio::test]
async fn test_nearest_module_directory_wins() {
    let fs = MemoryFs::new()
        .file("/node_modules/b/index.js", "outer")
        .file("/node_modules/a/node_modules/b/index.js", "vendored");

    let r = resolver();
    assert_eq!(
        r.resolve("b", "/node_modules/a/index.js", &fs).await.unwrap(),
        "/node_modules/a/node_modules/b/index.js"
    );
    assert_eq!(r.resolve("b", "/src/x.js", &fs).await.unwrap(), "/node_modules/b/index.js");
}

#[test]
fn test_node_modules_paths_skip_module_directories() {
    let r = PathResolver::new(["js"], ["node_modules", "vendor"]);
    assert_eq!(
        r.node_modules_paths("/node_modules/a"),
        vec![
            "/node_modules/a/node_modules",
            "/node_modules/a/vendor",
            "/node_modules",
            "/vendor",
        ]
    );
}

#[tokio::test]
async fn test_extra_module_directory() {
    let fs = MemoryFs::new().file("/src/components/button.js", "");
    let r = PathResolver::new(["js"], ["node_modules", "src"]);

    assert_eq!(
        r.resolve("components/button", "/src/app/main.js", &fs).await.unwrap(),
        "/src/components/button.js"
    );
}

#[tokio::test]
async fn test_browser_map_disables_bare_specifier() {
    let fs = MemoryFs::new()
        .file(
            "/node_modules/a/package.json",
            r#"{"browser": {"fs": false, "stream": "stream-browserify"}}"#,
        )
        .file("/node_modules/stream-browserify/index.js", "");

    let r = resolver();
    assert_eq!(
        r.resolve("fs", "/node_modules/a/index.js", &fs).await.unwrap(),
        EMPTY_SHIM_PATH
    );
    assert_eq!(
        r.resolve("stream", "/node_modules/a/index.js", &fs).await.unwrap(),
        "/node_modules/stream-browserify/index.js"
    );
    // No package.json above the requester: the map does not apply
    assert!(r.resolve("fs", "/src/index.js", &fs).await.unwrap_err().is_resolution_miss());
}

#[tokio::test]
async fn test_browser_map_replaces_files() {
    let fs = MemoryFs::new()
        .file(
            "/node_modules/a/package.json",
            r#"{"browser": {"./lib/node.js": "./lib/browser.js", "./lib/server": false}}"#,
        )
        .file("/node_modules/a/lib/node.js", "")
        .file("/node_modules/a/lib/browser.js", "")
        .file("/node_modules/a/lib/server.js", "");

    let r = resolver();
    assert_eq!(
        r.resolve("./lib/node", "/node_modules/a/index.js", &fs).await.unwrap(),
        "/node_modules/a/lib/browser.js"
    );
    assert_eq!(
        r.resolve("./lib/server", "/node_modules/a/index.js", &fs).await.unwrap(),
        EMPTY_SHIM_PATH
    );
}

#[tokio::test]
async fn test_browser_map_prefers_exact_key_over_extension_match() {
    let fs = MemoryFs::new()
        .file(
            "/node_modules/a/package.json",
            r#"{"browser": {"./lib/x": false, "./lib/x.js": "./lib/x-browser.js"}}"#,
        )
        .file("/node_modules/a/lib/x.js", "")
        .file("/node_modules/a/lib/x-browser.js", "")
        .file(
            "/node_modules/b/package.json",
            r#"{"browser": {"./lib/y": false}}"#,
        )
        .file("/node_modules/b/lib/y.js", "");

    let r = resolver();
    assert_eq!(
        r.resolve("./lib/x", "/node_modules/a/index.js", &fs).await.unwrap(),
        "/node_modules/a/lib/x-browser.js"
    );
    assert_eq!(
        r.resolve("./lib/y", "/node_modules/b/index.js", &fs).await.unwrap(),
        EMPTY_SHIM_PATH
    );
}

#[tokio::test]
async fn test_package_json_is_read_only_when_present() {
    let fs = MemoryFs::new().file("/node_modules/pkg/index.js", "");
    resolver().resolve("pkg", "/index.js", &fs).await.unwrap();
    assert_eq!(fs.reads.load(Ordering::SeqCst), 0);
}

/// Non-miss errors from the filesystem abort resolution.
#[tokio::test]
async fn test_hard_errors_propagate() {
    struct FailingFs;

    #[async_trait]
    impl VirtualFs for FailingFs {
        fn is_file(&self, path: &str) -> bool {
            path.ends_with("package.json")
        }

        async fn read_file(&self, path: &str) -> FetchResult<String> {
            Err(FetchError::Network {
                url: path.to_string(),
                attempts: 6,
                reason: "HTTP 500".to_string(),
            })
        }
    }

    let err = resolver().resolve("pkg", "/index.js", &FailingFs).await.unwrap_err();
    assert!(matches!(err, FetchError::Network { .. }));
}
