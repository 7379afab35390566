//! Virtual path helpers.
//!
//! Virtual paths are always absolute, `/`-separated and independent of the host
//! platform, e.g. `/node_modules/react/index.js`.

use std::path::Path;

use fob_graph::extract_package_name;
use path_clean::PathClean;

/// Sentinel path produced when a package's `browser` map disables a module.
pub const EMPTY_SHIM_PATH: &str = "//empty.js";

/// Source of a synthesized no-op module.
pub const EMPTY_MODULE_CODE: &str = "module.exports = null;";

/// Join `specifier` onto `base` and normalize `.` and `..` segments.
///
/// ```
/// # use fob_fetch::paths::join;
/// assert_eq!(join("/node_modules/a/lib", "../index.js"), "/node_modules/a/index.js");
/// assert_eq!(join("/src", "/abs.js"), "/abs.js");
/// ```
pub fn join(base: &str, specifier: &str) -> String {
    to_virtual(&Path::new("/").join(base).join(specifier).clean())
}

/// Normalize a virtual path.
pub fn normalize(path: &str) -> String {
    join("/", path)
}

/// Parent directory of a virtual path; `/` is its own parent.
pub fn dirname(path: &str) -> String {
    match path.trim_end_matches('/').rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Last segment of a virtual path.
pub fn basename(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Whether a specifier is resolved against the filesystem rather than module
/// directories.
pub fn is_path_specifier(specifier: &str) -> bool {
    specifier.starts_with('/')
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == ".."
}

fn to_virtual(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.is_empty() {
        "/".to_string()
    } else {
        path
    }
}

/// Name of the dependency that owns `path`.
///
/// The *last* `/{module_dir}/` segment decides, so vendored copies of a
/// sub-dependency (`/node_modules/a/node_modules/b/x.js`) resolve to `b`. A
/// path without a module directory is read as a bare specifier.
///
/// ```
/// # use fob_fetch::paths::dependency_name;
/// assert_eq!(dependency_name("/node_modules/a/node_modules/@s/b/x.js", "node_modules"), "@s/b");
/// assert_eq!(dependency_name("react/jsx-runtime", "node_modules"), "react");
/// ```
pub fn dependency_name<'a>(path: &'a str, module_dir: &str) -> &'a str {
    let marker = format!("/{module_dir}/");
    let tail = match path.rfind(&marker) {
        Some(idx) => &path[idx + marker.len()..],
        None => path.strip_prefix(&marker[1..]).unwrap_or(path),
    };
    extract_package_name(tail)
}

/// Path of a file relative to the root of the dependency `name`, ready to be
/// appended to a CDN URL.
///
/// `#` is escaped because CDNs would treat it as a fragment.
pub fn package_relative_path(path: &str, module_dir: &str, name: &str) -> String {
    let marker = format!("/{module_dir}/{name}");
    let relative = match path.rfind(&marker) {
        Some(idx) => &path[idx + marker.len()..],
        None => path,
    };
    let relative = if relative.starts_with('/') {
        relative.to_string()
    } else {
        format!("/{relative}")
    };
    relative.replace('#', "%23")
}

/// Virtual root directory of the dependency `name`.
pub fn package_root(module_dir: &str, name: &str) -> String {
    format!("/{module_dir}/{name}")
}

/// Directory `name` is installed in, read from an absolute path inside it.
///
/// ```
/// # use fob_fetch::paths::install_root;
/// assert_eq!(
///     install_root("/node_modules/a/node_modules/b/lib/x.js", "node_modules", "b").as_deref(),
///     Some("/node_modules/a/node_modules/b")
/// );
/// assert_eq!(install_root("b/lib/x.js", "node_modules", "b"), None);
/// ```
pub fn install_root(path: &str, module_dir: &str, name: &str) -> Option<String> {
    let marker = format!("/{module_dir}/{name}");
    let idx = path.rfind(&marker)?;
    let end = idx + marker.len();
    match path[end..].chars().next() {
        None | Some('/') => Some(path[..end].to_string()),
        Some(_) => None,
    }
}

/// Split an npm alias (`npm:real@1.0.0`) into the real package name and
/// version. Non-alias versions pass through unchanged.
///
/// ```
/// # use fob_fetch::paths::resolve_npm_alias;
/// assert_eq!(
///     resolve_npm_alias("vue2", "npm:@vue/compat@2.6.14"),
///     ("@vue/compat".to_string(), "2.6.14".to_string())
/// );
/// assert_eq!(
///     resolve_npm_alias("react", "18.2.0"),
///     ("react".to_string(), "18.2.0".to_string())
/// );
/// ```
pub fn resolve_npm_alias(name: &str, version: &str) -> (String, String) {
    let Some(alias) = version.strip_prefix("npm:") else {
        return (name.to_string(), version.to_string());
    };
    match alias.rfind('@') {
        Some(idx) if idx > 0 => (alias[..idx].to_string(), alias[idx + 1..].to_string()),
        _ => (alias.to_string(), "latest".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_and_normalize() {
        assert_eq!(join("/node_modules/a", "./lib/x"), "/node_modules/a/lib/x");
        assert_eq!(join("/node_modules/a/lib", ".."), "/node_modules/a");
        assert_eq!(join("/", "../../x.js"), "/x.js");
        assert_eq!(normalize("/a/./b//c/"), "/a/b/c");
        assert_eq!(normalize(""), "/");
    }

    #[test]
    fn test_dirname_and_basename() {
        assert_eq!(dirname("/node_modules/react/package.json"), "/node_modules/react");
        assert_eq!(dirname("/index.js"), "/");
        assert_eq!(dirname("/"), "/");
        assert_eq!(basename("/node_modules/react/"), "react");
        assert_eq!(basename("/"), "");
    }

    #[test]
    fn test_is_path_specifier() {
        assert!(is_path_specifier("./a"));
        assert!(is_path_specifier("../a"));
        assert!(is_path_specifier("/a"));
        assert!(is_path_specifier("."));
        assert!(!is_path_specifier("react"));
        assert!(!is_path_specifier(".bin"));
        assert!(!is_path_specifier("@scope/pkg"));
    }

    #[test]
    fn test_dependency_name_uses_last_module_directory() {
        let dir = "node_modules";
        assert_eq!(dependency_name("/node_modules/react/index.js", dir), "react");
        assert_eq!(
            dependency_name("/node_modules/@babel/core/lib/index.js", dir),
            "@babel/core"
        );
        assert_eq!(
            dependency_name("/node_modules/a/node_modules/b/index.js", dir),
            "b"
        );
        assert_eq!(dependency_name("node_modules/react", dir), "react");
        assert_eq!(dependency_name("lodash/fp", dir), "lodash");
    }

    #[test]
    fn test_package_relative_path() {
        let dir = "node_modules";
        assert_eq!(
            package_relative_path("/node_modules/react/cjs/react.js", dir, "react"),
            "/cjs/react.js"
        );
        assert_eq!(
            package_relative_path("/node_modules/a/node_modules/b/x.js", dir, "b"),
            "/x.js"
        );
        assert_eq!(
            package_relative_path("/node_modules/c/#private.js", dir, "c"),
            "/%23private.js"
        );
        assert_eq!(package_relative_path("lib/x.js", dir, "d"), "/lib/x.js");
    }

    #[test]
    fn test_install_root() {
        let dir = "node_modules";
        assert_eq!(
            install_root("/node_modules/react/index.js", dir, "react").as_deref(),
            Some("/node_modules/react")
        );
        assert_eq!(
            install_root("/node_modules/react", dir, "react").as_deref(),
            Some("/node_modules/react")
        );
        // A longer package name sharing the prefix is not a match
        assert_eq!(install_root("/node_modules/react-dom/index.js", dir, "react"), None);
    }

    #[test]
    fn test_npm_alias_forms() {
        assert_eq!(
            resolve_npm_alias("a", "npm:real@1.0.0"),
            ("real".to_string(), "1.0.0".to_string())
        );
        assert_eq!(
            resolve_npm_alias("a", "npm:@scope/real@^2"),
            ("@scope/real".to_string(), "^2".to_string())
        );
        assert_eq!(
            resolve_npm_alias("a", "npm:real"),
            ("real".to_string(), "latest".to_string())
        );
        assert_eq!(
            resolve_npm_alias("a", "npm:@scope/real"),
            ("@scope/real".to_string(), "latest".to_string())
        );
    }
}
