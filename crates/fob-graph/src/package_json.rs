//! Package.json parsing for module resolution.
//!
//! Only the fields the resolver reads are modelled: `version` for dependency
//! version lookup, and `main` / `module` / `browser` for entry-point selection.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Parsed package.json structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageJson {
    /// Package name
    pub name: Option<String>,
    /// Package version
    pub version: Option<String>,
    /// CommonJS entry point
    pub main: Option<String>,
    /// ES module entry point
    pub module: Option<String>,
    /// Browser entry point or file replacement map
    #[serde(default, deserialize_with = "lenient_browser")]
    pub browser: Option<BrowserField>,
    /// Production dependencies
    #[serde(default)]
    pub dependencies: HashMap<String, String>,
}

/// The `browser` field: either an alternate entry point or a replacement map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrowserField {
    /// `"browser": "./dist/browser.js"`
    Entry(String),
    /// `"browser": { "./lib/node.js": "./lib/browser.js", "fs": false }`
    Map(HashMap<String, Replacement>),
}

/// Right-hand side of a `browser` map entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// Replace with another file or package.
    Path(String),
    /// `false`: replace with an empty module.
    Disabled,
}

impl Serialize for Replacement {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Replacement::Path(path) => serializer.serialize_str(path),
            Replacement::Disabled => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for Replacement {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(path) => Ok(Replacement::Path(path)),
            serde_json::Value::Bool(false) => Ok(Replacement::Disabled),
            other => Err(serde::de::Error::custom(format!(
                "expected string or false in browser map, got {other}"
            ))),
        }
    }
}

// Published packages carry every shape imaginable in `browser`; an unusable
// value is ignored instead of failing the whole document.
fn lenient_browser<'de, D>(deserializer: D) -> std::result::Result<Option<BrowserField>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

impl PackageJson {
    /// Parse package.json source text.
    ///
    /// # Example
    ///
    /// ```
    /// # use fob_graph::PackageJson;
    /// let pkg = PackageJson::parse(r#"{"name": "react", "version": "18.2.0"}"#).unwrap();
    /// assert_eq!(pkg.version.as_deref(), Some("18.2.0"));
    /// ```
    pub fn parse(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| Error::InvalidPackageJson(e.to_string()))
    }

    /// Entry point used for directory resolution.
    ///
    /// A string `browser` field wins over `main`, and `module` is used when
    /// neither is present.
    pub fn entry_point(&self) -> Option<&str> {
        if let Some(BrowserField::Entry(entry)) = &self.browser {
            return Some(entry.as_str());
        }
        self.main.as_deref().or(self.module.as_deref())
    }

    /// The `browser` replacement map, if the field is an object.
    pub fn browser_map(&self) -> Option<&HashMap<String, Replacement>> {
        match &self.browser {
            Some(BrowserField::Map(map)) => Some(map),
            _ => None,
        }
    }
}

/// Extract the base package name from an npm import specifier.
///
/// This handles scoped packages correctly:
/// - `@foo/bar` -> `@foo/bar`
/// - `@foo/bar/baz` -> `@foo/bar`
/// - `lodash` -> `lodash`
/// - `lodash/fp` -> `lodash`
///
/// # Example
///
/// ```
/// # use fob_graph::extract_package_name;
/// assert_eq!(extract_package_name("@babel/core/lib/index"), "@babel/core");
/// assert_eq!(extract_package_name("lodash/fp"), "lodash");
/// ```
pub fn extract_package_name(specifier: &str) -> &str {
    let specifier = specifier.trim_start_matches('/');
    let mut segments = specifier.splitn(3, '/');
    match (segments.next(), segments.next()) {
        (Some(scope), Some(name)) if scope.starts_with('@') => {
            &specifier[..scope.len() + 1 + name.len()]
        }
        (Some(name), _) => name,
        _ => specifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_package_name() {
        // Scoped packages
        assert_eq!(extract_package_name("@babel/core"), "@babel/core");
        assert_eq!(extract_package_name("@babel/core/lib/index"), "@babel/core");
        assert_eq!(extract_package_name("@types/node/fs"), "@types/node");

        // Regular packages
        assert_eq!(extract_package_name("lodash"), "lodash");
        assert_eq!(extract_package_name("lodash/fp"), "lodash");
        assert_eq!(extract_package_name("react/jsx-runtime"), "react");

        // Edge cases
        assert_eq!(extract_package_name(""), "");
        assert_eq!(extract_package_name("@org"), "@org");
        assert_eq!(extract_package_name("/react/index.js"), "react");
    }

    #[test]
    fn test_entry_point_precedence() {
        let pkg = PackageJson::parse(
            r#"{"main": "lib/index.js", "module": "es/index.js", "browser": "dist/browser.js"}"#,
        )
        .unwrap();
        assert_eq!(pkg.entry_point(), Some("dist/browser.js"));

        let pkg = PackageJson::parse(r#"{"main": "lib/index.js", "module": "es/index.js"}"#).unwrap();
        assert_eq!(pkg.entry_point(), Some("lib/index.js"));

        let pkg = PackageJson::parse(r#"{"module": "es/index.js"}"#).unwrap();
        assert_eq!(pkg.entry_point(), Some("es/index.js"));

        assert_eq!(PackageJson::default().entry_point(), None);
    }

    #[test]
    fn test_browser_map_parse() {
        let pkg = PackageJson::parse(
            r#"{
                "main": "index.js",
                "browser": { "./lib/node.js": "./lib/browser.js", "fs": false }
            }"#,
        )
        .unwrap();

        let map = pkg.browser_map().unwrap();
        assert_eq!(
            map.get("./lib/node.js"),
            Some(&Replacement::Path("./lib/browser.js".to_string()))
        );
        assert_eq!(map.get("fs"), Some(&Replacement::Disabled));
        assert_eq!(pkg.entry_point(), Some("index.js"));
    }

    #[test]
    fn test_unusable_browser_field_is_ignored() {
        let pkg = PackageJson::parse(r#"{"version": "1.0.0", "browser": true}"#).unwrap();
        assert!(pkg.browser.is_none());
        assert_eq!(pkg.version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            PackageJson::parse("{ not json"),
            Err(Error::InvalidPackageJson(_))
        ));
    }
}
