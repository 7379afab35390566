use serde::{Deserialize, Serialize};

use crate::paths::EMPTY_MODULE_CODE;

/// Outcome of [`ModuleFetcher::fetch_module`](crate::ModuleFetcher::fetch_module).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    /// Absolute virtual path the content belongs to.
    pub path: String,
    pub code: String,
    /// Always empty; dependencies are discovered by the bundler.
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub stubbed: bool,
    #[serde(default)]
    pub downloaded: bool,
}

impl FileResult {
    /// Content fetched from a backend.
    pub fn downloaded(path: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
            requires: Vec::new(),
            stubbed: false,
            downloaded: true,
        }
    }

    /// Synthesized no-op module.
    pub fn stub(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: EMPTY_MODULE_CODE.to_string(),
            requires: Vec::new(),
            stubbed: true,
            downloaded: false,
        }
    }

    /// Graph node for this result.
    pub fn to_module(&self) -> fob_graph::TranspiledModule {
        let mut module = if self.downloaded {
            fob_graph::TranspiledModule::downloaded(&self.path, &self.code)
        } else {
            fob_graph::TranspiledModule::new(&self.path, &self.code)
        };
        if self.stubbed {
            module.mark_stubbed();
        }
        module
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(FileResult::stub("/node_modules/fs")).unwrap();
        assert_eq!(json["path"], "/node_modules/fs");
        assert_eq!(json["code"], EMPTY_MODULE_CODE);
        assert_eq!(json["stubbed"], true);
        assert_eq!(json["downloaded"], false);
        assert_eq!(json["requires"], serde_json::json!([]));
    }

    #[test]
    fn test_to_module_flags() {
        let module = FileResult::downloaded("/node_modules/a/index.js", "x").to_module();
        assert!(module.downloaded);
        assert!(!module.stubbed);

        let module = FileResult::stub("/node_modules/fs").to_module();
        assert!(module.stubbed);
    }
}
