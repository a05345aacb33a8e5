use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::error::{ForgeError, ForgeResult};

/// Where named templates live unless the caller says otherwise.
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Where generated files land unless an explicit output path is given.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Templates are plain Markdown files with embedded markers.
pub const TEMPLATE_EXTENSION: &str = "md";

/// Reads and parses a UTF-8 JSON configuration file. The document is read-only
/// after this point; every later stage borrows it.
pub fn load_config(path: &Path) -> ForgeResult<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        ForgeError::config(format!("cannot read config '{}': {e}", path.display()))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        ForgeError::config(format!(
            "config '{}' is not valid JSON: {e}",
            path.display()
        ))
    })
}

/// Resolves template names (from `meta.template`) to files under a root
/// directory, with a fixed extension.
#[derive(Clone, Debug)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{TEMPLATE_EXTENSION}"))
    }

    pub fn load(&self, name: &str) -> ForgeResult<String> {
        let path = self.path_for(name);
        fs::read_to_string(&path).map_err(|e| {
            ForgeError::template(format!("cannot read template '{}': {e}", path.display()))
        })
    }
}
