//! Generation settings.
//!
//! Settings are read once per run and consumed read-only by the resolver, the delegator, and the manifest.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use shapegen_core::SemanticVersion;
use shapegen_core::lang::conventions;
use shapegen_model::ShapeId;

use super::errors::{CodegenError, CodegenResult};

/// Default floor for the `go` directive of generated modules.
pub const DEFAULT_GO_VERSION: SemanticVersion = SemanticVersion::new(1, 15, 0);

/// Tool name written into generated-file headers by default.
pub const DEFAULT_GENERATED_BY: &str = "shapegen";

/// Settings for one generation run.
#[derive(Debug, Clone)]
pub struct CodegenSettings {
    /// Go module path of the generated client (e.g. `github.com/acme/weather`).
    pub module: String,
    /// Service shape the client is generated for.
    pub service: ShapeId,
    /// Package name of the module root; derived from `module` when unset.
    pub package_name: Option<String>,
    /// Minimum Go version written to `go.mod`, raised by standard-library dependencies.
    pub go_version: SemanticVersion,
    /// Tool name in the generated-file marker.
    pub generated_by: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SettingsFile {
    module: String,
    service: ShapeId,
    #[serde(default)]
    package_name: Option<String>,
    #[serde(default)]
    go_version: Option<String>,
    #[serde(default)]
    generated_by: Option<String>,
}

impl CodegenSettings {
    /// Create settings with defaults for everything but the module path and service.
    pub fn new(module: impl Into<String>, service: ShapeId) -> Self {
        Self {
            module: module.into(),
            service,
            package_name: None,
            go_version: DEFAULT_GO_VERSION,
            generated_by: DEFAULT_GENERATED_BY.to_string(),
        }
    }

    /// Set the root package name
    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = Some(name.into());
        self
    }

    /// Set the minimum Go version
    pub fn with_go_version(mut self, version: SemanticVersion) -> Self {
        self.go_version = version;
        self
    }

    /// Set the tool name used in file headers
    pub fn with_generated_by(mut self, tool: impl Into<String>) -> Self {
        self.generated_by = tool.into();
        self
    }

    /// Package name of the module root.
    pub fn root_package_name(&self) -> String {
        self.package_name
            .clone()
            .unwrap_or_else(|| conventions::default_package_alias(&self.module))
    }

    /// Parse settings from JSON (`{"module": ..., "service": ..., "goVersion": ...}`).
    pub fn from_json_str(source: &str, origin: &Path) -> CodegenResult<Self> {
        let file: SettingsFile = serde_json::from_str(source).map_err(|e| CodegenError::Settings {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut settings = CodegenSettings::new(file.module, file.service);
        settings.package_name = file.package_name;
        if let Some(version) = file.go_version {
            settings.go_version = SemanticVersion::parse(&version)?;
        }
        if let Some(tool) = file.generated_by {
            settings.generated_by = tool;
        }
        Ok(settings)
    }

    /// Read settings from a JSON file.
    pub fn from_json_file(path: &Path) -> CodegenResult<Self> {
        let source = fs::read_to_string(path).map_err(|e| CodegenError::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&source, path)
    }
}
