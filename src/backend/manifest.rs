//! Final dependency set, the `generated.json` manifest, and `go.mod`.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use shapegen_core::SemanticVersion;

use super::dependency::{Dependency, resolve_transitive_closure, select_version};
use super::errors::CodegenResult;

/// File name of the generation manifest.
pub const MANIFEST_FILE: &str = "generated.json";
/// File name of the module definition.
pub const GO_MOD_FILE: &str = "go.mod";

/// Dependencies of a generation run after closure and merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependencies {
    go_version: SemanticVersion,
    packages: BTreeMap<String, Dependency>,
}

impl ResolvedDependencies {
    /// Close over `dependencies` and raise `floor` to the highest standard-library requirement.
    #[tracing::instrument(skip_all, fields(floor = %floor))]
    pub fn resolve<'a>(
        dependencies: impl IntoIterator<Item = &'a Dependency>,
        floor: &SemanticVersion,
    ) -> CodegenResult<Self> {
        let packages = resolve_transitive_closure(dependencies)?;
        let go_version = packages
            .values()
            .filter(|dep| dep.is_standard_library())
            .map(Dependency::version)
            .fold(floor, |max, version| if version > max { version } else { max })
            .clone();
        Ok(Self { go_version, packages })
    }

    /// Minimum standard-library (toolchain) version.
    pub fn go_version(&self) -> &SemanticVersion {
        &self.go_version
    }

    /// Every package in the closure, keyed by import path.
    pub fn packages(&self) -> &BTreeMap<String, Dependency> {
        &self.packages
    }

    /// External packages, import path → version.
    pub fn external(&self) -> impl Iterator<Item = &Dependency> {
        self.packages.values().filter(|dep| !dep.is_standard_library())
    }

    /// External modules to require, merged again per source path.
    ///
    /// ## Errors
    /// - [`super::errors::CodegenError::ConflictingMajorVersion`] if two packages of one module disagree on the
    ///   major version.
    pub fn modules(&self) -> CodegenResult<BTreeMap<String, SemanticVersion>> {
        let mut modules: BTreeMap<String, SemanticVersion> = BTreeMap::new();
        for dep in self.external() {
            let chosen = match modules.get(dep.source_path()) {
                Some(existing) => select_version(dep.source_path(), existing, dep.version())?.clone(),
                None => dep.version().clone(),
            };
            modules.insert(dep.source_path().to_string(), chosen);
        }
        Ok(modules)
    }
}

/// `MAJOR.MINOR` form used by the `go` directive.
pub fn go_directive(version: &SemanticVersion) -> String {
    format!("{}.{}", version.major(), version.minor())
}

/// External module versions always carry the `v` prefix, in `go.mod` and the manifest alike.
pub fn module_version(version: &SemanticVersion) -> String {
    version.clone().with_prefix("v").to_string()
}

/// Render `go.mod` for `module`.
pub fn render_go_mod(module: &str, resolved: &ResolvedDependencies) -> CodegenResult<String> {
    let mut out = format!("module {module}\n\ngo {}\n", go_directive(resolved.go_version()));
    let modules = resolved.modules()?;
    if !modules.is_empty() {
        out.push_str("\nrequire (\n");
        for (path, version) in &modules {
            let _ = writeln!(out, "\t{path} {}", module_version(version));
        }
        out.push_str(")\n");
    }
    Ok(out)
}

/// Persisted summary of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedManifest {
    pub module: String,
    /// Minimum standard-library version, `MAJOR.MINOR`.
    pub go: String,
    /// External import path → resolved version.
    pub dependencies: BTreeMap<String, String>,
    /// Every output file relative to the output root, sorted. Does not list the manifest itself.
    pub files: Vec<String>,
    pub unstable: bool,
}

impl GeneratedManifest {
    pub fn new(module: &str, resolved: &ResolvedDependencies, files: impl IntoIterator<Item = String>) -> Self {
        let mut files: Vec<String> = files.into_iter().collect();
        files.sort();
        files.dedup();
        Self {
            module: module.to_string(),
            go: go_directive(resolved.go_version()),
            dependencies: resolved
                .external()
                .map(|dep| (dep.import_path().to_string(), module_version(dep.version())))
                .collect(),
            files,
            unstable: false,
        }
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> CodegenResult<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
