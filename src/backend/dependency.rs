//! Dependency descriptors, Minimal Version Selection, and transitive closure.
//!
//! A [`Dependency`] names one imported package: its import path, the module (source path) that provides it, the
//! minimum version required, and what it in turn requires. Two requirements on the same import path are merged by
//! keeping the higher floor; requirements whose non-zero major versions differ are incompatible.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use shapegen_core::SemanticVersion;

use super::errors::{CodegenError, CodegenResult};

/// Where a package comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependencyKind {
    /// Ships with the Go toolchain; its version is a floor on the `go` directive.
    StandardLibrary,
    /// Required through `go.mod`.
    External,
}

impl DependencyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DependencyKind::StandardLibrary => "stdlib",
            DependencyKind::External => "external",
        }
    }
}

/// One required package.
///
/// Identity is the import path plus the version floor; two descriptors for the same path are reconciled with
/// [`merge`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dependency {
    import_path: String,
    source_path: String,
    kind: DependencyKind,
    alias: Option<String>,
    version: SemanticVersion,
    requires: BTreeSet<Dependency>,
}

impl Dependency {
    /// A standard-library package (`time`, `math/big`, ...). The version is the minimum toolchain release.
    pub fn standard_library(import_path: impl Into<String>, version: SemanticVersion) -> Self {
        let import_path = import_path.into();
        Self {
            source_path: import_path.clone(),
            import_path,
            kind: DependencyKind::StandardLibrary,
            alias: None,
            version,
            requires: BTreeSet::new(),
        }
    }

    /// A package provided by the module at `source_path`.
    pub fn external(
        source_path: impl Into<String>,
        import_path: impl Into<String>,
        version: SemanticVersion,
    ) -> Self {
        Self {
            import_path: import_path.into(),
            source_path: source_path.into(),
            kind: DependencyKind::External,
            alias: None,
            version,
            requires: BTreeSet::new(),
        }
    }

    /// Import this package under an explicit alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Add a transitive requirement.
    pub fn requiring(mut self, dependency: Dependency) -> Self {
        self.requires.insert(dependency);
        self
    }

    pub fn import_path(&self) -> &str {
        &self.import_path
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn version(&self) -> &SemanticVersion {
        &self.version
    }

    pub fn requires(&self) -> &BTreeSet<Dependency> {
        &self.requires
    }

    pub fn is_standard_library(&self) -> bool {
        self.kind == DependencyKind::StandardLibrary
    }
}

/// Pick the higher of two version floors for `import_path`.
///
/// ## Errors
/// - [`CodegenError::ConflictingMajorVersion`] if both majors are non-zero and differ. A `0.x` floor never
///   conflicts.
pub fn select_version<'a>(
    import_path: &str,
    left: &'a SemanticVersion,
    right: &'a SemanticVersion,
) -> CodegenResult<&'a SemanticVersion> {
    if right_wins(import_path, left, right)? {
        Ok(right)
    } else {
        Ok(left)
    }
}

fn right_wins(import_path: &str, left: &SemanticVersion, right: &SemanticVersion) -> CodegenResult<bool> {
    if left.major() != right.major() && left.major() != 0 && right.major() != 0 {
        return Err(CodegenError::ConflictingMajorVersion {
            import_path: import_path.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        });
    }
    Ok(left.compare(right) == Ordering::Less)
}

/// Merge two requirements on the same package, keeping the one with the higher version floor.
///
/// When the versions are equal the left descriptor wins.
///
/// ## Errors
/// - [`CodegenError::MismatchedImportPath`] if the import paths differ.
/// - [`CodegenError::ConflictingMajorVersion`] per [`select_version`].
pub fn merge(left: &Dependency, right: &Dependency) -> CodegenResult<Dependency> {
    if left.import_path != right.import_path {
        return Err(CodegenError::MismatchedImportPath {
            left: left.import_path.clone(),
            right: right.import_path.clone(),
        });
    }
    if right_wins(&left.import_path, &left.version, &right.version)? {
        Ok(right.clone())
    } else {
        Ok(left.clone())
    }
}

/// Expand `roots` into every package they transitively require, one merged entry per import path.
///
/// Breadth-first; a package's requirements are expanded once per distinct (import path, version) pair, so cycles
/// terminate and a raised floor re-expands with the new version's requirements.
///
/// ## Errors
/// - Any merge failure, in particular [`CodegenError::ConflictingMajorVersion`].
#[tracing::instrument(skip_all)]
pub fn resolve_transitive_closure<'a>(
    roots: impl IntoIterator<Item = &'a Dependency>,
) -> CodegenResult<BTreeMap<String, Dependency>> {
    let mut resolved: BTreeMap<String, Dependency> = BTreeMap::new();
    let mut expanded: BTreeSet<(String, SemanticVersion)> = BTreeSet::new();
    let mut queue: VecDeque<Dependency> = roots.into_iter().cloned().collect();

    while let Some(next) = queue.pop_front() {
        let merged = match resolved.get(&next.import_path) {
            Some(existing) => merge(existing, &next)?,
            None => next,
        };
        if expanded.insert((merged.import_path.clone(), merged.version.clone())) {
            queue.extend(merged.requires.iter().cloned());
        }
        resolved.insert(merged.import_path.clone(), merged);
    }

    tracing::debug!(packages = resolved.len(), "resolved dependency closure");
    Ok(resolved)
}

/// Packages the generated code imports.
pub mod packages {
    use super::Dependency;
    use shapegen_core::SemanticVersion;

    /// Module providing the runtime support library for generated clients.
    pub const SMITHY_GO_MODULE: &str = "github.com/aws/smithy-go";
    pub const SMITHY_GO_DOCUMENT: &str = "github.com/aws/smithy-go/document";
    pub const SMITHY_GO_MIDDLEWARE: &str = "github.com/aws/smithy-go/middleware";

    const GO_1_15: SemanticVersion = SemanticVersion::new(1, 15, 0);

    fn smithy_go_version() -> SemanticVersion {
        SemanticVersion::new(1, 4, 0).with_prefix("v")
    }

    pub fn time() -> Dependency {
        Dependency::standard_library("time", GO_1_15)
    }

    pub fn math_big() -> Dependency {
        Dependency::standard_library("math/big", GO_1_15)
    }

    pub fn fmt() -> Dependency {
        Dependency::standard_library("fmt", GO_1_15)
    }

    pub fn context() -> Dependency {
        Dependency::standard_library("context", GO_1_15)
    }

    /// `github.com/aws/smithy-go`, imported as `smithy`.
    pub fn smithy_go() -> Dependency {
        Dependency::external(SMITHY_GO_MODULE, SMITHY_GO_MODULE, smithy_go_version()).with_alias("smithy")
    }

    /// `github.com/aws/smithy-go/document`, imported as `smithydocument`.
    pub fn smithy_document() -> Dependency {
        Dependency::external(SMITHY_GO_MODULE, SMITHY_GO_DOCUMENT, smithy_go_version())
            .with_alias("smithydocument")
            .requiring(smithy_go())
    }

    pub fn smithy_middleware() -> Dependency {
        Dependency::external(SMITHY_GO_MODULE, SMITHY_GO_MIDDLEWARE, smithy_go_version())
            .requiring(smithy_go())
            .requiring(context())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn v(text: &str) -> SemanticVersion {
        SemanticVersion::parse(text).unwrap()
    }

    fn ext(path: &str, version: &str) -> Dependency {
        Dependency::external(path, path, v(version))
    }

    // ========================================
    // Merge
    // ========================================

    #[test]
    fn test_merge_picks_higher_floor() {
        let merged = merge(&ext("a", "v1.2.0"), &ext("a", "v1.4.1")).unwrap();
        assert_eq!(merged.version(), &v("v1.4.1"));
        let merged = merge(&ext("a", "v1.4.1"), &ext("a", "v1.2.0")).unwrap();
        assert_eq!(merged.version(), &v("v1.4.1"));
    }

    #[test]
    fn test_merge_equal_versions_keeps_left() {
        let left = ext("a", "v1.0.0").with_alias("x");
        let right = ext("a", "v1.0.0");
        assert_eq!(merge(&left, &right).unwrap().alias(), Some("x"));
    }

    #[test]
    fn test_merge_conflicting_major() {
        let err = merge(&ext("a", "v1.0.0"), &ext("a", "v2.0.0")).unwrap_err();
        assert!(matches!(err, CodegenError::ConflictingMajorVersion { ref import_path, .. } if import_path == "a"));
    }

    #[test]
    fn test_merge_zero_major_never_conflicts() {
        let merged = merge(&ext("a", "v0.9.0"), &ext("a", "v1.0.0")).unwrap();
        assert_eq!(merged.version(), &v("v1.0.0"));
        let merged = merge(&ext("a", "v0.3.0"), &ext("a", "v0.4.0")).unwrap();
        assert_eq!(merged.version(), &v("v0.4.0"));
    }

    #[test]
    fn test_merge_mismatched_paths() {
        let err = merge(&ext("a", "v1.0.0"), &ext("b", "v1.0.0")).unwrap_err();
        assert!(matches!(err, CodegenError::MismatchedImportPath { .. }));
    }

    #[test]
    fn test_merge_prerelease_below_release() {
        let merged = merge(&ext("a", "v1.0.0-rc.1"), &ext("a", "v1.0.0")).unwrap();
        assert_eq!(merged.version(), &v("v1.0.0"));
    }

    // ========================================
    // Transitive closure
    // ========================================

    #[test]
    fn test_closure_includes_transitive() {
        let c = ext("c", "v1.0.0");
        let b = ext("b", "v1.0.0").requiring(c);
        let a = ext("a", "v1.0.0").requiring(b);
        let closure = resolve_transitive_closure([&a]).unwrap();
        assert_eq!(closure.keys().cloned().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_closure_merges_diamond() {
        let b = ext("shared", "v1.1.0");
        let c = ext("shared", "v1.3.0");
        let left = ext("left", "v1.0.0").requiring(b);
        let right = ext("right", "v1.0.0").requiring(c);
        let closure = resolve_transitive_closure([&left, &right]).unwrap();
        assert_eq!(closure["shared"].version(), &v("v1.3.0"));
    }

    #[test]
    fn test_closure_terminates_on_cycle() {
        let inner = ext("a", "v1.0.0");
        let b = ext("b", "v1.0.0").requiring(inner);
        let a = ext("a", "v1.0.0").requiring(b);
        let closure = resolve_transitive_closure([&a]).unwrap();
        assert_eq!(closure.len(), 2);
    }

    #[test]
    fn test_closure_reexpands_raised_floor() {
        let newer = ext("lib", "v1.2.0").requiring(ext("extra", "v1.0.0"));
        let older = ext("lib", "v1.0.0");
        let app = ext("app", "v1.0.0").requiring(older).requiring(ext("tool", "v1.0.0").requiring(newer));
        let closure = resolve_transitive_closure([&app]).unwrap();
        assert_eq!(closure["lib"].version(), &v("v1.2.0"));
        assert!(closure.contains_key("extra"));
    }

    #[test]
    fn test_closure_propagates_conflict() {
        let a = ext("a", "v1.0.0").requiring(ext("shared", "v1.0.0"));
        let b = ext("b", "v1.0.0").requiring(ext("shared", "v2.0.0"));
        let err = resolve_transitive_closure([&a, &b]).unwrap_err();
        assert!(matches!(err, CodegenError::ConflictingMajorVersion { .. }));
    }

    #[test]
    fn test_well_known_packages() {
        assert!(packages::time().is_standard_library());
        assert_eq!(packages::smithy_go().alias(), Some("smithy"));
        assert_eq!(packages::smithy_document().source_path(), packages::SMITHY_GO_MODULE);
        let closure = resolve_transitive_closure([&packages::smithy_middleware()]).unwrap();
        assert!(closure.contains_key(packages::SMITHY_GO_MODULE));
        assert!(closure.contains_key("context"));
    }
}
