//! Resolved target-language names.
//!
//! A [`Symbol`] is what the generator writes when it refers to a shape: a name, the package it lives in, whether the
//! reference goes through a pointer, and the packages that must be imported for the reference to compile.

use std::fmt;
use std::hash::{Hash, Hasher};

use shapegen_model::ShapeId;

use super::dependency::Dependency;

/// Whether references to a symbol are written by value or through a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerKind {
    #[default]
    Value,
    Pointer,
}

/// Container shape of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContainerKind {
    #[default]
    Scalar,
    /// `[]Element`
    Slice,
    /// `map[string]Element`
    Map,
}

/// A resolved name in the generated code.
///
/// Equality and hashing consider only the namespace and name: the same type referenced with different pointability
/// is still the same symbol.
#[derive(Debug, Clone)]
pub struct Symbol {
    name: String,
    namespace: String,
    pointer_kind: PointerKind,
    container_kind: ContainerKind,
    element: Option<Box<Symbol>>,
    dependencies: Vec<Dependency>,
    definition_file: Option<String>,
    origin: Option<ShapeId>,
}

impl Symbol {
    /// A named type declared in package `namespace`.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            pointer_kind: PointerKind::Value,
            container_kind: ContainerKind::Scalar,
            element: None,
            dependencies: Vec::new(),
            definition_file: None,
            origin: None,
        }
    }

    /// A predeclared type (`string`, `int32`, ...). Builtins live in the empty namespace and never need an import.
    pub fn builtin(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    /// `[]element`
    pub fn slice(element: Symbol) -> Self {
        Self::container(ContainerKind::Slice, element)
    }

    /// `map[string]element`
    pub fn map(element: Symbol) -> Self {
        Self::container(ContainerKind::Map, element)
    }

    fn container(kind: ContainerKind, element: Symbol) -> Self {
        let name = match kind {
            ContainerKind::Slice => format!("[]{}", element.name),
            ContainerKind::Map => format!("map[string]{}", element.name),
            ContainerKind::Scalar => element.name.clone(),
        };
        Self {
            container_kind: kind,
            element: Some(Box::new(element)),
            ..Self::new(name, "")
        }
    }

    pub fn with_pointer_kind(mut self, kind: PointerKind) -> Self {
        self.pointer_kind = kind;
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_definition_file(mut self, file: impl Into<String>) -> Self {
        self.definition_file = Some(file.into());
        self
    }

    pub fn with_origin(mut self, shape: ShapeId) -> Self {
        self.origin = Some(shape);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn pointer_kind(&self) -> PointerKind {
        self.pointer_kind
    }

    pub fn is_pointer(&self) -> bool {
        self.pointer_kind == PointerKind::Pointer
    }

    pub fn container_kind(&self) -> ContainerKind {
        self.container_kind
    }

    pub fn element(&self) -> Option<&Symbol> {
        self.element.as_deref()
    }

    /// Packages this symbol itself needs (not its element's).
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// File (relative to the output root) that declares this symbol, if it is generated.
    pub fn definition_file(&self) -> Option<&str> {
        self.definition_file.as_deref()
    }

    /// Shape this symbol was resolved from.
    pub fn origin(&self) -> Option<&ShapeId> {
        self.origin.as_ref()
    }

    pub fn is_builtin(&self) -> bool {
        self.namespace.is_empty()
    }

    /// Alias requested by this symbol's own package dependency, if any.
    pub fn requested_alias(&self) -> Option<&str> {
        self.dependencies
            .iter()
            .find(|dep| dep.import_path() == self.namespace)
            .and_then(Dependency::alias)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::dependency::packages;
    use std::collections::HashSet;

    #[test]
    fn test_identity_ignores_pointer_kind() {
        let a = Symbol::new("Forecast", "example.com/weather/types");
        let b = a.clone().with_pointer_kind(PointerKind::Pointer);
        assert_eq!(a, b);
        let set: HashSet<Symbol> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_containers() {
        let slice = Symbol::slice(Symbol::builtin("byte"));
        assert_eq!(slice.container_kind(), ContainerKind::Slice);
        assert_eq!(slice.element().map(Symbol::name), Some("byte"));
        assert!(slice.is_builtin());
        assert_eq!(Symbol::map(Symbol::builtin("int32")).name(), "map[string]int32");
    }

    #[test]
    fn test_requested_alias() {
        let sym = Symbol::new("ErrorFault", packages::SMITHY_GO_MODULE).with_dependency(packages::smithy_go());
        assert_eq!(sym.requested_alias(), Some("smithy"));
        assert_eq!(Symbol::new("Time", "time").requested_alias(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Symbol::new("Time", "time").to_string(), "time.Time");
        assert_eq!(Symbol::builtin("string").to_string(), "string");
    }
}
