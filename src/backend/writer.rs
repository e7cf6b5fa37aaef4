//! Per-file Go source buffer with indentation, format-state scoping, and import tracking.
//!
//! Every reference written through [`GoWriter::write_type`] registers the referenced package's import and merges its
//! dependencies into the file, so the import block and `go.mod` can never drift from what the body uses.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use shapegen_core::lang::conventions::{self, DOT_IMPORT_ALIAS};

use super::dependency::Dependency;
use super::errors::{CodegenError, CodegenResult};
use super::settings::DEFAULT_GENERATED_BY;
use super::symbol::{ContainerKind, PointerKind, Symbol};

/// Writer configuration
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Text emitted once per indentation level
    pub indent_unit: String,
    /// Prefix of documentation comment lines
    pub doc_prefix: String,
    /// Tool name in the generated-file marker
    pub generated_by: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent_unit: "\t".to_string(),
            doc_prefix: "// ".to_string(),
            generated_by: DEFAULT_GENERATED_BY.to_string(),
        }
    }
}

impl WriterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation unit
    pub fn with_indent_unit(mut self, unit: impl Into<String>) -> Self {
        self.indent_unit = unit.into();
        self
    }

    /// Set the tool name used in the file header
    pub fn with_generated_by(mut self, tool: impl Into<String>) -> Self {
        self.generated_by = tool.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FormatState {
    indent_level: usize,
    line_prefix: String,
}

/// Source buffer for one output file.
#[derive(Debug, Clone)]
pub struct GoWriter {
    file_key: String,
    namespace: String,
    package_name: String,
    config: WriterConfig,
    body: String,
    state: FormatState,
    saved: Vec<FormatState>,
    at_line_start: bool,
    /// alias → package path
    imports: BTreeMap<String, String>,
    dependencies: BTreeSet<Dependency>,
}

impl GoWriter {
    /// Create a writer for `file_key` in package `namespace`, declared as `package_name`.
    pub fn new(
        file_key: impl Into<String>,
        namespace: impl Into<String>,
        package_name: impl Into<String>,
        config: WriterConfig,
    ) -> Self {
        Self {
            file_key: file_key.into(),
            namespace: namespace.into(),
            package_name: package_name.into(),
            config,
            body: String::new(),
            state: FormatState::default(),
            saved: Vec::new(),
            at_line_start: true,
            imports: BTreeMap::new(),
            dependencies: BTreeSet::new(),
        }
    }

    pub fn file_key(&self) -> &str {
        &self.file_key
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Import table, alias → package path.
    pub fn imports(&self) -> &BTreeMap<String, String> {
        &self.imports
    }

    pub fn dependencies(&self) -> &BTreeSet<Dependency> {
        &self.dependencies
    }

    /// Body written so far, without header or imports.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    // ---- text ----

    /// Write text; embedded newlines start new (indented, prefixed) lines.
    pub fn write(&mut self, text: &str) -> &mut Self {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.newline();
            }
            if !line.is_empty() {
                self.write_line_start();
                self.body.push_str(line);
            }
        }
        self
    }

    pub fn writeln(&mut self, text: &str) -> &mut Self {
        self.write(text);
        self.newline()
    }

    /// End the current line. Trailing spaces are dropped; an empty prefixed line keeps the trimmed prefix.
    pub fn newline(&mut self) -> &mut Self {
        if self.at_line_start && !self.state.line_prefix.is_empty() {
            self.write_indent();
            let prefix = self.state.line_prefix.trim_end().to_string();
            self.body.push_str(&prefix);
        }
        let trimmed = self.body.trim_end_matches(' ').len();
        self.body.truncate(trimmed);
        self.body.push('\n');
        self.at_line_start = true;
        self
    }

    /// Make sure the next write is separated from previous content by exactly one blank line.
    pub fn ensure_blank_line(&mut self) -> &mut Self {
        if self.body.is_empty() {
            return self;
        }
        if !self.at_line_start {
            self.newline();
        }
        if !self.body.ends_with("\n\n") {
            self.body.push('\n');
        }
        self
    }

    fn write_indent(&mut self) {
        for _ in 0..self.state.indent_level {
            self.body.push_str(&self.config.indent_unit);
        }
    }

    fn write_line_start(&mut self) {
        if self.at_line_start {
            self.write_indent();
            let prefix = self.state.line_prefix.clone();
            self.body.push_str(&prefix);
            self.at_line_start = false;
        }
    }

    pub fn indent(&mut self) -> &mut Self {
        self.state.indent_level += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.state.indent_level = self.state.indent_level.saturating_sub(1);
        self
    }

    // ---- format state ----

    /// Save the current indentation and line prefix.
    pub fn push_state(&mut self) -> &mut Self {
        self.saved.push(self.state.clone());
        self
    }

    /// Restore the most recently saved state.
    ///
    /// ## Errors
    /// - [`CodegenError::UnbalancedFormatState`] if nothing was pushed.
    pub fn pop_state(&mut self) -> CodegenResult<&mut Self> {
        match self.saved.pop() {
            Some(state) => {
                self.state = state;
                Ok(self)
            }
            None => Err(CodegenError::UnbalancedFormatState {
                file_key: self.file_key.clone(),
            }),
        }
    }

    /// Run `f` in a scoped format state; the state is restored even if `f` fails.
    pub fn with_state<T, F>(&mut self, f: F) -> CodegenResult<T>
    where
        F: FnOnce(&mut Self) -> CodegenResult<T>,
    {
        self.push_state();
        let result = f(self);
        self.pop_state()?;
        result
    }

    /// Write `open`, run `f` one level deeper, then write `close`.
    pub fn block<F>(&mut self, open: &str, close: &str, f: F) -> CodegenResult<&mut Self>
    where
        F: FnOnce(&mut Self) -> CodegenResult<()>,
    {
        self.writeln(open);
        self.with_state(|w| {
            w.indent();
            f(w)
        })?;
        self.writeln(close);
        Ok(self)
    }

    /// Write documentation as `//` comment lines.
    pub fn write_docs(&mut self, docs: &str) -> CodegenResult<&mut Self> {
        self.with_state(|w| {
            w.state.line_prefix = w.config.doc_prefix.clone();
            for line in docs.trim_end().lines() {
                w.write(line.trim_end());
                w.newline();
            }
            Ok(())
        })?;
        Ok(self)
    }

    // ---- typed writes ----

    /// Write a reference to `symbol`, with `*` when the symbol is pointer-kind.
    pub fn write_type(&mut self, symbol: &Symbol) -> CodegenResult<&mut Self> {
        let reference = self.type_reference(symbol)?;
        Ok(self.write(&reference))
    }

    /// Write a pointer to `symbol` regardless of its pointer kind.
    pub fn write_pointer_type(&mut self, symbol: &Symbol) -> CodegenResult<&mut Self> {
        let value = symbol.clone().with_pointer_kind(PointerKind::Value);
        let reference = self.type_reference(&value)?;
        Ok(self.write(&format!("*{reference}")))
    }

    /// Write a value verbatim (numbers, pre-quoted literals).
    pub fn write_literal(&mut self, value: impl std::fmt::Display) -> &mut Self {
        self.write(&value.to_string())
    }

    /// Write a Go interpreted string literal.
    pub fn write_string(&mut self, value: &str) -> &mut Self {
        self.write(&quote(value))
    }

    /// Render `symbol` as this file refers to it, importing its package if it lives elsewhere.
    pub fn type_reference(&mut self, symbol: &Symbol) -> CodegenResult<String> {
        let base = match (symbol.container_kind(), symbol.element()) {
            (ContainerKind::Slice, Some(element)) => format!("[]{}", self.type_reference(element)?),
            (ContainerKind::Map, Some(element)) => format!("map[string]{}", self.type_reference(element)?),
            _ => self.qualified_name(symbol)?,
        };
        Ok(match symbol.pointer_kind() {
            PointerKind::Pointer => format!("*{base}"),
            PointerKind::Value => base,
        })
    }

    fn qualified_name(&mut self, symbol: &Symbol) -> CodegenResult<String> {
        if symbol.is_builtin() || symbol.namespace() == self.namespace {
            return Ok(symbol.name().to_string());
        }
        let alias = self.add_import(symbol.namespace(), symbol.requested_alias())?;
        for dependency in symbol.dependencies() {
            self.add_dependency(dependency.clone());
        }
        Ok(format!("{alias}.{}", symbol.name()))
    }

    // ---- imports ----

    /// Import `namespace`, returning the alias it is bound to.
    ///
    /// Without an explicit alias the package's default alias is used. Importing the writer's own package or the
    /// universe namespace records nothing.
    ///
    /// ## Errors
    /// - [`CodegenError::WildcardImportForbidden`] for a dot import.
    /// - [`CodegenError::AliasConflict`] if the alias is already bound to another package.
    pub fn add_import(&mut self, namespace: &str, alias: Option<&str>) -> CodegenResult<String> {
        let alias = alias
            .map(str::to_string)
            .unwrap_or_else(|| conventions::default_package_alias(namespace));
        if alias == DOT_IMPORT_ALIAS || alias == "*" {
            return Err(CodegenError::WildcardImportForbidden {
                file_key: self.file_key.clone(),
                namespace: namespace.to_string(),
            });
        }
        if namespace.is_empty() || namespace == self.namespace {
            return Ok(alias);
        }
        match self.imports.get(&alias) {
            Some(existing) if existing == namespace => Ok(alias),
            Some(existing) => Err(CodegenError::AliasConflict {
                file_key: self.file_key.clone(),
                alias,
                existing: existing.clone(),
                requested: namespace.to_string(),
            }),
            None => {
                tracing::trace!(file = %self.file_key, %alias, namespace, "import added");
                self.imports.insert(alias.clone(), namespace.to_string());
                Ok(alias)
            }
        }
    }

    pub fn add_dependency(&mut self, dependency: Dependency) -> &mut Self {
        self.dependencies.insert(dependency);
        self
    }

    // ---- output ----

    /// Render the complete file: generated marker, package clause, import block, body.
    pub fn render(&self) -> String {
        let mut out = format!(
            "// Code generated by {}. DO NOT EDIT.\n\npackage {}\n",
            self.config.generated_by, self.package_name
        );

        if !self.imports.is_empty() {
            let mut by_path: Vec<(&String, &String)> = self.imports.iter().map(|(a, p)| (p, a)).collect();
            by_path.sort();
            let (std, external): (Vec<_>, Vec<_>) = by_path.into_iter().partition(|(path, _)| is_std_path(path));

            out.push_str("\nimport (\n");
            for (i, group) in [std, external].iter().filter(|g| !g.is_empty()).enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                for (path, alias) in group {
                    if **alias == conventions::default_package_alias(path) {
                        let _ = writeln!(out, "\t\"{path}\"");
                    } else {
                        let _ = writeln!(out, "\t{alias} \"{path}\"");
                    }
                }
            }
            out.push_str(")\n");
        }

        let body = self.body.trim_matches('\n');
        if !body.is_empty() {
            out.push('\n');
            out.push_str(body);
            out.push('\n');
        }
        out
    }
}

/// Standard-library paths have no dot in their first element.
fn is_std_path(path: &str) -> bool {
    path.split('/').next().is_some_and(|first| !first.contains('.'))
}

/// Go interpreted string literal for `value`.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::dependency::packages;

    const NS: &str = "github.com/acme/weather/types";

    fn writer() -> GoWriter {
        GoWriter::new("types/types.go", NS, "types", WriterConfig::default())
    }

    // ========================================
    // Text and indentation
    // ========================================

    #[test]
    fn test_write_and_indent() {
        let mut w = writer();
        w.writeln("a").indent().writeln("b").dedent().writeln("c");
        assert_eq!(w.body(), "a\n\tb\nc\n");
    }

    #[test]
    fn test_multiline_write_indents_each_line() {
        let mut w = writer();
        w.indent().write("x\ny\n");
        assert_eq!(w.body(), "\tx\n\ty\n");
    }

    #[test]
    fn test_custom_indent_unit() {
        let config = WriterConfig::new().with_indent_unit("  ");
        let mut w = GoWriter::new("a.go", "example.com/a", "a", config);
        w.block("if x {", "}", |w| {
            w.writeln("y()");
            Ok(())
        })
        .unwrap();
        assert_eq!(w.body(), "if x {\n  y()\n}\n");
    }

    #[test]
    fn test_dedent_saturates() {
        let mut w = writer();
        w.dedent().writeln("x");
        assert_eq!(w.body(), "x\n");
    }

    #[test]
    fn test_blank_lines_are_not_indented() {
        let mut w = writer();
        w.indent().writeln("x").newline().writeln("y");
        assert_eq!(w.body(), "\tx\n\n\ty\n");
    }

    #[test]
    fn test_ensure_blank_line() {
        let mut w = writer();
        w.ensure_blank_line();
        assert_eq!(w.body(), "");
        w.write("a").ensure_blank_line().ensure_blank_line().writeln("b");
        assert_eq!(w.body(), "a\n\nb\n");
    }

    // ========================================
    // Format state
    // ========================================

    #[test]
    fn test_with_state_restores_on_error() {
        let mut w = writer();
        let result: CodegenResult<()> = w.with_state(|w| {
            w.indent().indent();
            Err(CodegenError::NoDefinitionFile { symbol: "x".into() })
        });
        assert!(result.is_err());
        w.writeln("top");
        assert_eq!(w.body(), "top\n");
    }

    #[test]
    fn test_pop_without_push() {
        let mut w = writer();
        assert!(matches!(w.pop_state(), Err(CodegenError::UnbalancedFormatState { .. })));
    }

    #[test]
    fn test_block() {
        let mut w = writer();
        w.block("type A struct {", "}", |w| {
            w.writeln("X int32");
            Ok(())
        })
        .unwrap();
        assert_eq!(w.body(), "type A struct {\n\tX int32\n}\n");
    }

    #[test]
    fn test_write_docs_prefix_scoped() {
        let mut w = writer();
        w.indent();
        w.write_docs("First line.\n\nSecond line.").unwrap();
        w.writeln("Field string");
        assert_eq!(w.body(), "\t// First line.\n\t//\n\t// Second line.\n\tField string\n");
    }

    // ========================================
    // Types and imports
    // ========================================

    #[test]
    fn test_same_namespace_reference_not_imported() {
        let mut w = writer();
        w.write_type(&Symbol::new("Forecast", NS)).unwrap();
        assert_eq!(w.body(), "Forecast");
        assert!(w.imports().is_empty());
    }

    #[test]
    fn test_foreign_reference_imports_and_merges_dependencies() {
        let mut w = writer();
        let time = Symbol::new("Time", "time")
            .with_pointer_kind(PointerKind::Pointer)
            .with_dependency(packages::time());
        w.write_type(&time).unwrap();
        assert_eq!(w.body(), "*time.Time");
        assert_eq!(w.imports().get("time").map(String::as_str), Some("time"));
        assert!(w.dependencies().contains(&packages::time()));
    }

    #[test]
    fn test_containers_render_elements() {
        let mut w = writer();
        let element = Symbol::builtin("string").with_pointer_kind(PointerKind::Pointer);
        w.write_type(&Symbol::slice(element.clone())).unwrap();
        w.write(" ");
        w.write_type(&Symbol::map(Symbol::new("Forecast", NS))).unwrap();
        assert_eq!(w.body(), "[]*string map[string]Forecast");
    }

    #[test]
    fn test_write_pointer_type() {
        let mut w = writer();
        w.write_pointer_type(&Symbol::new("Forecast", NS)).unwrap();
        assert_eq!(w.body(), "*Forecast");
    }

    #[test]
    fn test_alias_conflict() {
        let mut w = writer();
        w.add_import("github.com/a/types", None).unwrap();
        let err = w.add_import("github.com/b/types", None).unwrap_err();
        assert!(matches!(err, CodegenError::AliasConflict { ref alias, .. } if alias == "types"));
        assert_eq!(w.add_import("github.com/a/types", None).unwrap(), "types");
    }

    #[test]
    fn test_wildcard_import_rejected() {
        let mut w = writer();
        let err = w.add_import("fmt", Some(".")).unwrap_err();
        assert!(matches!(err, CodegenError::WildcardImportForbidden { .. }));
    }

    #[test]
    fn test_own_namespace_import_ignored() {
        let mut w = writer();
        w.add_import(NS, None).unwrap();
        assert!(w.imports().is_empty());
    }

    #[test]
    fn test_write_string_escapes() {
        let mut w = writer();
        w.write_string("a \"b\"\n\\");
        assert_eq!(w.body(), r#""a \"b\"\n\\""#);
    }

    // ========================================
    // Render
    // ========================================

    #[test]
    fn test_render_groups_imports() {
        let mut w = writer();
        w.add_import("time", None).unwrap();
        w.add_import(packages::SMITHY_GO_MODULE, Some("smithy")).unwrap();
        w.add_import("fmt", None).unwrap();
        w.add_import(packages::SMITHY_GO_MIDDLEWARE, None).unwrap();
        w.writeln("var _ = 1");
        let expected = "// Code generated by shapegen. DO NOT EDIT.\n\npackage types\n\nimport (\n\t\"fmt\"\n\t\"time\"\n\n\tsmithy \"github.com/aws/smithy-go\"\n\t\"github.com/aws/smithy-go/middleware\"\n)\n\nvar _ = 1\n";
        assert_eq!(w.render(), expected);
    }

    #[test]
    fn test_render_without_imports() {
        let mut w = GoWriter::new("doc.go", NS, "types", WriterConfig::new().with_generated_by("tool"));
        w.writeln("type A int32");
        assert_eq!(w.render(), "// Code generated by tool. DO NOT EDIT.\n\npackage types\n\ntype A int32\n");
    }
}
