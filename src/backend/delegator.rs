//! Route generated code to per-file writers and flush them.
//!
//! The delegator owns one [`GoWriter`] per output file for the lifetime of a generation run. Successive checkouts of
//! the same file append to the same writer, separated by a blank line. Flushing consumes the delegator, so nothing
//! can be written to a file after it has been emitted.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use shapegen_core::lang::conventions;

use super::dependency::Dependency;
use super::errors::{CodegenError, CodegenResult};
use super::symbol::Symbol;
use super::writer::{GoWriter, WriterConfig};

/// Destination for rendered files.
pub trait FileSink {
    /// Store `contents` at `path`, relative to the output root.
    fn write_file(&mut self, path: &str, contents: &str) -> CodegenResult<()>;
}

/// Writes files under a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSink for DirectorySink {
    fn write_file(&mut self, path: &str, contents: &str) -> CodegenResult<()> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|source| CodegenError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&full, contents).map_err(|source| CodegenError::Io { path: full, source })
    }
}

/// Keeps files in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }
}

impl FileSink for MemorySink {
    fn write_file(&mut self, path: &str, contents: &str) -> CodegenResult<()> {
        self.files.insert(path.to_string(), contents.to_string());
        Ok(())
    }
}

/// File key → writer registry for one generation run.
#[derive(Debug)]
pub struct WriterDelegator {
    writers: BTreeMap<String, GoWriter>,
    package_names: BTreeMap<String, String>,
    config: WriterConfig,
}

impl WriterDelegator {
    pub fn new(config: WriterConfig) -> Self {
        Self {
            writers: BTreeMap::new(),
            package_names: BTreeMap::new(),
            config,
        }
    }

    /// Declare files in `namespace` as `package name` instead of the path's default alias.
    pub fn with_package_name(mut self, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        self.package_names.insert(namespace.into(), name.into());
        self
    }

    fn package_name(&self, namespace: &str) -> String {
        self.package_names
            .get(namespace)
            .cloned()
            .unwrap_or_else(|| conventions::default_package_alias(namespace))
    }

    /// Get the writer for `file_key`, creating it on first use.
    ///
    /// A writer that already holds content gets a blank line so the next chunk starts a new declaration.
    ///
    /// ## Errors
    /// - [`CodegenError::NamespaceMismatch`] if the file was first checked out for another package.
    pub fn checkout_writer(&mut self, file_key: &str, namespace: &str) -> CodegenResult<&mut GoWriter> {
        let package_name = self.package_name(namespace);
        let config = &self.config;
        let writer = self.writers.entry(file_key.to_string()).or_insert_with(|| {
            tracing::trace!(file = file_key, namespace, "writer created");
            GoWriter::new(file_key, namespace, package_name, config.clone())
        });
        if writer.namespace() != namespace {
            return Err(CodegenError::NamespaceMismatch {
                file_key: file_key.to_string(),
                existing: writer.namespace().to_string(),
                requested: namespace.to_string(),
            });
        }
        writer.ensure_blank_line();
        Ok(writer)
    }

    /// Run `f` against the writer for an explicit file.
    pub fn use_file_writer<T, F>(&mut self, file_key: &str, namespace: &str, f: F) -> CodegenResult<T>
    where
        F: FnOnce(&mut GoWriter) -> CodegenResult<T>,
    {
        let writer = self.checkout_writer(file_key, namespace)?;
        f(writer)
    }

    /// Run `f` against the writer for the file that declares `symbol`.
    ///
    /// ## Errors
    /// - [`CodegenError::NoDefinitionFile`] for symbols that are not generated (builtins, library types).
    pub fn use_shape_writer<T, F>(&mut self, symbol: &Symbol, f: F) -> CodegenResult<T>
    where
        F: FnOnce(&mut GoWriter) -> CodegenResult<T>,
    {
        let file_key = symbol
            .definition_file()
            .ok_or_else(|| CodegenError::NoDefinitionFile {
                symbol: symbol.to_string(),
            })?
            .to_string();
        self.use_file_writer(&file_key, symbol.namespace(), f)
    }

    /// File keys checked out so far, sorted.
    pub fn file_keys(&self) -> Vec<String> {
        self.writers.keys().cloned().collect()
    }

    /// Union of every writer's dependencies.
    pub fn collect_dependencies(&self) -> BTreeSet<Dependency> {
        self.writers
            .values()
            .flat_map(|writer| writer.dependencies().iter().cloned())
            .collect()
    }

    /// Render every writer into `sink`, in file-key order, and return the keys written.
    #[tracing::instrument(skip_all, fields(files = self.writers.len()))]
    pub fn flush_all(self, sink: &mut dyn FileSink) -> CodegenResult<Vec<String>> {
        let mut written = Vec::with_capacity(self.writers.len());
        for (file_key, writer) in self.writers {
            sink.write_file(&file_key, &writer.render())?;
            tracing::debug!(file = %file_key, "flushed");
            written.push(file_key);
        }
        Ok(written)
    }
}
