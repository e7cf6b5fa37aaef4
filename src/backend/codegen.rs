//! Generation director: transform, reserve, walk, flush.

use shapegen_model::transform::synthesize_operation_io;
use shapegen_model::{Model, Shape, ShapeId, ShapeKind};

use super::delegator::{FileSink, WriterDelegator};
use super::errors::CodegenResult;
use super::manifest::{GO_MOD_FILE, GeneratedManifest, MANIFEST_FILE, ResolvedDependencies, render_go_mod};
use super::reserved::reservation_pass;
use super::resolver::{DOCUMENT_FILE, SymbolResolver, TYPES_FILE};
use super::settings::CodegenSettings;
use super::shapes::ShapeGenerator;
use super::writer::{GoWriter, WriterConfig};

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutput {
    pub manifest: GeneratedManifest,
    /// Files written, sorted; includes `go.mod` but not the manifest.
    pub files: Vec<String>,
}

/// Generates a Go client module for one service.
#[derive(Debug, Clone)]
pub struct Codegen {
    settings: CodegenSettings,
}

impl Codegen {
    pub fn new(settings: CodegenSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CodegenSettings {
        &self.settings
    }

    /// Generate every file for the configured service into `sink`.
    ///
    /// Dependencies are resolved before anything is flushed, so a version conflict leaves the sink untouched.
    ///
    /// ## Errors
    /// - Model errors (dangling references, invalid shapes).
    /// - [`super::errors::CodegenError::ConflictingMajorVersion`] and writer errors (alias conflicts, ...).
    /// - Sink IO errors.
    #[tracing::instrument(skip_all, fields(service = %self.settings.service, module = %self.settings.module))]
    pub fn generate(&self, model: &Model, sink: &mut dyn FileSink) -> CodegenResult<GenerationOutput> {
        model.validate()?;
        let model = synthesize_operation_io(model, &self.settings.service)?;
        if model.operations(&self.settings.service)?.is_empty() {
            tracing::warn!("service has no operations; generating an empty client");
        }

        let closure = model.service_closure(&self.settings.service)?;
        let generated: Vec<ShapeId> = closure.iter().filter(|id| !Model::is_prelude(id)).cloned().collect();
        let escaper = reservation_pass(&model, &generated)?;
        let resolver = SymbolResolver::new(&model, &self.settings, &escaper);

        let config = WriterConfig::new().with_generated_by(self.settings.generated_by.as_str());
        let delegator = WriterDelegator::new(config)
            .with_package_name(resolver.namespaces().root.clone(), self.settings.root_package_name());
        let mut run = GenerationRun::new(&model, &resolver, delegator);
        for id in &closure {
            run.visit(model.expect_shape(id)?)?;
        }
        run.finish(&self.settings, sink)
    }
}

/// Writers and bookkeeping for one invocation; consumed by [`GenerationRun::finish`].
#[derive(Debug)]
pub struct GenerationRun<'a> {
    model: &'a Model,
    resolver: &'a SymbolResolver<'a>,
    delegator: WriterDelegator,
    unions: Vec<&'a Shape>,
    document_written: bool,
}

impl<'a> GenerationRun<'a> {
    pub fn new(model: &'a Model, resolver: &'a SymbolResolver<'a>, delegator: WriterDelegator) -> Self {
        Self {
            model,
            resolver,
            delegator,
            unions: Vec::new(),
            document_written: false,
        }
    }

    /// Generate the declaration for one shape, routed to its definition file.
    pub fn visit(&mut self, shape: &'a Shape) -> CodegenResult<()> {
        let generator = ShapeGenerator::new(self.model, self.resolver);
        if matches!(shape.kind, ShapeKind::Document) {
            return self.document(generator);
        }
        if Model::is_prelude(&shape.id) {
            return Ok(());
        }

        let symbol = self.resolver.resolve_shape(&shape.id)?;
        match &shape.kind {
            ShapeKind::Structure { .. } => self.delegator.use_shape_writer(&symbol, |w| generator.structure(w, shape)),
            ShapeKind::Union { .. } => {
                self.unions.push(shape);
                self.delegator.use_shape_writer(&symbol, |w| generator.union(w, shape))
            }
            ShapeKind::Enum { .. } | ShapeKind::IntEnum { .. } => {
                self.delegator.use_shape_writer(&symbol, |w| generator.enumeration(w, shape))
            }
            ShapeKind::Operation { .. } => self.delegator.use_shape_writer(&symbol, |w| generator.operation(w, shape)),
            ShapeKind::Service { .. } => self.delegator.use_shape_writer(&symbol, |w| generator.service(w, shape)),
            _ => Ok(()),
        }
    }

    fn document(&mut self, generator: ShapeGenerator<'_>) -> CodegenResult<()> {
        if self.document_written {
            return Ok(());
        }
        self.document_written = true;
        let namespace = self.resolver.namespaces().document.clone();
        self.delegator
            .use_file_writer(DOCUMENT_FILE, &namespace, |w| generator.document(w))
    }

    /// Write trailing shared declarations, resolve dependencies, and flush every file plus `go.mod` and the manifest.
    #[tracing::instrument(skip_all)]
    pub fn finish(mut self, settings: &CodegenSettings, sink: &mut dyn FileSink) -> CodegenResult<GenerationOutput> {
        if !self.unions.is_empty() {
            let generator = ShapeGenerator::new(self.model, self.resolver);
            let namespace = self.resolver.namespaces().types.clone();
            let unions = std::mem::take(&mut self.unions);
            self.delegator.use_file_writer(TYPES_FILE, &namespace, |w: &mut GoWriter| {
                generator.unknown_union_member(w, &unions)
            })?;
        }

        let dependencies = self.delegator.collect_dependencies();
        let resolved = ResolvedDependencies::resolve(&dependencies, &settings.go_version)?;
        let go_mod = render_go_mod(&settings.module, &resolved)?;

        let mut files = self.delegator.flush_all(sink)?;
        sink.write_file(GO_MOD_FILE, &go_mod)?;
        files.push(GO_MOD_FILE.to_string());

        let manifest = GeneratedManifest::new(&settings.module, &resolved, files);
        sink.write_file(MANIFEST_FILE, &manifest.to_json()?)?;
        tracing::info!(files = manifest.files.len(), go = %manifest.go, "generation complete");

        Ok(GenerationOutput {
            files: manifest.files.clone(),
            manifest,
        })
    }
}
