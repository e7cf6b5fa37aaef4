//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use shapegen_core::SemanticVersion;
use shapegen_model::{Model, ShapeId};

use crate::backend::{Codegen, CodegenError, CodegenSettings, DirectorySink};

use super::{CliError, CliResult, ExitCode};

/// Arguments of the `generate` command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub model: PathBuf,
    pub module: Option<String>,
    pub service: Option<String>,
    pub out: PathBuf,
    pub settings: Option<PathBuf>,
    pub go_version: Option<String>,
    pub package_name: Option<String>,
}

// ============================================================================
// generate
// ============================================================================

/// Generate a Go module into `options.out`.
pub fn generate(options: &GenerateOptions) -> CliResult<ExitCode> {
    let settings = settings_from_options(options)?;
    validate_output_dir(&options.out)?;

    let model = Model::from_json_file(&options.model).map_err(CliError::diagnostic)?;
    let mut sink = DirectorySink::new(&options.out);
    let output = Codegen::new(settings)
        .generate(&model, &mut sink)
        .map_err(CliError::diagnostic)?;

    println!(
        "Generated {} files for {} (go {}) into {}",
        output.files.len(),
        output.manifest.module,
        output.manifest.go,
        options.out.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Build settings from an optional settings file, then apply flag overrides.
pub fn settings_from_options(options: &GenerateOptions) -> CliResult<CodegenSettings> {
    let mut settings = match &options.settings {
        Some(path) => CodegenSettings::from_json_file(path).map_err(CliError::diagnostic)?,
        None => {
            let module = options
                .module
                .clone()
                .ok_or_else(|| CliError::failure("Error: --module is required when no --settings file is given"))?;
            let service = options
                .service
                .as_deref()
                .ok_or_else(|| CliError::failure("Error: --service is required when no --settings file is given"))?;
            CodegenSettings::new(module, parse_service(service)?)
        }
    };

    if let Some(module) = &options.module {
        settings.module = module.clone();
    }
    if let Some(service) = &options.service {
        settings.service = parse_service(service)?;
    }
    if let Some(version) = &options.go_version {
        settings.go_version = SemanticVersion::parse(version)
            .map_err(|e| CliError::diagnostic(CodegenError::from(e)))?;
    }
    if let Some(name) = &options.package_name {
        settings.package_name = Some(name.clone());
    }
    Ok(settings)
}

fn parse_service(text: &str) -> CliResult<ShapeId> {
    ShapeId::parse(text).map_err(CliError::diagnostic)
}

/// Reject output paths that climb out of the working tree.
fn validate_output_dir(out_dir: &Path) -> CliResult<()> {
    if out_dir.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(CliError::failure(format!(
            "Output directory '{}' contains path traversal (..)",
            out_dir.display()
        )));
    }
    Ok(())
}

// ============================================================================
// check
// ============================================================================

/// Load and validate a model, then print shape counts by type.
pub fn check(model_path: &Path) -> CliResult<ExitCode> {
    let model = Model::from_json_file(model_path).map_err(CliError::diagnostic)?;
    model.validate().map_err(CliError::diagnostic)?;

    let counts = shape_counts(&model);
    println!("{}: {} shapes", model_path.display(), counts.values().sum::<usize>());
    for (kind, count) in counts {
        println!("  {kind:<12} {count}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Number of non-prelude shapes per type name.
pub fn shape_counts(model: &Model) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for shape in model.shapes().filter(|s| !Model::is_prelude(&s.id)) {
        *counts.entry(shape.kind.type_name()).or_insert(0) += 1;
    }
    counts
}

// ============================================================================
// resolve
// ============================================================================

/// Parse versions and print them in ascending precedence order.
pub fn resolve(versions: &[String]) -> CliResult<ExitCode> {
    for version in sorted_versions(versions)? {
        println!("{version}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Parse and sort; fails on the first invalid version.
pub fn sorted_versions(versions: &[String]) -> CliResult<Vec<SemanticVersion>> {
    let mut parsed = versions
        .iter()
        .map(|v| SemanticVersion::parse(v).map_err(|e| CliError::diagnostic(CodegenError::from(e))))
        .collect::<CliResult<Vec<_>>>()?;
    parsed.sort_by(SemanticVersion::compare);
    Ok(parsed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn options() -> GenerateOptions {
        GenerateOptions {
            model: PathBuf::from("model.json"),
            module: Some("github.com/acme/weather".into()),
            service: Some("example.weather#Weather".into()),
            out: PathBuf::from("out"),
            ..GenerateOptions::default()
        }
    }

    #[test]
    fn test_settings_from_flags() {
        let settings = settings_from_options(&options()).unwrap();
        assert_eq!(settings.module, "github.com/acme/weather");
        assert_eq!(settings.service.name(), "Weather");
        assert_eq!(settings.go_version.to_string(), "1.15.0");
    }

    #[test]
    fn test_settings_overrides() {
        let opts = GenerateOptions {
            go_version: Some("1.18.0".into()),
            package_name: Some("wx".into()),
            ..options()
        };
        let settings = settings_from_options(&opts).unwrap();
        assert_eq!(settings.go_version.minor(), 18);
        assert_eq!(settings.root_package_name(), "wx");
    }

    #[test]
    fn test_settings_require_module_without_file() {
        let opts = GenerateOptions {
            module: None,
            ..options()
        };
        let err = settings_from_options(&opts).unwrap_err();
        assert!(err.message.contains("--module"));
    }

    #[test]
    fn test_settings_reject_bad_version() {
        let opts = GenerateOptions {
            go_version: Some("1.18".into()),
            ..options()
        };
        assert!(settings_from_options(&opts).is_err());
    }

    #[test]
    fn test_validate_output_dir() {
        assert!(validate_output_dir(Path::new("out/weather")).is_ok());
        assert!(validate_output_dir(Path::new("../escape")).is_err());
    }

    #[test]
    fn test_sorted_versions() {
        let input = vec!["v1.10.0".to_string(), "1.2.0".to_string(), "1.2.0-rc.1".to_string()];
        let sorted: Vec<String> = sorted_versions(&input).unwrap().iter().map(|v| v.to_string()).collect();
        assert_eq!(sorted, vec!["1.2.0-rc.1", "1.2.0", "v1.10.0"]);
    }

    #[test]
    fn test_sorted_versions_reports_invalid() {
        let err = sorted_versions(&["nope".to_string()]).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }

    #[test]
    fn test_shape_counts_skip_prelude() {
        let model = Model::from_json_str(r#"{"shapes": {"a#B": {"type": "string"}}}"#).unwrap();
        let counts = shape_counts(&model);
        assert_eq!(counts.get("string"), Some(&1));
        assert_eq!(counts.len(), 1);
    }
}
