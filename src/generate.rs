//! The generator pipeline.
//!
//! A run has two hard phases. The model phase collects source files,
//! extracts every module (in parallel) and then resolves re-exports over the
//! complete registry. The output phase renders pages (in parallel) and writes
//! them, the table of contents and `SUMMARY.md` sequentially in module order.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use apibook_core::error::ApibookError;
use apibook_python::files::{collect_python_files, root_module};
use apibook_python::reexport::{resolve_reexports, ResolutionReport};
use apibook_python::registry::ModuleRegistry;

use crate::render::{output_file_name, render_module, render_summary, render_toc, RenderOptions};

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Root of the Python package to document.
    pub root: PathBuf,
    /// Directory receiving the markdown pages.
    pub output_dir: PathBuf,
    /// Template for `SUMMARY.md`; the built-in default when `None`.
    pub summary_template: Option<PathBuf>,
    /// Globs of source paths to skip.
    pub exclude: Vec<String>,
    /// Where to dump the resolved model as JSON, if anywhere.
    pub dump_model: Option<PathBuf>,
    pub render: RenderOptions,
}

impl GenerateOptions {
    pub fn new(root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        GenerateOptions {
            root: root.into(),
            output_dir: output_dir.into(),
            summary_template: None,
            exclude: Vec::new(),
            dump_model: None,
            render: RenderOptions::default(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Number of modules extracted.
    pub modules: usize,
    /// Pages written, in module order.
    pub pages: Vec<PathBuf>,
    /// Path of the written summary.
    pub summary: PathBuf,
    /// Re-exported symbols spliced into their exporting modules.
    pub spliced: usize,
    /// Exports whose defining module lacked the symbol.
    pub soft_misses: usize,
}

/// Build the resolved documentation model for a source root.
///
/// # Arguments
///
/// * `root` - Root of the Python package
/// * `exclude` - Globs of root-relative paths to skip
pub fn build_model(
    root: &Path,
    exclude: &[String],
) -> Result<(ModuleRegistry, ResolutionReport), ApibookError> {
    let files = collect_python_files(root, exclude)?;
    let root_name = root_module(root)?;
    info!("Found {} source files under {}", files.len(), root.display());

    let mut registry = ModuleRegistry::from_sources(&root_name, &files)?;
    let report = resolve_reexports(&mut registry)?;
    debug!(
        "Resolved re-exports: {} spliced, {} soft misses",
        report.spliced,
        report.soft_misses.len()
    );
    Ok((registry, report))
}

/// Run the whole pipeline: build the model, then write pages and summary.
///
/// The summary template is read before anything else so that a bad path
/// fails the run before any output is produced.
pub fn generate(options: &GenerateOptions) -> Result<GenerateReport, ApibookError> {
    let template = match &options.summary_template {
        Some(path) => Some(fs::read_to_string(path).map_err(|e| {
            ApibookError::config(format!(
                "failed to read summary template {}: {}",
                path.display(),
                e
            ))
        })?),
        None => None,
    };

    let (registry, resolution) = build_model(&options.root, &options.exclude)?;

    if let Some(path) = &options.dump_model {
        let json = serde_json::to_string_pretty(&registry)
            .map_err(|e| ApibookError::internal(format!("failed to serialize model: {}", e)))?;
        write_file(path, &json)?;
        info!("Wrote model to {}", path.display());
    }

    fs::create_dir_all(&options.output_dir)
        .map_err(|e| ApibookError::io(&options.output_dir, e))?;

    let modules = registry.into_modules();
    let pages: Vec<(String, String)> = modules
        .par_iter()
        .map(|module| {
            (
                output_file_name(&module.name),
                render_module(module, &options.render),
            )
        })
        .collect();

    let mut report = GenerateReport {
        modules: modules.len(),
        spliced: resolution.spliced,
        soft_misses: resolution.soft_misses.len(),
        ..Default::default()
    };

    for (file_name, content) in pages {
        let path = options.output_dir.join(file_name);
        write_file(&path, &content)?;
        debug!("Wrote {}", path.display());
        report.pages.push(path);
    }

    let toc = render_toc(modules.iter().map(|m| m.name.as_str()));
    let summary = render_summary(template.as_deref(), &toc);
    report.summary = options.output_dir.join("SUMMARY.md");
    write_file(&report.summary, &summary)?;

    info!(
        "Wrote {} pages and {}",
        report.pages.len(),
        report.summary.display()
    );
    Ok(report)
}

fn write_file(path: &Path, content: &str) -> Result<(), ApibookError> {
    fs::write(path, content).map_err(|e| ApibookError::io(path, e))
}
