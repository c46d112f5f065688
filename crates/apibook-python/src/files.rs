//! Python file collection and module naming.
//!
//! Walks a source root, yielding `(relative path, source)` pairs for `.py`
//! files, and maps relative paths to dotted module names.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use apibook_core::error::ApibookError;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["__pycache__", "node_modules", "venv", "target"];

// ============================================================================
// Error Types
// ============================================================================

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// The source root has no usable base name.
    #[error("cannot derive a package name from {path}")]
    UnnamedRoot { path: PathBuf },

    /// An exclusion pattern is not a valid glob.
    #[error("invalid exclude pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// IO error while walking or reading.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for file operations.
pub type FileResult<T> = Result<T, FileError>;

impl From<FileError> for ApibookError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::Io { path, source } => ApibookError::io(path, source),
            FileError::InvalidPattern { .. } => ApibookError::config(err.to_string()),
            FileError::UnnamedRoot { .. } => ApibookError::invalid_args(err.to_string()),
        }
    }
}

// ============================================================================
// Module Naming
// ============================================================================

/// The top-level package name for a source root: its base name.
///
/// Roots without a base name (`.`, `..`) are canonicalized first.
pub fn root_module(root: &Path) -> FileResult<String> {
    if let Some(name) = root.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }
    let canonical = fs::canonicalize(root).map_err(|source| FileError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| FileError::UnnamedRoot {
            path: root.to_path_buf(),
        })
}

/// Convert a root-relative file path to a dotted module name.
///
/// The root's package name is the first segment, the `.py` suffix is
/// stripped, and `.` components are dropped. A package's own file maps to
/// `pkg.__init__`.
///
/// # Arguments
///
/// * `root_name` - Result of [`root_module`]
/// * `relative_path` - File path relative to the root
pub fn path_to_module(root_name: &str, relative_path: &str) -> String {
    let path = Path::new(relative_path);
    let mut parts = vec![root_name.to_string()];
    for component in path.components() {
        if let Component::Normal(part) = component {
            let part = part.to_string_lossy();
            let part = part.strip_suffix(".py").unwrap_or(&part);
            parts.push(part.to_string());
        }
    }
    parts.join(".")
}

// ============================================================================
// File Collection
// ============================================================================

/// Compile exclusion globs, matched against root-relative paths.
pub fn build_exclusions(patterns: &[String]) -> FileResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| FileError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| FileError::InvalidPattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

/// Collect Python files by walking a directory.
///
/// Skips hidden components, `__pycache__`, `node_modules`, `venv` and
/// `target`, plus anything matching `exclude`. Returns
/// `(relative_path, content)` pairs sorted by path.
///
/// # Arguments
///
/// * `root` - The source root directory
/// * `exclude` - Exclusion globs, matched against root-relative paths
pub fn collect_python_files(root: &Path, exclude: &[String]) -> FileResult<Vec<(String, String)>> {
    let exclusions = build_exclusions(exclude)?;
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry.file_name()));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            FileError::Io {
                path,
                source: e.into(),
            }
        })?;
        let path = entry.path();

        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "py") {
            continue;
        }
        let Ok(rel_path) = path.strip_prefix(root) else {
            continue;
        };
        if exclusions.is_match(rel_path) {
            debug!("excluded {}", rel_path.display());
            continue;
        }

        let content = fs::read_to_string(path).map_err(|source| FileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        files.push((rel_path.to_string_lossy().into_owned(), content));
    }

    files.sort_by(|(path_a, _), (path_b, _)| path_a.cmp(path_b));

    Ok(files)
}

fn is_skipped(name: &std::ffi::OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

// ============================================================================
// Tests
// ============================================================================
