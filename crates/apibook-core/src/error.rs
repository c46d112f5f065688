//! Error types and exit codes for apibook.
//!
//! This module provides a unified error type (`ApibookError`) that bridges
//! domain-specific errors from the different phases of a run (file collection,
//! extraction, re-export resolution, rendering) into one type the binary can
//! report and map to a process exit status.
//!
//! ## Exit Codes
//!
//! - `2`: Invalid arguments or configuration
//! - `3`: Syntax errors in an input file
//! - `4`: Extractor gaps (a syntax shape the extractor does not model)
//! - `5`: Resolution errors (dangling exports, duplicate modules)
//! - `6`: I/O errors (unreadable input, unwritable output)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Design
//!
//! - **Unified type**: `ApibookError` is the single error type for the CLI
//! - **Bridging**: `impl From<X> for ApibookError` lives next to each domain error
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Exit codes for fatal conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments or configuration from the caller.
    InvalidArguments = 2,
    /// An input file could not be parsed.
    SyntaxError = 3,
    /// The extractor met a syntax shape it does not model.
    ExtractorGap = 4,
    /// Cross-module resolution failed.
    ResolutionError = 5,
    /// Reading inputs or writing outputs failed.
    IoError = 6,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for a documentation run.
///
/// Every fatal condition of a run ends up as one of these variants. Each variant
/// carries enough context to print a human-readable diagnostic.
#[derive(Debug, Error)]
pub enum ApibookError {
    /// Invalid arguments from the caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Configuration file could not be read or parsed.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A source file is not valid Python.
    #[error("syntax error in {path}: {message}")]
    Syntax { path: String, message: String },

    /// A syntax shape the extractor does not model.
    #[error("unsupported syntax in {module}: {message}")]
    ExtractorGap { module: String, message: String },

    /// Two input files map to the same dotted module name.
    #[error("duplicate module name '{name}'")]
    DuplicateModule { name: String },

    /// An export names a module that is not part of the run.
    #[error(
        "could not find module {module} or {module}.__init__ (exported as '{export}' from {exporter}) - known modules:\n{}",
        format_known_modules(known_modules)
    )]
    UnresolvedModule {
        module: String,
        exporter: String,
        export: String,
        known_modules: Vec<String>,
    },

    /// I/O failure on a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// One quoted, tab-indented module name per line.
fn format_known_modules(modules: &[String]) -> String {
    modules
        .iter()
        .map(|name| format!("\t\"{}\"", name))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&ApibookError> for OutputErrorCode {
    fn from(err: &ApibookError) -> Self {
        match err {
            ApibookError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            ApibookError::Config { .. } => OutputErrorCode::InvalidArguments,
            ApibookError::Syntax { .. } => OutputErrorCode::SyntaxError,
            ApibookError::ExtractorGap { .. } => OutputErrorCode::ExtractorGap,
            ApibookError::DuplicateModule { .. } => OutputErrorCode::ResolutionError,
            ApibookError::UnresolvedModule { .. } => OutputErrorCode::ResolutionError,
            ApibookError::Io { .. } => OutputErrorCode::IoError,
            ApibookError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<ApibookError> for OutputErrorCode {
    fn from(err: ApibookError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl ApibookError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        ApibookError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ApibookError::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ApibookError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApibookError::Internal {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn syntax_maps_to_syntax_error() {
            let err = ApibookError::Syntax {
                path: "pkg/mod.py".to_string(),
                message: "invalid syntax".to_string(),
            };
            assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::SyntaxError);
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn config_maps_to_invalid_arguments() {
            let err = ApibookError::config("bad toml");
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn unresolved_module_maps_to_resolution_error() {
            let err = ApibookError::UnresolvedModule {
                module: "pkg.missing".to_string(),
                exporter: "pkg.__init__".to_string(),
                export: "Thing".to_string(),
                known_modules: vec![],
            };
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
            assert_eq!(err.error_code().code(), 5);
        }

        #[test]
        fn extractor_gap_maps_to_extractor_gap() {
            let err = ApibookError::ExtractorGap {
                module: "pkg".to_string(),
                message: "unknown return".to_string(),
            };
            assert_eq!(err.error_code().code(), 4);
        }

        #[test]
        fn io_maps_to_io_error() {
            let err = ApibookError::io(
                "out/SUMMARY.md",
                io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            );
            assert_eq!(err.error_code(), OutputErrorCode::IoError);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn unresolved_module_lists_known_modules() {
            let err = ApibookError::UnresolvedModule {
                module: "pkg.gone".to_string(),
                exporter: "pkg.__init__".to_string(),
                export: "Widget".to_string(),
                known_modules: vec!["pkg.__init__".to_string(), "pkg.widget".to_string()],
            };
            let text = err.to_string();
            assert!(text.starts_with("could not find module pkg.gone or pkg.gone.__init__"));
            assert!(text.contains("\t\"pkg.__init__\"\n\t\"pkg.widget\""));
        }

        #[test]
        fn invalid_arguments_display() {
            let err = ApibookError::invalid_args("root directory does not exist");
            assert_eq!(
                err.to_string(),
                "invalid arguments: root directory does not exist"
            );
        }
    }

    mod output_error_code {
        use super::*;

        #[test]
        fn code_values_are_stable() {
            assert_eq!(OutputErrorCode::InvalidArguments.code(), 2);
            assert_eq!(OutputErrorCode::SyntaxError.code(), 3);
            assert_eq!(OutputErrorCode::ExtractorGap.code(), 4);
            assert_eq!(OutputErrorCode::ResolutionError.code(), 5);
            assert_eq!(OutputErrorCode::IoError.code(), 6);
            assert_eq!(OutputErrorCode::InternalError.code(), 10);
        }

        #[test]
        fn display_shows_code() {
            assert_eq!(format!("{}", OutputErrorCode::ResolutionError), "5");
        }
    }
}
