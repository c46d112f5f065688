//! Python language support for apibook.
//!
//! This crate turns a tree of Python sources into a resolved documentation
//! model. It includes:
//! - The symbol model (modules, classes, functions, imports)
//! - Symbol extraction over the Python syntax tree
//! - File collection and module naming
//! - The module registry
//! - Re-export resolution for `__all__` lists

pub mod extract;
pub mod files;
pub mod reexport;
pub mod registry;
pub mod symbols;

pub use extract::{extract_module, ExtractError};
pub use files::{collect_python_files, path_to_module, root_module, FileError};
pub use reexport::{resolve_reexports, ResolutionReport, ResolveError, SoftMiss};
pub use registry::ModuleRegistry;
pub use symbols::{Module, Symbol};
