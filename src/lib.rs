//! apibook: markdown API reference for Python packages
//!
//! Builds a cross-referenced documentation model from a tree of Python
//! sources and renders it to one markdown page per module plus an
//! mdbook-compatible `SUMMARY.md`.

// Model builder - re-exported from the workspace crates
pub use apibook_core::docstring;
pub use apibook_core::error;
pub use apibook_core::metadata;
pub use apibook_core::signature;
pub use apibook_python::extract;
pub use apibook_python::files;
pub use apibook_python::reexport;
pub use apibook_python::registry;
pub use apibook_python::symbols;

// Output side
pub mod config;
pub mod generate;
pub mod render;
