//! Core infrastructure for apibook.
//!
//! This crate provides the language-agnostic half of the documentation model:
//! - Error types and exit codes
//! - Text utilities (docstring cleaning)
//! - Docstring dialect parsing (Google, NumPy, reST, epydoc)
//! - Signature normalization for callables and classes
//! - Class attribute metadata

pub mod docstring;
pub mod error;
pub mod metadata;
pub mod signature;
pub mod text;
