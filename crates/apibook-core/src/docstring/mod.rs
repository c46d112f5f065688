//! Docstring dialect parser.
//!
//! Parses one docstring into a short/long description and a flat list of meta
//! items (parameters, returns, raised exceptions, deprecation notes and generic
//! fields). Four dialects are understood:
//!
//! - reST (`:param name: ...`)
//! - Google (`Args:` titled sections)
//! - NumPy (underlined section titles)
//! - epydoc (`@param name: ...`)
//!
//! [`parse`] detects the dialect automatically by running every parser and
//! keeping the result with the most meta items. It never fails; a docstring no
//! parser accepts degrades to a plain description.

mod epydoc;
mod google;
mod numpy;
mod rest;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::cleandoc;

// ============================================================================
// Keywords
// ============================================================================

pub(crate) const PARAM_KEYWORDS: &[&str] = &[
    "param",
    "parameter",
    "arg",
    "argument",
    "attribute",
    "key",
    "keyword",
];
pub(crate) const RAISES_KEYWORDS: &[&str] = &["raises", "raise", "except", "exception"];
pub(crate) const DEPRECATION_KEYWORDS: &[&str] = &["deprecation"];
pub(crate) const RETURNS_KEYWORDS: &[&str] = &["return", "returns"];
pub(crate) const YIELDS_KEYWORDS: &[&str] = &["yield", "yields"];

// ============================================================================
// Model
// ============================================================================

/// Docstring dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocstringStyle {
    Rest,
    Google,
    Numpy,
    Epydoc,
}

impl DocstringStyle {
    /// All dialects, in detection priority order.
    pub const ALL: [DocstringStyle; 4] = [
        DocstringStyle::Rest,
        DocstringStyle::Google,
        DocstringStyle::Numpy,
        DocstringStyle::Epydoc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocstringStyle::Rest => "rest",
            DocstringStyle::Google => "google",
            DocstringStyle::Numpy => "numpy",
            DocstringStyle::Epydoc => "epydoc",
        }
    }
}

impl fmt::Display for DocstringStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed docstring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Docstring {
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub blank_after_short_description: bool,
    pub blank_after_long_description: bool,
    pub meta: Vec<DocstringMeta>,
    /// Dialect that produced this docstring, `None` for the plain fallback.
    pub style: Option<DocstringStyle>,
}

/// A documented parameter (or attribute, for `attribute` sections).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocstringParam {
    pub args: Vec<String>,
    pub description: Option<String>,
    pub arg_name: String,
    pub type_name: Option<String>,
    pub is_optional: Option<bool>,
    pub default: Option<String>,
}

/// A documented return or yield value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocstringReturns {
    pub args: Vec<String>,
    pub description: Option<String>,
    pub type_name: Option<String>,
    pub is_generator: bool,
    pub return_name: Option<String>,
}

/// A documented exception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocstringRaises {
    pub args: Vec<String>,
    pub description: Option<String>,
    pub type_name: Option<String>,
}

/// A deprecation note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocstringDeprecated {
    pub args: Vec<String>,
    pub description: Option<String>,
    pub version: Option<String>,
}

/// Any other field, e.g. `:ivar name:` or a NumPy `Notes` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocstringOther {
    pub args: Vec<String>,
    pub description: Option<String>,
}

/// One meta item of a docstring.
///
/// `args()` always starts with the section key (`param`, `returns`, `ivar`,
/// ...) followed by the raw key tokens as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocstringMeta {
    Param(DocstringParam),
    Returns(DocstringReturns),
    Raises(DocstringRaises),
    Deprecated(DocstringDeprecated),
    Other(DocstringOther),
}

impl DocstringMeta {
    pub fn args(&self) -> &[String] {
        match self {
            DocstringMeta::Param(p) => &p.args,
            DocstringMeta::Returns(r) => &r.args,
            DocstringMeta::Raises(r) => &r.args,
            DocstringMeta::Deprecated(d) => &d.args,
            DocstringMeta::Other(o) => &o.args,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            DocstringMeta::Param(p) => p.description.as_deref(),
            DocstringMeta::Returns(r) => r.description.as_deref(),
            DocstringMeta::Raises(r) => r.description.as_deref(),
            DocstringMeta::Deprecated(d) => d.description.as_deref(),
            DocstringMeta::Other(o) => o.description.as_deref(),
        }
    }

    /// The section key, i.e. the first arg.
    pub fn key(&self) -> &str {
        self.args().first().map(String::as_str).unwrap_or("")
    }

    pub(crate) fn other(args: Vec<String>, description: Option<String>) -> Self {
        DocstringMeta::Other(DocstringOther { args, description })
    }
}

impl Docstring {
    fn empty(style: DocstringStyle) -> Self {
        Docstring {
            style: Some(style),
            ..Default::default()
        }
    }

    /// All parameter items, in order.
    pub fn params(&self) -> impl Iterator<Item = &DocstringParam> {
        self.meta.iter().filter_map(|m| match m {
            DocstringMeta::Param(p) => Some(p),
            _ => None,
        })
    }

    /// The first returns/yields item.
    pub fn returns(&self) -> Option<&DocstringReturns> {
        self.meta.iter().find_map(|m| match m {
            DocstringMeta::Returns(r) => Some(r),
            _ => None,
        })
    }

    /// All raises items, in order.
    pub fn raises(&self) -> impl Iterator<Item = &DocstringRaises> {
        self.meta.iter().filter_map(|m| match m {
            DocstringMeta::Raises(r) => Some(r),
            _ => None,
        })
    }

    pub fn deprecation(&self) -> Option<&DocstringDeprecated> {
        self.meta.iter().find_map(|m| match m {
            DocstringMeta::Deprecated(d) => Some(d),
            _ => None,
        })
    }

    /// Fill short/long descriptions from the text preceding the meta block.
    pub(crate) fn set_description(&mut self, desc_chunk: &str) {
        let (short, long) = match desc_chunk.split_once('\n') {
            Some((short, long)) => (short, Some(long)),
            None => (desc_chunk, None),
        };
        self.short_description = non_empty(short);
        if let Some(long) = long {
            self.blank_after_short_description = long.starts_with('\n');
            self.blank_after_long_description = long.ends_with("\n\n");
            self.long_description = non_empty(long.trim());
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error raised by a single dialect parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{style} docstring: {message}")]
pub struct DocstringError {
    pub style: DocstringStyle,
    pub message: String,
}

impl DocstringError {
    pub(crate) fn new(style: DocstringStyle, message: impl Into<String>) -> Self {
        DocstringError {
            style,
            message: message.into(),
        }
    }
}

pub type DocstringResult<T> = Result<T, DocstringError>;

// ============================================================================
// Entry points
// ============================================================================

/// Parse a docstring, detecting the dialect.
///
/// Every dialect parser runs; the result with the most meta items wins, ties
/// going to the earlier dialect in [`DocstringStyle::ALL`]. When all parsers
/// reject the text the cleaned text becomes the description.
pub fn parse(text: &str) -> Docstring {
    let mut best: Option<Docstring> = None;
    for style in DocstringStyle::ALL {
        match parse_with_style(text, style) {
            Ok(doc) => {
                let better = match &best {
                    Some(current) => doc.meta.len() > current.meta.len(),
                    None => true,
                };
                if better {
                    best = Some(doc);
                }
            }
            Err(err) => tracing::debug!("{}", err),
        }
    }

    best.unwrap_or_else(|| {
        let mut doc = Docstring::default();
        doc.set_description(&cleandoc(text));
        doc
    })
}

/// Parse a docstring with an explicit dialect.
pub fn parse_with_style(text: &str, style: DocstringStyle) -> DocstringResult<Docstring> {
    match style {
        DocstringStyle::Rest => rest::parse(text),
        DocstringStyle::Google => google::parse(text),
        DocstringStyle::Numpy => numpy::parse(text),
        DocstringStyle::Epydoc => epydoc::parse(text),
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

pub(crate) fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Trimmed text, `None` when nothing remains.
pub(crate) fn clean_str(text: &str) -> Option<String> {
    non_empty(text.trim())
}

/// Keep the first line of a description as is and clean the indentation of
/// the rest.
pub(crate) fn join_first_line(desc: &str) -> String {
    match desc.split_once('\n') {
        Some((first, rest)) => format!("{}\n{}", first, cleandoc(rest)),
        None => desc.to_string(),
    }
}

/// Split text into chunks, each starting at a line that begins with `marker`.
///
/// Text before the first marker line is discarded. Every chunk keeps its
/// lines joined by `\n`.
pub(crate) fn marker_chunks(text: &str, marker: char) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    for line in text.split('\n') {
        if line.starts_with(marker) {
            chunks.push(line.to_string());
        } else if let Some(current) = chunks.last_mut() {
            current.push('\n');
            current.push_str(line);
        }
    }
    chunks
}

/// Byte offset of the first line starting with `marker`.
pub(crate) fn first_marker_line(text: &str, marker: char) -> Option<usize> {
    let mut offset = 0;
    for line in text.split('\n') {
        if line.starts_with(marker) {
            return Some(offset);
        }
        offset += line.len() + 1;
    }
    None
}
