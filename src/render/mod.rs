//! Markdown rendering over the resolved model.
//!
//! Everything here is a pure function of its inputs: module pages
//! ([`markdown`]), the nested table of contents ([`toc`]) and the
//! `SUMMARY.md` template substitution ([`summary`]).

pub mod markdown;
pub mod summary;
pub mod toc;

use crate::config::ApibookConfig;

pub use markdown::render_module;
pub use summary::{render_summary, DEFAULT_SUMMARY_TEMPLATE, TOC_PLACEHOLDER};
pub use toc::render_toc;

/// Suffix of a package's own module name.
const PACKAGE_SUFFIX: &str = ".__init__";

/// Knobs for page rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Column budget before a call signature is reflowed one parameter per line.
    pub signature_width: usize,
    /// `_`-prefixed method names that are rendered anyway.
    pub visible_private: Vec<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions::from(&ApibookConfig::default())
    }
}

impl From<&ApibookConfig> for RenderOptions {
    fn from(config: &ApibookConfig) -> Self {
        RenderOptions {
            signature_width: config.signature_width,
            visible_private: config.visible_private.clone(),
        }
    }
}

impl RenderOptions {
    /// Whether a method is rendered.
    pub fn method_visible(&self, name: &str) -> bool {
        !is_private(name) || self.visible_private.iter().any(|n| n == name)
    }
}

/// Whether a name follows the private naming convention.
pub fn is_private(name: &str) -> bool {
    name.starts_with('_')
}

/// The page file name of a module: `pkg.__init__` becomes `pkg.md`.
pub fn output_file_name(module_name: &str) -> String {
    format!(
        "{}.md",
        module_name
            .strip_suffix(PACKAGE_SUFFIX)
            .unwrap_or(module_name)
    )
}
