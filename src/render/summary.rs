//! `SUMMARY.md` template substitution.

/// Token replaced by the rendered table of contents.
pub const TOC_PLACEHOLDER: &str = "{{apibook_toc}}";

/// Template used when the caller supplies none.
pub const DEFAULT_SUMMARY_TEMPLATE: &str = "# SUMMARY\n# API Reference\n\n{{apibook_toc}}\n";

/// Substitute the table of contents into a summary template.
///
/// Every occurrence of [`TOC_PLACEHOLDER`] is replaced. A template without
/// the placeholder is returned unchanged.
pub fn render_summary(template: Option<&str>, toc: &str) -> String {
    template
        .unwrap_or(DEFAULT_SUMMARY_TEMPLATE)
        .replace(TOC_PLACEHOLDER, toc)
}
