//! Nested table of contents over module names.

use std::collections::BTreeMap;

use super::{is_private, PACKAGE_SUFFIX};

#[derive(Debug, Default)]
struct TocNode {
    /// A module renders a page at this path.
    has_page: bool,
    children: BTreeMap<String, TocNode>,
}

/// Render the table of contents for a set of module names.
///
/// Names are split on `.` into a tree, sorted at every level. Each node with
/// a page becomes `- [\`segment\`](dotted.path.md)` indented two spaces per
/// level; a node without a page contributes only its children. Modules with
/// a `_`-prefixed segment (other than a trailing `__init__`) are left out.
///
/// # Arguments
///
/// * `module_names` - Dotted module names, in any order
pub fn render_toc<'a>(module_names: impl IntoIterator<Item = &'a str>) -> String {
    let mut root = TocNode::default();

    for name in module_names {
        let name = name.strip_suffix(PACKAGE_SUFFIX).unwrap_or(name);
        if name.split('.').any(is_private) {
            continue;
        }
        let mut node = &mut root;
        for segment in name.split('.') {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.has_page = true;
    }

    let mut out = String::new();
    write_nodes(&mut out, "", &root.children, 0);
    out
}

fn write_nodes(out: &mut String, path: &str, nodes: &BTreeMap<String, TocNode>, level: usize) {
    for (segment, node) in nodes {
        let path = if path.is_empty() {
            segment.clone()
        } else {
            format!("{}.{}", path, segment)
        };
        if node.has_page {
            out.push_str(&"  ".repeat(level));
            out.push_str(&format!("- [`{}`]({}.md)\n\n", segment, path));
        }
        write_nodes(out, &path, &node.children, level + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_and_sorted() {
        let toc = render_toc([
            "pkg.zeta",
            "pkg.__init__",
            "pkg.alpha.__init__",
            "pkg.alpha.inner",
        ]);
        assert_eq!(
            toc,
            "- [`pkg`](pkg.md)\n\n  - [`alpha`](pkg.alpha.md)\n\n    - [`inner`](pkg.alpha.inner.md)\n\n  - [`zeta`](pkg.zeta.md)\n\n"
        );
    }

    #[test]
    fn package_without_page_lists_children_only() {
        let toc = render_toc(["pkg.sub.mod"]);
        assert_eq!(toc, "    - [`mod`](pkg.sub.mod.md)\n\n");
    }

    #[test]
    fn private_modules_are_left_out() {
        let toc = render_toc(["pkg.__init__", "pkg._impl", "pkg._impl.deep", "pkg.api"]);
        assert_eq!(toc, "- [`pkg`](pkg.md)\n\n  - [`api`](pkg.api.md)\n\n");
    }

    #[test]
    fn rendering_is_idempotent() {
        let names = ["b.x", "a.__init__", "a.y", "b.__init__"];
        assert_eq!(render_toc(names), render_toc(names));
        let mut reversed = names;
        reversed.reverse();
        assert_eq!(render_toc(names), render_toc(reversed));
    }

    #[test]
    fn empty() {
        assert_eq!(render_toc(std::iter::empty()), "");
    }
}
