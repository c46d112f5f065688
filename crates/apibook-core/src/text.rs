//! Text helpers shared by the docstring parsers and the extractor.

/// Expand tab characters to spaces using the given tab size.
///
/// Columns reset at every newline, so a tab always advances to the next
/// multiple of `tab_size` within its own line.
pub fn expand_tabs(text: &str, tab_size: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = tab_size - (column % tab_size);
                out.push_str(&" ".repeat(pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}

/// Clean up indentation of a docstring.
///
/// The first line has its leading whitespace removed. Every following line
/// loses the smallest indentation found among the non-blank following lines.
/// Empty lines at the start and end are dropped, and tabs are expanded to
/// eight columns first.
///
/// # Arguments
///
/// * `doc` - Raw docstring text as written in the source.
///
/// # Returns
///
/// The cleaned text, lines joined by `\n`.
pub fn cleandoc(doc: &str) -> String {
    let expanded = expand_tabs(doc, 8);
    let mut lines: Vec<String> = expanded.split('\n').map(str::to_string).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let content = line.trim_start().chars().count();
            if content == 0 {
                None
            } else {
                Some(line.chars().count() - content)
            }
        })
        .min();

    if let Some(first) = lines.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(margin) = margin {
        for line in lines.iter_mut().skip(1) {
            *line = line.chars().skip(margin).collect();
        }
    }

    // Blank edges go even when no margin was found to dedent them.
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|line| line.trim().is_empty()).count();
    lines.drain(..leading);

    lines.join("\n")
}

/// Collapse every run of line breaks (and the indentation that follows them)
/// into a single space.
pub fn single_line(text: &str) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }
    text.split('\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleandoc_removes_common_margin() {
        let doc = "Summary line.\n\n    Details here.\n      Indented more.\n    ";
        assert_eq!(
            cleandoc(doc),
            "Summary line.\n\nDetails here.\n  Indented more."
        );
    }

    #[test]
    fn cleandoc_strips_first_line_and_blank_edges() {
        let doc = "\n\n   Leading\n   body\n\n";
        assert_eq!(cleandoc(doc), "Leading\nbody");
    }

    #[test]
    fn cleandoc_ignores_first_line_indent_for_margin() {
        let doc = "First\n        second\n        third";
        assert_eq!(cleandoc(doc), "First\nsecond\nthird");
    }

    #[test]
    fn cleandoc_expands_tabs() {
        assert_eq!(cleandoc("x\n\ty\n\t  z"), "x\ny\n  z");
    }

    #[test]
    fn cleandoc_empty() {
        assert_eq!(cleandoc(""), "");
        assert_eq!(cleandoc("   \n  \n"), "");
        assert_eq!(cleandoc("\n  \t\n"), "");
    }

    #[test]
    fn cleandoc_keeps_inner_whitespace_lines() {
        assert_eq!(cleandoc("A\n   \n  B"), "A\n \nB");
    }

    #[test]
    fn expand_tabs_respects_columns() {
        assert_eq!(expand_tabs("ab\tc", 4), "ab  c");
        assert_eq!(expand_tabs("a\n\tb", 8), "a\n        b");
    }

    #[test]
    fn single_line_joins_fragments() {
        assert_eq!(single_line("foo(\n    a,\n    b,\n)"), "foo( a, b, )");
        assert_eq!(single_line("plain"), "plain");
    }
}
