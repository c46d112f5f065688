//! Google style docstrings (`Args:` / `Returns:` titled sections).

use std::sync::LazyLock;

use regex::Regex;

use super::{
    non_empty, Docstring, DocstringError, DocstringMeta, DocstringParam, DocstringRaises,
    DocstringResult, DocstringReturns, DocstringStyle, PARAM_KEYWORDS, RAISES_KEYWORDS,
    RETURNS_KEYWORDS, YIELDS_KEYWORDS,
};
use crate::text::cleandoc;

/// How the items of a section are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionType {
    /// The whole section is one item.
    Singular,
    /// One `name: description` item per line at the section indent.
    Multiple,
    /// `type: description` when the text looks like it, one item otherwise.
    SingularOrMultiple,
}

#[derive(Debug, Clone, Copy)]
struct Section {
    title: &'static str,
    key: &'static str,
    kind: SectionType,
}

impl Section {
    const fn new(title: &'static str, key: &'static str, kind: SectionType) -> Self {
        Section { title, key, kind }
    }
}

const SECTIONS: &[Section] = &[
    Section::new("Arguments", "param", SectionType::Multiple),
    Section::new("Args", "param", SectionType::Multiple),
    Section::new("Parameters", "param", SectionType::Multiple),
    Section::new("Params", "param", SectionType::Multiple),
    Section::new("Raises", "raises", SectionType::Multiple),
    Section::new("Exceptions", "raises", SectionType::Multiple),
    Section::new("Except", "raises", SectionType::Multiple),
    Section::new("Attributes", "attribute", SectionType::Multiple),
    Section::new("Example", "examples", SectionType::Singular),
    Section::new("Examples", "examples", SectionType::Singular),
    Section::new("Returns", "returns", SectionType::SingularOrMultiple),
    Section::new("Yields", "yields", SectionType::SingularOrMultiple),
];

static TITLES: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = SECTIONS
        .iter()
        .map(|s| format!("(?:{})", regex::escape(s.title)))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?m)^({}):[ \t\r\f\v]*$", alternatives)).unwrap()
});

static TYPED_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\s*(.+?)\s*\(\s*(.*[^\s]+)\s*\)").unwrap());

static ARG_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A.*\. Defaults to (.+)\.").unwrap());

static MULTIPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(?:(\s*[^:\s]+:)|([^:]*\]:.*))").unwrap());

static UNKNOWN_META: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\S").unwrap());

fn error(message: impl Into<String>) -> DocstringError {
    DocstringError::new(DocstringStyle::Google, message)
}

fn find_section(title: &str) -> Option<&'static Section> {
    SECTIONS.iter().find(|s| s.title == title)
}

fn build_meta(text: &str, section: &Section) -> DocstringResult<DocstringMeta> {
    let singular = match section.kind {
        SectionType::Singular => true,
        SectionType::SingularOrMultiple => !MULTIPLE.is_match(text),
        SectionType::Multiple => false,
    };
    if singular {
        return build_single_meta(section, text);
    }

    let (before, desc) = text
        .split_once(':')
        .ok_or_else(|| error(format!("expected a colon in {:?}", text)))?;
    let desc = desc.strip_prefix(' ').unwrap_or(desc);
    let desc = match desc.split_once('\n') {
        Some((first, rest)) => format!("{}\n{}", first, cleandoc(rest)),
        None => desc.to_string(),
    };
    let desc = desc.trim_matches('\n').to_string();

    Ok(build_multi_meta(section, before, desc))
}

fn build_single_meta(section: &Section, desc: &str) -> DocstringResult<DocstringMeta> {
    let key = section.key;
    let args = vec![key.to_string()];
    let description = non_empty(desc);

    if RETURNS_KEYWORDS.contains(&key) || YIELDS_KEYWORDS.contains(&key) {
        return Ok(DocstringMeta::Returns(DocstringReturns {
            args,
            description,
            type_name: None,
            is_generator: YIELDS_KEYWORDS.contains(&key),
            return_name: None,
        }));
    }
    if RAISES_KEYWORDS.contains(&key) {
        return Ok(DocstringMeta::Raises(DocstringRaises {
            args,
            description,
            type_name: None,
        }));
    }
    if PARAM_KEYWORDS.contains(&key) {
        return Err(error("expected parameter name"));
    }
    Ok(DocstringMeta::other(args, description))
}

fn build_multi_meta(section: &Section, before: &str, desc: String) -> DocstringMeta {
    let key = section.key;
    let args = vec![key.to_string(), before.to_string()];

    if PARAM_KEYWORDS.contains(&key) {
        let (arg_name, type_name, is_optional) = match TYPED_ARG.captures(before) {
            Some(caps) => {
                let arg_name = caps[1].to_string();
                let raw_type = &caps[2];
                if let Some(stripped) = raw_type.strip_suffix(", optional") {
                    (arg_name, Some(stripped.to_string()), Some(true))
                } else if let Some(stripped) = raw_type.strip_suffix('?') {
                    (arg_name, Some(stripped.to_string()), Some(true))
                } else {
                    (arg_name, Some(raw_type.to_string()), Some(false))
                }
            }
            None => (before.to_string(), None, None),
        };
        let default = ARG_DEFAULT.captures(&desc).map(|caps| caps[1].to_string());
        return DocstringMeta::Param(DocstringParam {
            args,
            description: Some(desc),
            arg_name,
            type_name,
            is_optional,
            default,
        });
    }
    if RETURNS_KEYWORDS.contains(&key) || YIELDS_KEYWORDS.contains(&key) {
        return DocstringMeta::Returns(DocstringReturns {
            args,
            description: Some(desc),
            type_name: Some(before.to_string()),
            is_generator: YIELDS_KEYWORDS.contains(&key),
            return_name: None,
        });
    }
    if RAISES_KEYWORDS.contains(&key) {
        return DocstringMeta::Raises(DocstringRaises {
            args,
            description: Some(desc),
            type_name: Some(before.to_string()),
        });
    }
    DocstringMeta::other(args, Some(desc))
}

/// Split a `Multiple` section into items, one per line at the section indent.
fn split_items(chunk: &str, title: &str) -> DocstringResult<Vec<String>> {
    let indent: String = chunk.chars().take_while(|c| c.is_whitespace()).collect();
    let item_start = Regex::new(&format!(r"(?m)^{}(\S)", regex::escape(&indent)))
        .map_err(|e| error(e.to_string()))?;

    let starts: Vec<(usize, usize)> = item_start
        .captures_iter(chunk)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = caps.get(1)?;
            Some((whole.start(), body.start()))
        })
        .collect();
    if starts.is_empty() {
        return Err(error(format!("no specification for \"{}\": \"{}\"", title, chunk)));
    }

    let items = starts
        .iter()
        .enumerate()
        .map(|(i, &(_, body_start))| {
            let end = starts.get(i + 1).map_or(chunk.len(), |&(next, _)| next);
            chunk[body_start..end].trim_matches('\n').to_string()
        })
        .collect();
    Ok(items)
}

/// Dedent a docstring, keeping items indented under a title on the first line.
///
/// `cleandoc` measures the margin without the first line, which would pull the
/// items of a leading section back to the title's column.
fn dedent(text: &str) -> String {
    let trimmed = text.trim_start();
    let first = trimmed.lines().next().unwrap_or_default();
    if TITLES.is_match(first) {
        cleandoc(&format!("\n{}", trimmed))
    } else {
        cleandoc(text)
    }
}

pub(super) fn parse(text: &str) -> DocstringResult<Docstring> {
    let mut ret = Docstring::empty(DocstringStyle::Google);
    if text.is_empty() {
        return Ok(ret);
    }
    let text = dedent(text);

    let (desc_chunk, meta_chunk) = match TITLES.find(&text) {
        Some(m) => text.split_at(m.start()),
        None => (text.as_str(), ""),
    };
    ret.set_description(desc_chunk);

    let titles: Vec<(String, usize, usize)> = TITLES
        .captures_iter(meta_chunk)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((caps[1].to_string(), whole.start(), whole.end()))
        })
        .collect();

    // Repeated titles keep their first position but the last body.
    let mut chunks: Vec<(&'static Section, String)> = Vec::new();
    for (i, (title, _, end)) in titles.iter().enumerate() {
        let Some(section) = find_section(title) else {
            continue;
        };
        let stop = titles.get(i + 1).map_or(meta_chunk.len(), |next| next.1);
        let mut details = &meta_chunk[*end..stop];
        if let Some(unknown) = UNKNOWN_META.find(details) {
            details = &details[..unknown.start()];
        }
        let details = details.trim_matches('\n').to_string();
        match chunks.iter_mut().find(|(s, _)| s.title == section.title) {
            Some(existing) => existing.1 = details,
            None => chunks.push((section, details)),
        }
    }

    for (section, chunk) in chunks {
        if section.kind != SectionType::Multiple {
            ret.meta.push(build_meta(&cleandoc(&chunk), section)?);
            continue;
        }
        for part in split_items(&chunk, section.title)? {
            ret.meta.push(build_meta(&part, section)?);
        }
    }

    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_with_types_and_defaults() {
        let doc = parse(
            "Summary.\n\nArgs:\n    x (int): The x.\n    y (str, optional): The y. Defaults to \"a\".\n    z: No type.\n",
        )
        .unwrap();
        let params: Vec<_> = doc.params().collect();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].arg_name, "x");
        assert_eq!(params[0].type_name.as_deref(), Some("int"));
        assert_eq!(params[0].is_optional, Some(false));
        assert_eq!(params[1].type_name.as_deref(), Some("str"));
        assert_eq!(params[1].is_optional, Some(true));
        assert_eq!(params[1].default.as_deref(), Some("\"a\""));
        assert_eq!(params[2].arg_name, "z");
        assert_eq!(params[2].type_name, None);
        assert_eq!(params[2].args, vec!["param", "z"]);
    }

    #[test]
    fn multiline_item_description() {
        let doc = parse("Args:\n    x: First line\n        continues here.\n    y: Second.").unwrap();
        let params: Vec<_> = doc.params().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(
            params[0].description.as_deref(),
            Some("First line\ncontinues here.")
        );
    }

    #[test]
    fn returns_singular_and_typed() {
        let doc = parse("Returns:\n    The answer.").unwrap();
        let returns = doc.returns().unwrap();
        assert_eq!(returns.description.as_deref(), Some("The answer."));
        assert_eq!(returns.type_name, None);

        let doc = parse("Returns:\n    int: The answer.").unwrap();
        let returns = doc.returns().unwrap();
        assert_eq!(returns.description.as_deref(), Some("The answer."));
        assert_eq!(returns.type_name.as_deref(), Some("int"));
    }

    #[test]
    fn yields_is_generator() {
        let doc = parse("Yields:\n    Items.").unwrap();
        assert!(doc.returns().unwrap().is_generator);
    }

    #[test]
    fn raises_section() {
        let doc = parse("Raises:\n    ValueError: If bad.\n    KeyError: If missing.").unwrap();
        let raises: Vec<_> = doc.raises().collect();
        assert_eq!(raises.len(), 2);
        assert_eq!(raises[1].type_name.as_deref(), Some("KeyError"));
        assert_eq!(raises[1].description.as_deref(), Some("If missing."));
    }

    #[test]
    fn attributes_section() {
        let doc = parse("Attributes:\n    name (str): Fooobar\n    type (str): The foobar\n").unwrap();
        let params: Vec<_> = doc.params().collect();
        assert_eq!(params[0].args[0], "attribute");
        assert_eq!(params[1].arg_name, "type");
        assert_eq!(params[1].description.as_deref(), Some("The foobar"));
    }

    #[test]
    fn leading_section_keeps_item_indent() {
        assert_eq!(dedent("Args:\n    x: The x."), "Args:\n    x: The x.");
        assert_eq!(dedent("  Args:\n        x: The x.\n"), "Args:\n        x: The x.");
        assert_eq!(
            dedent("Summary.\n    Args:\n        x: The x."),
            "Summary.\nArgs:\n    x: The x."
        );
    }

    #[test]
    fn unindented_text_ends_section() {
        let doc = parse("Args:\n    x: The x.\nTrailing prose.").unwrap();
        assert_eq!(doc.params().count(), 1);
    }

    #[test]
    fn item_without_colon_is_an_error() {
        assert!(parse("Args:\n    just words").is_err());
    }

    #[test]
    fn no_sections_is_description_only() {
        let doc = parse("Only words here.").unwrap();
        assert!(doc.meta.is_empty());
        assert_eq!(doc.short_description.as_deref(), Some("Only words here."));
    }
}
