//! NumPy style docstrings (underlined section titles).

use std::sync::LazyLock;

use regex::Regex;

use super::{
    clean_str, Docstring, DocstringDeprecated, DocstringMeta, DocstringParam, DocstringRaises,
    DocstringResult, DocstringReturns, DocstringStyle,
};
use crate::text::cleandoc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    /// Free text kept as one generic item.
    Text,
    Param,
    Raises,
    Returns,
    Yields,
    /// `.. deprecated:: VERSION` directive.
    Deprecation,
}

#[derive(Debug, Clone, Copy)]
struct Section {
    title: &'static str,
    key: &'static str,
    kind: SectionKind,
}

impl Section {
    const fn new(title: &'static str, key: &'static str, kind: SectionKind) -> Self {
        Section { title, key, kind }
    }

    fn title_pattern(&self) -> String {
        let title = regex::escape(self.title);
        match self.kind {
            SectionKind::Deprecation => format!(r"^\.\.\s*({})\s*::", title),
            _ => format!(
                r"^({})\s*?\n{}\s*$",
                title,
                "-".repeat(self.title.chars().count())
            ),
        }
    }
}

const SECTIONS: &[Section] = &[
    Section::new("Parameters", "param", SectionKind::Param),
    Section::new("Params", "param", SectionKind::Param),
    Section::new("Arguments", "param", SectionKind::Param),
    Section::new("Args", "param", SectionKind::Param),
    Section::new("Other Parameters", "other_param", SectionKind::Param),
    Section::new("Other Params", "other_param", SectionKind::Param),
    Section::new("Receives", "receives", SectionKind::Param),
    Section::new("Receive", "receives", SectionKind::Param),
    Section::new("Raises", "raises", SectionKind::Raises),
    Section::new("Raise", "raises", SectionKind::Raises),
    Section::new("Warns", "warns", SectionKind::Raises),
    Section::new("Warn", "warns", SectionKind::Raises),
    Section::new("Attributes", "attribute", SectionKind::Param),
    Section::new("Attribute", "attribute", SectionKind::Param),
    Section::new("Returns", "returns", SectionKind::Returns),
    Section::new("Return", "returns", SectionKind::Returns),
    Section::new("Yields", "yields", SectionKind::Yields),
    Section::new("Yield", "yields", SectionKind::Yields),
    Section::new("Examples", "examples", SectionKind::Text),
    Section::new("Example", "examples", SectionKind::Text),
    Section::new("Warnings", "warnings", SectionKind::Text),
    Section::new("Warning", "warnings", SectionKind::Text),
    Section::new("See Also", "see_also", SectionKind::Text),
    Section::new("Related", "see_also", SectionKind::Text),
    Section::new("Notes", "notes", SectionKind::Text),
    Section::new("Note", "notes", SectionKind::Text),
    Section::new("References", "references", SectionKind::Text),
    Section::new("Reference", "references", SectionKind::Text),
    Section::new("deprecated", "deprecation", SectionKind::Deprecation),
];

/// One capture group per entry of `SECTIONS`, in order.
static TITLES: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = SECTIONS
        .iter()
        .map(Section::title_pattern)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?m){}", alternatives)).unwrap()
});

static KV: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[^\s].*$").unwrap());

static PARAM_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<name>.*?)(?:\s*:\s*(?P<type>.*?))?$").unwrap());

static PARAM_OPTIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<type>.*?)(?:, optional|\(optional\))$").unwrap());

static PARAM_DEFAULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)[Dd]efault(?: is | = |: |s to |)\s*(?P<value>[\w\-.]*\w)").unwrap()
});

static RETURN_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(?P<name>.*?)\s*:\s*)?(?P<type>.*?)$").unwrap());

/// Split a section body into `(key line, cleaned value)` pairs.
///
/// A key is any line that starts without indentation; its value is the
/// indented text up to the next key.
fn key_values(text: &str) -> Vec<(String, String)> {
    let keys: Vec<_> = KV.find_iter(text).collect();
    keys.iter()
        .enumerate()
        .map(|(i, key)| {
            let end = keys.get(i + 1).map_or(text.len(), |next| next.start());
            (key.as_str().to_string(), cleandoc(&text[key.end()..end]))
        })
        .collect()
}

fn parse_param(section: &Section, key: &str, value: &str) -> DocstringMeta {
    let mut arg_name = String::new();
    let mut type_name = None;
    let mut is_optional = None;

    if let Some(caps) = PARAM_KEY.captures(key) {
        arg_name = caps["name"].to_string();
        if let Some(raw_type) = caps.name("type") {
            match PARAM_OPTIONAL.captures(raw_type.as_str()) {
                Some(optional) => {
                    type_name = Some(optional["type"].to_string());
                    is_optional = Some(true);
                }
                None => {
                    type_name = Some(raw_type.as_str().to_string());
                    is_optional = Some(false);
                }
            }
        }
    }

    let default = PARAM_DEFAULT
        .captures(value)
        .map(|caps| caps["value"].to_string());

    DocstringMeta::Param(DocstringParam {
        args: vec![section.key.to_string(), arg_name.clone()],
        description: clean_str(value),
        arg_name,
        type_name,
        is_optional,
        default,
    })
}

fn parse_returns(section: &Section, key: &str, value: &str, is_generator: bool) -> DocstringMeta {
    let (return_name, type_name) = match RETURN_KEY.captures(key) {
        Some(caps) => (
            caps.name("name").map(|m| m.as_str().to_string()),
            Some(caps["type"].to_string()),
        ),
        None => (None, None),
    };
    DocstringMeta::Returns(DocstringReturns {
        args: vec![section.key.to_string()],
        description: clean_str(value),
        type_name,
        is_generator,
        return_name,
    })
}

fn parse_section(section: &Section, text: &str) -> Vec<DocstringMeta> {
    match section.kind {
        SectionKind::Text => vec![DocstringMeta::other(
            vec![section.key.to_string()],
            clean_str(text),
        )],
        SectionKind::Param => key_values(text)
            .iter()
            .map(|(key, value)| parse_param(section, key, value))
            .collect(),
        SectionKind::Raises => key_values(text)
            .into_iter()
            .map(|(key, value)| {
                DocstringMeta::Raises(DocstringRaises {
                    args: vec![section.key.to_string(), key.clone()],
                    description: clean_str(&value),
                    type_name: if key.is_empty() { None } else { Some(key) },
                })
            })
            .collect(),
        SectionKind::Returns | SectionKind::Yields => key_values(text)
            .iter()
            .map(|(key, value)| {
                parse_returns(section, key, value, section.kind == SectionKind::Yields)
            })
            .collect(),
        SectionKind::Deprecation => {
            let (version, desc) = match text.split_once('\n') {
                Some((version, desc)) => (version, clean_str(&cleandoc(desc))),
                None => (text, None),
            };
            vec![DocstringMeta::Deprecated(DocstringDeprecated {
                args: vec![section.key.to_string()],
                description: desc,
                version: clean_str(version),
            })]
        }
    }
}

pub(super) fn parse(text: &str) -> DocstringResult<Docstring> {
    let mut ret = Docstring::empty(DocstringStyle::Numpy);
    if text.is_empty() {
        return Ok(ret);
    }
    let text = cleandoc(text);

    let (desc_chunk, meta_chunk) = match TITLES.find(&text) {
        Some(m) => text.split_at(m.start()),
        None => (text.as_str(), ""),
    };
    ret.set_description(desc_chunk);

    let titles: Vec<(&Section, usize, usize)> = TITLES
        .captures_iter(meta_chunk)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let index = (1..caps.len()).find(|&i| caps.get(i).is_some())?;
            Some((SECTIONS.get(index - 1)?, whole.start(), whole.end()))
        })
        .collect();

    for (i, (section, _, end)) in titles.iter().enumerate() {
        let stop = titles.get(i + 1).map_or(meta_chunk.len(), |next| next.1);
        ret.meta.extend(parse_section(section, &meta_chunk[*end..stop]));
    }

    Ok(ret)
}
