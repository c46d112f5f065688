//! epydoc docstrings (`@param name: ...`).

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::rest::trailing_default;
use super::{
    first_marker_line, join_first_line, marker_chunks, Docstring, DocstringError, DocstringMeta,
    DocstringParam, DocstringRaises, DocstringResult, DocstringReturns, DocstringStyle,
};
use crate::text::cleandoc;

static PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(param|keyword|type)(\s+[_A-z][_A-z0-9]*\??):").unwrap());

static RAISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(raise)(\s+[_A-z][_A-z0-9]*\??)?:").unwrap());

static RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(return|rtype|yield|ytype):").unwrap());

static META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([_A-z][_A-z0-9]+)((\s+[_A-z][_A-z0-9]*\??)*):").unwrap()
});

const RESERVED: &[&str] = &["param", "keyword", "type", "return", "rtype"];

fn error(message: impl Into<String>) -> DocstringError {
    DocstringError::new(DocstringStyle::Epydoc, message)
}

/// Which family of tag a chunk belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Base {
    Param,
    Raise,
    Return,
    Meta,
}

/// One `@tag args: description` chunk.
#[derive(Debug)]
struct Tag {
    base: Base,
    key: String,
    args: Vec<String>,
    desc: String,
}

#[derive(Debug, Default)]
struct Info {
    type_name: Option<String>,
    description: Option<String>,
    is_generator: Option<bool>,
}

fn tokenize(chunk: &str) -> DocstringResult<Tag> {
    let (base, caps) = if let Some(caps) = PARAM.captures(chunk) {
        (Base::Param, caps)
    } else if let Some(caps) = RAISE.captures(chunk) {
        (Base::Raise, caps)
    } else if let Some(caps) = RETURN.captures(chunk) {
        (Base::Return, caps)
    } else if let Some(caps) = META.captures(chunk) {
        (Base::Meta, caps)
    } else {
        return Err(error(format!(
            "error parsing meta information near \"{}\"",
            chunk
        )));
    };

    let end = caps.get(0).map_or(0, |m| m.end());
    let group = |i: usize| caps.get(i).map(|m| m.as_str().trim().to_string());

    let (key, args) = match base {
        Base::Param => (caps[1].to_string(), group(2).into_iter().collect()),
        Base::Raise => (
            String::new(),
            group(2).into_iter().filter(|a| !a.is_empty()).collect(),
        ),
        Base::Return => (caps[1].to_string(), Vec::new()),
        Base::Meta => (
            caps[1].to_string(),
            group(2)
                .map(|tokens| tokens.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        ),
    };

    if base == Base::Meta && RESERVED.contains(&key.as_str()) {
        return Err(error(format!("error parsing meta keyword near \"{}\"", chunk)));
    }

    Ok(Tag {
        base,
        key,
        args,
        desc: join_first_line(chunk[end..].trim()),
    })
}

pub(super) fn parse(text: &str) -> DocstringResult<Docstring> {
    let mut ret = Docstring::empty(DocstringStyle::Epydoc);
    if text.is_empty() {
        return Ok(ret);
    }
    let text = cleandoc(text);

    let (desc_chunk, meta_chunk) = match first_marker_line(&text, '@') {
        Some(at) => text.split_at(at),
        None => (text.as_str(), ""),
    };
    ret.set_description(desc_chunk);

    let stream = marker_chunks(meta_chunk, '@')
        .iter()
        .map(|chunk| tokenize(chunk))
        .collect::<DocstringResult<Vec<_>>>()?;

    // Types and descriptions of the same name are spread over several tags.
    let mut infos: HashMap<String, Info> = HashMap::new();
    for tag in &stream {
        if !matches!(tag.base, Base::Param | Base::Return) {
            continue;
        }
        let name = tag.args.first().cloned().unwrap_or_else(|| "return".to_string());
        let info = infos.entry(name.clone()).or_default();
        if tag.key.contains("type") {
            info.type_name = Some(tag.desc.clone());
        } else {
            info.description = Some(tag.desc.clone());
        }
        if tag.base == Base::Return {
            let is_generator = tag.key == "ytype" || tag.key == "yield";
            if *info.is_generator.get_or_insert(is_generator) != is_generator {
                return Err(error(format!(
                    "error parsing meta information for \"{}\"",
                    name
                )));
            }
        }
    }

    let mut done: Vec<String> = Vec::new();
    for tag in stream {
        match tag.base {
            Base::Param => {
                let Some(arg_name) = tag.args.first().cloned() else {
                    return Err(error("parameter tag without a name"));
                };
                if done.contains(&arg_name) {
                    continue;
                }
                let info = infos.get(&arg_name);
                let raw_type = info.and_then(|i| i.type_name.clone());
                let (type_name, is_optional) = match raw_type {
                    Some(ty) if ty.ends_with('?') => {
                        (Some(ty.trim_end_matches('?').to_string()), Some(true))
                    }
                    other => (other, Some(false)),
                };
                ret.meta.push(DocstringMeta::Param(DocstringParam {
                    args: vec![tag.key, arg_name.clone()],
                    description: info.and_then(|i| i.description.clone()),
                    arg_name: arg_name.clone(),
                    type_name,
                    is_optional,
                    default: trailing_default(&tag.desc),
                }));
                done.push(arg_name);
            }
            Base::Return => {
                let name = "return".to_string();
                if done.contains(&name) {
                    continue;
                }
                let info = infos.get(&name);
                ret.meta.push(DocstringMeta::Returns(DocstringReturns {
                    args: vec![tag.key],
                    description: info.and_then(|i| i.description.clone()),
                    type_name: info.and_then(|i| i.type_name.clone()),
                    is_generator: info.and_then(|i| i.is_generator).unwrap_or(false),
                    return_name: None,
                }));
                done.push(name);
            }
            Base::Raise => {
                let type_name = tag.args.first().cloned();
                let mut args = vec![tag.key];
                args.extend(tag.args);
                ret.meta.push(DocstringMeta::Raises(DocstringRaises {
                    args,
                    description: Some(tag.desc),
                    type_name,
                }));
            }
            Base::Meta => {
                let mut args = vec![tag.key];
                args.extend(tag.args);
                ret.meta.push(DocstringMeta::other(args, Some(tag.desc)));
            }
        }
    }

    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_and_type_are_combined() {
        let doc = parse("Summary.\n\n@param x: The x.\n@type x: int?\n@param y: The y.").unwrap();
        let params: Vec<_> = doc.params().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].arg_name, "x");
        assert_eq!(params[0].description.as_deref(), Some("The x."));
        assert_eq!(params[0].type_name.as_deref(), Some("int"));
        assert_eq!(params[0].is_optional, Some(true));
        assert_eq!(params[1].type_name, None);
    }

    #[test]
    fn type_before_param_keeps_type_key() {
        let doc = parse("@type x: str\n@param x: The x.").unwrap();
        let params: Vec<_> = doc.params().collect();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].args, vec!["type", "x"]);
        assert_eq!(params[0].description.as_deref(), Some("The x."));
    }

    #[test]
    fn return_and_rtype() {
        let doc = parse("@return: The answer.\n@rtype: int").unwrap();
        let returns = doc.returns().unwrap();
        assert_eq!(returns.description.as_deref(), Some("The answer."));
        assert_eq!(returns.type_name.as_deref(), Some("int"));
        assert!(!returns.is_generator);
        assert_eq!(doc.meta.len(), 1);
    }

    #[test]
    fn yield_mixed_with_return_is_an_error() {
        assert!(parse("@yield: Items.\n@rtype: int").is_err());
    }

    #[test]
    fn raise_tag() {
        let doc = parse("@raise ValueError: If bad.").unwrap();
        let raises: Vec<_> = doc.raises().collect();
        assert_eq!(raises[0].type_name.as_deref(), Some("ValueError"));
        assert_eq!(raises[0].args, vec!["", "ValueError"]);
    }

    #[test]
    fn generic_tags_keep_args() {
        let doc = parse("@ivar name: Fooobar\n@cvar other: Bar").unwrap();
        assert_eq!(doc.meta[0].args(), &["ivar", "name"]);
        assert_eq!(doc.meta[0].description(), Some("Fooobar"));
        assert_eq!(doc.meta[1].args(), &["cvar", "other"]);
    }

    #[test]
    fn garbage_tag_is_an_error() {
        assert!(parse("@!!!").is_err());
    }
}
