//! reST field-list docstrings (`:param name: ...`).

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{
    first_marker_line, join_first_line, marker_chunks, Docstring, DocstringDeprecated,
    DocstringError, DocstringMeta, DocstringParam, DocstringRaises, DocstringResult,
    DocstringReturns, DocstringStyle, DEPRECATION_KEYWORDS, PARAM_KEYWORDS, RAISES_KEYWORDS,
    RETURNS_KEYWORDS, YIELDS_KEYWORDS,
};
use crate::text::cleandoc;

static DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A.*defaults to (.+)").unwrap());

static DEPRECATED_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\A(?P<version>v?\d+(?:\.[0-9a-z.]+)) (?P<desc>.+)").unwrap()
});

fn error(message: impl Into<String>) -> DocstringError {
    DocstringError::new(DocstringStyle::Rest, message)
}

/// Extract a `defaults to X` clause from a parameter description.
pub(crate) fn trailing_default(desc: &str) -> Option<String> {
    DEFAULT
        .captures(desc)
        .map(|caps| caps[1].trim_end_matches('.').to_string())
}

fn build_meta(args: Vec<String>, desc: String) -> DocstringResult<DocstringMeta> {
    let key = args[0].as_str();

    if PARAM_KEYWORDS.contains(&key) {
        let (arg_name, type_name, is_optional) = match args.len() {
            3 => {
                let raw_type = args[1].as_str();
                match raw_type.strip_suffix('?') {
                    Some(stripped) => (args[2].clone(), Some(stripped.to_string()), Some(true)),
                    None => (args[2].clone(), Some(raw_type.to_string()), Some(false)),
                }
            }
            2 => (args[1].clone(), None, None),
            _ => {
                return Err(error(format!(
                    "expected one or two arguments for a {} keyword",
                    key
                )))
            }
        };
        let default = trailing_default(&desc);
        return Ok(DocstringMeta::Param(DocstringParam {
            args,
            description: Some(desc),
            arg_name,
            type_name,
            is_optional,
            default,
        }));
    }

    if RETURNS_KEYWORDS.contains(&key) || YIELDS_KEYWORDS.contains(&key) {
        let type_name = match args.len() {
            1 => None,
            2 => Some(args[1].clone()),
            _ => {
                return Err(error(format!(
                    "expected one or no arguments for a {} keyword",
                    key
                )))
            }
        };
        let is_generator = YIELDS_KEYWORDS.contains(&key);
        return Ok(DocstringMeta::Returns(DocstringReturns {
            args,
            description: Some(desc),
            type_name,
            is_generator,
            return_name: None,
        }));
    }

    if DEPRECATION_KEYWORDS.contains(&key) {
        let (version, description) = match DEPRECATED_VERSION.captures(&desc) {
            Some(caps) => (Some(caps["version"].to_string()), caps["desc"].to_string()),
            None => (None, desc),
        };
        return Ok(DocstringMeta::Deprecated(DocstringDeprecated {
            args,
            description: Some(description),
            version,
        }));
    }

    if RAISES_KEYWORDS.contains(&key) {
        let type_name = match args.len() {
            1 => None,
            2 => Some(args[1].clone()),
            _ => {
                return Err(error(format!(
                    "expected one or no arguments for a {} keyword",
                    key
                )))
            }
        };
        return Ok(DocstringMeta::Raises(DocstringRaises {
            args,
            description: Some(desc),
            type_name,
        }));
    }

    Ok(DocstringMeta::other(args, Some(desc)))
}

pub(super) fn parse(text: &str) -> DocstringResult<Docstring> {
    let mut ret = Docstring::empty(DocstringStyle::Rest);
    if text.is_empty() {
        return Ok(ret);
    }
    let text = cleandoc(text);

    let (desc_chunk, meta_chunk) = match first_marker_line(&text, ':') {
        Some(at) => text.split_at(at),
        None => (text.as_str(), ""),
    };
    ret.set_description(desc_chunk);

    let mut types: HashMap<String, String> = HashMap::new();
    let mut rtypes: Vec<(Option<String>, String)> = Vec::new();

    for chunk in marker_chunks(meta_chunk, ':') {
        let (args_chunk, desc_chunk) = chunk
            .trim_start_matches(':')
            .split_once(':')
            .ok_or_else(|| error(format!("error parsing meta information near \"{}\"", chunk)))?;
        let args: Vec<String> = args_chunk.split_whitespace().map(str::to_string).collect();
        if args.is_empty() {
            return Err(error(format!("empty field name near \"{}\"", chunk)));
        }
        let desc = join_first_line(desc_chunk.trim());

        if args.len() == 2 && args[0] == "type" {
            types.insert(args[1].clone(), desc);
        } else if args[0] == "rtype" && args.len() <= 2 {
            let name = args.get(1).cloned();
            rtypes.retain(|(existing, _)| existing != &name);
            rtypes.push((name, desc));
        } else {
            ret.meta.push(build_meta(args, desc)?);
        }
    }

    let mut has_returns = false;
    for meta in ret.meta.iter_mut() {
        match meta {
            DocstringMeta::Param(param) => {
                if param.type_name.is_none() {
                    param.type_name = types.get(&param.arg_name).cloned();
                }
            }
            DocstringMeta::Returns(returns) => {
                has_returns = true;
                if returns.type_name.is_none() {
                    returns.type_name = rtypes
                        .iter()
                        .find(|(name, _)| name == &returns.return_name)
                        .map(|(_, ty)| ty.clone());
                }
            }
            _ => {}
        }
    }

    if !has_returns {
        for (return_name, type_name) in rtypes {
            ret.meta.push(DocstringMeta::Returns(DocstringReturns {
                args: Vec::new(),
                description: None,
                type_name: Some(type_name),
                is_generator: false,
                return_name,
            }));
        }
    }

    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_with_types_and_defaults() {
        let doc = parse(
            "Short.\n\nLong text.\n\n:param int x: The x.\n:param y: The y, defaults to 3.\n:type y: float\n",
        )
        .unwrap();
        let params: Vec<_> = doc.params().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].arg_name, "x");
        assert_eq!(params[0].type_name.as_deref(), Some("int"));
        assert_eq!(params[0].is_optional, Some(false));
        assert_eq!(params[1].type_name.as_deref(), Some("float"));
        assert_eq!(params[1].default.as_deref(), Some("3"));
        assert_eq!(doc.short_description.as_deref(), Some("Short."));
        assert_eq!(doc.long_description.as_deref(), Some("Long text."));
    }

    #[test]
    fn optional_type_marker() {
        let doc = parse(":param str? name: A name.").unwrap();
        let param = doc.params().next().unwrap();
        assert_eq!(param.type_name.as_deref(), Some("str"));
        assert_eq!(param.is_optional, Some(true));
    }

    #[test]
    fn rtype_attaches_to_returns() {
        let doc = parse(":returns: The value.\n:rtype: int").unwrap();
        let returns = doc.returns().unwrap();
        assert_eq!(returns.type_name.as_deref(), Some("int"));
        assert_eq!(returns.description.as_deref(), Some("The value."));
    }

    #[test]
    fn rtype_without_returns_creates_one() {
        let doc = parse("Short.\n\n:rtype: bool").unwrap();
        let returns = doc.returns().unwrap();
        assert_eq!(returns.type_name.as_deref(), Some("bool"));
        assert_eq!(returns.description, None);
    }

    #[test]
    fn raises_and_deprecation() {
        let doc = parse(":raises ValueError: If bad.\n:deprecation: 1.2.0 Use other.").unwrap();
        let raises: Vec<_> = doc.raises().collect();
        assert_eq!(raises[0].type_name.as_deref(), Some("ValueError"));
        let deprecated = doc.deprecation().unwrap();
        assert_eq!(deprecated.version.as_deref(), Some("1.2.0"));
        assert_eq!(deprecated.description.as_deref(), Some("Use other."));
    }

    #[test]
    fn generic_field_keeps_all_args() {
        let doc = parse(":ivar name str: Fooobar").unwrap();
        assert_eq!(doc.meta.len(), 1);
        assert_eq!(doc.meta[0].args(), &["ivar", "name", "str"]);
        assert_eq!(doc.meta[0].description(), Some("Fooobar"));
    }

    #[test]
    fn multiline_description_is_dedented() {
        let doc = parse(":param x: First line\n    second line\n    third line").unwrap();
        let param = doc.params().next().unwrap();
        assert_eq!(
            param.description.as_deref(),
            Some("First line\nsecond line\nthird line")
        );
    }

    #[test]
    fn missing_colon_is_an_error() {
        assert!(parse(":param x").is_err());
    }

    #[test]
    fn too_many_param_args_is_an_error() {
        assert!(parse(":param a b c d: nope").is_err());
    }
}
