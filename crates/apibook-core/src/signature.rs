//! Docstring to signature normalization.
//!
//! A [`Signature`] is the dialect-independent view of one docstring: what each
//! parameter means, what comes back, what can be raised, and the free-text
//! summary. It is built from whatever dialect the docstring parser detects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::docstring;

/// Documentation for one parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDoc {
    pub name: String,
    pub type_name: Option<String>,
    pub default: Option<String>,
    pub description: Option<String>,
}

/// Documentation for one raised exception.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaisesDoc {
    pub type_name: Option<String>,
    pub description: Option<String>,
}

/// Normalized documentation for a callable or a class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Parameter documentation keyed by parameter name.
    pub params: BTreeMap<String, ParamDoc>,
    /// Return value descriptions, in order.
    pub returns: Vec<String>,
    /// Documented exceptions, in order.
    pub raises: Vec<RaisesDoc>,
    /// Short and long description joined by a blank line.
    pub summary: String,
}

impl Signature {
    /// Normalize a raw docstring.
    ///
    /// Backslashes are doubled before parsing so escape sequences survive as
    /// written. Parameter keys that look like attribute paths (`self.x`,
    /// `f(x)`) are stored under their type name, with name and type swapped.
    ///
    /// # Arguments
    ///
    /// * `docs` - The docstring text, possibly empty.
    pub fn parse(docs: &str) -> Signature {
        let doc = docstring::parse(&docs.replace('\\', "\\\\"));

        let mut params = BTreeMap::new();
        for param in doc.params() {
            let looks_like_path = param.arg_name.contains('(') || param.arg_name.contains('.');
            let entry = match (&param.type_name, looks_like_path) {
                (Some(type_name), true) => ParamDoc {
                    name: type_name.clone(),
                    type_name: Some(param.arg_name.clone()),
                    default: param.default.clone(),
                    description: param.description.clone(),
                },
                _ => ParamDoc {
                    name: param.arg_name.clone(),
                    type_name: param.type_name.clone(),
                    default: param.default.clone(),
                    description: param.description.clone(),
                },
            };
            params.insert(entry.name.clone(), entry);
        }

        let returns = doc
            .returns()
            .and_then(|r| r.description.clone().or_else(|| r.type_name.clone()))
            .into_iter()
            .collect();

        let raises = doc
            .raises()
            .map(|r| RaisesDoc {
                type_name: r.type_name.clone(),
                description: r.description.clone(),
            })
            .collect();

        let summary = [&doc.short_description, &doc.long_description]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n");

        Signature {
            params,
            returns,
            raises,
            summary,
        }
    }

    /// Look up the documentation of one parameter.
    pub fn param(&self, name: &str) -> Option<&ParamDoc> {
        self.params.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
            && self.returns.is_empty()
            && self.raises.is_empty()
            && self.summary.is_empty()
    }

    /// Merge the parameter documentation of a method with a fallback
    /// signature (typically the class docstring for `__init__`).
    ///
    /// On conflicting keys the method's own entry wins.
    pub fn merged_params(
        own: &Signature,
        fallback: Option<&Signature>,
    ) -> BTreeMap<String, ParamDoc> {
        let mut merged = fallback.map(|f| f.params.clone()).unwrap_or_default();
        for (name, doc) in &own.params {
            merged.insert(name.clone(), doc.clone());
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_signature() {
        let sig = Signature::parse(
            "Add two numbers.\n\nMore detail.\n\nArgs:\n    a (int): First.\n    b: Second. Defaults to 2.\n\nReturns:\n    The sum.\n\nRaises:\n    TypeError: On bad input.",
        );
        assert_eq!(sig.summary, "Add two numbers.\n\nMore detail.");
        assert_eq!(sig.params.len(), 2);
        let a = sig.param("a").unwrap();
        assert_eq!(a.type_name.as_deref(), Some("int"));
        assert_eq!(a.description.as_deref(), Some("First."));
        assert_eq!(sig.param("b").unwrap().default.as_deref(), Some("2"));
        assert_eq!(sig.returns, vec!["The sum."]);
        assert_eq!(sig.raises.len(), 1);
        assert_eq!(sig.raises[0].type_name.as_deref(), Some("TypeError"));
    }

    #[test]
    fn google_sections_without_summary() {
        let sig = Signature::parse("Args:\n    x: The x.\n    y: The y.");
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.param("y").unwrap().description.as_deref(), Some("The y."));
        assert!(sig.summary.is_empty());
    }

    #[test]
    fn empty_docstring_is_empty_signature() {
        let sig = Signature::parse("");
        assert!(sig.is_empty());
    }

    #[test]
    fn path_like_keys_are_swapped() {
        let sig = Signature::parse(":param handler self.callback: Called on events.");
        let doc = sig.param("handler").unwrap();
        assert_eq!(doc.name, "handler");
        assert_eq!(doc.type_name.as_deref(), Some("self.callback"));
    }

    #[test]
    fn path_like_key_without_type_keeps_name() {
        let sig = Signature::parse(":param self.x: The x.");
        assert!(sig.param("self.x").is_some());
    }

    #[test]
    fn returns_falls_back_to_type() {
        let sig = Signature::parse("Summary.\n\n:rtype: bool");
        assert_eq!(sig.returns, vec!["bool"]);
    }

    #[test]
    fn duplicate_params_keep_last() {
        let sig = Signature::parse(":param x: First.\n:param x: Second.");
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.param("x").unwrap().description.as_deref(), Some("Second."));
    }

    #[test]
    fn backslashes_survive() {
        let sig = Signature::parse(r"Match a \d pattern.");
        assert_eq!(sig.summary, r"Match a \\d pattern.");
    }

    #[test]
    fn serializes_params_by_name() {
        let sig = Signature::parse(":param x: The x.");
        let json = serde_json::to_value(&sig).unwrap();
        assert_eq!(json["params"]["x"]["description"], "The x.");
        assert_eq!(json["returns"], serde_json::json!([]));
    }

    #[test]
    fn merged_params_prefers_own() {
        let own = Signature::parse(":param x: Own x.");
        let class = Signature::parse(":param x: Class x.\n:param y: Class y.");
        let merged = Signature::merged_params(&own, Some(&class));
        assert_eq!(merged["x"].description.as_deref(), Some("Own x."));
        assert_eq!(merged["y"].description.as_deref(), Some("Class y."));

        let alone = Signature::merged_params(&own, None);
        assert_eq!(alone.len(), 1);
    }
}
