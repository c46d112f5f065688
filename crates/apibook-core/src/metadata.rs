//! Class attribute documentation gathered from class docstrings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::docstring::{self, DocstringMeta};

/// Where a documented field lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Instance variable (`ivar`).
    Instance,
    /// Class variable (`cvar`).
    Class,
    /// Module variable (`var`).
    Module,
    /// Unknown or unspecified location.
    #[default]
    Unknown,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Instance => "instance",
            FieldKind::Class => "class",
            FieldKind::Module => "module",
            FieldKind::Unknown => "unknown",
        }
    }

    /// Map a docstring tag to a field kind.
    ///
    /// Unrecognized tags log a warning and map to [`FieldKind::Unknown`].
    pub fn from_tag(tag: &str) -> FieldKind {
        match tag {
            "ivar" => FieldKind::Instance,
            "cvar" => FieldKind::Class,
            "var" => FieldKind::Module,
            other => {
                warn!("Unknown field kind: {:?}", other);
                FieldKind::Unknown
            }
        }
    }
}

impl FromStr for FieldKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FieldKind::from_tag(s))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One documented class field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub type_name: Option<String>,
    pub description: Option<String>,
    pub kind: FieldKind,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        type_name: Option<&str>,
        description: Option<&str>,
    ) -> Self {
        Field {
            name: name.into(),
            type_name: type_name.map(str::to_string),
            description: description.map(str::to_string),
            kind: FieldKind::Unknown,
        }
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Class information combined from several docstring sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDetail {
    pub fields: Vec<Field>,
}

impl ClassDetail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn by_name_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Add the fields documented in a class docstring.
    ///
    /// `Attributes` sections create fields of unknown kind. `ivar`, `cvar` and
    /// `var` tags create fields of the matching kind, or update the
    /// description of a field seen earlier. epydoc `@type name:` tags set the
    /// type of a field seen earlier.
    pub fn with_docstring_source(mut self, docstring: &str) -> Self {
        let parsed = docstring::parse(docstring);

        for meta in &parsed.meta {
            debug!("Processing item {:?}", meta);
            let args = meta.args();
            match (meta.key(), meta) {
                ("attribute", DocstringMeta::Param(param)) => {
                    self.fields.push(Field {
                        name: param.arg_name.clone(),
                        type_name: param.type_name.clone(),
                        description: param.description.clone(),
                        kind: FieldKind::Unknown,
                    });
                }
                ("type", DocstringMeta::Param(param)) => {
                    if let Some(field) = self.by_name_mut(&param.arg_name) {
                        field.type_name = param.type_name.clone();
                    }
                }
                ("ivar" | "cvar" | "var", _) => {
                    let Some(name) = args.get(1) else {
                        continue;
                    };
                    let description = meta.description().map(str::to_string);
                    match self.by_name_mut(name) {
                        Some(field) => field.description = description,
                        None => self.fields.push(Field {
                            name: name.clone(),
                            type_name: args.get(2).cloned(),
                            description,
                            kind: FieldKind::from_tag(&args[0]),
                        }),
                    }
                }
                _ => {}
            }
        }

        self
    }
}
