//! Symbol model for extracted Python modules.
//!
//! A [`Module`] is the symbol table of one source file: its classes, functions,
//! module-level variables, type aliases and imports, in declaration order, plus
//! the names its `__all__` list exports. Type and default expressions are kept
//! as opaque source text; nothing is evaluated.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Suffix of a package's own module name (`pkg.__init__`).
pub const PACKAGE_SUFFIX: &str = ".__init__";

// ============================================================================
// Literals
// ============================================================================

/// A literal value, as accepted in decorator arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    None,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Ellipsis,
    Tuple(Vec<Literal>),
    List(Vec<Literal>),
}

/// Quote a string the way Python's `repr` does.
fn quote(text: &str, prefix: &str) -> String {
    let delim = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2 + prefix.len());
    out.push_str(prefix);
    out.push(delim);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

fn join_literals(items: &[Literal]) -> String {
    items
        .iter()
        .map(Literal::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => write!(f, "None"),
            Literal::Bool(true) => write!(f, "True"),
            Literal::Bool(false) => write!(f, "False"),
            Literal::Int(value) => write!(f, "{}", value),
            Literal::Float(value) => write!(f, "{:?}", value),
            Literal::Str(value) => write!(f, "{}", quote(value, "")),
            Literal::Bytes(value) => {
                write!(f, "{}", quote(&String::from_utf8_lossy(value), "b"))
            }
            Literal::Ellipsis => write!(f, "..."),
            Literal::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0]),
            Literal::Tuple(items) => write!(f, "({})", join_literals(items)),
            Literal::List(items) => write!(f, "[{}]", join_literals(items)),
        }
    }
}

// ============================================================================
// Symbols
// ============================================================================

/// One applied decorator.
///
/// `args` and `kwargs` are both `None` for a bare decorator (`@name`) and both
/// `Some` when the decorator was called (`@name(...)`), even with no arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decorator {
    pub name: String,
    pub args: Option<Vec<Literal>>,
    pub kwargs: Option<BTreeMap<String, Literal>>,
}

impl Decorator {
    pub fn bare(name: impl Into<String>) -> Self {
        Decorator {
            name: name.into(),
            args: None,
            kwargs: None,
        }
    }

    pub fn is_bare(&self) -> bool {
        self.args.is_none() && self.kwargs.is_none()
    }
}

impl fmt::Display for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if self.is_bare() {
            return Ok(());
        }
        let mut parts: Vec<String> = self
            .args
            .iter()
            .flatten()
            .map(Literal::to_string)
            .collect();
        parts.extend(
            self.kwargs
                .iter()
                .flatten()
                .map(|(key, value)| format!("{}={}", key, value)),
        );
        write!(f, "({})", parts.join(", "))
    }
}

/// One function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub annotation: Option<String>,
    pub default: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            annotation: None,
            default: None,
        }
    }
}

/// A function or method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub name: String,
    /// Positional-only and positional-or-keyword parameters, in order.
    pub params: Vec<Parameter>,
    /// Keyword-only parameters, in order.
    pub kwonly_params: Vec<Parameter>,
    /// `*args`, if declared.
    pub var_positional: Option<Parameter>,
    /// `**kwargs`, if declared.
    pub var_keyword: Option<Parameter>,
    /// Return annotation text.
    pub returns: Option<String>,
    pub docstring: Option<String>,
    pub decorators: Vec<Decorator>,
    pub is_async: bool,
    /// The first positional parameter is a method receiver (`self`/`cls`).
    pub receiver: bool,
}

impl FunctionSymbol {
    /// Positional parameters without the receiver.
    pub fn arguments(&self) -> &[Parameter] {
        if self.receiver {
            self.params.get(1..).unwrap_or(&[])
        } else {
            &self.params
        }
    }
}

/// An annotated class attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSymbol {
    pub name: String,
    pub type_name: String,
    /// Unevaluated default expression.
    pub default: Option<String>,
}

/// A class definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSymbol {
    pub name: String,
    pub bases: Vec<String>,
    pub fields: Vec<FieldSymbol>,
    pub methods: Vec<FunctionSymbol>,
    pub decorators: Vec<Decorator>,
    pub docstring: Option<String>,
}

impl ClassSymbol {
    pub fn method(&self, name: &str) -> Option<&FunctionSymbol> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A module-level `X: TypeAlias = ...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAlias {
    pub name: String,
    pub type_name: String,
}

/// Any other module-level assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    /// Assigned expression, absent for a bare annotation.
    pub value: Option<String>,
    pub annotation: Option<String>,
}

/// A name imported by a `from` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedName {
    /// The name bound in the importing module.
    pub fn bound_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// An import statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Import {
    /// `import a.b [as c]`, one per alias.
    Naked {
        module: String,
        alias: Option<String>,
    },
    /// `from [.]*a.b import x [as y], ...`
    From {
        module: Option<String>,
        names: Vec<ImportedName>,
        /// Number of leading dots, 0 for absolute imports.
        level: u32,
    },
}

impl Import {
    /// Whether this import binds `name` in the importing module.
    pub fn binds(&self, name: &str) -> bool {
        match self {
            Import::Naked { module, alias } => alias.as_deref().unwrap_or(module) == name,
            Import::From { names, .. } => names.iter().any(|n| n.bound_name() == name),
        }
    }
}

/// Where an imported name is defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
    /// Dotted name of the defining module.
    pub module: String,
    /// Name of the item inside that module.
    pub item: String,
}

impl ImportTarget {
    /// The fully qualified item name (`module.item`).
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.module, self.item)
    }
}

/// Any symbol a module can export.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Class(ClassSymbol),
    Function(FunctionSymbol),
    Variable(Variable),
    Alias(TypeAlias),
    Import(Import),
}

impl Symbol {
    pub fn kind(&self) -> &'static str {
        match self {
            Symbol::Class(_) => "class",
            Symbol::Function(_) => "function",
            Symbol::Variable(_) => "variable",
            Symbol::Alias(_) => "alias",
            Symbol::Import(_) => "import",
        }
    }
}

// ============================================================================
// Module
// ============================================================================

/// The symbol table of one source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Dotted module name, `pkg.__init__` for a package.
    pub name: String,
    pub docstring: Option<String>,
    pub classes: Vec<ClassSymbol>,
    pub functions: Vec<FunctionSymbol>,
    pub variables: Vec<Variable>,
    pub aliases: Vec<TypeAlias>,
    pub imports: Vec<Import>,
    /// Names listed in `__all__`, in declaration order.
    pub exports: Vec<String>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether this module is a package's `__init__`.
    pub fn is_package(&self) -> bool {
        self.name.ends_with(PACKAGE_SUFFIX) || self.name == "__init__"
    }

    /// The module name without a trailing `.__init__`.
    pub fn display_name(&self) -> &str {
        self.name.strip_suffix(PACKAGE_SUFFIX).unwrap_or(&self.name)
    }

    /// Find a symbol by name.
    ///
    /// Lookup order: classes, functions, variables, aliases, imports.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        if let Some(class) = self.classes.iter().find(|c| c.name == name) {
            return Some(Symbol::Class(class.clone()));
        }
        if let Some(function) = self.functions.iter().find(|f| f.name == name) {
            return Some(Symbol::Function(function.clone()));
        }
        if let Some(variable) = self.variables.iter().find(|v| v.name == name) {
            return Some(Symbol::Variable(variable.clone()));
        }
        if let Some(alias) = self.aliases.iter().find(|a| a.name == name) {
            return Some(Symbol::Alias(alias.clone()));
        }
        self.imports
            .iter()
            .find(|i| i.binds(name))
            .map(|i| Symbol::Import(i.clone()))
    }

    /// Append a symbol to the list of its kind.
    ///
    /// Returns `false` (and leaves the module untouched) when a symbol of the
    /// same kind and name is already present.
    pub fn push(&mut self, symbol: Symbol) -> bool {
        match symbol {
            Symbol::Class(class) => {
                if self.classes.iter().any(|c| c.name == class.name) {
                    return false;
                }
                self.classes.push(class);
            }
            Symbol::Function(function) => {
                if self.functions.iter().any(|f| f.name == function.name) {
                    return false;
                }
                self.functions.push(function);
            }
            Symbol::Variable(variable) => {
                if self.variables.iter().any(|v| v.name == variable.name) {
                    return false;
                }
                self.variables.push(variable);
            }
            Symbol::Alias(alias) => {
                if self.aliases.iter().any(|a| a.name == alias.name) {
                    return false;
                }
                self.aliases.push(alias);
            }
            Symbol::Import(import) => {
                if self.imports.contains(&import) {
                    return false;
                }
                self.imports.push(import);
            }
        }
        true
    }

    /// Resolve a name bound by one of this module's imports to the module
    /// that defines it.
    ///
    /// Relative imports are rewritten against this module's dotted name: a
    /// depth of `n` drops `n` trailing components before appending the
    /// imported module. A `from . import x` (no module) resolves to this
    /// module with `n - 1` trailing components dropped. `import a.b as x`
    /// resolves to module `a`, item `b`.
    ///
    /// Returns `None` when no import binds the name.
    pub fn resolve_import(&self, name: &str) -> Option<ImportTarget> {
        for import in &self.imports {
            match import {
                Import::From {
                    module,
                    names,
                    level,
                } => {
                    let Some(imported) = names.iter().find(|n| n.bound_name() == name) else {
                        continue;
                    };
                    let item = imported.name.clone();
                    let level = *level as usize;
                    let target = match (module, level) {
                        (Some(module), 0) => module.clone(),
                        (Some(module), _) => {
                            let mut parts = self.parent_parts(level);
                            parts.push(module.as_str());
                            parts.join(".")
                        }
                        (None, 0) => self.name.clone(),
                        (None, _) => self.parent_parts(level - 1).join("."),
                    };
                    return Some(ImportTarget {
                        module: target,
                        item,
                    });
                }
                Import::Naked { module, alias } => {
                    if alias.as_deref().unwrap_or(module) != name {
                        continue;
                    }
                    let target = match module.rsplit_once('.') {
                        Some((parent, item)) => ImportTarget {
                            module: parent.to_string(),
                            item: item.to_string(),
                        },
                        None => ImportTarget {
                            module: module.clone(),
                            item: name.to_string(),
                        },
                    };
                    return Some(target);
                }
            }
        }
        None
    }

    /// Components of this module's name with `drop` trailing ones removed.
    fn parent_parts(&self, drop: usize) -> Vec<&str> {
        let parts: Vec<&str> = self.name.split('.').collect();
        let keep = parts.len().saturating_sub(drop);
        parts[..keep].to_vec()
    }
}
