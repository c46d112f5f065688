//! Symbol extraction from Python source.
//!
//! [`extract_module`] parses one file and walks its module-level statements
//! into a [`Module`]. The walk covers the module body and the bodies of
//! module-level `if` and `try` blocks, so imports guarded by
//! `if TYPE_CHECKING:` or `try: ... except ImportError:` are recorded too.
//! Function bodies are never walked.
//!
//! Expressions are recorded as their source text with line breaks collapsed.
//! Two annotation positions are checked strictly: return annotations and
//! keyword-only defaults. A shape outside the recognized set there is a fatal
//! [`ExtractError`] so that gaps in the extractor surface instead of
//! producing silently wrong pages.

use std::collections::BTreeMap;

use rustpython_parser::ast::{self, Constant, Expr, Ranged, Stmt, UnaryOp};
use rustpython_parser::Parse;
use thiserror::Error;
use tracing::debug;

use apibook_core::error::ApibookError;
use apibook_core::text::{cleandoc, single_line};

use crate::symbols::{
    ClassSymbol, Decorator, FieldSymbol, FunctionSymbol, Import, ImportedName, Literal, Module,
    Parameter, TypeAlias, Variable,
};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while extracting a module.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The file is not valid Python.
    #[error("syntax error in {path}: {message}")]
    Syntax { path: String, message: String },

    /// A return annotation shape the extractor does not model.
    #[error("unknown return annotation in function {function:?} of {module}: {node}")]
    UnsupportedReturn {
        module: String,
        function: String,
        node: String,
    },

    /// A keyword-only default shape the extractor does not model.
    #[error(
        "unknown default value in function {function:?} of {module} for parameter {param:?}: {node}"
    )]
    UnsupportedDefault {
        module: String,
        function: String,
        param: String,
        node: String,
    },

    /// Two files map to the same dotted module name.
    #[error("duplicate module name '{name}'")]
    DuplicateModule { name: String },
}

/// Result type for extraction.
pub type ExtractResult<T> = Result<T, ExtractError>;

impl From<ExtractError> for ApibookError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Syntax { path, message } => ApibookError::Syntax { path, message },
            ExtractError::UnsupportedReturn { ref module, .. }
            | ExtractError::UnsupportedDefault { ref module, .. } => ApibookError::ExtractorGap {
                module: module.clone(),
                message: err.to_string(),
            },
            ExtractError::DuplicateModule { name } => ApibookError::DuplicateModule { name },
        }
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Extract the symbol table of one source file.
///
/// # Arguments
///
/// * `name` - Dotted module name (`pkg.__init__` for a package)
/// * `source` - File contents
/// * `path` - Path used in diagnostics
pub fn extract_module(name: &str, source: &str, path: &str) -> ExtractResult<Module> {
    let suite = ast::Suite::parse(source, path).map_err(|e| ExtractError::Syntax {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    let mut collector = ModuleCollector::new(name, source);
    collector.module.docstring = docstring(&suite);
    collector.visit_body(&suite)?;
    Ok(collector.module)
}

// ============================================================================
// Collector
// ============================================================================

/// Walks module-level statements, accumulating symbols.
struct ModuleCollector<'src> {
    source: &'src str,
    module: Module,
}

impl<'src> ModuleCollector<'src> {
    fn new(name: &str, source: &'src str) -> Self {
        ModuleCollector {
            source,
            module: Module::new(name),
        }
    }

    /// Source text of a node, on one line.
    fn text<N: Ranged>(&self, node: &N) -> String {
        let range = node.range();
        let start = usize::from(range.start());
        let end = usize::from(range.end());
        single_line(self.source.get(start..end).unwrap_or_default())
    }

    fn visit_body(&mut self, body: &[Stmt]) -> ExtractResult<()> {
        for stmt in body {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> ExtractResult<()> {
        match stmt {
            Stmt::ClassDef(class) => {
                let class = self.class(class)?;
                self.module.classes.push(class);
            }
            Stmt::FunctionDef(f) => {
                let function = self.function(
                    FunctionParts {
                        name: f.name.as_str(),
                        args: &f.args,
                        body: &f.body,
                        decorators: &f.decorator_list,
                        returns: f.returns.as_deref(),
                        is_async: false,
                    },
                    false,
                )?;
                self.module.functions.push(function);
            }
            Stmt::AsyncFunctionDef(f) => {
                let function = self.function(
                    FunctionParts {
                        name: f.name.as_str(),
                        args: &f.args,
                        body: &f.body,
                        decorators: &f.decorator_list,
                        returns: f.returns.as_deref(),
                        is_async: true,
                    },
                    false,
                )?;
                self.module.functions.push(function);
            }
            Stmt::Assign(assign) => self.visit_assign(assign),
            Stmt::AnnAssign(assign) => self.visit_ann_assign(assign),
            Stmt::TypeAlias(alias) => {
                let alias = TypeAlias {
                    name: self.text(alias.name.as_ref()),
                    type_name: self.text(alias.value.as_ref()),
                };
                self.module.aliases.push(alias);
            }
            Stmt::AugAssign(assign) => {
                if is_all_target(&assign.target) && matches!(assign.op, ast::Operator::Add) {
                    collect_exports(&assign.value, &mut self.module.exports);
                }
            }
            Stmt::Import(import) => {
                for alias in &import.names {
                    self.module.imports.push(Import::Naked {
                        module: alias.name.as_str().to_string(),
                        alias: alias.asname.as_ref().map(|a| a.as_str().to_string()),
                    });
                }
            }
            Stmt::ImportFrom(import) => {
                self.module.imports.push(Import::From {
                    module: import.module.as_ref().map(|m| m.as_str().to_string()),
                    names: import
                        .names
                        .iter()
                        .map(|alias| ImportedName {
                            name: alias.name.as_str().to_string(),
                            alias: alias.asname.as_ref().map(|a| a.as_str().to_string()),
                        })
                        .collect(),
                    level: import.level.map_or(0, |level| level.to_u32()),
                });
            }
            Stmt::If(block) => {
                self.visit_body(&block.body)?;
                self.visit_body(&block.orelse)?;
            }
            Stmt::Try(block) => {
                self.visit_body(&block.body)?;
                for handler in &block.handlers {
                    let ast::ExceptHandler::ExceptHandler(handler) = handler;
                    self.visit_body(&handler.body)?;
                }
                self.visit_body(&block.orelse)?;
                self.visit_body(&block.finalbody)?;
            }
            Stmt::TryStar(block) => {
                self.visit_body(&block.body)?;
                for handler in &block.handlers {
                    let ast::ExceptHandler::ExceptHandler(handler) = handler;
                    self.visit_body(&handler.body)?;
                }
                self.visit_body(&block.orelse)?;
                self.visit_body(&block.finalbody)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn visit_assign(&mut self, assign: &ast::StmtAssign) {
        if assign.targets.len() == 1 && is_all_target(&assign.targets[0]) {
            self.module.exports.clear();
            collect_exports(&assign.value, &mut self.module.exports);
            return;
        }
        let value = self.text(assign.value.as_ref());
        for target in &assign.targets {
            let variable = Variable {
                name: self.text(target),
                value: Some(value.clone()),
                annotation: None,
            };
            self.module.variables.push(variable);
        }
    }

    fn visit_ann_assign(&mut self, assign: &ast::StmtAnnAssign) {
        if is_all_target(&assign.target) {
            if let Some(value) = &assign.value {
                self.module.exports.clear();
                collect_exports(value, &mut self.module.exports);
            }
            return;
        }

        let name = self.text(assign.target.as_ref());
        let annotation = self.text(assign.annotation.as_ref());
        match &assign.value {
            Some(value) if is_type_alias_annotation(&assign.annotation) => {
                let alias = TypeAlias {
                    name,
                    type_name: self.text(value.as_ref()),
                };
                self.module.aliases.push(alias);
            }
            value => {
                let variable = Variable {
                    name,
                    value: value.as_deref().map(|v| self.text(v)),
                    annotation: Some(annotation),
                };
                self.module.variables.push(variable);
            }
        }
    }

    fn class(&self, class: &ast::StmtClassDef) -> ExtractResult<ClassSymbol> {
        let mut fields = Vec::new();
        let mut methods = Vec::new();

        for stmt in &class.body {
            match stmt {
                Stmt::AnnAssign(assign) => {
                    let Expr::Name(target) = assign.target.as_ref() else {
                        continue;
                    };
                    fields.push(FieldSymbol {
                        name: target.id.as_str().to_string(),
                        type_name: self.text(assign.annotation.as_ref()),
                        default: assign.value.as_deref().map(|v| self.text(v)),
                    });
                }
                Stmt::FunctionDef(f) => methods.push(self.function(
                    FunctionParts {
                        name: f.name.as_str(),
                        args: &f.args,
                        body: &f.body,
                        decorators: &f.decorator_list,
                        returns: f.returns.as_deref(),
                        is_async: false,
                    },
                    true,
                )?),
                Stmt::AsyncFunctionDef(f) => methods.push(self.function(
                    FunctionParts {
                        name: f.name.as_str(),
                        args: &f.args,
                        body: &f.body,
                        decorators: &f.decorator_list,
                        returns: f.returns.as_deref(),
                        is_async: true,
                    },
                    true,
                )?),
                _ => {}
            }
        }

        Ok(ClassSymbol {
            name: class.name.as_str().to_string(),
            bases: class.bases.iter().map(|b| self.text(b)).collect(),
            fields,
            methods,
            decorators: self.decorators(&class.decorator_list),
            docstring: docstring(&class.body),
        })
    }

    fn function(&self, f: FunctionParts<'_>, is_method: bool) -> ExtractResult<FunctionSymbol> {
        let args = f.args;

        let params: Vec<Parameter> = args
            .posonlyargs
            .iter()
            .chain(args.args.iter())
            .map(|arg| Parameter {
                name: arg.def.arg.as_str().to_string(),
                annotation: arg.def.annotation.as_deref().map(|a| self.text(a)),
                default: arg.default.as_deref().map(|d| self.text(d)),
            })
            .collect();

        let mut kwonly_params = Vec::with_capacity(args.kwonlyargs.len());
        for arg in &args.kwonlyargs {
            let name = arg.def.arg.as_str();
            let default = match arg.default.as_deref() {
                Some(default) => Some(self.kwonly_default(f.name, name, default)?),
                None => None,
            };
            kwonly_params.push(Parameter {
                name: name.to_string(),
                annotation: arg.def.annotation.as_deref().map(|a| self.text(a)),
                default,
            });
        }

        let receiver = is_method
            && params
                .first()
                .is_some_and(|p| p.name == "self" || p.name == "cls");

        Ok(FunctionSymbol {
            name: f.name.to_string(),
            var_positional: args.vararg.as_deref().map(|a| self.variadic(a)),
            var_keyword: args.kwarg.as_deref().map(|a| self.variadic(a)),
            params,
            kwonly_params,
            returns: self.returns(f.name, f.returns)?,
            docstring: docstring(f.body),
            decorators: self.decorators(f.decorators),
            is_async: f.is_async,
            receiver,
        })
    }

    fn variadic(&self, arg: &ast::Arg) -> Parameter {
        Parameter {
            name: arg.arg.as_str().to_string(),
            annotation: arg.annotation.as_deref().map(|a| self.text(a)),
            default: None,
        }
    }

    fn kwonly_default(&self, function: &str, param: &str, default: &Expr) -> ExtractResult<String> {
        match default {
            Expr::Lambda(_) => Ok("<lambda ...>".to_string()),
            Expr::Constant(_)
            | Expr::Name(_)
            | Expr::Attribute(_)
            | Expr::UnaryOp(_)
            | Expr::Tuple(_)
            | Expr::List(_)
            | Expr::Set(_)
            | Expr::Dict(_)
            | Expr::Call(_)
            | Expr::Subscript(_)
            | Expr::BinOp(_) => Ok(self.text(default)),
            other => Err(ExtractError::UnsupportedDefault {
                module: self.module.name.clone(),
                function: function.to_string(),
                param: param.to_string(),
                node: format!("{:?}", other),
            }),
        }
    }

    fn returns(&self, function: &str, returns: Option<&Expr>) -> ExtractResult<Option<String>> {
        let Some(returns) = returns else {
            return Ok(None);
        };
        match returns {
            Expr::Name(name) => Ok(Some(name.id.as_str().to_string())),
            Expr::Constant(constant) => match &constant.value {
                Constant::Str(value) => Ok(Some(value.clone())),
                Constant::None => Ok(Some("None".to_string())),
                _ => Ok(Some(self.text(returns))),
            },
            Expr::Subscript(_) | Expr::Attribute(_) | Expr::Tuple(_) | Expr::BinOp(_) => {
                Ok(Some(self.text(returns)))
            }
            other => Err(ExtractError::UnsupportedReturn {
                module: self.module.name.clone(),
                function: function.to_string(),
                node: format!("{:?}", other),
            }),
        }
    }

    fn decorators(&self, list: &[Expr]) -> Vec<Decorator> {
        list.iter().map(|d| self.decorator(d)).collect()
    }

    fn decorator(&self, expr: &Expr) -> Decorator {
        let Expr::Call(call) = expr else {
            return Decorator::bare(self.text(expr));
        };
        let name = self.text(call.func.as_ref());

        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            match literal(arg) {
                Some(value) => args.push(value),
                None => {
                    debug!(
                        "decorator @{} has a non-literal argument, recording it bare",
                        name
                    );
                    return Decorator::bare(name);
                }
            }
        }

        let mut kwargs = BTreeMap::new();
        for keyword in &call.keywords {
            let Some(key) = &keyword.arg else {
                debug!("decorator @{} unpacks a mapping, recording it bare", name);
                return Decorator::bare(name);
            };
            match literal(&keyword.value) {
                Some(value) => {
                    kwargs.insert(key.as_str().to_string(), value);
                }
                None => {
                    debug!(
                        "decorator @{} has a non-literal keyword {}, recording it bare",
                        name,
                        key.as_str()
                    );
                    return Decorator::bare(name);
                }
            }
        }

        Decorator {
            name,
            args: Some(args),
            kwargs: Some(kwargs),
        }
    }
}

/// The pieces of a sync or async function definition.
struct FunctionParts<'a> {
    name: &'a str,
    args: &'a ast::Arguments,
    body: &'a [Stmt],
    decorators: &'a [Expr],
    returns: Option<&'a Expr>,
    is_async: bool,
}

// ============================================================================
// Helpers
// ============================================================================

/// The cleaned docstring of a body, if its first statement is a string.
fn docstring(body: &[Stmt]) -> Option<String> {
    let Some(Stmt::Expr(expr)) = body.first() else {
        return None;
    };
    match expr.value.as_ref() {
        Expr::Constant(ast::ExprConstant {
            value: Constant::Str(text),
            ..
        }) => Some(cleandoc(text)),
        _ => None,
    }
}

fn is_all_target(target: &Expr) -> bool {
    matches!(target, Expr::Name(name) if name.id.as_str() == "__all__")
}

/// `TypeAlias` or any attribute path ending in `.TypeAlias`.
fn is_type_alias_annotation(annotation: &Expr) -> bool {
    match annotation {
        Expr::Name(name) => name.id.as_str() == "TypeAlias",
        Expr::Attribute(attr) => attr.attr.as_str() == "TypeAlias",
        _ => false,
    }
}

/// Collect the string elements of an `__all__` value.
///
/// Lists and tuples contribute their string elements; `a + b` concatenations
/// are followed on both sides. Anything else is ignored.
fn collect_exports(value: &Expr, exports: &mut Vec<String>) {
    match value {
        Expr::List(ast::ExprList { elts, .. }) | Expr::Tuple(ast::ExprTuple { elts, .. }) => {
            for elt in elts {
                if let Expr::Constant(ast::ExprConstant {
                    value: Constant::Str(name),
                    ..
                }) = elt
                {
                    exports.push(name.clone());
                }
            }
        }
        Expr::BinOp(binop) if matches!(binop.op, ast::Operator::Add) => {
            collect_exports(&binop.left, exports);
            collect_exports(&binop.right, exports);
        }
        _ => {}
    }
}

fn constant_literal(constant: &Constant) -> Option<Literal> {
    match constant {
        Constant::None => Some(Literal::None),
        Constant::Bool(value) => Some(Literal::Bool(*value)),
        Constant::Str(value) => Some(Literal::Str(value.clone())),
        Constant::Bytes(value) => Some(Literal::Bytes(value.clone())),
        Constant::Int(value) => value.to_string().parse().ok().map(Literal::Int),
        Constant::Float(value) => Some(Literal::Float(*value)),
        Constant::Ellipsis => Some(Literal::Ellipsis),
        Constant::Tuple(items) => items
            .iter()
            .map(constant_literal)
            .collect::<Option<Vec<_>>>()
            .map(Literal::Tuple),
        Constant::Complex { .. } => None,
    }
}

/// Convert an expression to a literal value, if it is one.
fn literal(expr: &Expr) -> Option<Literal> {
    match expr {
        Expr::Constant(constant) => constant_literal(&constant.value),
        Expr::Tuple(tuple) => tuple
            .elts
            .iter()
            .map(literal)
            .collect::<Option<Vec<_>>>()
            .map(Literal::Tuple),
        Expr::List(list) => list
            .elts
            .iter()
            .map(literal)
            .collect::<Option<Vec<_>>>()
            .map(Literal::List),
        Expr::UnaryOp(unary) if matches!(unary.op, UnaryOp::USub) => {
            match literal(&unary.operand)? {
                Literal::Int(value) => Some(Literal::Int(-value)),
                Literal::Float(value) => Some(Literal::Float(-value)),
                _ => None,
            }
        }
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
