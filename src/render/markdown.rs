//! Module page rendering.
//!
//! A page lists a module's type aliases, functions and classes. Function and
//! method blocks show the call signature in a fenced `python` block followed
//! by the normalized docstring: summary, arguments, returns and raises.

use std::collections::BTreeMap;

use apibook_core::metadata::ClassDetail;
use apibook_core::signature::{ParamDoc, Signature};
use apibook_python::symbols::{ClassSymbol, FunctionSymbol, Module, Parameter};

use super::{is_private, RenderOptions};

const INDENT_OPEN: &str = "<div style=\"padding-left: 20px;\">\n\n";
const INDENT_CLOSE: &str = "</div>\n\n";

/// Render one resolved module to markdown.
pub fn render_module(module: &Module, options: &RenderOptions) -> String {
    let mut md = if module.is_package() {
        format!("# package `{}`\n\n", module.display_name())
    } else {
        format!("# module `{}`\n\n", module.name)
    };

    if let Some(doc) = module.docstring.as_deref().filter(|d| !d.is_empty()) {
        md.push_str(doc);
        md.push_str("\n\n");
    }

    let aliases: Vec<_> = module
        .aliases
        .iter()
        .filter(|a| !is_private(&a.name))
        .collect();
    if !aliases.is_empty() {
        md.push_str("## Type Aliases\n\n");
        for alias in aliases {
            md.push_str(&format!("`type {}`: `{}`\n\n", alias.name, alias.type_name));
        }
    }

    let functions: Vec<_> = module
        .functions
        .iter()
        .filter(|f| !is_private(&f.name))
        .collect();
    if !functions.is_empty() {
        md.push_str("## Functions\n\n");
        for function in functions {
            md.push_str(&render_function(function, None, options));
        }
    }

    let classes: Vec<_> = module
        .classes
        .iter()
        .filter(|c| !is_private(&c.name))
        .collect();
    if !classes.is_empty() {
        md.push_str("## Classes\n\n");
        for class in classes {
            md.push_str(&render_class(class, options));
        }
    }

    md
}

// ============================================================================
// Classes
// ============================================================================

fn render_class(class: &ClassSymbol, options: &RenderOptions) -> String {
    let bases = if class.bases.is_empty() {
        String::new()
    } else {
        format!("({})", class.bases.join(", "))
    };
    let mut md = format!("### `class {}{}:`\n\n", class.name, bases);
    md.push_str(INDENT_OPEN);

    if !class.decorators.is_empty() {
        let decorators: Vec<String> = class
            .decorators
            .iter()
            .map(|d| format!("`{}`", d))
            .collect();
        md.push_str(&decorators.join(" "));
        md.push_str("\n\n");
    }

    let docstring = class.docstring.as_deref().unwrap_or_default();
    let signature = class.docstring.as_deref().map(Signature::parse);
    if let Some(signature) = signature.as_ref().filter(|s| !s.summary.is_empty()) {
        md.push_str(&signature.summary);
        md.push_str("\n\n");
    }

    let fields = field_lines(class, &ClassDetail::new().with_docstring_source(docstring));
    if !fields.is_empty() {
        md.push_str("#### Fields\n\n");
        for line in fields {
            md.push_str(&line);
            md.push_str("\n\n");
        }
    }

    let methods: Vec<_> = class
        .methods
        .iter()
        .filter(|m| options.method_visible(&m.name))
        .collect();
    if !methods.is_empty() {
        md.push_str("#### Methods\n\n");
        for method in methods {
            let extra = if method.name == "__init__" {
                signature.as_ref()
            } else {
                None
            };
            md.push_str(&render_function(method, extra, options));
        }
    }

    md.push_str(INDENT_CLOSE);
    md
}

/// Field bullets: annotated fields first, then fields only the docstring
/// mentions. Descriptions come from the class docstring.
fn field_lines(class: &ClassSymbol, detail: &ClassDetail) -> Vec<String> {
    let mut lines = Vec::new();

    for field in class.fields.iter().filter(|f| !is_private(&f.name)) {
        let mut line = format!("- `{}`: `{}`", field.name, field.type_name);
        if let Some(default) = &field.default {
            line.push_str(&format!(" = `{}`", default));
        }
        if let Some(desc) = detail.by_name(&field.name).and_then(|d| d.description.as_ref()) {
            line.push_str(&format!(" - {}", desc));
        }
        lines.push(line);
    }

    for documented in &detail.fields {
        if is_private(&documented.name) || class.fields.iter().any(|f| f.name == documented.name)
        {
            continue;
        }
        let mut line = format!("- `{}`", documented.name);
        if let Some(type_name) = &documented.type_name {
            line.push_str(&format!(": `{}`", type_name));
        }
        if let Some(desc) = &documented.description {
            line.push_str(&format!(" - {}", desc));
        }
        lines.push(line);
    }

    lines
}

// ============================================================================
// Functions
// ============================================================================

/// Source-style text of one parameter: `name: type = default`.
fn param_text(param: &Parameter, prefix: &str) -> String {
    let mut text = format!("{}{}", prefix, param.name);
    if let Some(annotation) = &param.annotation {
        text.push_str(&format!(": {}", annotation));
    }
    if let Some(default) = &param.default {
        if param.annotation.is_some() {
            text.push_str(&format!(" = {}", default));
        } else {
            text.push_str(&format!("={}", default));
        }
    }
    text
}

/// Every parameter of a signature in declaration order, including the
/// receiver and the `*` separator before keyword-only parameters.
fn signature_params(function: &FunctionSymbol) -> Vec<String> {
    let mut params: Vec<String> = function.params.iter().map(|p| param_text(p, "")).collect();
    match &function.var_positional {
        Some(var) => params.push(param_text(var, "*")),
        None if !function.kwonly_params.is_empty() => params.push("*".to_string()),
        None => {}
    }
    params.extend(function.kwonly_params.iter().map(|p| param_text(p, "")));
    if let Some(var) = &function.var_keyword {
        params.push(param_text(var, "**"));
    }
    params
}

/// Bare names of every parameter, the part of a signature measured against
/// the width budget.
fn param_names(function: &FunctionSymbol) -> Vec<&str> {
    function
        .params
        .iter()
        .chain(&function.var_positional)
        .chain(&function.kwonly_params)
        .chain(&function.var_keyword)
        .map(|p| p.name.as_str())
        .collect()
}

fn render_signature(function: &FunctionSymbol, width: usize) -> String {
    let params = signature_params(function);
    let returns = function
        .returns
        .as_ref()
        .map(|r| format!(" -> {}", r))
        .unwrap_or_default();

    let measured = param_names(function).join(", ");
    let args = if function.name.len() + measured.len() + returns.len() > width {
        format!("\n    {},\n", params.join(",\n    "))
    } else {
        params.join(", ")
    };

    let mut md = String::from("```python\n");
    for decorator in &function.decorators {
        md.push_str(&decorator.to_string());
        md.push('\n');
    }
    if function.is_async {
        md.push_str("async ");
    }
    md.push_str(&format!("def {}({}){}\n```\n\n", function.name, args, returns));
    md
}

/// Render a function or method block.
///
/// # Arguments
///
/// * `function` - The function to render
/// * `extra` - Class-level signature merged into `__init__` argument docs
/// * `options` - Rendering options
fn render_function(
    function: &FunctionSymbol,
    extra: Option<&Signature>,
    options: &RenderOptions,
) -> String {
    let mut md = render_signature(function, options.signature_width);
    md.push_str(INDENT_OPEN);

    if function.docstring.is_some() || extra.is_some() {
        let signature = Signature::parse(function.docstring.as_deref().unwrap_or_default());
        let docs = Signature::merged_params(&signature, extra);

        if !signature.summary.is_empty() {
            md.push_str(&signature.summary);
            md.push_str("\n\n");
        }

        let mut arguments: Vec<String> = function
            .arguments()
            .iter()
            .chain(&function.kwonly_params)
            .map(|p| argument_line(p, &p.name, &docs))
            .collect();
        if let Some(var) = &function.var_positional {
            arguments.push(argument_line(var, &format!("*{}", var.name), &docs));
        }
        if let Some(var) = &function.var_keyword {
            arguments.push(argument_line(var, &format!("**{}", var.name), &docs));
        }
        if !arguments.is_empty() {
            md.push_str("**Arguments**:\n\n");
            for line in arguments {
                md.push_str(&line);
                md.push('\n');
            }
            md.push('\n');
        }

        if !signature.returns.is_empty() {
            md.push_str("**Returns**:\n\n");
            for ret in &signature.returns {
                md.push_str(&format!("- {}\n", ret));
            }
            md.push('\n');
        }

        if !signature.raises.is_empty() {
            md.push_str("**Raises**:\n\n");
            for raises in &signature.raises {
                let mut line = String::from("-");
                if let Some(type_name) = &raises.type_name {
                    line.push_str(&format!(" `{}`", type_name));
                }
                if let Some(desc) = &raises.description {
                    if raises.type_name.is_some() {
                        line.push(':');
                    }
                    line.push_str(&format!(" {}", desc));
                }
                md.push_str(&line);
                md.push('\n');
            }
            md.push('\n');
        }
    }

    md.push_str(INDENT_CLOSE);
    md
}

/// One `**Arguments**` bullet.
///
/// The declared annotation wins over the docstring type and the declared
/// default wins over the docstring default. Variadic parameters are looked
/// up with and without their star prefix.
fn argument_line(param: &Parameter, label: &str, docs: &BTreeMap<String, ParamDoc>) -> String {
    let doc = docs.get(label).or_else(|| docs.get(&param.name));

    let type_name = param
        .annotation
        .as_ref()
        .or_else(|| doc.and_then(|d| d.type_name.as_ref()));
    let mut line = match type_name {
        Some(type_name) => format!("- `{}({})`", label, type_name),
        None => format!("- `{}`", label),
    };

    if let Some(desc) = doc.and_then(|d| d.description.as_ref()) {
        line.push_str(&format!(": {}", desc));
    }

    let default = param
        .default
        .as_ref()
        .or_else(|| doc.and_then(|d| d.default.as_ref()));
    if let Some(default) = default {
        line.push_str(&format!(" (_default: {}_)", default));
    }
    line
}
