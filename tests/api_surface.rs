//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Model Builder
// ============================================================================

use apibook::docstring::{
    parse, parse_with_style, Docstring, DocstringDeprecated, DocstringError, DocstringMeta,
    DocstringOther, DocstringParam, DocstringRaises, DocstringReturns, DocstringStyle,
};
use apibook::error::{ApibookError, OutputErrorCode};
use apibook::metadata::{ClassDetail, Field, FieldKind};
use apibook::signature::{ParamDoc, RaisesDoc, Signature};

use apibook::extract::{extract_module, ExtractError};
use apibook::files::{collect_python_files, path_to_module, root_module, FileError};
use apibook::reexport::{resolve_reexports, ResolutionReport, ResolveError, SoftMiss};
use apibook::registry::ModuleRegistry;
use apibook::symbols::{
    ClassSymbol, Decorator, FieldSymbol, FunctionSymbol, Import, ImportTarget, ImportedName,
    Literal, Module, Parameter, Symbol, TypeAlias, Variable,
};

// ============================================================================
// Output Side
// ============================================================================

use apibook::config::{ApibookConfig, Config, CONFIG_FILE_NAME};
use apibook::generate::{build_model, generate, GenerateOptions, GenerateReport};
use apibook::render::{
    output_file_name, render_module, render_summary, render_toc, RenderOptions,
    DEFAULT_SUMMARY_TEMPLATE, TOC_PLACEHOLDER,
};

#[test]
fn api_surface_compiles() {
    // The imports above are the test.
}
