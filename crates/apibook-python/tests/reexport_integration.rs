//! Integration tests for collection, extraction and re-export resolution.
//!
//! Each test lays out a package on disk, runs the same steps a documentation
//! run performs, and checks the resolved registry.

use std::fs;
use std::path::Path;

use apibook_core::error::{ApibookError, OutputErrorCode};
use apibook_python::{
    collect_python_files, resolve_reexports, root_module, ModuleRegistry, ResolveError,
};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn build(root: &Path) -> Result<ModuleRegistry, ApibookError> {
    let files = collect_python_files(root, &[])?;
    let mut registry = ModuleRegistry::from_sources(&root_module(root)?, &files)?;
    resolve_reexports(&mut registry)?;
    Ok(registry)
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn package_surface_includes_reexports() {
    let dir = TempDir::new().unwrap();
    let pkg = dir.path().join("pkg");
    write(
        &pkg,
        "__init__.py",
        "\"\"\"The package.\"\"\"\nfrom .widget import Widget\nfrom .util import helper as make\n__all__ = [\"Widget\", \"make\"]\n",
    );
    write(
        &pkg,
        "widget.py",
        "class Widget:\n    \"\"\"A widget.\"\"\"\n    size: int = 3\n",
    );
    write(&pkg, "util.py", "def helper(x: int) -> int:\n    return x\n");

    let registry = build(&pkg).unwrap();
    let package = registry.get("pkg.__init__").unwrap();
    assert_eq!(package.docstring.as_deref(), Some("The package."));
    assert_eq!(package.classes.len(), 1);
    assert_eq!(package.classes[0].fields[0].default.as_deref(), Some("3"));
    assert_eq!(package.functions.len(), 1);
    assert_eq!(package.functions[0].name, "helper");
}

#[test]
fn nested_packages_resolve_against_their_own_name() {
    let dir = TempDir::new().unwrap();
    let pkg = dir.path().join("lib");
    write(&pkg, "__init__.py", "");
    write(
        &pkg,
        "sub/__init__.py",
        "from ..core import Engine\n__all__ = ['Engine']\n",
    );
    write(&pkg, "core.py", "class Engine:\n    pass\n");

    let registry = build(&pkg).unwrap();
    assert_eq!(registry.get("lib.sub.__init__").unwrap().classes.len(), 1);
}

#[test]
fn dangling_export_lists_known_modules() {
    let dir = TempDir::new().unwrap();
    let pkg = dir.path().join("pkg");
    write(&pkg, "__init__.py", "from .gone import X\n__all__ = ['X']\n");
    write(&pkg, "here.py", "X = 1\n");

    let files = collect_python_files(&pkg, &[]).unwrap();
    let mut registry = ModuleRegistry::from_sources("pkg", &files).unwrap();
    let err = resolve_reexports(&mut registry).unwrap_err();
    assert!(matches!(err, ResolveError::ModuleNotFound { .. }));

    let err = ApibookError::from(err);
    assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::ResolutionError);
    let message = err.to_string();
    assert!(message.contains("could not find module pkg.gone"));
    assert!(message.contains("\t\"pkg.__init__\"\n\t\"pkg.here\""));
}

#[test]
fn visitation_order_does_not_matter() {
    // Module names sort the re-exporting chain in both directions.
    let dir = TempDir::new().unwrap();
    let pkg = dir.path().join("pkg");
    write(&pkg, "a.py", "from .z import Item\n__all__ = ['Item']\n");
    write(&pkg, "z.py", "from .m import Item\n__all__ = ['Item']\n");
    write(&pkg, "m.py", "class Item:\n    pass\n");

    let registry = build(&pkg).unwrap();
    for name in ["pkg.a", "pkg.z"] {
        assert_eq!(registry.get(name).unwrap().classes.len(), 1, "{name}");
    }
}

// ============================================================================
// Fatal extraction errors
// ============================================================================

#[test]
fn syntax_error_names_the_file() {
    let dir = TempDir::new().unwrap();
    let pkg = dir.path().join("pkg");
    write(&pkg, "ok.py", "X = 1\n");
    write(&pkg, "bad.py", "class :\n");

    let err = build(&pkg).unwrap_err();
    assert_eq!(err.error_code(), OutputErrorCode::SyntaxError);
    assert!(err.to_string().contains("bad.py"));
}

#[test]
fn unsupported_return_is_an_extractor_gap() {
    let dir = TempDir::new().unwrap();
    let pkg = dir.path().join("pkg");
    write(&pkg, "f.py", "def f() -> [int]:\n    pass\n");

    let err = build(&pkg).unwrap_err();
    assert_eq!(err.error_code(), OutputErrorCode::ExtractorGap);
}
