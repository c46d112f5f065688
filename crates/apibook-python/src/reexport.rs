//! Re-export resolution.
//!
//! A package's `__all__` often names symbols that are imported rather than
//! defined locally. [`resolve_reexports`] finds the defining symbol of each
//! such export and splices a copy into the exporting module, so the page for
//! `pkg` documents `pkg.Widget` even when `Widget` lives in `pkg.widget`.
//!
//! Resolution runs in two passes. The first reads the registry exactly as
//! extraction left it and computes every splice. The second applies them.
//! The outcome therefore does not depend on the order modules are visited.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, info, warn};

use apibook_core::error::ApibookError;

use crate::registry::ModuleRegistry;
use crate::symbols::{ImportTarget, Module, Symbol, PACKAGE_SUFFIX};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while resolving re-exports.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Neither the defining module nor its package `__init__` is registered.
    #[error("could not find module {module} or {module}.__init__ (exported as '{export}' from {exporter})")]
    ModuleNotFound {
        module: String,
        exporter: String,
        export: String,
        known_modules: Vec<String>,
    },
}

/// Result type for resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

impl From<ResolveError> for ApibookError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::ModuleNotFound {
                module,
                exporter,
                export,
                known_modules,
            } => ApibookError::UnresolvedModule {
                module,
                exporter,
                export,
                known_modules,
            },
        }
    }
}

// ============================================================================
// Report
// ============================================================================

/// An export whose defining module exists but lacks the named symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftMiss {
    /// Module whose `__all__` names the export.
    pub exporter: String,
    /// The exported name.
    pub export: String,
    /// Where the export was expected to be defined.
    pub target: String,
}

/// Summary of one resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Symbols appended to exporting modules.
    pub spliced: usize,
    pub soft_misses: Vec<SoftMiss>,
}

// ============================================================================
// Resolution
// ============================================================================

/// One computed splice: append `symbol` to module `into`.
struct Splice {
    into: String,
    symbol: Symbol,
}

/// Resolve every `__all__` entry of every module and splice the defining
/// symbols into their exporting modules.
///
/// Exports defined locally, exports that name a submodule, and exports bound
/// by no import are left alone. A missing defining module fails the whole
/// run; a defining module that lacks the symbol is logged and recorded as a
/// [`SoftMiss`].
pub fn resolve_reexports(registry: &mut ModuleRegistry) -> ResolveResult<ResolutionReport> {
    let mut report = ResolutionReport::default();
    let mut splices = Vec::new();

    for module in registry.iter() {
        if module.exports.is_empty() {
            continue;
        }
        info!("Fixing up re-exports for {}", module.name);
        for export in &module.exports {
            match resolve_export(registry, module, export)? {
                Resolution::Found(symbol) => splices.push(Splice {
                    into: module.name.clone(),
                    symbol,
                }),
                Resolution::Missing(target) => {
                    warn!(
                        "Could not find {} (exported as '{}' from {})",
                        target, export, module.name
                    );
                    report.soft_misses.push(SoftMiss {
                        exporter: module.name.clone(),
                        export: export.clone(),
                        target,
                    });
                }
                Resolution::Skip => {}
            }
        }
    }

    for Splice { into, symbol } in splices {
        let Some(module) = registry.get_mut(&into) else {
            continue;
        };
        if module.push(symbol) {
            report.spliced += 1;
        }
    }

    Ok(report)
}

enum Resolution {
    Found(Symbol),
    /// Qualified name that could not be found.
    Missing(String),
    Skip,
}

fn resolve_export(
    registry: &ModuleRegistry,
    module: &Module,
    export: &str,
) -> ResolveResult<Resolution> {
    let Some(target) = module.resolve_import(export) else {
        return Ok(Resolution::Skip);
    };
    if target.module == module.name {
        return Ok(Resolution::Skip);
    }
    if registry.contains(&target.qualified()) {
        debug!("{} names module {}", export, target.qualified());
        return Ok(Resolution::Skip);
    }

    let candidates = candidates(registry, &target);
    if candidates.is_empty() {
        return Err(ResolveError::ModuleNotFound {
            module: target.module,
            exporter: module.name.clone(),
            export: export.to_string(),
            known_modules: registry.names().map(str::to_string).collect(),
        });
    }

    for candidate in candidates {
        debug!("Looking for {} in {}", target.item, candidate.name);
        let Some(symbol) = candidate.lookup(&target.item) else {
            continue;
        };
        let symbol = match symbol {
            Symbol::Import(_) => {
                let mut visited = BTreeSet::from([format!("{}.{}", candidate.name, target.item)]);
                follow_import(registry, candidate, &target.item, &mut visited).unwrap_or(symbol)
            }
            other => other,
        };
        return Ok(Resolution::Found(symbol));
    }

    Ok(Resolution::Missing(target.qualified()))
}

/// The registered modules that may define `target`: the module itself, then
/// its package `__init__`.
fn candidates<'r>(registry: &'r ModuleRegistry, target: &ImportTarget) -> Vec<&'r Module> {
    [
        target.module.clone(),
        format!("{}{}", target.module, PACKAGE_SUFFIX),
    ]
    .iter()
    .filter_map(|name| registry.get(name))
    .collect()
}

/// Follow a chain of imports to the symbol that defines `item`.
///
/// Returns `None` when the chain leaves the registry, names a module, loops,
/// or ends at a module that lacks the item.
fn follow_import(
    registry: &ModuleRegistry,
    module: &Module,
    item: &str,
    visited: &mut BTreeSet<String>,
) -> Option<Symbol> {
    let target = module.resolve_import(item)?;
    let qualified = target.qualified();
    if registry.contains(&qualified) || !visited.insert(qualified) {
        return None;
    }

    for candidate in candidates(registry, &target) {
        match candidate.lookup(&target.item) {
            Some(Symbol::Import(_)) => {
                return follow_import(registry, candidate, &target.item, visited);
            }
            Some(symbol) => return Some(symbol),
            None => continue,
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_module;

    fn registry(files: &[(&str, &str)]) -> ModuleRegistry {
        files
            .iter()
            .map(|(name, source)| extract_module(name, source, name).unwrap())
            .collect()
    }

    #[test]
    fn splices_relative_reexport() {
        let mut reg = registry(&[
            (
                "pkg.__init__",
                "from .widget import Widget\n__all__ = ['Widget']\n",
            ),
            ("pkg.widget", "class Widget:\n    \"\"\"A widget.\"\"\"\n"),
        ]);
        let report = resolve_reexports(&mut reg).unwrap();
        assert_eq!(report.spliced, 1);
        assert!(report.soft_misses.is_empty());

        let package = reg.get("pkg.__init__").unwrap();
        let direct = reg.get("pkg.widget").unwrap();
        assert_eq!(package.classes.len(), 1);
        assert_eq!(package.classes[0], direct.classes[0]);
    }

    #[test]
    fn local_definitions_are_skipped() {
        let mut reg = registry(&[("pkg.__init__", "def f():\n    pass\n__all__ = ['f']\n")]);
        let report = resolve_reexports(&mut reg).unwrap();
        assert_eq!(report.spliced, 0);
        assert_eq!(reg.get("pkg.__init__").unwrap().functions.len(), 1);
    }

    #[test]
    fn submodule_exports_are_skipped() {
        let mut reg = registry(&[
            ("pkg.__init__", "from . import sub\n__all__ = ['sub']\n"),
            ("pkg.sub", "X = 1\n"),
        ]);
        let report = resolve_reexports(&mut reg).unwrap();
        assert_eq!(report.spliced, 0);
    }

    #[test]
    fn falls_back_to_package_init() {
        let mut reg = registry(&[
            ("top.__init__", "from .inner import Thing\n__all__ = ['Thing']\n"),
            ("top.inner.__init__", "Thing: int = 3\n"),
        ]);
        resolve_reexports(&mut reg).unwrap();
        let top = reg.get("top.__init__").unwrap();
        assert_eq!(top.variables[0].name, "Thing");
    }

    #[test]
    fn follows_import_chains() {
        let mut reg = registry(&[
            ("pkg.__init__", "from .api import run\n__all__ = ['run']\n"),
            ("pkg.api", "from .impl import run\n"),
            ("pkg.impl", "def run():\n    \"\"\"Run it.\"\"\"\n"),
        ]);
        resolve_reexports(&mut reg).unwrap();
        let package = reg.get("pkg.__init__").unwrap();
        assert_eq!(package.functions.len(), 1);
        assert_eq!(package.functions[0].docstring.as_deref(), Some("Run it."));
    }

    #[test]
    fn external_import_is_spliced_as_is() {
        let mut reg = registry(&[
            ("pkg.__init__", "from .compat import json\n__all__ = ['json']\n"),
            ("pkg.compat", "import json\n"),
        ]);
        resolve_reexports(&mut reg).unwrap();
        let package = reg.get("pkg.__init__").unwrap();
        assert_eq!(package.imports.len(), 2);
    }

    #[test]
    fn import_cycles_terminate() {
        let mut reg = registry(&[
            ("pkg.__init__", "from .a import x\n__all__ = ['x']\n"),
            ("pkg.a", "from .b import x\n"),
            ("pkg.b", "from .a import x\n"),
        ]);
        let report = resolve_reexports(&mut reg).unwrap();
        assert_eq!(report.spliced, 1);
        assert_eq!(reg.get("pkg.__init__").unwrap().imports.len(), 2);
    }

    #[test]
    fn missing_symbol_is_soft() {
        let mut reg = registry(&[
            ("pkg.__init__", "from .a import gone\n__all__ = ['gone']\n"),
            ("pkg.a", "X = 1\n"),
        ]);
        let report = resolve_reexports(&mut reg).unwrap();
        assert_eq!(
            report.soft_misses,
            vec![SoftMiss {
                exporter: "pkg.__init__".into(),
                export: "gone".into(),
                target: "pkg.a.gone".into(),
            }]
        );
    }

    #[test]
    fn missing_module_is_fatal() {
        let mut reg = registry(&[
            ("pkg.__init__", "from .nowhere import x\n__all__ = ['x']\n"),
            ("pkg.a", "X = 1\n"),
        ]);
        let err = resolve_reexports(&mut reg).unwrap_err();
        let ResolveError::ModuleNotFound {
            ref module,
            ref known_modules,
            ..
        } = err;
        assert_eq!(module, "pkg.nowhere");
        assert_eq!(known_modules, &vec!["pkg.__init__", "pkg.a"]);

        let message = ApibookError::from(err).to_string();
        assert!(message.contains("known modules:"));
        assert!(message.contains("\t\"pkg.a\""));
    }

    #[test]
    fn duplicate_exports_splice_once() {
        let mut reg = registry(&[
            (
                "pkg.__init__",
                "from .a import f\n__all__ = ['f']\n__all__ += ['f']\n",
            ),
            ("pkg.a", "def f():\n    pass\n"),
        ]);
        let report = resolve_reexports(&mut reg).unwrap();
        assert_eq!(report.spliced, 1);
        assert_eq!(reg.get("pkg.__init__").unwrap().functions.len(), 1);
    }

    #[test]
    fn resolution_reads_extraction_time_state() {
        // `pkg.b` re-exports from `pkg.c`; `pkg.a` re-exports from `pkg.b`,
        // which defines nothing itself at extraction time.
        let mut reg = registry(&[
            ("pkg.a", "from .b import Thing\n__all__ = ['Thing']\n"),
            ("pkg.b", "from .c import Thing\n__all__ = ['Thing']\n"),
            ("pkg.c", "class Thing:\n    pass\n"),
        ]);
        resolve_reexports(&mut reg).unwrap();
        assert_eq!(reg.get("pkg.a").unwrap().classes.len(), 1);
        assert_eq!(reg.get("pkg.b").unwrap().classes.len(), 1);
    }
}
