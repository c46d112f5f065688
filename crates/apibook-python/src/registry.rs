//! The module registry: every extracted module, keyed by dotted name.

use std::collections::btree_map::{self, BTreeMap};

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::extract::{extract_module, ExtractError, ExtractResult};
use crate::files::path_to_module;
use crate::symbols::Module;

/// Dotted module name to extracted [`Module`].
///
/// Iteration is in sorted name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, Module>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract every source file and collect the results.
    ///
    /// Files are extracted in parallel, then inserted in the given order. The
    /// first failure in input order is returned, as is a second file mapping
    /// to an already registered module name.
    ///
    /// # Arguments
    ///
    /// * `root_name` - Top-level package name (see [`crate::files::root_module`])
    /// * `files` - `(relative path, source)` pairs
    pub fn from_sources(root_name: &str, files: &[(String, String)]) -> ExtractResult<Self> {
        let extracted: Vec<ExtractResult<Module>> = files
            .par_iter()
            .map(|(path, source)| {
                let name = path_to_module(root_name, path);
                info!("Processing {}", path);
                extract_module(&name, source, path)
            })
            .collect();

        let mut registry = ModuleRegistry::new();
        for module in extracted {
            registry.insert(module?)?;
        }
        Ok(registry)
    }

    /// Register a module. Fails if its name is already taken.
    pub fn insert(&mut self, module: Module) -> ExtractResult<()> {
        match self.modules.entry(module.name.clone()) {
            btree_map::Entry::Occupied(entry) => Err(ExtractError::DuplicateModule {
                name: entry.key().clone(),
            }),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(module);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Registered module names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Consume the registry, yielding modules in name order.
    pub fn into_modules(self) -> Vec<Module> {
        self.modules.into_values().collect()
    }
}

impl FromIterator<Module> for ModuleRegistry {
    /// Collect modules, keeping the first of any duplicate names.
    fn from_iter<I: IntoIterator<Item = Module>>(iter: I) -> Self {
        let mut modules = BTreeMap::new();
        for module in iter {
            modules.entry(module.name.clone()).or_insert(module);
        }
        ModuleRegistry { modules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(files: &[(&str, &str)]) -> Vec<(String, String)> {
        files
            .iter()
            .map(|(p, s)| (p.to_string(), s.to_string()))
            .collect()
    }

    #[test]
    fn from_sources_names_modules() {
        let files = sources(&[
            ("__init__.py", "from .a import f\n"),
            ("a.py", "def f():\n    pass\n"),
            ("sub/b.py", "X = 1\n"),
        ]);
        let registry = ModuleRegistry::from_sources("pkg", &files).unwrap();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["pkg.__init__", "pkg.a", "pkg.sub.b"]);
        assert_eq!(registry.get("pkg.a").unwrap().functions.len(), 1);
        assert!(registry.contains("pkg.sub.b"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn first_error_in_input_order_wins() {
        let files = sources(&[
            ("a.py", "def broken(:\n"),
            ("b.py", "def f() -> g():\n    pass\n"),
        ]);
        let err = ModuleRegistry::from_sources("pkg", &files).unwrap_err();
        assert!(matches!(err, ExtractError::Syntax { ref path, .. } if path == "a.py"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ModuleRegistry::new();
        registry.insert(Module::new("pkg.a")).unwrap();
        let err = registry.insert(Module::new("pkg.a")).unwrap_err();
        assert!(matches!(err, ExtractError::DuplicateModule { ref name } if name == "pkg.a"));
    }

    #[test]
    fn serializes_as_a_map() {
        let registry: ModuleRegistry = vec![Module::new("pkg.b"), Module::new("pkg.a")]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&registry).unwrap();
        assert!(json["pkg.a"].is_object());
        assert_eq!(json["pkg.b"]["name"], "pkg.b");
        assert_eq!(registry.into_modules()[0].name, "pkg.a");
    }
}
