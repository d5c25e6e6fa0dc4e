#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Grammar tables for Sapwood.
//!
//! The parsing and query crates only ever see a compiled [`Grammar`]. This
//! crate is where grammars come from: definitions in the shape of
//! tree-sitter's `grammar.json`, an LALR(1) generator turning them into
//! tables, and a handful of bundled languages.
//!
//! Nothing is cached implicitly. Every call to a language function builds
//! its table from scratch; wrap a loader in [`GrammarCache`] to share tables
//! across a process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use sapwood_core::{ExternalScanner, Grammar, GrammarError, GrammarLoader};
use tracing::debug;

pub mod definition;
pub mod generate;
pub mod grammars;

#[cfg(test)]
mod lib_tests;

pub use definition::{GrammarDefinition, Precedence, PrecedenceEntry, Rule};
pub use generate::{GenerateError, generate};

/// Generate a table from `definition` and load it.
pub fn build(
    definition: &GrammarDefinition,
    scanner: Option<Arc<dyn ExternalScanner>>,
) -> Result<Grammar, GrammarError> {
    let table = generate(definition)?;
    Grammar::new(table, scanner)
}

/// Build a grammar from `grammar.json` text. Grammars with external tokens
/// need a scanner.
pub fn from_json(
    json: &str,
    scanner: Option<Arc<dyn ExternalScanner>>,
) -> Result<Arc<Grammar>, GrammarError> {
    let definition = GrammarDefinition::from_json(json)?;
    Ok(Arc::new(build(&definition, scanner)?))
}

macro_rules! define_grammars {
    (
        $(
            $fn_name:ident => {
                feature: $feature:literal,
                name: $name:literal,
                definition: $definition:path,
                scanner: $scanner:expr,
                names: [$($alias:literal),* $(,)?],
                extensions: [$($ext:literal),* $(,)?] $(,)?
            }
        ),* $(,)?
    ) => {
        $(
            #[cfg(feature = $feature)]
            pub fn $fn_name() -> Result<Arc<Grammar>, GrammarError> {
                let grammar = build(&$definition(), $scanner)?;
                debug!(grammar = $name, states = grammar.state_count(), "built bundled grammar");
                Ok(Arc::new(grammar))
            }
        )*

        /// Build a bundled grammar by name or alias, ignoring case.
        pub fn from_name(name: &str) -> Result<Arc<Grammar>, GrammarError> {
            match name.to_ascii_lowercase().as_str() {
                $(
                    #[cfg(feature = $feature)]
                    $($alias)|* => $fn_name(),
                )*
                _ => Err(GrammarError::NotFound(name.to_owned())),
            }
        }

        /// Build the bundled grammar for a file extension, ignoring case.
        pub fn from_ext(ext: &str) -> Result<Arc<Grammar>, GrammarError> {
            match ext.to_ascii_lowercase().as_str() {
                $(
                    #[cfg(feature = $feature)]
                    $($ext)|* => $fn_name(),
                )*
                _ => Err(GrammarError::NotFound(ext.to_owned())),
            }
        }

        /// Canonical names of the enabled bundled grammars.
        pub fn names() -> Vec<&'static str> {
            vec![
                $(
                    #[cfg(feature = $feature)]
                    $name,
                )*
            ]
        }
    };
}

define_grammars! {
    arithmetic => {
        feature: "lang-arithmetic",
        name: "arithmetic",
        definition: grammars::arithmetic::definition,
        scanner: None,
        names: ["arithmetic", "calc"],
        extensions: ["calc"],
    },
    json => {
        feature: "lang-json",
        name: "json",
        definition: grammars::json::definition,
        scanner: None,
        names: ["json", "jsonc"],
        extensions: ["json", "jsonc"],
    },
    python => {
        feature: "lang-python",
        name: "python",
        definition: grammars::python::definition,
        scanner: Some(Arc::new(grammars::python::IndentScanner)),
        names: ["python", "py"],
        extensions: ["py", "pyi"],
    },
}

/// Loads the bundled grammars by name.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinLoader;

impl GrammarLoader for BuiltinLoader {
    fn load(&self, name: &str) -> Result<Arc<Grammar>, GrammarError> {
        from_name(name)
    }

    fn names(&self) -> Vec<String> {
        names().into_iter().map(str::to_owned).collect()
    }
}

/// Memoizing wrapper around another loader.
///
/// Caching is opt-in: create one cache and hand it to whoever needs
/// grammars. Failed loads are not cached.
#[derive(Debug, Default)]
pub struct GrammarCache<L> {
    loader: L,
    grammars: Mutex<HashMap<String, Arc<Grammar>>>,
}

impl<L: GrammarLoader> GrammarCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            grammars: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.grammars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.grammars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<L: GrammarLoader> GrammarLoader for GrammarCache<L> {
    fn load(&self, name: &str) -> Result<Arc<Grammar>, GrammarError> {
        let key = name.to_ascii_lowercase();
        if let Some(grammar) = self
            .grammars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(grammar));
        }

        // Build outside the lock; a racing load of the same name keeps the
        // first stored grammar.
        let grammar = self.loader.load(name)?;
        let mut grammars = self.grammars.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(grammars.entry(key).or_insert(grammar)))
    }

    fn names(&self) -> Vec<String> {
        self.loader.names()
    }
}
