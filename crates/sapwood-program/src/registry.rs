//! Custom predicates.
//!
//! The built-in predicates are fixed. Anything else a query calls must be
//! registered here before the query is compiled; the compiled program keeps
//! the function, so the registry is not needed at match time.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::predicate::PredicateValue;

pub type PredicateFn = Arc<dyn Fn(&[PredicateValue<'_>]) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct CustomPredicate {
    name: String,
    arity: RangeInclusive<usize>,
    func: PredicateFn,
}

impl CustomPredicate {
    /// Name without the leading `#`, e.g. `is-upper?`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> &RangeInclusive<usize> {
        &self.arity
    }

    pub fn call(&self, args: &[PredicateValue<'_>]) -> bool {
        (self.func)(args)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPredicate")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Default, Debug)]
pub struct PredicateRegistry {
    entries: IndexMap<String, CustomPredicate>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` (without `#`) taking `arity` arguments. A later
    /// registration under the same name replaces the earlier one.
    pub fn register<F>(mut self, name: impl Into<String>, arity: RangeInclusive<usize>, func: F) -> Self
    where
        F: Fn(&[PredicateValue<'_>]) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        let predicate = CustomPredicate {
            name: name.clone(),
            arity,
            func: Arc::new(func),
        };
        self.entries.insert(name, predicate);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CustomPredicate> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
