//! String interning for query-side names.
//!
//! Capture names and predicate strings are interned once at compile time so
//! the matcher compares integer handles instead of strings.

use std::collections::HashMap;

/// A lightweight handle to an interned string.
///
/// Atoms are ordered by insertion order, not lexicographically.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Atom(u32);

impl Atom {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Create an atom from a raw index. Only meaningful for the interner that issued it.
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }
}

/// Deduplicates strings and hands out [`Atom`] handles.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    map: HashMap<String, Atom>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning the existing atom if it was seen before.
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }

        let atom = Atom(self.strings.len() as u32);
        self.strings.push(s.to_owned());
        self.map.insert(s.to_owned(), atom);
        atom
    }

    /// Look up an atom without interning.
    pub fn get(&self, s: &str) -> Option<Atom> {
        self.map.get(s).copied()
    }

    /// # Panics
    /// Panics if the atom was not created by this interner.
    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        &self.strings[atom.0 as usize]
    }

    #[inline]
    pub fn try_resolve(&self, atom: Atom) -> Option<&str> {
        self.strings.get(atom.0 as usize).map(|s| s.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Atom, &str)> {
        self.strings
            .iter()
            .enumerate()
            .map(|(i, s)| (Atom(i as u32), s.as_str()))
    }

    /// Consume the interner, keeping only the strings in atom order.
    pub fn into_strings(self) -> Vec<String> {
        self.strings
    }
}
