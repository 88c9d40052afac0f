//! Symbol interning
//!
//! Every state owns its own table. Method names are interned too, so the
//! method table is keyed by cheap `Sym` handles.

use crate::value::{RuntimeError, Sym};
use std::collections::HashMap;

/// Interned names for one state
#[derive(Debug)]
pub struct SymbolTable {
    owner: u64,
    names: Vec<String>,
    ids: HashMap<String, u32>,
}

impl SymbolTable {
    pub fn new(owner: u64) -> Self {
        Self {
            owner,
            names: Vec::new(),
            ids: HashMap::new(),
        }
    }

    /// Intern `name`, returning the existing symbol if already present
    pub fn intern(&mut self, name: &str) -> Sym {
        if let Some(&id) = self.ids.get(name) {
            return Sym {
                owner: self.owner,
                id,
            };
        }
        let id = self.names.len() as u32;
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        Sym {
            owner: self.owner,
            id,
        }
    }

    /// Look up a symbol without interning
    pub fn lookup(&self, name: &str) -> Option<Sym> {
        self.ids.get(name).map(|&id| Sym {
            owner: self.owner,
            id,
        })
    }

    /// Name of an interned symbol
    pub fn name(&self, sym: Sym) -> Result<&str, RuntimeError> {
        if sym.owner != self.owner {
            return Err(RuntimeError::ForeignValue);
        }
        self.names
            .get(sym.id as usize)
            .map(String::as_str)
            .ok_or(RuntimeError::ForeignValue)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Forget every symbol, returning how many were released
    pub fn release_all(&mut self) -> usize {
        let released = self.names.len();
        self.names = Vec::new();
        self.ids = HashMap::new();
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let mut table = SymbolTable::new(3);
        let a = table.intern("upcase!");
        let b = table.intern("upcase!");
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
        assert_eq!(table.name(a).unwrap(), "upcase!");
    }

    #[test]
    fn test_lookup_does_not_intern() {
        let mut table = SymbolTable::new(3);
        assert!(table.lookup("x").is_none());
        table.intern("x");
        assert!(table.lookup("x").is_some());
    }

    #[test]
    fn test_foreign_symbol() {
        let mut a = SymbolTable::new(1);
        let b = SymbolTable::new(2);
        let sym = a.intern("x");
        assert_eq!(b.name(sym), Err(RuntimeError::ForeignValue));
    }
}
