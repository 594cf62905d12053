//! Symbol table handed over by name analysis
//!
//! Symbols are identities, not name strings: two distinct `x`s in
//! different scopes are two entries. The backend only ever looks
//! symbols up by `SymbolId`.

use dlc_common::{SymbolId, Type};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Var,
    Fn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, ty: Type, kind: SymbolKind) -> SymbolId {
        let id = self.symbols.len() as SymbolId;
        self.symbols.push(Symbol {
            name: name.into(),
            ty,
            kind,
        });
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id as usize)
    }

    pub fn name(&self, id: SymbolId) -> Option<&str> {
        self.get(id).map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_identity() {
        let mut table = SymbolTable::new();
        let a = table.add("x", Type::Int, SymbolKind::Var);
        let b = table.add("x", Type::Bool, SymbolKind::Var);
        assert_ne!(a, b);
        assert_eq!(table.get(a).unwrap().ty, Type::Int);
        assert_eq!(table.get(b).unwrap().ty, Type::Bool);
        assert_eq!(table.name(a), Some("x"));
    }
}
