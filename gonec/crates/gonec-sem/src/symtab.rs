//! The symbol table.
//!
//! One flat scope mapping identifier names to their declarations. The
//! table is seeded with the built-in type names, so `SimpleType`
//! resolution and redefinition checks go through the same mechanism as
//! ordinary identifiers.

use crate::types::{TypeId, TypeRegistry};
use gonec_util::Symbol;
use indexmap::IndexMap;
use std::fmt;

/// Where a symbol was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclSite {
    /// Declared at a source line
    Line(u32),
    /// Seeded at startup
    Builtin,
}

impl fmt::Display for DeclSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclSite::Line(line) => write!(f, "{line}"),
            DeclSite::Builtin => write!(f, "<builtin type>"),
        }
    }
}

/// What kind of thing a name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// `const` declaration - readable, never writable
    Const,
    /// `var` declaration - readable and writable
    Var,
    /// A built-in type name - neither readable nor writable
    Type,
}

/// A symbol table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolEntry {
    pub kind: SymbolKind,
    pub ty: TypeId,
    pub site: DeclSite,
}

/// Flat map from identifier to declaring entry.
pub struct SymbolTable {
    entries: IndexMap<Symbol, SymbolEntry>,
}

impl SymbolTable {
    /// Create a table seeded with the registry's built-in type names.
    pub fn new(registry: &TypeRegistry) -> Self {
        let mut entries = IndexMap::new();
        for (name, ty) in registry.builtins() {
            entries.insert(
                Symbol::intern(name),
                SymbolEntry {
                    kind: SymbolKind::Type,
                    ty,
                    site: DeclSite::Builtin,
                },
            );
        }
        Self { entries }
    }

    /// Look up a name.
    pub fn get(&self, name: Symbol) -> Option<&SymbolEntry> {
        self.entries.get(&name)
    }

    /// Insert a declaration. The caller checks for redefinition first;
    /// an existing entry is never replaced.
    pub fn define(&mut self, name: Symbol, entry: SymbolEntry) {
        self.entries.entry(name).or_insert(entry);
    }
}
