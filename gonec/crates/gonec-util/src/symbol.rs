//! Interned string symbols.
//!
//! A `Symbol` is a 4-byte handle into a global string table, giving O(1)
//! equality and hashing for identifiers and type names. Strings are
//! leaked on first interning so the table can hand out `'static`
//! references without lifetime bookkeeping; the set of unique strings in
//! a compilation is bounded, so this never amounts to much.

use ahash::AHasher;
use dashmap::DashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

/// Global string table, initialized on first use.
///
/// Gone's keywords and built-in type names are pre-interned so they are
/// available without allocation during lexing.
static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(|| {
    let table = StringTable::new();
    for known in [
        "const", "var", "print", "if", "else", "while", "true", "false", "int", "float", "char",
        "bool",
    ] {
        table.intern(known);
    }
    table
});

/// An interned string identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    index: u32,
}

impl Symbol {
    /// Intern a string, returning its symbol.
    ///
    /// Interning the same string twice returns the same symbol.
    pub fn intern(string: &str) -> Self {
        STRING_TABLE.intern(string)
    }

    /// The string this symbol was interned from.
    pub fn as_str(&self) -> &'static str {
        STRING_TABLE.get(*self).unwrap_or("<unbound symbol>")
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thread-safe string table backed by DashMap.
struct StringTable {
    /// Maps string hash to (string, symbol index).
    map: DashMap<u64, (&'static str, u32)>,

    /// Maps symbol index back to its string.
    by_index: DashMap<u32, &'static str>,

    /// Next free index.
    next_index: AtomicU32,
}

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_capacity(64),
            by_index: DashMap::with_capacity(64),
            next_index: AtomicU32::new(0),
        }
    }

    fn intern(&self, string: &str) -> Symbol {
        let hash = Self::hash_string(string);

        // Fast path: already interned
        if let Some(entry) = self.map.get(&hash) {
            if entry.value().0 == string {
                return Symbol {
                    index: entry.value().1,
                };
            }
        }

        match self.map.entry(hash) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                if entry.get().0 == string {
                    return Symbol {
                        index: entry.get().1,
                    };
                }
                // Different string with the same hash
                self.handle_collision(string, hash)
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let interned: &'static str = Box::leak(string.to_string().into_boxed_str());
                let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
                entry.insert((interned, idx));
                self.by_index.insert(idx, interned);
                Symbol { index: idx }
            }
        }
    }

    /// Linear probing with a golden-ratio offset; probe slots until the
    /// string is found or an empty slot turns up.
    fn handle_collision(&self, string: &str, original_hash: u64) -> Symbol {
        const MAX_PROBES: u64 = 32;
        const PROBE_PRIME: u64 = 0x9e3779b97f4a7c15;

        for i in 1u64..=MAX_PROBES {
            let probe_hash = original_hash.wrapping_add(i.wrapping_mul(PROBE_PRIME));

            if let Some(entry) = self.map.get(&probe_hash) {
                if entry.value().0 == string {
                    return Symbol {
                        index: entry.value().1,
                    };
                }
            } else {
                let interned: &'static str = Box::leak(string.to_string().into_boxed_str());
                let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
                self.map.insert(probe_hash, (interned, idx));
                self.by_index.insert(idx, interned);
                return Symbol { index: idx };
            }
        }

        // All probe slots taken by other strings; accept an overwrite of
        // the original slot rather than failing
        let interned: &'static str = Box::leak(string.to_string().into_boxed_str());
        let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
        self.map.insert(original_hash, (interned, idx));
        self.by_index.insert(idx, interned);
        Symbol { index: idx }
    }

    fn get(&self, symbol: Symbol) -> Option<&'static str> {
        self.by_index.get(&symbol.index).map(|entry| *entry.value())
    }

    #[inline]
    fn hash_string(string: &str) -> u64 {
        let mut hasher = AHasher::default();
        string.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_intern_same_string() {
        let s1 = Symbol::intern("hello");
        let s2 = Symbol::intern("hello");
        assert_eq!(s1, s2);
    }

    #[test]
    fn test_intern_different_strings() {
        let s1 = Symbol::intern("hello");
        let s2 = Symbol::intern("world");
        assert_ne!(s1, s2);
    }

    #[test]
    fn test_as_str_round_trip() {
        let symbol = Symbol::intern("some_identifier");
        assert_eq!(symbol.as_str(), "some_identifier");
    }

    #[test]
    fn test_display_uses_string() {
        let symbol = Symbol::intern("counter");
        assert_eq!(format!("{symbol}"), "counter");
    }

    #[test]
    fn test_keywords_are_preinterned() {
        // Keywords must already be present; interning them again is a hit
        let before = Symbol::intern("while");
        let again = Symbol::intern("while");
        assert_eq!(before, again);
    }

    #[test]
    fn test_empty_string() {
        let s = Symbol::intern("");
        assert_eq!(s.as_str(), "");
    }

    #[test]
    fn test_many_unique_strings() {
        let mut symbols = Vec::new();
        for i in 0..500 {
            symbols.push(Symbol::intern(&format!("unique_{i}")));
        }
        for i in 0..500 {
            for j in (i + 1)..500 {
                assert_ne!(symbols[i], symbols[j]);
            }
        }
        for (i, sym) in symbols.iter().enumerate() {
            assert_eq!(sym.as_str(), format!("unique_{i}"));
        }
    }

    #[test]
    fn test_concurrent_intern_same_string() {
        let handles: Vec<_> = (0..10)
            .map(|_| thread::spawn(|| Symbol::intern("concurrent_same")))
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for symbol in &results[1..] {
            assert_eq!(results[0], *symbol);
        }
    }
}
