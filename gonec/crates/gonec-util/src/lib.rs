//! gonec-util - Core utilities and foundation types.
//!
//! This crate provides the types shared by every phase of the Gone
//! compiler: source spans, interned symbols, typed indices, and the
//! diagnostic sink.

mod diagnostic;
mod index_vec;
mod span;
mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::Span;
pub use symbol::Symbol;

// Re-export commonly used hash maps
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;

crate::define_idx!(NodeId);
