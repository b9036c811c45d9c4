//! gonec-ir - Basic-block IR generation for the Gone language.
//!
//! Walks a type-checked AST and emits a flat list of labeled
//! basic-block instructions in a stack-machine style. Structured
//! control flow (`if`, `while`) lowers into blocks with explicit jumps;
//! labels are freshly minted, monotonically increasing identifiers.

mod inst;
mod lower;

pub use inst::{Constant, Inst, Label};
pub use lower::{lower, Generator};
