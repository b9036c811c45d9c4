//! The Gone type system.
//!
//! Types are immutable descriptors seeded once at startup: a name plus
//! tables of the operators the type supports. Entry 0 of the registry is
//! the error sentinel used for recovery; it silently absorbs any
//! operator check so one bad subexpression produces one diagnostic.

use gonec_util::IndexVec;
use indexmap::IndexMap;
use thiserror::Error;

gonec_util::define_idx!(TypeId);

impl TypeId {
    /// The error sentinel, always registry entry 0.
    pub const ERROR: TypeId = TypeId(0);
}

/// An immutable type descriptor.
///
/// Operator tables are keyed the full way, `(lhs, op, rhs) -> result`
/// for binary and `(op, operand) -> result` for unary, with names as
/// the values so the registry stays a plain string-keyed table.
#[derive(Debug)]
pub struct TypeDef {
    /// Type name, e.g. `"int"`
    pub name: &'static str,

    /// Supported binary operators
    binary_ops: IndexMap<(&'static str, &'static str, &'static str), &'static str>,

    /// Supported unary operators
    unary_ops: IndexMap<(&'static str, &'static str), &'static str>,
}

/// An operator lookup miss.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperatorError {
    #[error("Unsupported operation {lhs} {op} {rhs}")]
    Binary {
        lhs: &'static str,
        op: &'static str,
        rhs: &'static str,
    },

    #[error("Unsupported operation {op} {operand}")]
    Unary {
        op: &'static str,
        operand: &'static str,
    },
}

/// Registry of the built-in types, read-only after construction.
pub struct TypeRegistry {
    types: IndexVec<TypeId, TypeDef>,
    by_name: IndexMap<&'static str, TypeId>,
    int: TypeId,
    float: TypeId,
    char: TypeId,
    bool: TypeId,
}

impl TypeRegistry {
    /// Build the registry with the error sentinel and the four built-in
    /// types.
    pub fn new() -> Self {
        let mut types = IndexVec::new();
        let mut by_name = IndexMap::new();

        // Entry 0: the error sentinel. It has no operators; checks
        // against it short-circuit before any lookup.
        let error = types.push(TypeDef {
            name: "error",
            binary_ops: IndexMap::new(),
            unary_ops: IndexMap::new(),
        });
        debug_assert_eq!(error, TypeId::ERROR);

        let comparisons: &[&str] = &["==", "!=", "<", "<=", ">", ">="];
        let arithmetic: &[&str] = &["+", "-", "*", "/"];

        let int = types.push(numeric_type("int", arithmetic, comparisons));
        let float = types.push(numeric_type("float", arithmetic, comparisons));

        // char compares but has no binary arithmetic; unary + - are
        // identity-typed
        let char_ty = types.push(TypeDef {
            name: "char",
            binary_ops: comparisons
                .iter()
                .map(|op| (("char", *op, "char"), "bool"))
                .collect(),
            unary_ops: IndexMap::from([(("+", "char"), "char"), (("-", "char"), "char")]),
        });

        let bool_ty = types.push(TypeDef {
            name: "bool",
            binary_ops: IndexMap::from([
                (("bool", "and", "bool"), "bool"),
                (("bool", "or", "bool"), "bool"),
                (("bool", "==", "bool"), "bool"),
                (("bool", "!=", "bool"), "bool"),
            ]),
            unary_ops: IndexMap::from([(("not", "bool"), "bool")]),
        });

        for (id, def) in types.iter_enumerated() {
            if id != TypeId::ERROR {
                by_name.insert(def.name, id);
            }
        }

        Self {
            types,
            by_name,
            int,
            float,
            char: char_ty,
            bool: bool_ty,
        }
    }

    /// Resolve a type name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// The name of a type.
    pub fn name(&self, ty: TypeId) -> &'static str {
        self.types[ty].name
    }

    /// Iterate the built-in type names and ids (the sentinel excluded).
    pub fn builtins(&self) -> impl Iterator<Item = (&'static str, TypeId)> + '_ {
        self.by_name.iter().map(|(name, id)| (*name, *id))
    }

    /// The `int` type.
    pub fn int_type(&self) -> TypeId {
        self.int
    }

    /// The `float` type.
    pub fn float_type(&self) -> TypeId {
        self.float
    }

    /// The `char` type.
    pub fn char_type(&self) -> TypeId {
        self.char
    }

    /// The `bool` type.
    pub fn bool_type(&self) -> TypeId {
        self.bool
    }

    /// Check a binary operator application.
    ///
    /// Operand types must be identical; there is no implicit conversion.
    /// If either operand is already the error sentinel the sentinel is
    /// returned without an error, so diagnostics don't cascade.
    pub fn check_binop(
        &self,
        lhs: TypeId,
        op: &'static str,
        rhs: TypeId,
    ) -> Result<TypeId, OperatorError> {
        if lhs == TypeId::ERROR || rhs == TypeId::ERROR {
            return Ok(TypeId::ERROR);
        }

        let lhs_def = &self.types[lhs];
        let rhs_name = self.name(rhs);

        match lhs_def.binary_ops.get(&(lhs_def.name, op, rhs_name)) {
            Some(result) => Ok(self.by_name[result]),
            None => Err(OperatorError::Binary {
                lhs: lhs_def.name,
                op,
                rhs: rhs_name,
            }),
        }
    }

    /// Check a unary operator application, with the same sentinel rule.
    pub fn check_unaryop(&self, op: &'static str, operand: TypeId) -> Result<TypeId, OperatorError> {
        if operand == TypeId::ERROR {
            return Ok(TypeId::ERROR);
        }

        let def = &self.types[operand];
        match def.unary_ops.get(&(op, def.name)) {
            Some(result) => Ok(self.by_name[result]),
            None => Err(OperatorError::Unary {
                op,
                operand: def.name,
            }),
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an `int`/`float`-shaped type: arithmetic preserves the operand
/// type, comparisons yield `bool`, unary `+ -` are identity.
fn numeric_type(
    name: &'static str,
    arithmetic: &[&'static str],
    comparisons: &[&'static str],
) -> TypeDef {
    let mut binary_ops = IndexMap::new();
    for op in arithmetic {
        binary_ops.insert((name, *op, name), name);
    }
    for op in comparisons {
        binary_ops.insert((name, *op, name), "bool");
    }

    TypeDef {
        name,
        binary_ops,
        unary_ops: IndexMap::from([(("+", name), name), (("-", name), name)]),
    }
}
