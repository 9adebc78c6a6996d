//! Values that can instantiate a [`crate::types::Type::Literal`] or a
//! [`crate::spec::Parameter`] — the "any hashable value" of the Python source,
//! narrowed to a small closed tagged union, the same way the teacher crate's
//! `value::ConstValue` narrows its host values rather than boxing `dyn Any`.

use derive_more::{Display, From};

/// A float wrapper with a total order and a `Hash` impl, so floats can sit in
/// `Literal` types and substitution maps the same way integers and strings
/// do. Mirrors `utils::F64` in the teacher crate.
#[derive(Debug, Display, Clone, Copy, From)]
pub struct OrdFloat(pub f64);

impl PartialEq for OrdFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}
impl Eq for OrdFloat {}
impl std::hash::Hash for OrdFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state)
    }
}

/// A literal value: what can be substituted for a [`crate::types::Type::Var`],
/// stored in a [`crate::types::Type::Literal`], or assigned to a
/// [`crate::spec::LiteralParameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From)]
pub enum LiteralValue {
    Int(i64),
    Bool(bool),
    Str(&'static str),
    Float(OrdFloat),
}

impl std::fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiteralValue::Int(i) => write!(f, "{i}"),
            LiteralValue::Bool(b) => write!(f, "{b}"),
            LiteralValue::Str(s) => write!(f, "{s:?}"),
            LiteralValue::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<&'static str> for LiteralValue {
    fn from(s: &'static str) -> Self {
        LiteralValue::Str(s)
    }
}

impl From<f64> for LiteralValue {
    fn from(x: f64) -> Self {
        LiteralValue::Float(OrdFloat(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_floats_hash_equal() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let a = LiteralValue::from(1.5);
        let b = LiteralValue::from(1.5);
        assert_eq!(a, b);

        let mut ha = DefaultHasher::new();
        a.hash(&mut ha);
        let mut hb = DefaultHasher::new();
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }
}
