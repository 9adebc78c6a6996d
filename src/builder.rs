//! A small fluent layer over [`crate::spec::Specification`] construction,
//! standing in for the Python source's DSL module — just enough to write a
//! query without nesting `Box::new` by hand.

use crate::galloc::AllocForExactSizeIter;
use crate::literal::LiteralValue;
use crate::spec::{LiteralParameter, Parameter, Predicate, Specification};
use crate::types::{intern_symbol, Symbol, Type};

/// Builds a [`Specification`] from the inside out: start from a target
/// type, then wrap it in predicates and parameter abstractions outside-in
/// via [`SpecBuilder::implies`] and [`SpecBuilder::for_all`].
pub struct SpecBuilder {
    spec: Specification,
}

impl SpecBuilder {
    pub fn target(ty: Type) -> SpecBuilder {
        SpecBuilder { spec: Specification::Type(ty) }
    }

    /// Guards the specification built so far with `predicate`.
    pub fn implies(self, predicate: Predicate) -> SpecBuilder {
        SpecBuilder { spec: Specification::Implication(predicate, Box::new(self.spec)) }
    }

    /// Binds a fresh literal parameter named `name`, ranging over `group`,
    /// around the specification built so far.
    pub fn for_all(self, name: &str, group: &str) -> SpecBuilder {
        let param = Parameter::Literal(LiteralParameter { name: intern_symbol(name), group: intern_symbol(group) });
        SpecBuilder { spec: Specification::Abstraction(param, Box::new(self.spec)) }
    }

    pub fn build(self) -> Specification {
        self.spec
    }
}

/// Builds a predicate whose check only needs a single named binding,
/// avoiding the boilerplate of pulling it out of the full [`crate::subtyping::Bindings`] map by hand.
pub fn predicate_on(
    name: &str,
    parameter: &'static str,
    check: impl Fn(LiteralValue) -> bool + 'static,
) -> Predicate {
    let parameters = std::iter::once(parameter).galloc_scollect();
    Predicate::new(name, parameters, move |bindings| {
        bindings.get(parameter).map(|v| check(*v)).unwrap_or(false)
    })
}

pub fn int(n: i64) -> LiteralValue {
    LiteralValue::Int(n)
}

pub fn boolean(b: bool) -> LiteralValue {
    LiteralValue::Bool(b)
}

pub fn string(s: &'static str) -> LiteralValue {
    LiteralValue::Str(s)
}

pub fn symbol(name: &str) -> Symbol {
    intern_symbol(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_composes_abstraction_and_implication_around_a_type() {
        let ty = Type::constructor0("fib");
        let pred = predicate_on("positive", "n", |v| matches!(v, LiteralValue::Int(n) if n > 0));
        let spec = SpecBuilder::target(ty).implies(pred).for_all("n", "int").build();
        assert_eq!(spec.target(), ty);
        assert_eq!(spec.parameters().len(), 1);
        assert_eq!(spec.predicates().len(), 1);
    }
}
