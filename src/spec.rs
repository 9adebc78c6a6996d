//! The query language: parameters that range over literal groups or bind
//! subterm types, semantic predicates over those parameters, and the
//! `Specification` tree that combines them with a target type (spec §3,
//! `Parameter`/`Predicate`/`Specification`/`ParameterSpace`).

use std::fmt;
use std::rc::Rc;

use crate::literal::LiteralValue;
use crate::subtyping::Bindings;
use crate::types::{Symbol, Type};

/// A parameter bound by a [`Specification::Abstraction`]: either a literal
/// drawn from a named group, or a term whose type is fixed in advance.
#[derive(Debug, Clone)]
pub enum Parameter {
    Literal(LiteralParameter),
    Term(TermParameter),
}

impl Parameter {
    pub fn name(&self) -> Symbol {
        match self {
            Parameter::Literal(p) => p.name,
            Parameter::Term(p) => p.name,
        }
    }
}

/// A parameter ranging over the values of a literal group (spec §3).
#[derive(Debug, Clone, Copy)]
pub struct LiteralParameter {
    pub name: Symbol,
    pub group: Symbol,
}

/// A parameter standing for a subterm of a fixed type, rather than a literal
/// value — used to write predicates and implications over whole solutions
/// instead of just the literals refining them.
#[derive(Debug, Clone, Copy)]
pub struct TermParameter {
    pub name: Symbol,
    pub type_: Type,
}

/// A user-supplied semantic check over a parameter binding. Predicates are
/// opaque closures, the same way the teacher crate treats externally
/// supplied value-level checks in `value::ConstValue` comparisons — the
/// synthesizer calls them without knowing what they test.
#[derive(Clone)]
pub struct Predicate {
    pub name: Symbol,
    pub parameters: &'static [Symbol],
    check: Rc<dyn Fn(&Bindings) -> bool>,
}

impl Predicate {
    pub fn new(
        name: &str,
        parameters: &'static [Symbol],
        check: impl Fn(&Bindings) -> bool + 'static,
    ) -> Predicate {
        Predicate {
            name: crate::types::intern_symbol(name),
            parameters,
            check: Rc::new(check),
        }
    }

    pub fn holds(&self, bindings: &Bindings) -> bool {
        (self.check)(bindings)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A synthesis query: a target [`Type`], optionally behind a chain of bound
/// parameters and predicate guards (spec §3).
#[derive(Debug, Clone)]
pub enum Specification {
    Type(Type),
    Abstraction(Parameter, Box<Specification>),
    Implication(Predicate, Box<Specification>),
}

impl Specification {
    /// The target type once every abstraction and implication is stripped.
    pub fn target(&self) -> Type {
        match self {
            Specification::Type(ty) => *ty,
            Specification::Abstraction(_, body) => body.target(),
            Specification::Implication(_, body) => body.target(),
        }
    }

    /// Every parameter bound along the path from the root to the target,
    /// outermost first.
    pub fn parameters(&self) -> Vec<&Parameter> {
        match self {
            Specification::Type(_) => vec![],
            Specification::Abstraction(param, body) => {
                let mut rest = body.parameters();
                rest.insert(0, param);
                rest
            }
            Specification::Implication(_, body) => body.parameters(),
        }
    }

    /// Every predicate guarding the target, outermost first.
    pub fn predicates(&self) -> Vec<&Predicate> {
        match self {
            Specification::Type(_) => vec![],
            Specification::Abstraction(_, body) => body.predicates(),
            Specification::Implication(pred, body) => {
                let mut rest = body.predicates();
                rest.insert(0, pred);
                rest
            }
        }
    }
}

/// How a literal group's values are made available to the synthesizer: a
/// finite group can be enumerated directly; an infinite or externally
/// defined one (spec §8's "infinite parameter space" scenario) can only be
/// tested for membership, and substitution candidates must instead come
/// from elsewhere (e.g. a ground literal already present in the query).
#[derive(Clone)]
pub enum GroupValues {
    Enumerable(Vec<LiteralValue>),
    MembershipOnly(Rc<dyn Fn(LiteralValue) -> bool>),
}

impl GroupValues {
    pub fn contains(&self, value: LiteralValue) -> bool {
        match self {
            GroupValues::Enumerable(values) => values.contains(&value),
            GroupValues::MembershipOnly(test) => test(value),
        }
    }

    pub fn values(&self) -> Option<&[LiteralValue]> {
        match self {
            GroupValues::Enumerable(values) => Some(values),
            GroupValues::MembershipOnly(_) => None,
        }
    }
}

impl fmt::Debug for GroupValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValues::Enumerable(values) => f.debug_tuple("Enumerable").field(values).finish(),
            GroupValues::MembershipOnly(_) => f.write_str("MembershipOnly(..)"),
        }
    }
}

/// The universe of literal groups a query can draw parameters from.
#[derive(Debug, Clone, Default)]
pub struct ParameterSpace {
    groups: std::collections::HashMap<Symbol, GroupValues, ahash::RandomState>,
}

impl ParameterSpace {
    pub fn new() -> ParameterSpace {
        ParameterSpace::default()
    }

    pub fn declare(&mut self, group: &str, values: GroupValues) -> &mut Self {
        self.groups.insert(crate::types::intern_symbol(group), values);
        self
    }

    pub fn get(&self, group: Symbol) -> Option<&GroupValues> {
        self.groups.get(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specification_target_sees_through_abstractions_and_implications() {
        let ty = Type::constructor0("fib");
        let pred = Predicate::new("always", &[], |_| true);
        let param = Parameter::Literal(LiteralParameter {
            name: crate::types::intern_symbol("n"),
            group: crate::types::intern_symbol("int"),
        });
        let spec = Specification::Abstraction(
            param,
            Box::new(Specification::Implication(pred, Box::new(Specification::Type(ty)))),
        );
        assert_eq!(spec.target(), ty);
        assert_eq!(spec.parameters().len(), 1);
        assert_eq!(spec.predicates().len(), 1);
    }

    #[test]
    fn enumerable_group_reports_its_values() {
        let mut space = ParameterSpace::new();
        space.declare("int", GroupValues::Enumerable(vec![LiteralValue::Int(1), LiteralValue::Int(2)]));
        let group = space.get(crate::types::intern_symbol("int")).unwrap();
        assert_eq!(group.values().unwrap().len(), 2);
        assert!(group.contains(LiteralValue::Int(1)));
        assert!(!group.contains(LiteralValue::Int(3)));
    }

    #[test]
    fn membership_only_group_has_no_enumerable_values() {
        let mut space = ParameterSpace::new();
        space.declare(
            "even",
            GroupValues::MembershipOnly(Rc::new(|v| matches!(v, LiteralValue::Int(n) if n % 2 == 0))),
        );
        let group = space.get(crate::types::intern_symbol("even")).unwrap();
        assert!(group.values().is_none());
        assert!(group.contains(LiteralValue::Int(4)));
        assert!(!group.contains(LiteralValue::Int(3)));
    }
}
