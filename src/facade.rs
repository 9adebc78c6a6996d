//! The single entry point a caller drives: [`Cosy::solve`] takes a query and
//! fuses grammar construction, pruning, enumeration, and interpretation into
//! one call, the way `cosy.__init__`'s top-level `solve` function does over
//! its four building blocks (spec §1, §6).

use std::rc::Rc;

use ahash::AHashMap;

use crate::enumerate::enumerate_trees;
use crate::error::{Error, Result};
use crate::literal::LiteralValue;
use crate::spec::{GroupValues, Parameter, ParameterSpace, Specification};
use crate::subtyping::Bindings;
use crate::synthesizer::{CombinatorInfo, Synthesizer};
use crate::taxonomy::Taxonomy;
use crate::tree::Tree;
use crate::types::Symbol;

/// A configured synthesis problem: a taxonomy, the combinators available to
/// it, and the groups their literal parameters range over.
pub struct Cosy {
    synthesizer: Synthesizer,
}

impl Cosy {
    pub fn new(taxonomy: Taxonomy, combinators: Vec<CombinatorInfo>, parameters: ParameterSpace) -> Cosy {
        Cosy { synthesizer: Synthesizer::new(taxonomy, combinators, parameters) }
    }

    /// Solves `specification`, returning up to `max_count` trees.
    ///
    /// Every literal parameter the query abstracts over is enumerated (its
    /// group must be finite — an abstraction over a membership-only group
    /// is rejected, since there is nothing to iterate), each combination
    /// checked against the query's predicates, and for every combination
    /// that survives, a grammar is built for the combination's grounded
    /// target type and enumerated. Results across combinations are
    /// concatenated in the order the combinations were tried.
    pub fn solve(&self, specification: &Specification, max_count: usize) -> Result<Vec<Tree>> {
        let literal_params: Vec<(Symbol, Symbol)> = specification
            .parameters()
            .iter()
            .filter_map(|p| match p {
                Parameter::Literal(lit) => Some((lit.name, lit.group)),
                Parameter::Term(_) => None,
            })
            .collect();

        let mut groups: AHashMap<Symbol, &GroupValues> = AHashMap::default();
        for (name, group) in &literal_params {
            let values = self
                .synthesizer
                .parameters
                .get(*group)
                .ok_or_else(|| Error::Specification(format!("undeclared group `{group}`")))?;
            if values.values().is_none() {
                return Err(Error::Specification(format!(
                    "parameter `{name}` ranges over the non-enumerable group `{group}`"
                )));
            }
            groups.insert(*name, values);
        }

        let combinations = cartesian(&literal_params, &groups);
        let group_names: AHashMap<Symbol, Symbol> = literal_params.iter().copied().collect();

        let mut results = Vec::new();
        for bindings in combinations {
            if results.len() >= max_count {
                break;
            }
            if !specification.predicates().iter().all(|pred| pred.holds(&bindings)) {
                continue;
            }
            let target = specification.target().subst(&group_names, &bindings);
            let space = self.synthesizer.construct_solution_space(target);
            let remaining = max_count - results.len();
            results.extend(enumerate_trees(&space, target, remaining));
        }
        Ok(results)
    }

    /// Interprets `tree` by folding each combinator application through
    /// `components`, looking up literal leaves via `literal`.
    pub fn interpret<V: Clone>(
        &self,
        tree: &Tree,
        components: &std::collections::HashMap<Symbol, Rc<dyn Fn(&[V]) -> V>, ahash::RandomState>,
        literal: impl Fn(LiteralValue) -> V,
    ) -> V {
        tree.interpret(components, &literal)
    }
}

fn cartesian(params: &[(Symbol, Symbol)], groups: &AHashMap<Symbol, &GroupValues>) -> Vec<Bindings> {
    let mut combinations = vec![Bindings::default()];
    for (name, _group) in params {
        let values = groups[name].values().expect("checked enumerable above");
        let mut next = Vec::with_capacity(combinations.len() * values.len());
        for combo in &combinations {
            for value in values {
                let mut extended = combo.clone();
                extended.insert(*name, *value);
                next.push(extended);
            }
        }
        combinations = next;
    }
    combinations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::LiteralParameter;
    use crate::types::{intern_symbol, Type};

    fn succ_zero_synth() -> Cosy {
        let mut taxonomy = Taxonomy::new();
        taxonomy.close();
        let zero = CombinatorInfo::simple("zero", Type::constructor0("nat"));
        let succ =
            CombinatorInfo::simple("succ", Type::arrow(Type::constructor0("nat"), Type::constructor0("nat")));
        Cosy::new(taxonomy, vec![zero, succ], ParameterSpace::new())
    }

    #[test]
    fn solve_finds_trees_for_a_plain_type_query() {
        let cosy = succ_zero_synth();
        let nat = Type::constructor0("nat");
        let trees = cosy.solve(&Specification::Type(nat), 3).unwrap();
        assert_eq!(trees.len(), 3);
    }

    #[test]
    fn solve_rejects_abstraction_over_a_membership_only_group() {
        let mut taxonomy = Taxonomy::new();
        taxonomy.close();
        let mut parameters = ParameterSpace::new();
        parameters.declare(
            "even",
            GroupValues::MembershipOnly(Rc::new(|v| matches!(v, LiteralValue::Int(n) if n % 2 == 0))),
        );
        let cosy = Cosy::new(taxonomy, vec![], parameters);
        let param = Parameter::Literal(LiteralParameter { name: intern_symbol("n"), group: intern_symbol("even") });
        let spec = Specification::Abstraction(param, Box::new(Specification::Type(Type::constructor0("nat"))));
        assert!(cosy.solve(&spec, 1).is_err());
    }
}
