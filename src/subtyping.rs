//! Subtype checking and substitution inference over the path-decomposed
//! (`organized`) form of a type (spec §4.1).
//!
//! A type `sigma` is a subtype of `tau` exactly when every path of `tau` is
//! covered by some path of `sigma`: constructors compare through the
//! [`Taxonomy`], arrows are checked contravariantly in the source and
//! covariantly in the target, and literals compare by value and group.
//!
//! Where `tau` still carries `Var` occurrences (as it does while a
//! combinator's declared type is being matched against a query), the same
//! path walk additionally collects the bindings those variables would need —
//! yielding [`SubstOutcome`], which keeps "no binding makes this work" and
//! "more than one binding would" distinct rather than conflating both with
//! an empty map.

use ahash::AHashMap;

use crate::literal::LiteralValue;
use crate::taxonomy::Taxonomy;
use crate::types::{Symbol, Type, TypeNode};

/// A variable assignment: `Var(name) -> LiteralValue`.
pub type Bindings = AHashMap<Symbol, LiteralValue>;

/// The result of matching a ground type against a type that may still
/// contain free variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstOutcome {
    /// No assignment of `tau`'s variables makes `sigma <= tau`.
    Impossible,
    /// Exactly one assignment works.
    Unique(Bindings),
    /// More than one assignment works and they disagree.
    Ambiguous,
}

/// Whether `sigma <= tau` under `taxonomy`. Both types must be ground (free
/// of `Var`); use [`infer_substitution`] when `tau` may still have variables.
pub fn check_subtype(sigma: Type, tau: Type, taxonomy: &Taxonomy) -> bool {
    tau.organized()
        .iter()
        .all(|tp| sigma.organized().iter().any(|sp| path_subtype(*sp, *tp, taxonomy)))
}

fn path_subtype(sp: Type, tp: Type, taxonomy: &Taxonomy) -> bool {
    match (sp.node(), tp.node()) {
        (_, TypeNode::Omega) => true,
        (TypeNode::Constructor(n1, a1), TypeNode::Constructor(n2, a2)) => {
            taxonomy.is_subtype(n1, n2) && check_subtype(a1, a2, taxonomy)
        }
        (TypeNode::Arrow(s1, t1), TypeNode::Arrow(s2, t2)) => {
            check_subtype(s2, s1, taxonomy) && check_subtype(t1, t2, taxonomy)
        }
        (TypeNode::Literal(v1, g1), TypeNode::Literal(v2, g2)) => v1 == v2 && g1 == g2,
        _ => false,
    }
}

/// Infers the binding(s) for `tau`'s free variables under which
/// `sigma <= tau` holds, where `sigma` is ground. `sigma` and `tau` need not
/// be path-aligned one-to-one: every path of `tau` must be covered by some
/// path of `sigma`, exactly as in [`check_subtype`], except a covering path
/// may also have to agree on a variable binding.
pub fn infer_substitution(sigma: Type, tau: Type, taxonomy: &Taxonomy) -> SubstOutcome {
    let mut result: Bindings = AHashMap::default();
    for tp in tau.organized() {
        let mut candidates: Vec<Bindings> = Vec::new();
        for sp in sigma.organized() {
            let mut bindings = Bindings::default();
            if infer_path(*sp, *tp, taxonomy, &mut bindings) {
                candidates.push(bindings);
            }
        }
        if candidates.is_empty() {
            return SubstOutcome::Impossible;
        }
        let first = candidates[0].clone();
        if !candidates.iter().all(|c| *c == first) {
            return SubstOutcome::Ambiguous;
        }
        for (name, value) in first {
            match result.get(&name) {
                Some(existing) if *existing != value => return SubstOutcome::Ambiguous,
                _ => {
                    result.insert(name, value);
                }
            }
        }
    }
    SubstOutcome::Unique(result)
}

fn infer_path(sp: Type, tp: Type, taxonomy: &Taxonomy, bindings: &mut Bindings) -> bool {
    match (sp.node(), tp.node()) {
        (_, TypeNode::Omega) => true,
        (_, TypeNode::Var(name)) => match sp.node() {
            TypeNode::Literal(value, _) => match bindings.get(name) {
                Some(existing) if *existing != value => false,
                _ => {
                    bindings.insert(name, value);
                    true
                }
            },
            _ => false,
        },
        (TypeNode::Constructor(n1, a1), TypeNode::Constructor(n2, a2)) => {
            taxonomy.is_subtype(n1, n2) && infer_path(a1, a2, taxonomy, bindings)
        }
        (TypeNode::Arrow(s1, t1), TypeNode::Arrow(s2, t2)) => {
            check_subtype(s2, s1, taxonomy) && infer_path(t1, t2, taxonomy, bindings)
        }
        (TypeNode::Literal(v1, g1), TypeNode::Literal(v2, g2)) => v1 == v2 && g1 == g2,
        _ => false,
    }
}

/// Infers the binding(s) for `sigma`'s free variables under which
/// `sigma <= tau` holds, where `tau` is ground. This is the mirror image of
/// [`infer_substitution`]: there the variables sit in the supertype (a query
/// abstracted over a literal parameter); here they sit in the subtype (a
/// combinator's own declared type, still carrying its unbound prefix
/// variables) and must be grounded before the combinator can be checked
/// against a concrete non-terminal (spec §4.4 step 1, "necessary
/// substitution").
pub fn infer_substitution_for_combinator(sigma: Type, tau: Type, taxonomy: &Taxonomy) -> SubstOutcome {
    let mut result: Bindings = AHashMap::default();
    for tp in tau.organized() {
        let mut candidates: Vec<Bindings> = Vec::new();
        for sp in sigma.organized() {
            let mut bindings = Bindings::default();
            if infer_path_for_combinator(*sp, *tp, taxonomy, &mut bindings) {
                candidates.push(bindings);
            }
        }
        if candidates.is_empty() {
            return SubstOutcome::Impossible;
        }
        let first = candidates[0].clone();
        if !candidates.iter().all(|c| *c == first) {
            return SubstOutcome::Ambiguous;
        }
        for (name, value) in first {
            match result.get(&name) {
                Some(existing) if *existing != value => return SubstOutcome::Ambiguous,
                _ => {
                    result.insert(name, value);
                }
            }
        }
    }
    SubstOutcome::Unique(result)
}

fn infer_path_for_combinator(sp: Type, tp: Type, taxonomy: &Taxonomy, bindings: &mut Bindings) -> bool {
    match (sp.node(), tp.node()) {
        (_, TypeNode::Omega) => true,
        (TypeNode::Var(name), _) => match tp.node() {
            TypeNode::Literal(value, _) => match bindings.get(name) {
                Some(existing) if *existing != value => false,
                _ => {
                    bindings.insert(name, value);
                    true
                }
            },
            _ => false,
        },
        (TypeNode::Constructor(n1, a1), TypeNode::Constructor(n2, a2)) => {
            taxonomy.is_subtype(n1, n2) && infer_path_for_combinator(a1, a2, taxonomy, bindings)
        }
        (TypeNode::Arrow(s1, t1), TypeNode::Arrow(s2, t2)) => {
            check_subtype(s2, s1, taxonomy) && infer_path_for_combinator(t1, t2, taxonomy, bindings)
        }
        (TypeNode::Literal(v1, g1), TypeNode::Literal(v2, g2)) => v1 == v2 && g1 == g2,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    fn taxonomy() -> Taxonomy {
        let mut t = Taxonomy::new();
        t.declare("int", "number").close();
        t
    }

    #[test]
    fn omega_is_a_supertype_of_everything() {
        let tax = taxonomy();
        let a = Type::constructor0("int");
        assert!(check_subtype(a, Type::omega(), &tax));
    }

    #[test]
    fn constructor_subtyping_follows_taxonomy() {
        let tax = taxonomy();
        let int_ty = Type::constructor0("int");
        let number_ty = Type::constructor0("number");
        assert!(check_subtype(int_ty, number_ty, &tax));
        assert!(!check_subtype(number_ty, int_ty, &tax));
    }

    #[test]
    fn arrow_is_contravariant_in_source() {
        let tax = taxonomy();
        let int_ty = Type::constructor0("int");
        let number_ty = Type::constructor0("number");
        let narrow = Type::arrow(number_ty, int_ty);
        let wide = Type::arrow(int_ty, number_ty);
        assert!(check_subtype(narrow, wide, &tax));
        assert!(!check_subtype(wide, narrow, &tax));
    }

    #[test]
    fn infer_substitution_binds_a_matching_literal() {
        let tax = taxonomy();
        let sigma = Type::constructor("at", Type::literal(3i64, "int"));
        let tau = Type::constructor("at", Type::var("x"));
        match infer_substitution(sigma, tau, &tax) {
            SubstOutcome::Unique(bindings) => {
                assert_eq!(bindings.get("x"), Some(&LiteralValue::Int(3)));
            }
            other => panic!("expected Unique, got {other:?}"),
        }
    }

    #[test]
    fn infer_substitution_is_impossible_when_no_path_covers_tau() {
        let tax = taxonomy();
        let sigma = Type::constructor0("number");
        let tau = Type::constructor("at", Type::var("x"));
        assert_eq!(infer_substitution(sigma, tau, &tax), SubstOutcome::Impossible);
    }

    #[test]
    fn infer_substitution_is_ambiguous_on_conflicting_paths() {
        let tax = taxonomy();
        let sigma = Type::intersection(
            Type::constructor("at", Type::literal(1i64, "int")),
            Type::constructor("at", Type::literal(2i64, "int")),
        );
        let tau = Type::constructor("at", Type::var("x"));
        assert_eq!(infer_substitution(sigma, tau, &tax), SubstOutcome::Ambiguous);
    }

    #[test]
    fn infer_substitution_for_combinator_grounds_a_var_in_the_subtype() {
        let tax = taxonomy();
        let sigma = Type::constructor("at", Type::var("z"));
        let tau = Type::constructor("at", Type::literal(5i64, "int"));
        match infer_substitution_for_combinator(sigma, tau, &tax) {
            SubstOutcome::Unique(bindings) => {
                assert_eq!(bindings.get("z"), Some(&LiteralValue::Int(5)));
            }
            other => panic!("expected Unique, got {other:?}"),
        }
    }

    #[test]
    fn infer_substitution_for_combinator_is_impossible_on_mismatched_constructor() {
        let tax = taxonomy();
        let sigma = Type::constructor("at", Type::var("z"));
        let tau = Type::constructor0("number");
        assert_eq!(infer_substitution_for_combinator(sigma, tau, &tax), SubstOutcome::Impossible);
    }
}
