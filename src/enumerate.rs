//! Lazy, duplicate-free tree enumeration (spec §4.6) and the `contains_tree`
//! membership check used by the regression tests that pin specific trees to
//! specific non-terminals (spec §4.7, §8 "contains-tree regression").

use ahash::AHashMap;
use ahash::AHashSet;

use crate::grammar::{Argument, SolutionSpace};
use crate::tree::Tree;
use crate::types::Type;

/// A safety valve against a grammar whose productive non-terminals never
/// reach `max_count` distinct trees (e.g. a parity gap in tree sizes) — not
/// a semantic limit, just a point past which enumeration gives up rather
/// than spinning forever.
const MAX_SIZE: usize = 512;

/// Up to `max_count` distinct smallest trees derivable from `target`,
/// materialized size-bucket by size-bucket so that every non-terminal's
/// trees of size `n` are available before size `n + 1` is attempted — the
/// same schedule `enumerate_trees` keeps in the Python source, just without
/// its generator-based laziness, since callers here always want a bounded
/// prefix rather than an unbounded stream.
pub fn enumerate_trees(space: &SolutionSpace, target: Type, max_count: usize) -> Vec<Tree> {
    let mut by_nonterminal: AHashMap<Type, Vec<Tree>> = AHashMap::default();
    let mut seen: AHashSet<(Type, Tree)> = AHashSet::default();

    for size in 1..=MAX_SIZE {
        let mut grew = false;
        for nonterminal in space.nonterminals().collect::<Vec<_>>() {
            for rule in space.get(nonterminal) {
                for children in combinations_of_size(&rule.arguments, &by_nonterminal, size - 1) {
                    if !rule.predicates_hold(&children) {
                        continue;
                    }
                    let tree = Tree::Node(rule.combinator, children);
                    if seen.insert((nonterminal, tree.clone())) {
                        by_nonterminal.entry(nonterminal).or_default().push(tree);
                        grew = true;
                    }
                }
            }
        }
        if by_nonterminal.get(&target).map(Vec::len).unwrap_or(0) >= max_count {
            break;
        }
        if !grew {
            break;
        }
    }

    by_nonterminal
        .remove(&target)
        .unwrap_or_default()
        .into_iter()
        .take(max_count)
        .collect()
}

/// Every way to fill `arguments` with trees (materialized so far) whose
/// sizes sum to exactly `budget`.
fn combinations_of_size(
    arguments: &[Argument],
    by_nonterminal: &AHashMap<Type, Vec<Tree>>,
    budget: usize,
) -> Vec<Vec<Tree>> {
    match arguments.split_first() {
        None => {
            if budget == 0 {
                vec![vec![]]
            } else {
                vec![]
            }
        }
        Some((Argument::Constant(constant), rest)) => {
            if budget == 0 {
                return vec![];
            }
            combinations_of_size(rest, by_nonterminal, budget - 1)
                .into_iter()
                .map(|mut tail| {
                    tail.insert(0, Tree::Literal(constant.value));
                    tail
                })
                .collect()
        }
        Some((Argument::NonTerminal(argument), rest)) => {
            let Some(candidates) = by_nonterminal.get(&argument.type_) else {
                return vec![];
            };
            let mut results = Vec::new();
            for candidate in candidates {
                let cost = candidate.size();
                if cost > budget {
                    continue;
                }
                for mut tail in combinations_of_size(rest, by_nonterminal, budget - cost) {
                    tail.insert(0, candidate.clone());
                    results.push(tail);
                }
            }
            results
        }
    }
}

/// Whether `tree` can be derived from `nonterminal` in `space`: some rule's
/// combinator matches the tree's root, and every child tree is in turn
/// derivable from that rule's corresponding argument non-terminal (constant
/// arguments must match the child literal exactly). Results are memoized on
/// `(non-terminal, tree)` since the same sub-tree is often re-checked
/// against the same non-terminal from multiple candidate parent rules.
pub fn contains_tree(space: &SolutionSpace, nonterminal: Type, tree: &Tree) -> bool {
    let mut memo: AHashMap<(Type, Tree), bool> = AHashMap::default();
    contains_tree_memo(space, nonterminal, tree, &mut memo)
}

fn contains_tree_memo(
    space: &SolutionSpace,
    nonterminal: Type,
    tree: &Tree,
    memo: &mut AHashMap<(Type, Tree), bool>,
) -> bool {
    if let Some(&result) = memo.get(&(nonterminal, tree.clone())) {
        return result;
    }
    // Placeholder entry breaks cycles (a recursive non-terminal whose
    // productivity depends on itself is never satisfied by finite input).
    memo.insert((nonterminal, tree.clone()), false);

    let Tree::Node(combinator, children) = tree else {
        return false;
    };

    let matches = space.get(nonterminal).iter().any(|rule| {
        rule.combinator == *combinator
            && rule.arguments.len() == children.len()
            && rule.arguments.iter().zip(children).all(|(arg, child)| match arg {
                Argument::Constant(constant) => matches!(child, Tree::Literal(v) if *v == constant.value),
                Argument::NonTerminal(n) => contains_tree_memo(space, n.type_, child, memo),
            })
            && rule.predicates_hold(children)
    });

    memo.insert((nonterminal, tree.clone()), matches);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::RhsRule;
    use crate::types::intern_symbol;

    fn nat_grammar() -> (SolutionSpace, Type) {
        let mut space = SolutionSpace::new();
        let nat = Type::constructor0("nat");
        space.add_rule(nat, RhsRule::new(intern_symbol("zero"), vec![]));
        space.add_rule(nat, RhsRule::new(intern_symbol("succ"), vec![Argument::nonterminal(None, nat)]));
        (space, nat)
    }

    #[test]
    fn enumerate_trees_yields_smallest_first() {
        let (space, nat) = nat_grammar();
        let trees = enumerate_trees(&space, nat, 3);
        assert_eq!(trees.len(), 3);
        assert_eq!(trees[0].size(), 1);
        assert!(trees[1].size() <= trees[2].size());
    }

    #[test]
    fn enumerate_trees_never_duplicates() {
        let (space, nat) = nat_grammar();
        let trees = enumerate_trees(&space, nat, 10);
        let unique: AHashSet<_> = trees.iter().cloned().collect();
        assert_eq!(unique.len(), trees.len());
    }

    #[test]
    fn contains_tree_accepts_a_derivable_tree() {
        let (space, nat) = nat_grammar();
        let zero = Tree::leaf(intern_symbol("zero"));
        let two = Tree::Node(intern_symbol("succ"), vec![Tree::Node(intern_symbol("succ"), vec![zero])]);
        assert!(contains_tree(&space, nat, &two));
    }

    #[test]
    fn contains_tree_rejects_an_unrelated_tree() {
        let (space, nat) = nat_grammar();
        let bogus = Tree::leaf(intern_symbol("not_in_grammar"));
        assert!(!contains_tree(&space, nat, &bogus));
    }

    #[test]
    fn contains_tree_rejects_wrong_literal_argument() {
        let mut space = SolutionSpace::new();
        let at = Type::constructor0("at");
        space.add_rule(
            at,
            RhsRule::new(
                intern_symbol("lit"),
                vec![Argument::constant(None, crate::literal::LiteralValue::Int(1), intern_symbol("int"))],
            ),
        );
        let wrong = Tree::Node(intern_symbol("lit"), vec![Tree::Literal(crate::literal::LiteralValue::Int(2))]);
        assert!(!contains_tree(&space, at, &wrong));
    }
}
