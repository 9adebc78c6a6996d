//! Builds the tree grammar for a query (spec §4.3, §4.4): decomposes each
//! combinator's (possibly intersected, possibly literal-parameterized) type
//! into a family of multi-arrows indexed by arity, matches their targets
//! against the non-terminals reachable from the query type, grounds any
//! remaining prefix variables by necessary substitution and literal
//! enumeration, and emits one production per minimal cover of the target's
//! paths whose arguments survive the combinator's own deferred predicates.

use ahash::AHashMap;

use crate::combinatorics::{maximal_elements, minimal_covers, partition, Mask};
use crate::grammar::{Argument, RhsRule, SolutionSpace};
use crate::spec::{ParameterSpace, Predicate};
use crate::subtyping::{check_subtype, infer_substitution_for_combinator, Bindings, SubstOutcome};
use crate::taxonomy::Taxonomy;
use crate::types::{Symbol, Type, TypeNode};

/// One reading of a combinator's type as an `n`-ary arrow: the argument
/// types in application order and the resulting target (spec §4.3). Unlike
/// [`decompose`]'s final output, a raw `MultiArrow` may still carry `Var`
/// occurrences from the combinator's own prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiArrow {
    pub args: Vec<Type>,
    pub target: Type,
}

/// The maximum arrow-spine length any organized path of `ty` has.
fn max_arity(ty: Type) -> usize {
    fn depth(path: Type) -> usize {
        match path.node() {
            TypeNode::Arrow(_, target) => 1 + depth(target),
            _ => 0,
        }
    }
    ty.organized().iter().map(|p| depth(*p)).max().unwrap_or(0)
}

/// Every multi-arrow reading of `ty`, indexed by arity (spec §4.3):
/// `splits[0]` is the single, whole-type reading consuming no arguments;
/// `splits[k]` holds one entry per organized path whose arrow spine is at
/// least `k` long, read as a `k`-ary arrow plus whatever's left of the
/// spine as its target. Readings of the same arity are kept separate
/// (rather than combined into one intersection up front) so that
/// [`Synthesizer::rules_for`]'s cover step can select exactly the subset
/// whose targets are actually needed.
pub fn splits(ty: Type) -> Vec<Vec<MultiArrow>> {
    let mut result: Vec<Vec<MultiArrow>> = vec![Vec::new(); max_arity(ty) + 1];
    result[0].push(MultiArrow { args: Vec::new(), target: ty });
    for path in ty.organized() {
        let mut args = Vec::new();
        let mut current = *path;
        while let TypeNode::Arrow(source, target) = current.node() {
            args.push(source);
            current = target;
            result[args.len()].push(MultiArrow { args: args.clone(), target: current });
        }
    }
    result
}

/// A combinator's declared type scheme (spec §3): a binder `prefix` of
/// literal parameters, the `groups` they each range over, a list of
/// `term_predicates` deferred until those parameters (and any argument
/// positions they flow into) are bound, and the (possibly `Var`-carrying)
/// `type_`, pre-split into its per-arity multi-arrow family.
#[derive(Debug, Clone)]
pub struct CombinatorInfo {
    pub name: Symbol,
    pub prefix: Vec<Symbol>,
    pub groups: AHashMap<Symbol, Symbol>,
    pub term_predicates: Vec<Predicate>,
    pub type_: Type,
    multiarrows: Vec<Vec<MultiArrow>>,
}

impl CombinatorInfo {
    pub fn new(
        name: &'static str,
        prefix: Vec<Symbol>,
        groups: AHashMap<Symbol, Symbol>,
        term_predicates: Vec<Predicate>,
        type_: Type,
    ) -> CombinatorInfo {
        let multiarrows = splits(type_);
        CombinatorInfo { name, prefix, groups, term_predicates, type_, multiarrows }
    }

    /// A combinator with no literal parameters of its own: no prefix, no
    /// groups, no deferred predicates, just a type.
    pub fn simple(name: &'static str, type_: Type) -> CombinatorInfo {
        CombinatorInfo::new(name, Vec::new(), AHashMap::default(), Vec::new(), type_)
    }
}

/// Builds and prunes the grammar reachable from a query type, given a fixed
/// set of combinators, their taxonomy, and the groups their literal
/// parameters range over.
pub struct Synthesizer {
    pub taxonomy: Taxonomy,
    pub combinators: Vec<CombinatorInfo>,
    pub parameters: ParameterSpace,
}

impl Synthesizer {
    pub fn new(taxonomy: Taxonomy, combinators: Vec<CombinatorInfo>, parameters: ParameterSpace) -> Synthesizer {
        Synthesizer { taxonomy, combinators, parameters }
    }

    /// The rules a single combinator contributes for the non-terminal
    /// `target`, following spec §4.4's three steps at every arity the
    /// combinator offers:
    ///
    /// 1. *Necessary substitution*: match every arity-`k` multi-arrow's
    ///    target against `target`, collecting the prefix bindings that
    ///    match forces (spec §4.4 step 1, [`infer_substitution_for_combinator`]).
    /// 2. *Literal enumeration*: any prefix variable the target didn't
    ///    force is enumerated over its declared group (spec §4.4 step 2).
    /// 3. *Minimal cover*: for each surviving grounding, the multi-arrows at
    ///    that arity are covered against `target.organized()` by
    ///    [`minimal_covers`], and the argument types of each cover are
    ///    combined position-wise and deduplicated by [`maximal_elements`]
    ///    (spec §4.4 step 3, §4.2's "asymptotic hot loop").
    fn rules_for(&self, combinator: &CombinatorInfo, target: Type) -> Vec<RhsRule> {
        let mut rules = Vec::new();
        for arity_group in &combinator.multiarrows {
            if arity_group.is_empty() {
                continue;
            }
            let necessary = self.necessary_bindings(combinator, arity_group, target);
            let Some(necessary) = necessary else { continue };

            for bindings in self.enumerate_groundings(combinator, necessary) {
                rules.extend(self.cover_rules(combinator, arity_group, target, &bindings));
            }
        }
        rules
    }

    /// Step 1: the union of every arity-`k` multi-arrow's necessary
    /// substitution against `target`, or `None` if two multi-arrows demand
    /// conflicting bindings (treated as a skip, logged, like an ambiguous
    /// match).
    fn necessary_bindings(
        &self,
        combinator: &CombinatorInfo,
        arity_group: &[MultiArrow],
        target: Type,
    ) -> Option<Bindings> {
        let mut merged: Bindings = Bindings::default();
        for arrow in arity_group {
            match infer_substitution_for_combinator(arrow.target, target, &self.taxonomy) {
                SubstOutcome::Impossible => continue,
                SubstOutcome::Ambiguous => {
                    crate::warn!("ambiguous necessary substitution for `{}` against `{target}`", combinator.name);
                    continue;
                }
                SubstOutcome::Unique(bindings) => {
                    for (name, value) in bindings {
                        match merged.get(&name) {
                            Some(existing) if *existing != value => {
                                crate::warn!(
                                    "conflicting necessary substitution for `{}` on `{name}`",
                                    combinator.name
                                );
                                return None;
                            }
                            _ => {
                                merged.insert(name, value);
                            }
                        }
                    }
                }
            }
        }
        Some(merged)
    }

    /// Step 2: every complete grounding of `combinator.prefix` extending
    /// `necessary` with a cartesian enumeration of the remaining variables'
    /// declared groups, filtered by `term_predicates`. A remaining variable
    /// whose group is not enumerable (spec §8's "infinite parameter space")
    /// makes the combinator unusable for this target; it is dropped with a
    /// warning rather than aborting the whole grammar.
    fn enumerate_groundings(&self, combinator: &CombinatorInfo, necessary: Bindings) -> Vec<Bindings> {
        let mut groundings = vec![necessary.clone()];
        for var in &combinator.prefix {
            if necessary.contains_key(var) {
                continue;
            }
            let Some(group_name) = combinator.groups.get(var) else { continue };
            let Some(group) = self.parameters.get(*group_name) else {
                crate::warn!("combinator `{}`'s parameter `{var}` ranges over an undeclared group", combinator.name);
                return Vec::new();
            };
            let Some(values) = group.values() else {
                crate::warn!(
                    "combinator `{}`'s parameter `{var}` ranges over the non-enumerable group `{group_name}`",
                    combinator.name
                );
                return Vec::new();
            };
            let mut next = Vec::with_capacity(groundings.len() * values.len());
            for partial in &groundings {
                for value in values {
                    let mut extended = partial.clone();
                    extended.insert(*var, *value);
                    next.push(extended);
                }
            }
            groundings = next;
        }
        groundings.retain(|bindings| combinator.term_predicates.iter().all(|p| p.holds(bindings)));
        groundings
    }

    /// Step 3: grounds every multi-arrow in `arity_group` under `bindings`,
    /// finds every minimal subset whose targets jointly cover
    /// `target.organized()`, and turns each cover into one rule whose
    /// arguments are the position-wise combination of the covered
    /// multi-arrows' argument types — keeping only the maximal (most
    /// general) argument tuples across covers. `bindings` has already been
    /// checked against `term_predicates` once, in [`Self::enumerate_groundings`];
    /// a predicate is only reattached to the emitted rule for the deferred
    /// recheck in `predicates_hold` when every parameter it needs is among
    /// the rule's own named argument positions — a predicate over a prefix
    /// variable that never surfaces as a named argument (e.g. one that only
    /// grounds the combinator's own target, or flows into a recursive
    /// non-terminal position) has nothing to recheck against and is trusted
    /// to have already been enforced here.
    fn cover_rules(
        &self,
        combinator: &CombinatorInfo,
        arity_group: &[MultiArrow],
        target: Type,
        bindings: &Bindings,
    ) -> Vec<RhsRule> {
        let grounded: Vec<MultiArrow> = arity_group
            .iter()
            .map(|arrow| MultiArrow {
                args: arrow.args.iter().map(|a| a.subst(&combinator.groups, bindings)).collect(),
                target: arrow.target.subst(&combinator.groups, bindings),
            })
            .collect();

        let target_paths = target.organized();
        if target_paths.len() > Mask::BITS as usize {
            crate::warn!("target `{target}` has too many organized paths to cover; skipping `{}`", combinator.name);
            return Vec::new();
        }
        let full_mask: Mask = if target_paths.is_empty() { 0 } else { (1 << target_paths.len()) - 1 };

        let masks: Vec<Mask> = grounded
            .iter()
            .map(|arrow| {
                target_paths.iter().enumerate().fold(0, |mask, (i, path)| {
                    if check_subtype(arrow.target, *path, &self.taxonomy) {
                        mask | (1 << i)
                    } else {
                        mask
                    }
                })
            })
            .collect();

        let useful: Vec<usize> = (0..grounded.len()).filter(|i| masks[*i] != 0).collect();
        if useful.is_empty() {
            return Vec::new();
        }
        let useful_masks: Vec<Mask> = useful.iter().map(|i| masks[*i]).collect();

        let mut candidates: Vec<Vec<Argument>> = Vec::new();
        for cover in minimal_covers(full_mask, &useful_masks) {
            let members: Vec<usize> = cover.iter().map(|i| useful[*i]).collect();
            candidates.push(self.combine_cover(combinator, &arity_group[0], &grounded, &members));
        }

        let maximal = maximal_elements(&candidates, |a, b| {
            a.len() == b.len()
                && a.iter().zip(b).all(|(x, y)| argument_dominates(x, y, &self.taxonomy))
        });

        maximal
            .into_iter()
            .map(|args| {
                let names: Vec<Symbol> = args.iter().filter_map(|a| a.name()).collect();
                let rechecked = combinator
                    .term_predicates
                    .iter()
                    .filter(|p| p.parameters.iter().all(|param| names.contains(param)))
                    .cloned()
                    .collect();
                RhsRule::with_predicates(combinator.name, args, rechecked)
            })
            .collect()
    }

    /// Combines the argument types of the multi-arrows named by `members`
    /// position-wise: a position whose original (pre-substitution) type was
    /// a bare prefix variable becomes a [`Argument::Constant`] carrying the
    /// bound literal value; any other position becomes an
    /// [`Argument::NonTerminal`] whose type is the intersection of that
    /// position's grounded types across every covered multi-arrow.
    fn combine_cover(
        &self,
        combinator: &CombinatorInfo,
        original: &MultiArrow,
        grounded: &[MultiArrow],
        members: &[usize],
    ) -> Vec<Argument> {
        let arity = original.args.len();
        (0..arity)
            .map(|position| match original.args[position].node() {
                TypeNode::Var(name) => {
                    let value = grounded[members[0]].args[position];
                    match value.node() {
                        TypeNode::Literal(v, group) => Argument::constant(Some(name), v, group),
                        _ => Argument::nonterminal(Some(name), value),
                    }
                }
                _ => {
                    let combined = Type::intersect(
                        &members.iter().map(|i| grounded[*i].args[position]).collect::<Vec<_>>(),
                    );
                    Argument::nonterminal(None, combined)
                }
            })
            .collect()
    }

    /// Builds the full grammar reachable from `target`: a worklist over
    /// non-terminals, adding every combinator's rules for each, and
    /// following any new non-terminal introduced by an argument position
    /// (spec §4.4), then pruning unproductive non-terminals (spec §4.5).
    pub fn construct_solution_space(&self, target: Type) -> SolutionSpace {
        let mut space = SolutionSpace::new();
        let mut worklist = vec![target];
        let mut seen = ahash::AHashSet::default();
        seen.insert(target);

        while let Some(nonterminal) = worklist.pop() {
            for combinator in &self.combinators {
                for rule in self.rules_for(combinator, nonterminal) {
                    for arg in rule.nonterminal_arguments() {
                        if seen.insert(arg) {
                            worklist.push(arg);
                        }
                    }
                    space.add_rule(nonterminal, rule);
                }
            }
        }

        space.prune();
        space
    }
}

/// `a` is dominated by (droppable in favor of) `b` at one argument
/// position: constants must agree (they're bound by the same grounding
/// already, so this only ever fails across genuinely different groundings),
/// and non-terminal positions compare contravariantly — `a`'s type must be
/// at least as general as `b`'s, since a rule requiring a narrower subterm
/// type is never easier to satisfy than one requiring a wider one.
fn argument_dominates(a: &Argument, b: &Argument, taxonomy: &Taxonomy) -> bool {
    match (a, b) {
        (Argument::Constant(x), Argument::Constant(y)) => x.value == y.value && x.group == y.group,
        (Argument::NonTerminal(x), Argument::NonTerminal(y)) => check_subtype(y.type_, x.type_, taxonomy),
        _ => false,
    }
}
