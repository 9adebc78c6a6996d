//! The tree grammar a synthesis run constructs and prunes before enumeration
//! (spec §3 `SolutionSpace`, §4.5 pruning): non-terminals are types, each
//! production (`RhsRule`) names a combinator and the non-terminals (or fixed
//! literal arguments) it needs, plus the combinator's own deferred term
//! predicates (spec §3's `NT ~> Terminal(args) [predicates]` rule form).

use ahash::AHashMap;
use ahash::AHashSet;

use crate::literal::LiteralValue;
use crate::spec::Predicate;
use crate::subtyping::Bindings;
use crate::tree::Tree;
use crate::types::{Symbol, Type};

/// A literal argument baked into a rule at construction time (spec §3's
/// `ConstantArgument(name, value, group)`). `name` is the combinator
/// prefix variable this value came from, and is the key term predicates
/// look the value up under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstantArgument {
    pub name: Option<Symbol>,
    pub value: LiteralValue,
    pub group: Symbol,
}

/// An argument position still requiring a synthesized subterm, optionally
/// named (when the combinator's prefix binds a term parameter rather than a
/// literal one) so predicates can refer to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NonTerminalArgument {
    pub name: Option<Symbol>,
    pub type_: Type,
}

/// One argument position of a production: either a fixed literal baked into
/// the rule at construction time, or a non-terminal the enumerator must
/// first produce a term for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Argument {
    Constant(ConstantArgument),
    NonTerminal(NonTerminalArgument),
}

impl Argument {
    pub fn constant(name: Option<Symbol>, value: LiteralValue, group: Symbol) -> Argument {
        Argument::Constant(ConstantArgument { name, value, group })
    }

    pub fn nonterminal(name: Option<Symbol>, type_: Type) -> Argument {
        Argument::NonTerminal(NonTerminalArgument { name, type_ })
    }

    pub fn name(&self) -> Option<Symbol> {
        match self {
            Argument::Constant(c) => c.name,
            Argument::NonTerminal(n) => n.name,
        }
    }
}

/// One production `nonterminal -> combinator(args...) [predicates]`. The
/// predicates are the combinator's own deferred term predicates (spec §3),
/// distinct from a query's outer `Specification::Implication` guard: they
/// are evaluated here, against the bindings the rule's own named arguments
/// supply, rather than once up front against the query's parameters.
#[derive(Debug, Clone)]
pub struct RhsRule {
    pub combinator: Symbol,
    pub arguments: Vec<Argument>,
    pub predicates: Vec<Predicate>,
}

impl PartialEq for RhsRule {
    fn eq(&self, other: &Self) -> bool {
        self.combinator == other.combinator && self.arguments == other.arguments
    }
}
impl Eq for RhsRule {}

impl RhsRule {
    pub fn new(combinator: Symbol, arguments: Vec<Argument>) -> RhsRule {
        RhsRule { combinator, arguments, predicates: Vec::new() }
    }

    pub fn with_predicates(combinator: Symbol, arguments: Vec<Argument>, predicates: Vec<Predicate>) -> RhsRule {
        RhsRule { combinator, arguments, predicates }
    }

    /// The non-terminals this rule depends on, in argument order.
    pub fn nonterminal_arguments(&self) -> impl Iterator<Item = Type> + '_ {
        self.arguments.iter().filter_map(|a| match a {
            Argument::NonTerminal(n) => Some(n.type_),
            Argument::Constant(_) => None,
        })
    }

    /// The bindings a rule's own arguments supply once `children` has been
    /// matched against them positionally: every named constant argument
    /// contributes its value directly; every named non-terminal argument
    /// contributes its value only if the subtree bound to it happens to be a
    /// literal leaf (the common case for a combinator's own prefix
    /// variables threaded through as a synthesized, rather than constant,
    /// argument). Unnamed or non-literal positions simply don't appear in
    /// the map; a predicate that needs them will fail its own lookup.
    pub fn argument_bindings(&self, children: &[Tree]) -> Bindings {
        let mut bindings = Bindings::default();
        for (argument, child) in self.arguments.iter().zip(children) {
            let Some(name) = argument.name() else { continue };
            match (argument, child) {
                (Argument::Constant(c), _) => {
                    bindings.insert(name, c.value);
                }
                (Argument::NonTerminal(_), Tree::Literal(value)) => {
                    bindings.insert(name, *value);
                }
                _ => {}
            }
        }
        bindings
    }

    /// Whether `children`, already matched positionally against this rule's
    /// arguments, also satisfy every deferred term predicate.
    pub fn predicates_hold(&self, children: &[Tree]) -> bool {
        if self.predicates.is_empty() {
            return true;
        }
        let bindings = self.argument_bindings(children);
        self.predicates.iter().all(|p| p.holds(&bindings))
    }
}

/// The grammar built for a synthesis run: every reachable type, and the
/// productions available for it.
#[derive(Debug, Default)]
pub struct SolutionSpace {
    rules: AHashMap<Type, Vec<RhsRule>>,
}

impl SolutionSpace {
    pub fn new() -> SolutionSpace {
        SolutionSpace::default()
    }

    pub fn add_rule(&mut self, nonterminal: Type, rule: RhsRule) {
        let entry = self.rules.entry(nonterminal).or_default();
        if !entry.contains(&rule) {
            entry.push(rule);
        }
    }

    pub fn get(&self, nonterminal: Type) -> &[RhsRule] {
        self.rules.get(&nonterminal).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = Type> + '_ {
        self.rules.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Removes every non-terminal that cannot produce a ground term, and
    /// every rule depending on one, by a fixpoint over the inverse grammar
    /// (spec §4.5): start from rules with no non-terminal arguments
    /// (necessarily productive), then repeatedly add any non-terminal all of
    /// whose rule's dependencies are already known productive.
    pub fn prune(&mut self) {
        let mut productive: AHashSet<Type> = AHashSet::default();
        let mut changed = true;
        while changed {
            changed = false;
            for (nonterminal, rules) in &self.rules {
                if productive.contains(nonterminal) {
                    continue;
                }
                let is_productive = rules.iter().any(|rule| {
                    rule.nonterminal_arguments().all(|nt| productive.contains(&nt))
                });
                if is_productive {
                    productive.insert(*nonterminal);
                    changed = true;
                }
            }
        }
        self.rules.retain(|nonterminal, rules| {
            rules.retain(|rule| rule.nonterminal_arguments().all(|nt| productive.contains(&nt)));
            productive.contains(nonterminal) && !rules.is_empty()
        });
    }

    /// A human-readable dump of every production, one non-terminal per line,
    /// for trace output and regression assertions.
    pub fn show(&self) -> String {
        let mut lines: Vec<String> = self
            .rules
            .iter()
            .map(|(nonterminal, rules)| {
                let rhs = rules
                    .iter()
                    .map(|r| format!("{}({})", r.combinator, r.arguments.len()))
                    .collect::<Vec<_>>()
                    .join(" | ");
                format!("{nonterminal} -> {rhs}")
            })
            .collect();
        lines.sort();
        lines.join("\n")
    }
}
