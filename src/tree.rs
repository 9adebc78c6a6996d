//! Ground terms produced by enumeration (spec §4.6/§4.7): a tree is either a
//! literal leaf or a combinator applied to argument subtrees. `interpret`
//! folds a tree into a host value by looking up each combinator's semantics
//! in a caller-supplied table — the synthesizer itself never knows what a
//! combinator "means", only its type.

use std::rc::Rc;

use crate::literal::LiteralValue;
use crate::types::Symbol;

/// A ground term: a literal, or a combinator applied to its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tree {
    Literal(LiteralValue),
    Node(Symbol, Vec<Tree>),
}

impl Tree {
    pub fn leaf(combinator: Symbol) -> Tree {
        Tree::Node(combinator, vec![])
    }

    /// Number of nodes, matching the size bucketing enumeration schedules by
    /// (spec §4.6).
    pub fn size(&self) -> usize {
        match self {
            Tree::Literal(_) => 1,
            Tree::Node(_, children) => 1 + children.iter().map(Tree::size).sum::<usize>(),
        }
    }

    /// Evaluates the tree by looking up each combinator's semantics in
    /// `components` and folding bottom-up. Panics if a combinator used in
    /// the tree has no entry — that would mean the tree was built from a
    /// grammar the caller didn't fully describe.
    pub fn interpret<V: Clone>(
        &self,
        components: &std::collections::HashMap<Symbol, Rc<dyn Fn(&[V]) -> V>, ahash::RandomState>,
        literal: &impl Fn(LiteralValue) -> V,
    ) -> V {
        match self {
            Tree::Literal(value) => literal(*value),
            Tree::Node(name, children) => {
                let args: Vec<V> = children.iter().map(|c| c.interpret(components, literal)).collect();
                let apply = components
                    .get(name)
                    .unwrap_or_else(|| panic!("no semantics registered for combinator `{name}`"));
                apply(&args)
            }
        }
    }
}

impl std::fmt::Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tree::Literal(value) => write!(f, "{value}"),
            Tree::Node(name, children) if children.is_empty() => write!(f, "{name}"),
            Tree::Node(name, children) => {
                write!(f, "{name}(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::intern_symbol;

    #[test]
    fn size_counts_every_node() {
        let leaf = Tree::leaf(intern_symbol("zero"));
        let one_arg = Tree::Node(intern_symbol("succ"), vec![leaf.clone()]);
        assert_eq!(leaf.size(), 1);
        assert_eq!(one_arg.size(), 2);
    }

    #[test]
    fn interpret_folds_bottom_up() {
        let mut components: std::collections::HashMap<Symbol, Rc<dyn Fn(&[i64]) -> i64>, ahash::RandomState> =
            Default::default();
        components.insert(intern_symbol("zero"), Rc::new(|_| 0));
        components.insert(intern_symbol("succ"), Rc::new(|args: &[i64]| args[0] + 1));
        let tree = Tree::Node(
            intern_symbol("succ"),
            vec![Tree::Node(intern_symbol("succ"), vec![Tree::leaf(intern_symbol("zero"))])],
        );
        let value = tree.interpret(&components, &|_| unreachable!());
        assert_eq!(value, 2);
    }

    #[test]
    fn display_renders_nested_application() {
        let tree = Tree::Node(intern_symbol("pair"), vec![Tree::Literal(LiteralValue::Int(1)), Tree::leaf(intern_symbol("zero"))]);
        assert_eq!(tree.to_string(), "pair(1, zero)");
    }
}
