//! The intersection type language (spec §3): `Omega`, `Constructor`, `Arrow`,
//! `Intersection`, `Literal`, `Var`, plus the cached derived fields every
//! type carries (`is_omega`, `size`, `organized`, `free_vars`).
//!
//! Following the teacher crate's arena-handle idiom (`expr::Expr` nodes
//! allocated via `galloc` and passed around as `&'static` references), a
//! `Type` is a cheap `Copy` handle into a thread-local bump arena. Every
//! constructor interns its node once and precomputes the derived fields, so
//! repeated traversals (subtyping, `organized`, pretty-printing) never
//! recompute them.

use std::cell::Cell;
use std::fmt;

use itertools::Itertools;

use crate::galloc::{AllocForAny, AllocForExactSizeIter, AllocForStr};
use crate::literal::LiteralValue;

/// An interned name: a constructor, group, or variable identifier.
pub type Symbol = &'static str;

/// Interns an arbitrary string as a [`Symbol`]. Combinator, group and
/// variable names built from `&'static str` literals don't need this (they
/// are already `'static`); it exists for names assembled at runtime.
pub fn intern_symbol(s: &str) -> Symbol {
    s.galloc_str()
}

#[derive(Debug, Clone, Copy)]
pub enum TypeNode {
    Omega,
    Constructor(Symbol, Type),
    Arrow(Type, Type),
    Intersection(Type, Type),
    Literal(LiteralValue, Symbol),
    Var(Symbol),
}

struct TypeData {
    node: TypeNode,
    is_omega: bool,
    size: usize,
    free_vars: &'static [Symbol],
    // Filled in right after `this` is known, since a path type's `organized`
    // set contains `self` — see `intern` below.
    organized: Cell<&'static [Type]>,
}

/// A value of the intersection type language (spec §3). Cheap to copy and
/// compare: equality and hashing are structural over the underlying node.
#[derive(Clone, Copy)]
pub struct Type(&'static TypeData);

impl Type {
    pub fn node(&self) -> TypeNode {
        self.0.node
    }

    pub fn is_omega(&self) -> bool {
        self.0.is_omega
    }

    pub fn size(&self) -> usize {
        self.0.size
    }

    pub fn free_vars(&self) -> &'static [Symbol] {
        self.0.free_vars
    }

    /// The path decomposition (spec §3): a non-intersection type's `organized`
    /// set is itself; an intersection's is the union of its parts' sets,
    /// after distributing through constructors and arrows.
    pub fn organized(&self) -> &'static [Type] {
        self.0.organized.get()
    }

    pub fn omega() -> Type {
        intern(TypeNode::Omega)
    }

    pub fn constructor(name: &str, arg: Type) -> Type {
        intern(TypeNode::Constructor(intern_symbol(name), arg))
    }

    /// A nullary constructor, whose argument defaults to `Omega` (spec §3).
    pub fn constructor0(name: &str) -> Type {
        Type::constructor(name, Type::omega())
    }

    pub fn arrow(source: Type, target: Type) -> Type {
        intern(TypeNode::Arrow(source, target))
    }

    pub fn intersection(left: Type, right: Type) -> Type {
        intern(TypeNode::Intersection(left, right))
    }

    pub fn literal(value: impl Into<LiteralValue>, group: &str) -> Type {
        intern(TypeNode::Literal(value.into(), intern_symbol(group)))
    }

    pub fn var(name: &str) -> Type {
        intern(TypeNode::Var(intern_symbol(name)))
    }

    /// Right-associates `types` into a single intersection, or `Omega` if
    /// empty (spec §3, `Type.intersect`).
    pub fn intersect(types: &[Type]) -> Type {
        match types.split_last() {
            None => Type::omega(),
            Some((last, rest)) => rest
                .iter()
                .rev()
                .fold(*last, |acc, t| Type::intersection(*t, acc)),
        }
    }

    /// Substitutes `Var` occurrences per `substitution`, consulting `groups`
    /// for the group a variable ranges over. A no-op subtree is returned
    /// unchanged (not reallocated) whenever none of its free variables are
    /// substituted — mirroring the Python source's short-circuit.
    pub fn subst(
        &self,
        groups: &ahash::AHashMap<Symbol, Symbol>,
        substitution: &ahash::AHashMap<Symbol, LiteralValue>,
    ) -> Type {
        let touches = |ty: &Type| ty.free_vars().iter().any(|v| substitution.contains_key(v));
        match self.node() {
            TypeNode::Omega | TypeNode::Literal(..) => *self,
            TypeNode::Constructor(name, arg) => {
                if !touches(self) {
                    *self
                } else {
                    Type::constructor(name, arg.subst(groups, substitution))
                }
            }
            TypeNode::Arrow(src, tgt) => {
                if !touches(self) {
                    *self
                } else {
                    Type::arrow(src.subst(groups, substitution), tgt.subst(groups, substitution))
                }
            }
            TypeNode::Intersection(l, r) => {
                if !touches(self) {
                    *self
                } else {
                    Type::intersection(l.subst(groups, substitution), r.subst(groups, substitution))
                }
            }
            TypeNode::Var(name) => match (substitution.get(name), groups.get(name)) {
                (Some(value), Some(group)) => Type::literal(*value, group),
                _ => *self,
            },
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0) || node_eq(&self.node(), &other.node())
    }
}
impl Eq for Type {}

impl std::hash::Hash for Type {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        hash_node(&self.node(), state);
    }
}

fn node_eq(a: &TypeNode, b: &TypeNode) -> bool {
    match (a, b) {
        (TypeNode::Omega, TypeNode::Omega) => true,
        (TypeNode::Constructor(n1, a1), TypeNode::Constructor(n2, a2)) => n1 == n2 && a1 == a2,
        (TypeNode::Arrow(s1, t1), TypeNode::Arrow(s2, t2)) => s1 == s2 && t1 == t2,
        (TypeNode::Intersection(l1, r1), TypeNode::Intersection(l2, r2)) => l1 == l2 && r1 == r2,
        (TypeNode::Literal(v1, g1), TypeNode::Literal(v2, g2)) => v1 == v2 && g1 == g2,
        (TypeNode::Var(n1), TypeNode::Var(n2)) => n1 == n2,
        _ => false,
    }
}

fn hash_node<H: std::hash::Hasher>(node: &TypeNode, state: &mut H) {
    use std::hash::Hash;
    std::mem::discriminant(node).hash(state);
    match node {
        TypeNode::Omega => {}
        TypeNode::Constructor(n, a) => {
            n.hash(state);
            a.hash(state);
        }
        TypeNode::Arrow(s, t) => {
            s.hash(state);
            t.hash(state);
        }
        TypeNode::Intersection(l, r) => {
            l.hash(state);
            r.hash(state);
        }
        TypeNode::Literal(v, g) => {
            v.hash(state);
            g.hash(state);
        }
        TypeNode::Var(n) => n.hash(state),
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            TypeNode::Omega => write!(f, "omega"),
            TypeNode::Constructor(name, arg) => {
                if arg.is_omega() && matches!(arg.node(), TypeNode::Omega) {
                    write!(f, "{name}")
                } else {
                    write!(f, "{name}({arg})")
                }
            }
            TypeNode::Arrow(src, tgt) => write!(f, "{src} -> {tgt}"),
            TypeNode::Intersection(l, r) => write!(f, "{l} & {r}"),
            TypeNode::Literal(value, group) => write!(f, "[{value}, {group}]"),
            TypeNode::Var(name) => write!(f, "<{name}>"),
        }
    }
}

impl std::ops::BitAnd for Type {
    type Output = Type;
    fn bitand(self, rhs: Type) -> Type {
        Type::intersection(self, rhs)
    }
}

fn compute_is_omega(node: &TypeNode) -> bool {
    match node {
        TypeNode::Omega => true,
        TypeNode::Constructor(..) | TypeNode::Literal(..) | TypeNode::Var(..) => false,
        TypeNode::Arrow(_, tgt) => tgt.is_omega(),
        TypeNode::Intersection(l, r) => l.is_omega() && r.is_omega(),
    }
}

fn compute_size(node: &TypeNode) -> usize {
    match node {
        TypeNode::Omega | TypeNode::Literal(..) | TypeNode::Var(..) => 1,
        TypeNode::Constructor(_, arg) => 1 + arg.size(),
        TypeNode::Arrow(s, t) => 1 + s.size() + t.size(),
        TypeNode::Intersection(l, r) => 1 + l.size() + r.size(),
    }
}

fn union_dedup<T: PartialEq + Copy>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = a.to_vec();
    for x in b {
        if !out.contains(x) {
            out.push(*x);
        }
    }
    out
}

fn compute_free_vars(node: &TypeNode) -> Vec<Symbol> {
    match node {
        TypeNode::Omega | TypeNode::Literal(..) => vec![],
        TypeNode::Constructor(_, arg) => arg.free_vars().to_vec(),
        TypeNode::Arrow(s, t) => union_dedup(s.free_vars(), t.free_vars()),
        TypeNode::Intersection(l, r) => union_dedup(l.free_vars(), r.free_vars()),
        TypeNode::Var(name) => vec![*name],
    }
}

/// Computes `organized` for `this` given its (already-interned) `node`. Needs
/// `this` itself, since the organized set of a path type (`Literal`, `Var`,
/// or `Omega`) is `{self}`.
fn compute_organized(this: Type, node: &TypeNode) -> Vec<Type> {
    match node {
        TypeNode::Omega => vec![],
        TypeNode::Literal(..) | TypeNode::Var(..) => vec![this],
        TypeNode::Constructor(name, arg) => {
            let paths = arg.organized();
            if paths.len() <= 1 {
                vec![this]
            } else {
                paths.iter().map(|p| Type::constructor(name, *p)).collect()
            }
        }
        TypeNode::Arrow(source, target) => {
            let paths = target.organized();
            match paths.len() {
                0 => vec![],
                1 => vec![this],
                _ => paths.iter().map(|p| Type::arrow(*source, *p)).collect(),
            }
        }
        TypeNode::Intersection(l, r) => union_dedup(l.organized(), r.organized()),
    }
}

fn intern(node: TypeNode) -> Type {
    let is_omega = compute_is_omega(&node);
    let size = compute_size(&node);
    let free_vars = compute_free_vars(&node).into_iter().galloc_scollect();
    let data = TypeData {
        node,
        is_omega,
        size,
        free_vars,
        organized: Cell::new(&[]),
    }
    .galloc();
    let this = Type(data);
    let organized = compute_organized(this, &node).into_iter().galloc_scollect();
    data.organized.set(organized);
    this
}

/// Pretty-prints a type the way `show`/debug output in the solution space
/// does: via `Display`, not a bespoke formatter.
pub fn organized_str(ty: Type) -> String {
    ty.organized().iter().map(|p| p.to_string()).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omega_is_omega() {
        assert!(Type::omega().is_omega());
    }

    #[test]
    fn arrow_to_omega_is_omega() {
        let a = Type::constructor0("a");
        assert!(Type::arrow(a, Type::omega()).is_omega());
    }

    #[test]
    fn constructor_organized_is_singleton_for_non_intersection_arg() {
        let t = Type::constructor0("fib");
        assert_eq!(t.organized(), &[t]);
    }

    #[test]
    fn constructor_distributes_over_intersection_argument() {
        let a = Type::literal(1i64, "int");
        let b = Type::literal(2i64, "int");
        let ty = Type::constructor("c", a & b);
        let expected_l = Type::constructor("c", a);
        let expected_r = Type::constructor("c", b);
        assert_eq!(ty.organized().len(), 2);
        assert!(ty.organized().contains(&expected_l));
        assert!(ty.organized().contains(&expected_r));
    }

    #[test]
    fn intersection_organized_is_union() {
        let a = Type::constructor0("a");
        let b = Type::constructor0("b");
        let ty = a & b;
        assert_eq!(ty.organized().len(), 2);
        assert!(ty.organized().contains(&a));
        assert!(ty.organized().contains(&b));
    }

    #[test]
    fn equal_types_built_separately_compare_equal() {
        let a1 = Type::constructor("fib", Type::literal(1i64, "int"));
        let a2 = Type::constructor("fib", Type::literal(1i64, "int"));
        assert_eq!(a1, a2);
    }

    #[test]
    fn display_matches_expected_shape() {
        let ty = Type::constructor("fib", Type::omega());
        assert_eq!(ty.to_string(), "fib");
        let ty = Type::arrow(Type::constructor0("a"), Type::constructor0("b"));
        assert_eq!(ty.to_string(), "a -> b");
    }

    #[test]
    fn subst_replaces_var_with_literal() {
        let mut groups = ahash::AHashMap::new();
        groups.insert("x", "int");
        let mut subst = ahash::AHashMap::new();
        subst.insert("x", LiteralValue::Int(3));
        let ty = Type::constructor("at", Type::var("x"));
        let substituted = ty.subst(&groups, &subst);
        assert_eq!(substituted, Type::constructor("at", Type::literal(3i64, "int")));
    }

    #[test]
    fn subst_leaves_unrelated_subtrees_untouched() {
        let groups = ahash::AHashMap::new();
        let subst = ahash::AHashMap::new();
        let ty = Type::constructor0("a");
        assert_eq!(ty.subst(&groups, &subst), ty);
    }
}
