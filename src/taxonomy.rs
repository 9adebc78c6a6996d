//! Subtype relation between constructor names (spec §3, `Taxonomy`).
//!
//! A taxonomy is declared as a set of direct edges (`child <= parent`) and
//! closed reflexively and transitively once, up front, so that every later
//! subtyping query (`subtyping::check_subtype`) is a single hash-set lookup
//! rather than a graph walk.

use ahash::AHashMap;
use ahash::AHashSet;

use crate::types::Symbol;

/// The declared and closed subtype relation over constructor names.
#[derive(Debug, Default)]
pub struct Taxonomy {
    /// `supertypes[c]` is every name `c` is a subtype of, including `c` itself.
    supertypes: AHashMap<Symbol, AHashSet<Symbol>>,
}

impl Taxonomy {
    pub fn new() -> Taxonomy {
        Taxonomy::default()
    }

    /// Declares `child <= parent` and every name registered so far as its own
    /// supertype. Call [`Taxonomy::close`] once all edges are declared.
    pub fn declare(&mut self, child: Symbol, parent: Symbol) -> &mut Self {
        self.supertypes.entry(child).or_insert_with(|| {
            let mut s = AHashSet::default();
            s.insert(child);
            s
        });
        self.supertypes.entry(parent).or_insert_with(|| {
            let mut s = AHashSet::default();
            s.insert(parent);
            s
        });
        self.supertypes.get_mut(child).unwrap().insert(parent);
        self
    }

    /// Computes the reflexive-transitive closure of the declared edges.
    /// Idempotent: safe to call again after more `declare` calls.
    pub fn close(&mut self) -> &mut Self {
        let names: Vec<Symbol> = self.supertypes.keys().copied().collect();
        let mut changed = true;
        while changed {
            changed = false;
            for name in &names {
                let reachable: Vec<Symbol> = self.supertypes[name].iter().copied().collect();
                for mid in reachable {
                    if mid == *name {
                        continue;
                    }
                    let grand: Vec<Symbol> = self.supertypes[mid].iter().copied().collect();
                    let set = self.supertypes.get_mut(name).unwrap();
                    for g in grand {
                        if set.insert(g) {
                            changed = true;
                        }
                    }
                }
            }
        }
        self
    }

    /// Whether `child` is `parent` or a declared (possibly transitive)
    /// subtype of it. Undeclared names are only subtypes of themselves.
    pub fn is_subtype(&self, child: Symbol, parent: Symbol) -> bool {
        if child == parent {
            return true;
        }
        self.supertypes
            .get(child)
            .map(|s| s.contains(parent))
            .unwrap_or(false)
    }

    /// All names registered in the taxonomy, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.supertypes.keys().copied()
    }
}
