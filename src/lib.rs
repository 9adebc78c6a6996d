//! CoSy: a synthesizer for an intersection type system with literal
//! refinement and user-supplied semantic predicates.
//!
//! A query (a [`spec::Specification`]) names a target type, optionally
//! behind bound literal parameters and predicate guards. [`facade::Cosy`]
//! resolves it against a fixed set of combinators and their
//! [`taxonomy::Taxonomy`] by building a tree grammar ([`grammar`]),
//! pruning away non-terminals that can never produce a ground term
//! ([`grammar::SolutionSpace::prune`]), and lazily enumerating the smallest
//! terms it derives ([`enumerate::enumerate_trees`]).

#[macro_use]
pub mod log;

pub mod builder;
pub mod combinatorics;
pub mod enumerate;
pub mod error;
pub mod facade;
pub mod galloc;
pub mod grammar;
pub mod literal;
pub mod spec;
pub mod subtyping;
pub mod synthesizer;
pub mod taxonomy;
pub mod tree;
pub mod types;

pub use error::{Error, Result};
pub use facade::Cosy;
pub use spec::Specification;
pub use synthesizer::CombinatorInfo;
pub use taxonomy::Taxonomy;
pub use tree::Tree;
pub use types::Type;
