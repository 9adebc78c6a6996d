//! Error conditions a synthesis run can surface (spec §7): a malformed
//! query, a combinator whose type cannot be resolved against the grammar,
//! or a tree that fails to interpret.

use derive_more::Display;

use crate::types::Symbol;

/// Everything that can go wrong building, resolving, or running a query.
#[derive(Debug, Display)]
pub enum Error {
    /// The query itself is malformed: a parameter references a group that
    /// was never declared in the [`crate::spec::ParameterSpace`], or a
    /// predicate references a parameter that isn't in scope.
    #[display(fmt = "invalid specification: {_0}")]
    Specification(String),

    /// A combinator's type could not be resolved into the grammar: its
    /// substitution against some non-terminal was ambiguous where the
    /// caller required it to be unique.
    #[display(fmt = "could not resolve combinator `{combinator}` against the target type")]
    Resolution { combinator: Symbol },

    /// A tree produced by enumeration referenced a combinator with no
    /// registered semantics.
    #[display(fmt = "no semantics registered for combinator `{combinator}`")]
    Interpretation { combinator: Symbol },
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
