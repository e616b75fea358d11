//! Error types raised by combinators and the instance registry.

use thiserror::Error;

/// Failures raised at the point a combinator or registry lookup is used.
///
/// None of these are retried internally. A failure aborts the generation
/// attempt that triggered it and names the offending combinator or type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    /// A choice combinator was given zero alternatives
    #[error("{combinator} requires at least one alternative")]
    EmptyChoice { combinator: &'static str },

    /// `frequency` received no entries or a total weight of zero
    #[error("frequency requires positive total weight (entries: {entries}, total weight: {total})")]
    InvalidWeights { entries: usize, total: u64 },

    /// Co-generation was requested for a type that never defined it
    #[error("co-generation is not implemented for `{type_name}`")]
    NotImplemented { type_name: &'static str },

    /// Registry lookup found no instance and no derivation for a type
    #[error("no Arbitrary instance registered for `{type_name}`")]
    MissingInstance { type_name: &'static str },
}

impl GenError {
    /// Create an empty-choice error for the named combinator
    pub fn empty_choice(combinator: &'static str) -> Self {
        Self::EmptyChoice { combinator }
    }

    /// Create an invalid-weights error
    pub fn invalid_weights(entries: usize, total: u64) -> Self {
        Self::InvalidWeights { entries, total }
    }

    /// Create a not-implemented error naming `T`
    pub fn not_implemented<T: ?Sized>() -> Self {
        Self::NotImplemented {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Create a missing-instance error naming `T`
    pub fn missing_instance<T: ?Sized>() -> Self {
        Self::MissingInstance {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The type this error is about, for registry and co-generation errors
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            GenError::NotImplemented { type_name } | GenError::MissingInstance { type_name } => {
                Some(type_name)
            }
            GenError::EmptyChoice { .. } | GenError::InvalidWeights { .. } => None,
        }
    }
}
