//! Co-generation: perturbing a generator's randomness by a concrete value.
//!
//! A value's [`Perturbation`] is the list of variant indices it maps to.
//! Applying it to a generator of any output type derives a generator whose
//! randomness depends on that value. This is what makes generated functions
//! vary with their input.

use std::fmt;
use std::sync::Arc;

use crate::arbitrary::Arbitrary;
use crate::error::GenError;
use crate::generator::{Gen, variant_seed};
use crate::seed::{Seed, StdSeed};

/// An ordered list of variant indices, applied first to last
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Perturbation {
    path: Vec<u64>,
}

impl Perturbation {
    /// The perturbation that leaves generators unchanged
    pub fn identity() -> Self {
        Self::default()
    }

    /// A single variant step
    pub fn variant(index: u64) -> Self {
        Self { path: vec![index] }
    }

    /// Append a variant step
    pub fn then_variant(mut self, index: u64) -> Self {
        self.path.push(index);
        self
    }

    /// Append every step of `other`
    pub fn then(mut self, other: Perturbation) -> Self {
        self.path.extend(other.path);
        self
    }

    /// The variant indices, in application order
    pub fn path(&self) -> &[u64] {
        &self.path
    }

    /// Check if this perturbation has no steps
    pub fn is_identity(&self) -> bool {
        self.path.is_empty()
    }

    /// Derive a generator whose seed is walked along this perturbation
    pub fn apply<U: 'static, S: Seed>(&self, g: Gen<U, S>) -> Gen<U, S> {
        if self.is_identity() {
            return g;
        }
        let path = self.path.clone();
        Gen::new(move |size, seed| {
            let seed = path.iter().fold(seed, |seed, &index| variant_seed(seed, index));
            g.run(size, seed)
        })
    }
}

type Perturb<A> = Arc<dyn Fn(&A) -> Result<Perturbation, GenError> + Send + Sync>;

/// A generated function from `A` to `B`.
///
/// Calling it perturbs the result generator by the argument and replays the
/// size and seed the function was generated with, so equal arguments give
/// equal results.
pub struct Fun<A, B, S = StdSeed> {
    result: Gen<B, S>,
    perturb: Perturb<A>,
    size: usize,
    seed: S,
}

impl<A, B: 'static, S: Seed> Fun<A, B, S> {
    /// Apply the function.
    ///
    /// Fails with `NotImplemented` when the argument type has no
    /// co-generation.
    pub fn call(&self, arg: &A) -> Result<B, GenError> {
        let perturbation = (self.perturb)(arg)?;
        Ok(perturbation
            .apply(self.result.clone())
            .run(self.size, self.seed.clone()))
    }
}

impl<A, B, S: Clone> Clone for Fun<A, B, S> {
    fn clone(&self) -> Self {
        Self {
            result: self.result.clone(),
            perturb: Arc::clone(&self.perturb),
            size: self.size,
            seed: self.seed.clone(),
        }
    }
}

impl<A, B, S: fmt::Debug> fmt::Debug for Fun<A, B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fun")
            .field("argument", &std::any::type_name::<A>())
            .field("result", &std::any::type_name::<B>())
            .field("size", &self.size)
            .field("seed", &self.seed)
            .finish()
    }
}

/// Generate functions using an explicit co-generator for the argument type
pub fn function_with<A, B, S, P>(perturb: P, result: Gen<B, S>) -> Gen<Fun<A, B, S>, S>
where
    A: 'static,
    B: 'static,
    S: Seed,
    P: Fn(&A) -> Result<Perturbation, GenError> + Send + Sync + 'static,
{
    let perturb: Perturb<A> = Arc::new(perturb);
    Gen::new(move |size, seed| Fun {
        result: result.clone(),
        perturb: Arc::clone(&perturb),
        size,
        seed,
    })
}

/// Generate functions whose argument type co-generates through [`Arbitrary`]
pub fn function_of<A, B, S>(result: Gen<B, S>) -> Gen<Fun<A, B, S>, S>
where
    A: Arbitrary,
    B: 'static,
    S: Seed,
{
    function_with(|arg: &A| arg.coarbitrary(), result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::choose;

    #[test]
    fn test_identity_is_noop() {
        let g: Gen<u32> = choose(0, 1_000_000);
        let same = Perturbation::identity().apply(g.clone());
        for key in 0..20 {
            assert_eq!(same.run(0, StdSeed::new(key)), g.run(0, StdSeed::new(key)));
        }
    }

    #[test]
    fn test_apply_matches_variant_chain() {
        let g: Gen<u32> = choose(0, 1_000_000);
        let perturbed = Perturbation::variant(3).then_variant(5).apply(g.clone());
        // The first index is walked first, i.e. it is the outermost variant
        let chained = g.variant(5).variant(3);
        for key in 0..20 {
            let seed = StdSeed::new(key);
            assert_eq!(perturbed.run(0, seed), chained.run(0, seed));
        }
    }

    #[test]
    fn test_then_concatenates() {
        let p = Perturbation::variant(1).then(Perturbation::variant(2).then_variant(3));
        assert_eq!(p.path(), &[1, 2, 3]);
        assert!(!p.is_identity());
    }

    #[test]
    fn test_generated_function_is_consistent() {
        let g: Gen<Fun<u8, u32>> = function_of(choose(0, 1_000_000));
        let f = g.run(5, StdSeed::new(77));
        for x in 0..=255u8 {
            assert_eq!(f.call(&x), f.call(&x));
        }
        let outputs: std::collections::HashSet<u32> =
            (0..=255u8).map(|x| f.call(&x).unwrap()).collect();
        assert!(outputs.len() > 200);
    }

    #[test]
    fn test_function_without_cogeneration_fails_on_call() {
        let g: Gen<Fun<f64, u8>> = function_of(choose(0, 9));
        let f = g.run(0, StdSeed::new(1));
        assert_eq!(f.call(&1.5), Err(GenError::not_implemented::<f64>()));
    }
}
