//! Core generator type: a replayable function of size and seed.
//!
//! A [`Gen`] never produces a value on construction. It is a recipe that is
//! driven with an explicit size and seed, so driving the same generator with
//! the same inputs always yields the same output. Every combinator in this
//! crate is built on the handful of operations defined here.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::config::GenConfig;
use crate::seed::{Seed, StdSeed};

/// A recipe for producing values of type `T` from a size and a seed
pub struct Gen<T, S = StdSeed> {
    inner: Arc<dyn Fn(usize, S) -> T + Send + Sync>,
}

impl<T, S> Clone for Gen<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, S> fmt::Debug for Gen<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gen")
            .field("output", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T: 'static, S: Seed> Gen<T, S> {
    /// Wrap a function of `(size, seed)` as a generator
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(usize, S) -> T + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Drive the generator with an explicit size and seed
    pub fn run(&self, size: usize, seed: S) -> T {
        (self.inner)(size, seed)
    }

    /// A generator that ignores size and seed and always yields `value`
    pub fn pure(value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        Self::new(move |_, _| value.clone())
    }

    /// Apply `f` to every produced value
    pub fn map<B, F>(self, f: F) -> Gen<B, S>
    where
        B: 'static,
        F: Fn(T) -> B + Send + Sync + 'static,
    {
        Gen::new(move |size, seed| f(self.run(size, seed)))
    }

    /// Sequence this generator with a continuation.
    ///
    /// The seed is split first: `self` is driven with the left half and the
    /// generator returned by `k` with the right half, so the two never share
    /// randomness.
    pub fn bind<B, K>(self, k: K) -> Gen<B, S>
    where
        B: 'static,
        K: Fn(T) -> Gen<B, S> + Send + Sync + 'static,
    {
        Gen::new(move |size, seed: S| {
            let (left, right) = seed.split();
            let value = self.run(size, left);
            k(value).run(size, right)
        })
    }

    /// Replace the ambient size seen by this generator with `size`
    pub fn resize(self, size: usize) -> Self {
        Self::new(move |_, seed| self.run(size, seed))
    }

    /// Transform the ambient size seen by this generator
    pub fn scale<F>(self, f: F) -> Self
    where
        F: Fn(usize) -> usize + Send + Sync + 'static,
    {
        Self::new(move |size, seed| self.run(f(size), seed))
    }

    /// Offset this generator's randomness by `index`.
    ///
    /// Distinct indices lead to independent generators derived from the same
    /// underlying recipe.
    pub fn variant(self, index: u64) -> Self {
        Self::new(move |size, seed| self.run(size, variant_seed(seed, index)))
    }

    /// Sample a size uniformly in `[0, max_size]`, then drive the generator
    /// with that size and the remaining seed
    pub fn generate(&self, max_size: usize, seed: S) -> T {
        let (size, rest) = seed.range(0, max_size as i128);
        self.run(usize::try_from(size).unwrap_or(max_size), rest)
    }

    /// Acquire a resource, use it, and release it on every exit path.
    ///
    /// `acquire` is driven with one half of the seed and the generator built
    /// by `body` with the other. `release` runs after `body` finishes, and also
    /// when it panics, in which case the panic is resumed afterwards.
    pub fn bracket<R, Rel, Body>(acquire: Gen<R, S>, release: Rel, body: Body) -> Self
    where
        R: 'static,
        Rel: Fn(R) + Send + Sync + 'static,
        Body: Fn(&R) -> Gen<T, S> + Send + Sync + 'static,
    {
        Self::new(move |size, seed: S| {
            let (left, right) = seed.split();
            let resource = acquire.run(size, left);
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| body(&resource).run(size, right)));
            release(resource);
            match outcome {
                Ok(value) => value,
                Err(payload) => panic::resume_unwind(payload),
            }
        })
    }
}

impl<T: 'static> Gen<T, StdSeed> {
    /// Generate a value using the size bound and seed from `config`
    pub fn generate_with(&self, config: &GenConfig) -> T {
        self.generate(config.max_size, config.seed())
    }
}

impl<A: 'static, E: 'static, S: Seed> Gen<Result<A, E>, S> {
    /// Intercept a failed result and continue with an alternate generator.
    ///
    /// The handler's generator is driven with a seed independent of the one
    /// that produced the failure.
    pub fn catch<H>(self, handler: H) -> Gen<A, S>
    where
        H: Fn(E) -> Gen<A, S> + Send + Sync + 'static,
    {
        Gen::new(move |size, seed: S| {
            let (left, right) = seed.split();
            match self.run(size, left) {
                Ok(value) => value,
                Err(error) => handler(error).run(size, right),
            }
        })
    }

    /// Like [`Gen::bind`], but stops at the first `Err`
    pub fn try_bind<B, K>(self, k: K) -> Gen<Result<B, E>, S>
    where
        B: 'static,
        K: Fn(A) -> Gen<Result<B, E>, S> + Send + Sync + 'static,
    {
        Gen::new(move |size, seed: S| {
            let (left, right) = seed.split();
            match self.run(size, left) {
                Ok(value) => k(value).run(size, right),
                Err(error) => Err(error),
            }
        })
    }
}

/// Build a generator from the ambient size.
///
/// `f` is only called once the generator is driven with a concrete size.
pub fn sized<T, S, F>(f: F) -> Gen<T, S>
where
    T: 'static,
    S: Seed,
    F: Fn(usize) -> Gen<T, S> + Send + Sync + 'static,
{
    Gen::new(move |size, seed| f(size).run(size, seed))
}

/// A generator yielding the ambient size
pub fn get_size<S: Seed>() -> Gen<usize, S> {
    Gen::new(|size, _| size)
}

/// Free-function form of [`Gen::resize`]
pub fn resize<T: 'static, S: Seed>(size: usize, g: Gen<T, S>) -> Gen<T, S> {
    g.resize(size)
}

/// Free-function form of [`Gen::variant`]
pub fn variant<T: 'static, S: Seed>(index: u64, g: Gen<T, S>) -> Gen<T, S> {
    g.variant(index)
}

/// Free-function form of [`Gen::generate`]
pub fn generate<T: 'static, S: Seed>(max_size: usize, seed: S, g: &Gen<T, S>) -> T {
    g.generate(max_size, seed)
}

/// Walk `seed` down the split tree along a prefix-free code for `index`:
/// the bit length in unary, a terminator, then the bits themselves.
pub(crate) fn variant_seed<S: Seed>(seed: S, index: u64) -> S {
    let bits = u64::BITS - index.leading_zeros();
    let mut seed = seed;
    for _ in 0..bits {
        seed = seed.split().1;
    }
    seed = seed.split().0;
    for bit in (0..bits).rev() {
        let (left, right) = seed.split();
        seed = if (index >> bit) & 1 == 1 { right } else { left };
    }
    seed
}
