//! Generator constructors built exclusively on the core operations.
//!
//! Choice-style constructors validate their arguments up front and return
//! `Result<Gen<_>, GenError>`. Once built, a generator never fails.

use std::sync::Arc;

use num_traits::Float;
use tracing::trace;

use crate::config::GenConfig;
use crate::error::GenError;
use crate::generator::{Gen, sized};
use crate::seed::{Seed, StdSeed};

/// A generated function value, as produced by [`promote`]
pub type GenFn<A, B> = Arc<dyn Fn(A) -> B + Send + Sync>;

/// Integer types that [`choose`] can sample through the seed's range sampler
pub trait Choosable: Copy + Send + Sync + 'static {
    /// Widen to the sampler's domain
    fn to_wide(self) -> i128;

    /// Narrow a sampled value that is known to lie within this type's range
    fn from_wide(wide: i128) -> Self;
}

macro_rules! impl_choosable {
    ($($t:ty),*) => {
        $(
            impl Choosable for $t {
                fn to_wide(self) -> i128 {
                    self as i128
                }

                fn from_wide(wide: i128) -> Self {
                    wide as $t
                }
            }
        )*
    };
}

impl_choosable!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

/// Uniform integer in `[lo, hi]`, inclusive on both ends; ignores size.
///
/// Reversed bounds are swapped.
pub fn choose<T: Choosable, S: Seed>(lo: T, hi: T) -> Gen<T, S> {
    let (lo, hi) = if lo.to_wide() <= hi.to_wide() {
        (lo.to_wide(), hi.to_wide())
    } else {
        (hi.to_wide(), lo.to_wide())
    };
    Gen::new(move |_, seed: S| T::from_wide(seed.range(lo, hi).0))
}

/// Uniform float in `[lo, hi]` on a grid of 2^53 steps
pub fn choose_float<F, S>(lo: F, hi: F) -> Gen<F, S>
where
    F: Float + Send + Sync + 'static,
    S: Seed,
{
    const STEPS: i128 = 1 << 53;
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    Gen::new(move |_, seed: S| {
        let (step, _) = seed.range(0, STEPS);
        let fraction = F::from(step).unwrap_or_else(F::zero) / F::from(STEPS).unwrap_or_else(F::one);
        (lo + (hi - lo) * fraction).max(lo).min(hi)
    })
}

/// Alias for [`Gen::pure`]
pub fn constant<T, S>(value: T) -> Gen<T, S>
where
    T: Clone + Send + Sync + 'static,
    S: Seed,
{
    Gen::pure(value)
}

/// Uniform pick from a non-empty list of values
pub fn elements<T, S>(xs: Vec<T>) -> Result<Gen<T, S>, GenError>
where
    T: Clone + Send + Sync + 'static,
    S: Seed,
{
    if xs.is_empty() {
        return Err(GenError::empty_choice("elements"));
    }
    let last = xs.len() - 1;
    Ok(choose(0, last).map(move |i: usize| xs[i].clone()))
}

/// Pick one generator uniformly, then drive it
pub fn oneof<T: 'static, S: Seed>(gens: Vec<Gen<T, S>>) -> Result<Gen<T, S>, GenError> {
    if gens.is_empty() {
        return Err(GenError::empty_choice("oneof"));
    }
    let last = gens.len() - 1;
    Ok(choose(0, last).bind(move |i: usize| gens[i].clone()))
}

/// Weighted choice between generators.
///
/// Draws `n` uniformly in `[1, total]` and selects the first entry, in list
/// order, whose cumulative weight is `>= n`. The list is never reordered.
pub fn frequency<T: 'static, S: Seed>(
    weighted: Vec<(u32, Gen<T, S>)>,
) -> Result<Gen<T, S>, GenError> {
    let entries = weighted.len();
    let mut total = 0u64;
    let cumulative: Vec<(u64, Gen<T, S>)> = weighted
        .into_iter()
        .map(|(weight, g)| {
            total += u64::from(weight);
            (total, g)
        })
        .collect();

    if entries == 0 || total == 0 {
        return Err(GenError::invalid_weights(entries, total));
    }

    Ok(choose(1u64, total).bind(move |n| {
        // n <= total, so some entry always qualifies
        let index = cumulative.partition_point(|(bound, _)| *bound < n);
        cumulative[index].1.clone()
    }))
}

/// Pick among the first `clamp(size, 1, len)` elements, so larger sizes
/// reach further into the list
pub fn growing_elements<T, S>(xs: Vec<T>) -> Result<Gen<T, S>, GenError>
where
    T: Clone + Send + Sync + 'static,
    S: Seed,
{
    if xs.is_empty() {
        return Err(GenError::empty_choice("growing_elements"));
    }
    let xs = Arc::new(xs);
    Ok(sized(move |n| {
        let xs = Arc::clone(&xs);
        let last = n.clamp(1, xs.len()) - 1;
        choose(0, last).map(move |i: usize| xs[i].clone())
    }))
}

// Each argument generator takes the left half of the current seed and passes
// the right half on, which is the split pattern of nested `bind`s.
macro_rules! lift_gen {
    ($(#[$doc:meta])* $name:ident => $($g:ident: $t:ident),+) => {
        $(#[$doc])*
        #[allow(unused_assignments)]
        pub fn $name<$($t,)+ R, S, F>(f: F, $($g: Gen<$t, S>),+) -> Gen<R, S>
        where
            $($t: 'static,)+
            R: 'static,
            S: Seed,
            F: Fn($($t),+) -> R + Send + Sync + 'static,
        {
            Gen::new(move |size, seed: S| {
                let mut seed = seed;
                $(
                    let (here, rest) = seed.split();
                    seed = rest;
                    let $g = $g.run(size, here);
                )+
                f($($g),+)
            })
        }
    };
}

lift_gen!(
    /// Lift a binary function over two independent generators
    lift_gen2 => ga: A, gb: B
);
lift_gen!(
    /// Lift a ternary function over three independent generators
    lift_gen3 => ga: A, gb: B, gc: C
);
lift_gen!(
    /// Lift a 4-ary function over four independent generators
    lift_gen4 => ga: A, gb: B, gc: C, gd: D
);
lift_gen!(
    /// Lift a 5-ary function over five independent generators
    lift_gen5 => ga: A, gb: B, gc: C, gd: D, ge: E
);
lift_gen!(
    /// Lift a 6-ary function over six independent generators
    lift_gen6 => ga: A, gb: B, gc: C, gd: D, ge: E, gf: G
);

/// Pair two independent generators
pub fn two<A: 'static, B: 'static, S: Seed>(ga: Gen<A, S>, gb: Gen<B, S>) -> Gen<(A, B), S> {
    lift_gen2(|a, b| (a, b), ga, gb)
}

/// Triple three independent generators
pub fn three<A: 'static, B: 'static, C: 'static, S: Seed>(
    ga: Gen<A, S>,
    gb: Gen<B, S>,
    gc: Gen<C, S>,
) -> Gen<(A, B, C), S> {
    lift_gen3(|a, b, c| (a, b, c), ga, gb, gc)
}

/// Combine four independent generators
pub fn four<A: 'static, B: 'static, C: 'static, D: 'static, S: Seed>(
    ga: Gen<A, S>,
    gb: Gen<B, S>,
    gc: Gen<C, S>,
    gd: Gen<D, S>,
) -> Gen<(A, B, C, D), S> {
    lift_gen4(|a, b, c, d| (a, b, c, d), ga, gb, gc, gd)
}

/// Turn a list of generators into a generator of a list, element `i` coming
/// from generator `i`, each independently seeded
pub fn sequence<T: 'static, S: Seed>(gens: Vec<Gen<T, S>>) -> Gen<Vec<T>, S> {
    Gen::new(move |size, seed: S| {
        let mut seed = seed;
        gens.iter()
            .map(|g| {
                let (here, rest) = seed.split();
                seed = rest;
                g.run(size, here)
            })
            .collect()
    })
}

/// Exactly `n` independent values from `g`
pub fn vector_of<T: 'static, S: Seed>(n: usize, g: Gen<T, S>) -> Gen<Vec<T>, S> {
    Gen::new(move |size, seed: S| {
        let mut seed = seed;
        let mut values = Vec::with_capacity(n);
        for _ in 0..n {
            let (here, rest) = seed.split();
            seed = rest;
            values.push(g.run(size, here));
        }
        values
    })
}

/// Argument-flipped [`vector_of`]
pub fn vector<T: 'static, S: Seed>(g: Gen<T, S>, n: usize) -> Gen<Vec<T>, S> {
    vector_of(n, g)
}

/// A list whose length is uniform in `[0, size]`
pub fn list_of<T: 'static, S: Seed>(g: Gen<T, S>) -> Gen<Vec<T>, S> {
    sized(move |n| {
        let g = g.clone();
        choose(0, n).bind(move |len| vector_of(len, g.clone()))
    })
}

/// A list whose length is uniform in `[1, max(1, size)]`
pub fn non_empty_list_of<T: 'static, S: Seed>(g: Gen<T, S>) -> Gen<Vec<T>, S> {
    sized(move |n| {
        let g = g.clone();
        choose(1, n.max(1)).bind(move |len| vector_of(len, g.clone()))
    })
}

/// `None` with weight 1, `Some` with weight `max(1, size)`
pub fn option_of<T: 'static, S: Seed>(g: Gen<T, S>) -> Gen<Option<T>, S> {
    sized(move |n| {
        let g = g.clone();
        choose(0, n.max(1)).bind(move |pick: usize| {
            if pick == 0 {
                Gen::new(|_, _| None)
            } else {
                g.clone().map(Some)
            }
        })
    })
}

/// A random order-preserving sub-sequence of `xs`
pub fn sublist_of<T, S>(xs: Vec<T>) -> Gen<Vec<T>, S>
where
    T: Clone + Send + Sync + 'static,
    S: Seed,
{
    vector_of(xs.len(), choose(0u8, 1u8)).map(move |keep| {
        xs.iter()
            .zip(keep)
            .filter(|(_, flag)| *flag == 1)
            .map(|(x, _)| x.clone())
            .collect()
    })
}

/// A random permutation of `xs`
pub fn shuffle<T, S>(xs: Vec<T>) -> Gen<Vec<T>, S>
where
    T: Clone + Send + Sync + 'static,
    S: Seed,
{
    Gen::new(move |_, seed: S| {
        let mut shuffled = xs.clone();
        let mut seed = seed;
        for i in (1..shuffled.len()).rev() {
            let (j, next) = seed.range(0, i as i128);
            seed = next;
            shuffled.swap(i, j as usize);
        }
        shuffled
    })
}

/// Try to find a value satisfying `pred`.
///
/// Makes `max(1, size)` attempts, the k-th one at size `size + k` with a
/// fresh split of the seed, and yields `None` if all of them are rejected.
pub fn such_that_option<T, S, P>(g: Gen<T, S>, pred: P) -> Gen<Option<T>, S>
where
    T: 'static,
    S: Seed,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    Gen::new(move |size, seed| attempt(&g, &pred, size, seed))
}

/// Like [`such_that_option`], but on failure tries again one size larger,
/// indefinitely.
///
/// This never returns if `pred` is unsatisfiable, and takes a long time if it
/// is rarely satisfied. Use [`such_that_option`] when that risk is not
/// acceptable.
pub fn such_that<T, S, P>(g: Gen<T, S>, pred: P) -> Gen<T, S>
where
    T: 'static,
    S: Seed,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    Gen::new(move |size, seed: S| {
        let mut size = size;
        let mut seed = seed;
        loop {
            let (here, rest) = seed.split();
            if let Some(value) = attempt(&g, &pred, size, here) {
                return value;
            }
            size = size.saturating_add(1);
            seed = rest;
            trace!(size, "such_that escalating size");
        }
    })
}

fn attempt<T, S, P>(g: &Gen<T, S>, pred: &P, size: usize, seed: S) -> Option<T>
where
    T: 'static,
    S: Seed,
    P: Fn(&T) -> bool,
{
    let mut seed = seed;
    for k in 0..size.max(1) {
        let (here, rest) = seed.split();
        seed = rest;
        let candidate = g.run(size.saturating_add(k), here);
        if pred(&candidate) {
            return Some(candidate);
        }
        trace!(attempt = k + 1, "candidate rejected by predicate");
    }
    None
}

/// Turn a function into generators into a generator of functions.
///
/// The produced function replays the size and seed it was generated with,
/// so it is deterministic in its argument.
pub fn promote<A, B, S, F>(f: F) -> Gen<GenFn<A, B>, S>
where
    A: 'static,
    B: 'static,
    S: Seed,
    F: Fn(A) -> Gen<B, S> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Gen::new(move |size, seed: S| {
        let f = Arc::clone(&f);
        Arc::new(move |a: A| f(a).run(size, seed.clone())) as GenFn<A, B>
    })
}

/// Draw `config.sample_count` values, with sizes spread evenly over
/// `[0, config.max_size]`
pub fn sample<T: 'static>(config: &GenConfig, g: &Gen<T, StdSeed>) -> Vec<T> {
    let count = config.sample_count;
    let mut seed = config.seed();
    (0..count)
        .map(|i| {
            let size = if count > 1 {
                // Widened so the product cannot overflow for any max_size
                (config.max_size as u128 * i as u128 / (count - 1) as u128) as usize
            } else {
                config.max_size
            };
            let (here, rest) = seed.split();
            seed = rest;
            g.run(size, here)
        })
        .collect()
}
