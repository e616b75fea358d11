//! Arbitrary trait and instances for standard types.
//!
//! Static call sites resolve a type's generation contract at compile time
//! through this trait. The [`Registry`](crate::registry::Registry) covers the
//! case where the concrete type is only known at runtime.

use crate::cogen::Perturbation;
use crate::combinators::{choose, choose_float, four, list_of, option_of, three, two};
use crate::error::GenError;
use crate::generator::{Gen, sized};
use crate::seed::Seed;
use crate::shrink::{shrink_bool, shrink_char, shrink_float, shrink_integral, shrink_list};

/// The complete generation contract for a type
///
/// Implementors provide a generator and may provide a co-generator and a
/// shrinker. A shrinker must never propose the value itself, and repeatedly
/// shrinking must terminate.
pub trait Arbitrary: Clone + Send + Sync + 'static {
    /// Generator for arbitrary values of this type
    fn arbitrary<S: Seed>() -> Gen<Self, S>;

    /// The perturbation this value applies to a generator when it is used as
    /// a function argument
    fn coarbitrary(&self) -> Result<Perturbation, GenError> {
        Err(GenError::not_implemented::<Self>())
    }

    /// Candidate simplifications of this value, simplest first
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(std::iter::empty())
    }
}

/// The generator for `T`
pub fn arbitrary<T: Arbitrary, S: Seed>() -> Gen<T, S> {
    T::arbitrary()
}

/// Perturb `g` by `value`
pub fn coarbitrary<T: Arbitrary, U: 'static, S: Seed>(
    value: &T,
    g: Gen<U, S>,
) -> Result<Gen<U, S>, GenError> {
    Ok(value.coarbitrary()?.apply(g))
}

// Perturbation for a sequence: a marker before each element, a terminator
// after the last, so that different lengths never alias.
fn coarbitrary_seq<'a, T: Arbitrary>(
    items: impl IntoIterator<Item = &'a T>,
) -> Result<Perturbation, GenError> {
    let mut perturbation = Perturbation::identity();
    for item in items {
        perturbation = perturbation.then_variant(1).then(item.coarbitrary()?);
    }
    Ok(perturbation.then_variant(0))
}

impl Arbitrary for () {
    fn arbitrary<S: Seed>() -> Gen<Self, S> {
        Gen::pure(())
    }

    fn coarbitrary(&self) -> Result<Perturbation, GenError> {
        Ok(Perturbation::identity())
    }
}

impl Arbitrary for bool {
    fn arbitrary<S: Seed>() -> Gen<Self, S> {
        choose(0u8, 1u8).map(|bit| bit == 1)
    }

    fn coarbitrary(&self) -> Result<Perturbation, GenError> {
        Ok(Perturbation::variant(u64::from(*self)))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(shrink_bool(*self).into_iter())
    }
}

// Integers lie in [-size, size], clamped to the type's range.
macro_rules! impl_arbitrary_int {
    ($($t:ty),*) => {
        $(
            impl Arbitrary for $t {
                fn arbitrary<S: Seed>() -> Gen<Self, S> {
                    sized(|n| {
                        let bound = n as i128;
                        let lo = (-bound).max(<$t>::MIN as i128) as $t;
                        let hi = bound.min(<$t>::MAX as i128) as $t;
                        choose(lo, hi)
                    })
                }

                fn coarbitrary(&self) -> Result<Perturbation, GenError> {
                    let index = if <$t>::MIN == 0 {
                        *self as u64
                    } else {
                        zigzag(*self as i64)
                    };
                    Ok(Perturbation::variant(index))
                }

                fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
                    let candidates: Vec<$t> = shrink_integral(*self as i128)
                        .into_iter()
                        .filter_map(|v| <$t>::try_from(v).ok())
                        .collect();
                    Box::new(candidates.into_iter())
                }
            }
        )*
    };
}

impl_arbitrary_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

// Interleaves signs so small magnitudes get small indices: 0, -1, 1, -2, 2, ...
fn zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

macro_rules! impl_arbitrary_float {
    ($($t:ty),*) => {
        $(
            impl Arbitrary for $t {
                fn arbitrary<S: Seed>() -> Gen<Self, S> {
                    sized(|n| {
                        let bound = n as $t;
                        choose_float(-bound, bound)
                    })
                }

                fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
                    Box::new(shrink_float(*self).into_iter())
                }
            }
        )*
    };
}

impl_arbitrary_float!(f32, f64);

const SURROGATES: (u32, u32) = (0xD800, 0xDFFF);
const SURROGATE_LEN: u32 = SURROGATES.1 - SURROGATES.0 + 1;
const SCALAR_COUNT: u32 = char::MAX as u32 + 1 - SURROGATE_LEN;

// The n-th Unicode scalar value, counting past the surrogate block
fn scalar_at(n: u32) -> char {
    let code = if n < SURROGATES.0 { n } else { n + SURROGATE_LEN };
    char::from_u32(code).unwrap_or('a')
}

impl Arbitrary for char {
    fn arbitrary<S: Seed>() -> Gen<Self, S> {
        // Mostly printable ASCII, occasionally any scalar value
        choose(0u8, 3u8).bind(|pick| {
            if pick == 0 {
                choose(0u32, SCALAR_COUNT - 1).map(scalar_at)
            } else {
                choose(0x20u32, 0x7E).map(|code| char::from_u32(code).unwrap_or('a'))
            }
        })
    }

    fn coarbitrary(&self) -> Result<Perturbation, GenError> {
        Ok(Perturbation::variant(u64::from(*self)))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(shrink_char(*self).into_iter())
    }
}

impl Arbitrary for String {
    fn arbitrary<S: Seed>() -> Gen<Self, S> {
        list_of(char::arbitrary()).map(|chars| chars.into_iter().collect())
    }

    fn coarbitrary(&self) -> Result<Perturbation, GenError> {
        let chars: Vec<char> = self.chars().collect();
        coarbitrary_seq(&chars)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let chars: Vec<char> = self.chars().collect();
        let candidates: Vec<String> = shrink_list(&chars, |c| shrink_char(*c))
            .into_iter()
            .map(|shrunk| shrunk.into_iter().collect())
            .collect();
        Box::new(candidates.into_iter())
    }
}

impl<T: Arbitrary> Arbitrary for Vec<T> {
    fn arbitrary<S: Seed>() -> Gen<Self, S> {
        list_of(T::arbitrary())
    }

    fn coarbitrary(&self) -> Result<Perturbation, GenError> {
        coarbitrary_seq(self)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(shrink_list(self, |x| x.shrink()).into_iter())
    }
}

impl<T: Arbitrary> Arbitrary for Option<T> {
    fn arbitrary<S: Seed>() -> Gen<Self, S> {
        option_of(T::arbitrary())
    }

    fn coarbitrary(&self) -> Result<Perturbation, GenError> {
        match self {
            None => Ok(Perturbation::variant(0)),
            Some(inner) => Ok(Perturbation::variant(1).then(inner.coarbitrary()?)),
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            None => Box::new(std::iter::empty()),
            Some(inner) => Box::new(std::iter::once(None).chain(inner.shrink().map(Some))),
        }
    }
}

impl<A: Arbitrary, B: Arbitrary> Arbitrary for (A, B) {
    fn arbitrary<S: Seed>() -> Gen<Self, S> {
        two(A::arbitrary(), B::arbitrary())
    }

    fn coarbitrary(&self) -> Result<Perturbation, GenError> {
        Ok(self.0.coarbitrary()?.then(self.1.coarbitrary()?))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let (a, b) = self.clone();
        let first = {
            let b = b.clone();
            a.shrink().map(move |a| (a, b.clone()))
        };
        let second = b.shrink().map(move |b| (a.clone(), b));
        Box::new(first.chain(second))
    }
}

impl<A: Arbitrary, B: Arbitrary, C: Arbitrary> Arbitrary for (A, B, C) {
    fn arbitrary<S: Seed>() -> Gen<Self, S> {
        three(A::arbitrary(), B::arbitrary(), C::arbitrary())
    }

    fn coarbitrary(&self) -> Result<Perturbation, GenError> {
        Ok(self
            .0
            .coarbitrary()?
            .then(self.1.coarbitrary()?)
            .then(self.2.coarbitrary()?))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let (a, b, c) = self.clone();
        let mut candidates: Vec<Self> = Vec::new();
        candidates.extend(a.shrink().map(|x| (x, b.clone(), c.clone())));
        candidates.extend(b.shrink().map(|x| (a.clone(), x, c.clone())));
        candidates.extend(c.shrink().map(|x| (a.clone(), b.clone(), x)));
        Box::new(candidates.into_iter())
    }
}

impl<A: Arbitrary, B: Arbitrary, C: Arbitrary, D: Arbitrary> Arbitrary for (A, B, C, D) {
    fn arbitrary<S: Seed>() -> Gen<Self, S> {
        four(A::arbitrary(), B::arbitrary(), C::arbitrary(), D::arbitrary())
    }

    fn coarbitrary(&self) -> Result<Perturbation, GenError> {
        Ok(self
            .0
            .coarbitrary()?
            .then(self.1.coarbitrary()?)
            .then(self.2.coarbitrary()?)
            .then(self.3.coarbitrary()?))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let (a, b, c, d) = self.clone();
        let mut candidates: Vec<Self> = Vec::new();
        candidates.extend(a.shrink().map(|x| (x, b.clone(), c.clone(), d.clone())));
        candidates.extend(b.shrink().map(|x| (a.clone(), x, c.clone(), d.clone())));
        candidates.extend(c.shrink().map(|x| (a.clone(), b.clone(), x, d.clone())));
        candidates.extend(d.shrink().map(|x| (a.clone(), b.clone(), c.clone(), x)));
        Box::new(candidates.into_iter())
    }
}
