//! # Sprout - Random Test Data Generation for Rust
//!
//! Sprout builds random values for property-based testing out of small
//! composable generators. A [`Gen<T>`](Gen) is a pure recipe from a size and a
//! splittable [`Seed`] to a value: running it twice with the same inputs gives
//! the same output, and generators combined with [`Gen::bind`] never share
//! randomness.
//!
//! Around that core sit:
//!
//! - a combinator library ([`choose`], [`frequency`], [`list_of`], [`such_that`], ...)
//! - the [`Arbitrary`] trait, bundling a type's generator, co-generator and shrinker
//! - a [`Registry`] for resolving those bundles when the type is only known at runtime
//! - generated functions ([`Fun`]), built on co-generation
//!
//! ## Quick Start
//!
//! ```rust
//! use sprout::{Gen, StdSeed, arbitrary, choose, list_of, two};
//!
//! let rolls: Gen<(u8, Vec<i32>)> = two(choose(1, 6), list_of(arbitrary()));
//!
//! let (die, xs) = rolls.generate(30, StdSeed::new(7));
//! assert!((1..=6).contains(&die));
//! assert!(xs.len() <= 30);
//! ```
//!
//! ## Shrinking
//!
//! ```rust
//! use sprout::{Arbitrary, Registry};
//!
//! let registry: Registry = Registry::with_defaults();
//! let candidates: Vec<i32> = registry.shrink(&-3i32).unwrap().collect();
//! assert_eq!(candidates, vec![3, 0, -2]);
//! assert_eq!(true.shrink().collect::<Vec<_>>(), vec![false]);
//! ```

pub mod arbitrary;
pub mod cogen;
pub mod combinators;
pub mod config;
pub mod error;
pub mod generator;
pub mod registry;
pub mod seed;
pub mod shrink;

// Re-export the main public API
pub use arbitrary::{Arbitrary, arbitrary, coarbitrary};
pub use cogen::{Fun, Perturbation, function_of, function_with};
pub use combinators::*;
pub use config::{ConfigError, GenConfig};
pub use error::GenError;
pub use generator::{Gen, generate, get_size, resize, sized, variant};
pub use registry::{Derivation, ErasedInstance, Instance, Registry, TypeKey};
pub use seed::{Seed, StdSeed};
pub use shrink::{shrink_bool, shrink_char, shrink_float, shrink_integral, shrink_list};
