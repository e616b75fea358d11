//! Basic usage examples demonstrating the core Sprout API
//!
//! Shows building generators from combinators, sampling them, resolving
//! instances through a registry and shrinking a failing value by hand.

use sprout::{
    Arbitrary, Fun, Gen, GenConfig, GenError, Registry, StdSeed, choose, elements, frequency,
    function_of, list_of, sample, such_that, two,
};

// Example 1: Combining generators
fn example_1_combinators() -> Result<(), GenError> {
    println!("=== Example 1: Combinators ===");

    let suit: Gen<&str> = elements(vec!["hearts", "spades", "clubs", "diamonds"])?;
    let rank: Gen<u8> = frequency(vec![(9, choose(2, 10)), (4, choose(11, 14))])?;
    let card = two(rank, suit);

    let config = GenConfig::default().with_seed(42).with_sample_count(5);
    for (rank, suit) in sample(&config, &card) {
        println!("  {} of {}", rank, suit);
    }
    println!();
    Ok(())
}

// Example 2: Size-dependent data
fn example_2_sized() {
    println!("=== Example 2: Sizes ===");

    let evens: Gen<Vec<i32>> = list_of(such_that(i32::arbitrary(), |x| x % 2 == 0));
    for size in [0, 5, 20] {
        let xs = evens.run(size, StdSeed::new(7));
        println!("  size {:>2}: {:?}", size, xs);
    }
    println!();
}

// Example 3: Shrinking a counterexample
fn example_3_shrinking() -> Result<(), GenError> {
    println!("=== Example 3: Shrinking ===");

    // Property under test: "no element exceeds 50"
    let fails = |xs: &Vec<u32>| xs.iter().any(|&x| x > 50);

    let registry: Registry = Registry::new();
    registry.register_arbitrary::<Vec<u32>>();

    let g = registry.generator::<Vec<u32>>()?;
    let Some(mut current) = (0..100)
        .map(|key| g.generate(100, StdSeed::new(key)))
        .find(|xs| fails(xs))
    else {
        println!("  no counterexample found");
        return Ok(());
    };
    println!("  found:  {:?}", current);

    while let Some(smaller) = registry.shrink(&current)?.find(|xs| fails(xs)) {
        current = smaller;
    }
    println!("  shrunk: {:?}", current);
    println!();
    Ok(())
}

// Example 4: Generated functions
fn example_4_functions() -> Result<(), GenError> {
    println!("=== Example 4: Functions ===");

    let g: Gen<Fun<String, bool>> = function_of(bool::arbitrary());
    let predicate = g.generate_with(&GenConfig::default().with_seed(3));
    for word in ["apple", "banana", "cherry", "apple"] {
        println!("  f({:?}) = {}", word, predicate.call(&word.to_string())?);
    }
    println!();
    Ok(())
}

fn main() -> Result<(), GenError> {
    example_1_combinators()?;
    example_2_sized();
    example_3_shrinking()?;
    example_4_functions()?;
    Ok(())
}
