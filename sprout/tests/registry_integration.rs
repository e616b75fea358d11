//! End-to-end use of the registry: registration rules, concurrent access,
//! derivation, shrinking to a fixed point and generated functions.

use pretty_assertions::assert_eq;
use sprout::{
    Arbitrary, ErasedInstance, Fun, Gen, GenError, Instance, Registry, StdSeed, TypeKey, choose,
    function_of, list_of,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn minimize<T: PartialEq + Clone + std::fmt::Debug + Send + Sync + 'static>(
    registry: &Registry,
    start: T,
) -> (T, usize) {
    let mut current = start;
    let mut steps = 0;
    while let Some(next) = registry.shrink(&current).unwrap().next() {
        assert!(next != current, "{:?} shrank to itself", current);
        current = next;
        steps += 1;
        assert!(steps < 10_000, "no fixed point reached");
    }
    (current, steps)
}

#[test]
fn test_register_then_overwrite() {
    let registry: Registry = Registry::with_defaults();
    let default = registry.resolve::<i32>().unwrap();

    assert!(!registry.register(Instance::new(Gen::pure(5i32))));
    assert!(Arc::ptr_eq(&default, &registry.resolve::<i32>().unwrap()));

    let custom = Instance::new(Gen::pure(5i32));
    assert!(registry.overwrite(custom));
    let resolved = registry.resolve::<i32>().unwrap();
    assert!(!Arc::ptr_eq(&default, &resolved));
    assert_eq!(resolved.generator().run(99, StdSeed::new(1)), 5);
}

#[test]
fn test_integer_shrinking_reaches_fixed_point() {
    let registry: Registry = Registry::with_defaults();
    let g = registry.generator::<i64>().unwrap();
    for key in 0..50 {
        let start = g.generate(1_000_000, StdSeed::new(key));
        let (minimal, _) = minimize(&registry, start);
        assert_eq!(minimal, 0);
    }
    let (minimal, steps) = minimize(&registry, i64::MIN);
    assert_eq!(minimal, 0);
    assert_eq!(steps, 1);
}

#[test]
fn test_shrinking_towards_a_failing_minimum() {
    // Keep only candidates that still "fail", as a runner would
    let registry: Registry = Registry::new();
    registry.register_arbitrary::<Vec<u32>>();
    let fails = |xs: &Vec<u32>| xs.iter().any(|&x| x >= 10);

    let mut current = vec![3, 250, 7, 41, 0];
    assert!(fails(&current));
    loop {
        let next = registry
            .shrink(&current)
            .unwrap()
            .find(|candidate| fails(candidate));
        match next {
            Some(smaller) => current = smaller,
            None => break,
        }
    }
    assert_eq!(current, vec![10]);
}

#[test]
fn test_concurrent_registration_installs_once() {
    let registry: Registry = Registry::new();
    let results: Vec<bool> = crossbeam::scope(|s| {
        let handles: Vec<_> = (0..8u64)
            .map(|i| {
                let registry = &registry;
                s.spawn(move |_| registry.register(Instance::new(Gen::pure(i))))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    assert_eq!(results.iter().filter(|&&installed| installed).count(), 1);
    let winner = results.iter().position(|&installed| installed).unwrap() as u64;
    let g = registry.generator::<u64>().unwrap();
    assert_eq!(g.run(0, StdSeed::new(0)), winner);
}

#[test]
fn test_concurrent_resolution_sees_one_derived_instance() {
    let derived = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&derived);
    let registry: Registry =
        Registry::with_defaults().with_derivation(move |registry: &Registry, key: TypeKey| {
            if !key.is::<Vec<char>>() {
                return None;
            }
            counter.fetch_add(1, Ordering::SeqCst);
            let element = registry.generator::<char>().ok()?;
            Some(ErasedInstance::new(Instance::new(list_of(element))))
        });

    let instances = crossbeam::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = &registry;
                s.spawn(move |_| registry.resolve::<Vec<char>>().unwrap())
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    })
    .unwrap();

    let installed = registry.resolve::<Vec<char>>().unwrap();
    assert!(instances.iter().all(|i| Arc::ptr_eq(i, &installed)));
    assert!(derived.load(Ordering::SeqCst) >= 1);
    assert_eq!(registry.len(), 17);
}

#[test]
fn test_missing_instance_without_derivation() {
    let registry: Registry = Registry::with_defaults();
    assert_eq!(
        registry.generator::<Option<bool>>().unwrap_err(),
        GenError::missing_instance::<Option<bool>>()
    );
    assert!(registry.register_arbitrary::<Option<bool>>());
    assert!(registry.generator::<Option<bool>>().is_ok());
}

#[test]
fn test_generated_functions_respect_their_argument() {
    let g: Gen<Fun<(u8, String), i32>> = function_of(choose(-1000, 1000));
    let f = g.generate(30, StdSeed::new(8));

    let a = (1u8, "one".to_string());
    let b = (1u8, "uno".to_string());
    assert_eq!(f.call(&a).unwrap(), f.call(&a.clone()).unwrap());

    let distinct: std::collections::HashSet<i32> = (0..50u8)
        .map(|n| f.call(&(n, b.1.clone())).unwrap())
        .collect();
    assert!(distinct.len() > 40);

    let h: Gen<Fun<Vec<f32>, u8>> = function_of(choose(0, 1));
    let h = h.run(0, StdSeed::new(0));
    assert_eq!(h.call(&vec![]).unwrap(), h.call(&vec![]).unwrap());
    assert!(matches!(
        h.call(&vec![1.0]),
        Err(GenError::NotImplemented { type_name: "f32" })
    ));
}

#[test]
fn test_registry_and_trait_shrink_agree() {
    let registry: Registry = Registry::with_defaults();
    let value = "Hello, World".to_string();
    let through_registry: Vec<String> = registry.shrink(&value).unwrap().collect();
    let direct: Vec<String> = value.shrink().collect();
    assert_eq!(through_registry, direct);
}
