//! Type-indexed registry of generation contracts.
//!
//! Static code reaches a type's contract through [`Arbitrary`]. The registry
//! is for code that only learns the concrete type at runtime, such as a
//! derivation layer composing instances for compound types. It is an explicit
//! object: create one per harness and pass it to whoever needs it.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError};

use crossbeam::sync::{ShardedLock, ShardedLockReadGuard, ShardedLockWriteGuard};
use tracing::{debug, warn};

use crate::arbitrary::Arbitrary;
use crate::cogen::Perturbation;
use crate::error::GenError;
use crate::generator::Gen;
use crate::seed::{Seed, StdSeed};

type CoGenFn<T> = Arc<dyn Fn(&T) -> Result<Perturbation, GenError> + Send + Sync>;
type ShrinkFn<T> = Arc<dyn Fn(&T) -> Box<dyn Iterator<Item = T>> + Send + Sync>;

/// A runtime bundle of generator, co-generator and shrinker for `T`
pub struct Instance<T, S = StdSeed> {
    generator: Gen<T, S>,
    co_generator: Option<CoGenFn<T>>,
    shrinker: ShrinkFn<T>,
}

impl<T: 'static, S: Seed> Instance<T, S> {
    /// An instance with no co-generation and no shrinking
    pub fn new(generator: Gen<T, S>) -> Self {
        Self {
            generator,
            co_generator: None,
            shrinker: Arc::new(|_| Box::new(std::iter::empty())),
        }
    }

    /// Set the co-generator used when values of `T` are function arguments
    pub fn with_co_generator<F>(mut self, co_generator: F) -> Self
    where
        F: Fn(&T) -> Result<Perturbation, GenError> + Send + Sync + 'static,
    {
        self.co_generator = Some(Arc::new(co_generator));
        self
    }

    /// Replace the shrinker. It must never yield its input.
    pub fn with_shrink<F>(mut self, shrinker: F) -> Self
    where
        F: Fn(&T) -> Box<dyn Iterator<Item = T>> + Send + Sync + 'static,
    {
        self.shrinker = Arc::new(shrinker);
        self
    }

    /// The instance described by `T`'s [`Arbitrary`] implementation
    pub fn from_arbitrary() -> Self
    where
        T: Arbitrary,
    {
        Self::new(T::arbitrary())
            .with_co_generator(|value: &T| value.coarbitrary())
            .with_shrink(|value: &T| value.shrink())
    }

    /// The generator for `T`
    pub fn generator(&self) -> Gen<T, S> {
        self.generator.clone()
    }

    /// The perturbation `value` applies to generators
    pub fn co_generator(&self, value: &T) -> Result<Perturbation, GenError> {
        match &self.co_generator {
            Some(co_generator) => co_generator(value),
            None => Err(GenError::not_implemented::<T>()),
        }
    }

    /// Perturb `g` by `value`
    pub fn co_generate<U: 'static>(&self, value: &T, g: Gen<U, S>) -> Result<Gen<U, S>, GenError> {
        Ok(self.co_generator(value)?.apply(g))
    }

    /// Shrink candidates for `value`
    pub fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        (self.shrinker)(value)
    }
}

impl<T, S> fmt::Debug for Instance<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &std::any::type_name::<T>())
            .field("co_generator", &self.co_generator.is_some())
            .finish()
    }
}

/// Runtime identity of a type, with its name for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    /// Identity used as the registry key
    pub id: TypeId,
    /// Type name for logs and errors
    pub name: &'static str,
}

impl TypeKey {
    /// The key of type `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Check if this key identifies `T`
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

/// An instance with its type erased, as produced by a [`Derivation`]
#[derive(Clone)]
pub struct ErasedInstance {
    key: TypeKey,
    instance: Arc<dyn Any + Send + Sync>,
}

impl ErasedInstance {
    /// Erase the type of an instance for `T`
    pub fn new<T: Send + Sync + 'static, S: Seed>(instance: Instance<T, S>) -> Self {
        Self::from_arc(Arc::new(instance))
    }

    fn from_arc<T: Send + Sync + 'static, S: Seed>(instance: Arc<Instance<T, S>>) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            instance,
        }
    }

    /// The type this instance generates
    pub fn key(&self) -> TypeKey {
        self.key
    }

    fn downcast<T: 'static, S: Seed>(&self) -> Option<Arc<Instance<T, S>>> {
        Arc::clone(&self.instance).downcast::<Instance<T, S>>().ok()
    }
}

impl fmt::Debug for ErasedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedInstance")
            .field("type", &self.key.name)
            .finish()
    }
}

/// Synthesizes instances for types nobody registered.
///
/// Consulted by [`Registry::resolve`] on a miss, without any registry lock
/// held, so implementations may resolve component types through `registry`.
/// Returning `None` declines.
pub trait Derivation<S: Seed>: Send + Sync {
    /// Synthesize an instance for the type identified by `key`, or decline
    fn derive(&self, registry: &Registry<S>, key: TypeKey) -> Option<ErasedInstance>;
}

impl<S, F> Derivation<S> for F
where
    S: Seed,
    F: Fn(&Registry<S>, TypeKey) -> Option<ErasedInstance> + Send + Sync,
{
    fn derive(&self, registry: &Registry<S>, key: TypeKey) -> Option<ErasedInstance> {
        self(registry, key)
    }
}

/// Type-indexed store of [`Instance`]s.
///
/// Writes are serialized and readers only ever clone a fully installed
/// `Arc`, so concurrent callers always see either no entry or a complete one.
pub struct Registry<S = StdSeed> {
    instances: ShardedLock<HashMap<TypeId, ErasedInstance>>,
    derivation: Option<Box<dyn Derivation<S>>>,
}

impl<S: Seed> Registry<S> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            instances: ShardedLock::new(HashMap::new()),
            derivation: None,
        }
    }

    /// Create a registry holding the instances for the scalar types and `String`
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.install_defaults();
        registry
    }

    /// Attach a derivation consulted when `resolve` misses
    pub fn with_derivation<D: Derivation<S> + 'static>(mut self, derivation: D) -> Self {
        self.derivation = Some(Box::new(derivation));
        self
    }

    fn install_defaults(&self) {
        macro_rules! defaults {
            ($registry:expr; $($t:ty),*) => {
                $( $registry.register_arbitrary::<$t>(); )*
            };
        }
        defaults!(
            self;
            (), bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String
        );
    }

    fn read(&self) -> ShardedLockReadGuard<'_, HashMap<TypeId, ErasedInstance>> {
        self.instances.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> ShardedLockWriteGuard<'_, HashMap<TypeId, ErasedInstance>> {
        self.instances.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install `instance` for `T` unless one is already present.
    ///
    /// Returns whether the instance was installed. An existing entry is left
    /// untouched.
    pub fn register<T: Send + Sync + 'static>(&self, instance: Instance<T, S>) -> bool {
        let key = TypeKey::of::<T>();
        let mut instances = self.write();
        if instances.contains_key(&key.id) {
            debug!(type_name = key.name, "instance already registered, keeping existing");
            return false;
        }
        instances.insert(key.id, ErasedInstance::new(instance));
        debug!(type_name = key.name, "registered instance");
        true
    }

    /// Install `instance` for `T`, replacing any existing entry.
    ///
    /// Returns whether an entry was replaced.
    pub fn overwrite<T: Send + Sync + 'static>(&self, instance: Instance<T, S>) -> bool {
        let key = TypeKey::of::<T>();
        let replaced = self
            .write()
            .insert(key.id, ErasedInstance::new(instance))
            .is_some();
        debug!(type_name = key.name, replaced, "overwrote instance");
        replaced
    }

    /// Register `T`'s [`Arbitrary`] implementation
    pub fn register_arbitrary<T: Arbitrary>(&self) -> bool {
        self.register(Instance::<T, S>::from_arbitrary())
    }

    /// Check if an instance is registered for `T`
    pub fn contains<T: 'static>(&self) -> bool {
        self.read().contains_key(&TypeId::of::<T>())
    }

    /// Get the number of registered instances
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn lookup<T: 'static>(&self) -> Option<Arc<Instance<T, S>>> {
        self.read()
            .get(&TypeId::of::<T>())
            .and_then(ErasedInstance::downcast::<T, S>)
    }

    /// The instance for `T`.
    ///
    /// On a miss the derivation, if any, is asked to synthesize one. A
    /// synthesized instance is installed with [`register`](Self::register)
    /// semantics: if another caller installed an entry in the meantime, that
    /// entry wins and is returned.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<Instance<T, S>>, GenError> {
        if let Some(instance) = self.lookup::<T>() {
            return Ok(instance);
        }

        let key = TypeKey::of::<T>();
        let derived = self
            .derivation
            .as_ref()
            .and_then(|derivation| {
                debug!(type_name = key.name, "no instance registered, trying derivation");
                derivation.derive(self, key)
            })
            .and_then(|erased| match erased.downcast::<T, S>() {
                Some(instance) => Some(instance),
                None => {
                    warn!(
                        type_name = key.name,
                        derived = erased.key().name,
                        "derivation returned an instance of the wrong type"
                    );
                    None
                }
            });

        let Some(instance) = derived else {
            return Err(GenError::missing_instance::<T>());
        };

        let mut instances = self.write();
        let installed = instances
            .entry(key.id)
            .or_insert_with(|| {
                debug!(type_name = key.name, "installed derived instance");
                ErasedInstance::from_arc(instance)
            })
            .downcast::<T, S>();
        installed.ok_or_else(GenError::missing_instance::<T>)
    }

    /// The generator for `T`
    pub fn generator<T: Send + Sync + 'static>(&self) -> Result<Gen<T, S>, GenError> {
        Ok(self.resolve::<T>()?.generator())
    }

    /// The perturbation `value` applies to generators
    pub fn co_arbitrary<T: Send + Sync + 'static>(
        &self,
        value: &T,
    ) -> Result<Perturbation, GenError> {
        self.resolve::<T>()?.co_generator(value)
    }

    /// Shrink candidates for `value`
    pub fn shrink<T: Send + Sync + 'static>(
        &self,
        value: &T,
    ) -> Result<Box<dyn Iterator<Item = T>>, GenError> {
        Ok(self.resolve::<T>()?.shrink(value))
    }
}

impl<S: Seed> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Seed> fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&'static str> = self.read().values().map(|e| e.key.name).collect();
        names.sort_unstable();
        f.debug_struct("Registry")
            .field("instances", &names)
            .field("derivation", &self.derivation.is_some())
            .finish()
    }
}
