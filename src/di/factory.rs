use super::constructor;
use super::definition::BeanDefinition;
use super::field::{self, BeanSource};
use super::registry::Registry;
use crate::error::{AmbiguityReason, ContainerError, Result};
use crate::lifecycle::{self, LifecycleManager, ShutdownSummary};
use crate::metadata::{BeanRef, TypeKey};
use dashmap::DashMap;
use parking_lot::{Mutex, ReentrantMutex};
use std::sync::Arc;

/// Resolves beans from a [`Registry`] and owns the shared instances.
///
/// Shared beans are created at most once: readers hit the cache without locking, and
/// creation runs under a single reentrant lock with a second cache check, so that nested
/// resolution on the creating thread never deadlocks.
///
/// The creation lock is held while user constructors, factory methods and
/// post-initialize hooks run. That code may resolve beans on its own thread, but it must
/// not wait on another thread that resolves an uncached shared bean: that thread blocks
/// on the same lock and neither side makes progress.
pub struct BeanFactory {
    registry: Registry,
    singletons: DashMap<TypeKey, BeanRef>,
    lifecycle: Mutex<LifecycleManager>,
    creation_lock: ReentrantMutex<()>,
    max_depth: usize,
}

impl BeanFactory {
    pub fn new(registry: Registry, max_depth: usize) -> Self {
        Self {
            registry,
            singletons: DashMap::new(),
            lifecycle: Mutex::new(LifecycleManager::new()),
            creation_lock: ReentrantMutex::new(()),
            max_depth,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolves the single bean assignable to `requested`, viewed as `requested`.
    pub fn get_bean(&self, requested: TypeKey) -> Result<BeanRef> {
        Resolution::new(self).get_bean(requested)
    }

    /// Resolves the bean registered under `name`, viewed as `requested`.
    pub fn get_bean_by_qualifier(&self, name: &str, requested: TypeKey) -> Result<BeanRef> {
        let definition = self
            .registry
            .get_by_qualifier(name)
            .cloned()
            .ok_or_else(|| ContainerError::NoBeanFound {
                requested: format!("qualifier '{}'", name),
            })?;

        let bean = Resolution::new(self).resolve(&definition)?;
        definition
            .descriptor()
            .view(&bean, requested)
            .ok_or_else(|| ContainerError::type_mismatch(requested.name()))
    }

    /// Picks the definition for `requested` among every assignable one.
    fn select_candidate(&self, requested: TypeKey) -> Result<Arc<BeanDefinition>> {
        let candidates: Vec<&Arc<BeanDefinition>> = self
            .registry
            .definitions()
            .filter(|d| d.descriptor().is_assignable_to(requested))
            .collect();

        let ambiguous = |reason: AmbiguityReason, among: &[&Arc<BeanDefinition>]| {
            ContainerError::AmbiguousBean {
                requested: requested.name().to_string(),
                reason,
                candidates: among
                    .iter()
                    .map(|d| d.produced_type().name())
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        };

        match candidates.as_slice() {
            [] => Err(ContainerError::NoBeanFound {
                requested: requested.name().to_string(),
            }),
            [single] => Ok(Arc::clone(single)),
            many => {
                let primaries: Vec<_> =
                    many.iter().copied().filter(|d| d.is_primary()).collect();
                match primaries.as_slice() {
                    [primary] => Ok(Arc::clone(primary)),
                    [] => Err(ambiguous(AmbiguityReason::NoPrimary, many)),
                    _ => Err(ambiguous(
                        AmbiguityReason::MultiplePrimary,
                        primaries.as_slice(),
                    )),
                }
            }
        }
    }

    fn cached(&self, key: TypeKey) -> Option<BeanRef> {
        self.singletons.get(&key).map(|entry| entry.value().clone())
    }

    /// Creates every shared, non-lazy bean now, in registration order.
    pub fn preinstantiate_singletons(&self) -> Result<()> {
        let eager: Vec<_> = self
            .registry
            .definitions()
            .filter(|d| d.is_shared() && !d.is_lazy())
            .cloned()
            .collect();

        tracing::info!("Pre-instantiating {} shared beans", eager.len());
        for definition in &eager {
            Resolution::new(self).resolve(definition)?;
        }
        Ok(())
    }

    pub fn is_cached(&self, key: TypeKey) -> bool {
        self.singletons.contains_key(&key)
    }

    pub fn singleton_count(&self) -> usize {
        self.singletons.len()
    }

    /// Runs pre-destroy hooks of every cached bean and empties the cache.
    pub fn destroy_singletons(&self) -> ShutdownSummary {
        let _guard = self.creation_lock.lock();
        let mut manager = std::mem::take(&mut *self.lifecycle.lock());
        let summary = manager.call_pre_destroy();
        self.singletons.clear();
        summary
    }
}

/// One top-level resolution call, tracking the chain of types being created.
struct Resolution<'a> {
    factory: &'a BeanFactory,
    path: Vec<TypeKey>,
}

impl<'a> Resolution<'a> {
    fn new(factory: &'a BeanFactory) -> Self {
        Self {
            factory,
            path: Vec::new(),
        }
    }

    /// Returns the bean of `definition`, viewed as its produced type.
    fn resolve(&mut self, definition: &Arc<BeanDefinition>) -> Result<BeanRef> {
        if !definition.is_shared() {
            return self.create(definition);
        }

        let factory = self.factory;
        let key = definition.produced_type();
        // Never hold a cache entry across the recursion below.
        if let Some(bean) = factory.cached(key) {
            return Ok(bean);
        }

        let _guard = factory.creation_lock.lock();
        if let Some(bean) = factory.cached(key) {
            return Ok(bean);
        }

        let bean = self.create(definition)?;
        factory.singletons.insert(key, bean.clone());
        factory
            .lifecycle
            .lock()
            .register(bean.clone(), Arc::clone(definition.descriptor()));
        tracing::debug!("Created shared bean {}", key);
        Ok(bean)
    }

    fn create(&mut self, definition: &BeanDefinition) -> Result<BeanRef> {
        let key = definition.produced_type();
        self.enter(key)?;
        let result = self.instantiate(definition);
        self.path.pop();
        result
    }

    fn enter(&mut self, key: TypeKey) -> Result<()> {
        if let Some(start) = self.path.iter().position(|k| *k == key) {
            let chain = self.path[start..]
                .iter()
                .chain(std::iter::once(&key))
                .map(|k| k.name())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ContainerError::CyclicDependency { chain });
        }
        if self.path.len() >= self.factory.max_depth {
            return Err(ContainerError::ResolutionDepthExceeded {
                type_name: key.name().to_string(),
                limit: self.factory.max_depth,
            });
        }
        self.path.push(key);
        Ok(())
    }

    fn instantiate(&mut self, definition: &BeanDefinition) -> Result<BeanRef> {
        let descriptor = definition.descriptor();
        let key = descriptor.key();

        let mut instance = match definition.factory_operation() {
            Some(operation) => {
                let owner = definition.factory_instance().ok_or_else(|| {
                    ContainerError::MissingFactoryOwner {
                        type_name: key.name().to_string(),
                        method: operation.method.to_string(),
                    }
                })?;
                operation
                    .producer
                    .invoke(owner)
                    .map_err(|source| ContainerError::BeanCreation {
                        type_name: key.name().to_string(),
                        method: operation.method.to_string(),
                        source: source.into(),
                    })?
            }
            None => constructor::create_bare(descriptor)?,
        };

        field::inject_fields(&mut *instance, descriptor, self)?;
        lifecycle::run_post_initialize(&mut *instance, descriptor)?;

        descriptor
            .seal(instance)
            .ok_or_else(|| ContainerError::type_mismatch(key.name()))
    }
}

impl BeanSource for Resolution<'_> {
    fn get_bean(&mut self, requested: TypeKey) -> Result<BeanRef> {
        let definition = self.factory.select_candidate(requested)?;
        let bean = self.resolve(&definition)?;
        definition
            .descriptor()
            .view(&bean, requested)
            .ok_or_else(|| ContainerError::type_mismatch(requested.name()))
    }
}
