use super::builder::ContainerBuilder;
use super::definition::DefinitionSummary;
use super::factory::BeanFactory;
use super::registry::Registry;
use super::{constructor, definition_builder};
use crate::config::ContainerConfig;
use crate::discovery::DiscoverySource;
use crate::error::{ContainerError, Result};
use crate::lifecycle::ShutdownSummary;
use crate::metadata::{Tag, TypeDescriptor, TypeKey};
use std::collections::HashSet;
use std::sync::Arc;

/// Thread-safe dependency injection container.
///
/// Built once from a set of type descriptors; beans are then resolved by type or by
/// name from any number of threads.
pub struct Container {
    factory: BeanFactory,
    config: ContainerConfig,
}

impl Container {
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Builds a container from every component `source` finds under `root`.
    pub fn build(source: &dyn DiscoverySource, root: &str) -> Result<Self> {
        let descriptors = source.scan(root)?;
        Self::assemble(descriptors, ContainerConfig::default())
    }

    pub(crate) fn assemble(
        descriptors: Vec<Arc<TypeDescriptor>>,
        config: ContainerConfig,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let candidates: Vec<_> = descriptors
            .into_iter()
            .filter(|d| seen.insert(d.key()))
            .collect();

        let mut registry = Registry::new();
        for descriptor in &candidates {
            registry.register(definition_builder::from_type(Arc::clone(descriptor))?);
        }

        for descriptor in candidates.iter().filter(|d| d.tags().is_configuration()) {
            register_factory_methods(&mut registry, descriptor)?;
        }

        tracing::info!(
            "Container built with {} bean definitions from {} components",
            registry.len(),
            candidates.len()
        );

        let container = Self {
            factory: BeanFactory::new(registry, config.max_resolution_depth),
            config,
        };
        if container.config.eager_singletons {
            container.factory.preinstantiate_singletons()?;
        }
        Ok(container)
    }

    /// Resolves the single bean assignable to `T`.
    ///
    /// `T` may be a concrete type or an interface type such as `dyn Trait`.
    pub fn get_bean<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let key = TypeKey::of::<T>();
        self.factory
            .get_bean(key)?
            .downcast::<T>()
            .ok_or_else(|| ContainerError::type_mismatch(key.name()))
    }

    /// Resolves the bean registered under qualifier or alias `name`.
    pub fn get_bean_by_name<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        let key = TypeKey::of::<T>();
        self.factory
            .get_bean_by_qualifier(name, key)?
            .downcast::<T>()
            .ok_or_else(|| ContainerError::type_mismatch(key.name()))
    }

    /// Returns true if at least one definition is assignable to `T`
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        let key = TypeKey::of::<T>();
        self.factory
            .registry()
            .definitions()
            .any(|d| d.descriptor().is_assignable_to(key))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.factory.registry().contains_qualifier(name)
    }

    pub fn definitions(&self) -> Vec<DefinitionSummary> {
        self.factory
            .registry()
            .definitions()
            .map(|d| d.summary())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.factory.registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.factory.registry().is_empty()
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Number of shared beans created so far
    pub fn singleton_count(&self) -> usize {
        self.factory.singleton_count()
    }

    /// Runs the pre-destroy hooks of every shared bean and releases them.
    ///
    /// Beans resolved afterwards are created anew.
    pub fn shutdown(&self) -> ShutdownSummary {
        tracing::info!("Shutting down container");
        self.factory.destroy_singletons()
    }
}

/// Registers the producer methods of one configuration type, bound to a single owner
/// instance created right away.
fn register_factory_methods(registry: &mut Registry, descriptor: &TypeDescriptor) -> Result<()> {
    let owner_key = descriptor.key();
    let owner = descriptor
        .seal(constructor::create_bare(descriptor)?)
        .ok_or_else(|| ContainerError::type_mismatch(owner_key.name()))?;

    for method in descriptor.methods_tagged(&Tag::Produces) {
        let definition = definition_builder::from_factory_operation(owner_key, method)?;
        let produced = definition.produced_type();
        let qualifier = definition.qualifier().to_string();

        let definition = registry.register(definition);
        if !qualifier.is_empty() {
            registry.register_alias(qualifier, produced)?;
        }
        definition.set_factory_instance(owner.clone());

        tracing::debug!(
            "Registered factory method {}::{} producing {}",
            owner_key,
            method.name(),
            produced
        );
    }
    Ok(())
}
