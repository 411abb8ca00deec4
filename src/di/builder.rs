use super::component::Component;
use super::container::Container;
use crate::config::ContainerConfig;
use crate::discovery::DiscoverySource;
use crate::error::Result;
use crate::metadata::TypeDescriptor;
use std::sync::Arc;

/// Builder for constructing a dependency injection container
///
/// Collects components from discovery sources and explicit registrations, then builds
/// the final immutable container.
///
/// # Example
/// ```
/// use sprig::{ContainerBuilder, Tag, TypeDescriptor};
///
/// #[derive(Default)]
/// struct Database;
///
/// let container = ContainerBuilder::new()
///     .register(
///         TypeDescriptor::builder::<Database>()
///             .tag(Tag::Manageable)
///             .default_constructor()
///             .build(),
///     )
///     .build()
///     .unwrap();
///
/// assert!(container.get_bean::<Database>().is_ok());
/// ```
pub struct ContainerBuilder {
    sources: Vec<Box<dyn DiscoverySource>>,
    root: String,
    descriptors: Vec<Arc<TypeDescriptor>>,
    config: ContainerConfig,
}

impl ContainerBuilder {
    /// Create a new container builder
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            root: String::new(),
            descriptors: Vec::new(),
            config: ContainerConfig::default(),
        }
    }

    /// Add a discovery source, scanned when the container is built
    pub fn discovery(mut self, source: impl DiscoverySource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Restrict discovery to types under the module path `root`
    pub fn scan(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Register a component descriptor directly
    pub fn register(mut self, descriptor: impl Into<Arc<TypeDescriptor>>) -> Self {
        self.descriptors.push(descriptor.into());
        self
    }

    /// Register a [`Component`] type
    pub fn register_component<T: Component>(self) -> Self {
        self.register(T::descriptor())
    }

    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the container
    ///
    /// Discovered components come first, followed by explicit registrations. A type seen
    /// twice keeps its first descriptor.
    pub fn build(self) -> Result<Container> {
        let mut descriptors = Vec::new();
        for source in &self.sources {
            descriptors.extend(source.scan(&self.root)?);
        }
        descriptors.extend(self.descriptors);
        Container::assemble(descriptors, self.config)
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
