//! # Sprig
//!
//! A small annotation-style dependency injection container for Rust.
//!
//! Types describe themselves through declarative metadata: tags such as *manageable*,
//! *configuration*, *inject*, *primary* or *qualifier*, attached to a type and to its
//! fields and methods. At build time the container reads that metadata once, registers a
//! definition per type, and afterwards resolves beans by type or by name.
//!
//! ## Features
//!
//! - **Scopes**: `SHARED` beans are created once and reused, `PER_REQUEST` beans are
//!   created for every resolution
//! - **Interface lookup**: resolve `Arc<dyn Trait>` from any bean providing it, with
//!   `primary` as the tie-break
//! - **Field injection**: `#[inject]` and `#[inject(optional)]` fields are filled after
//!   construction
//! - **Configuration units**: producer methods whose results become beans, reachable by
//!   type and by qualifier
//! - **Lifecycle hooks**: post-initialize before a bean is handed out, pre-destroy on
//!   shutdown
//! - **Cycle detection**: circular field dependencies fail with the full chain
//!
//! ## Quick Start
//!
//! ```rust
//! use sprig::prelude::*;
//!
//! pub trait UserRepository: Send + Sync {
//!     fn find(&self, id: u32) -> Option<String>;
//! }
//!
//! // 1. Define your components
//! #[derive(Default, Component)]
//! #[component(qualifier = "users", provides(dyn UserRepository))]
//! pub struct MemoryRepository;
//!
//! impl UserRepository for MemoryRepository {
//!     fn find(&self, id: u32) -> Option<String> {
//!         (id == 1).then(|| "ada".to_string())
//!     }
//! }
//!
//! #[derive(Default, Component)]
//! #[component(scope = "per_request")]
//! pub struct UserService {
//!     #[inject]
//!     repository: Option<Arc<dyn UserRepository>>,
//! }
//!
//! // 2. Build the container
//! let catalog = ComponentCatalog::new()
//!     .with::<MemoryRepository>()
//!     .with::<UserService>();
//! let container = Container::build(&catalog, "").unwrap();
//!
//! // 3. Resolve beans
//! let service = container.get_bean::<UserService>().unwrap();
//! let repository = service.repository.as_ref().unwrap();
//! assert_eq!(repository.find(1).as_deref(), Some("ada"));
//! ```

pub mod config;
pub mod di;
pub mod discovery;
pub mod error;
pub mod lifecycle;
pub mod metadata;

// Re-export core types
pub use config::ContainerConfig;
pub use di::{
    BeanDefinition, BeanFactory, Component, Container, ContainerBuilder, DefinitionSummary,
    Registry,
};
pub use discovery::{ComponentCatalog, DiscoverySource};
pub use error::{AmbiguityReason, ContainerError, Result};
pub use lifecycle::ShutdownSummary;
pub use metadata::{
    BeanRef, ConstructorDescriptor, DescriptorBuilder, FieldDescriptor, MethodDescriptor, Scope,
    Tag, TagSet, TypeDescriptor, TypeKey,
};

// Re-export macros
pub use sprig_macro::Component as DeriveComponent;

// Hooks, constructors and producers return `anyhow::Result`
pub use anyhow;

/// Prelude module for convenient imports
///
/// ```
/// use sprig::prelude::*;
/// ```
pub mod prelude {
    pub use crate::DeriveComponent as Component;
    pub use crate::config::ContainerConfig;
    pub use crate::di::{Component, Container, ContainerBuilder};
    pub use crate::discovery::{ComponentCatalog, DiscoverySource};
    pub use crate::error::{ContainerError, Result};
    pub use crate::metadata::{Scope, Tag, TypeDescriptor};
    pub use std::sync::Arc;
}
