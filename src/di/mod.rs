//! The container core
//!
//! Definitions are built from type descriptors and registered once; the factory then
//! resolves beans on demand, creating shared beans at most once.

mod builder;
mod component;
mod constructor;
mod container;
mod definition;
pub mod definition_builder;
mod factory;
mod field;
mod registry;

pub use builder::ContainerBuilder;
pub use component::Component;
pub use constructor::create_bare;
pub use container::Container;
pub use definition::{BeanDefinition, DefinitionSummary, FactoryOperation};
pub use factory::BeanFactory;
pub use field::{inject_fields, BeanSource};
pub use registry::Registry;
