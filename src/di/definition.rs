use crate::metadata::{BeanRef, Producer, Scope, TypeDescriptor, TypeKey};
use serde::Serialize;
use std::sync::{Arc, OnceLock};

/// A configuration unit's method that produces the bean.
#[derive(Clone)]
pub struct FactoryOperation {
    pub owner: TypeKey,
    pub method: &'static str,
    pub producer: Producer,
}

/// How the container creates and shares one kind of bean.
///
/// Immutable once registered, apart from the factory owner which is set exactly once
/// during the build phase.
pub struct BeanDefinition {
    pub(crate) descriptor: Arc<TypeDescriptor>,
    pub(crate) scope: Scope,
    pub(crate) lazy: bool,
    pub(crate) primary: bool,
    pub(crate) qualifier: String,
    pub(crate) factory_operation: Option<FactoryOperation>,
    pub(crate) factory_instance: OnceLock<BeanRef>,
}

impl BeanDefinition {
    pub fn produced_type(&self) -> TypeKey {
        self.descriptor.key()
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Empty when the bean has no name
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn factory_operation(&self) -> Option<&FactoryOperation> {
        self.factory_operation.as_ref()
    }

    pub fn factory_instance(&self) -> Option<&BeanRef> {
        self.factory_instance.get()
    }

    /// Binds the configuration instance owning the factory operation.
    ///
    /// Returns false if an owner was already set.
    pub(crate) fn set_factory_instance(&self, owner: BeanRef) -> bool {
        self.factory_instance.set(owner).is_ok()
    }

    pub fn is_shared(&self) -> bool {
        self.scope == Scope::Shared
    }

    pub fn summary(&self) -> DefinitionSummary {
        DefinitionSummary {
            produced_type: self.produced_type().name().to_string(),
            scope: self.scope,
            lazy: self.lazy,
            primary: self.primary,
            qualifier: (!self.qualifier.is_empty()).then(|| self.qualifier.clone()),
            factory: self
                .factory_operation
                .as_ref()
                .map(|op| format!("{}::{}", op.owner.name(), op.method)),
        }
    }
}

impl std::fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("produced_type", &self.produced_type())
            .field("scope", &self.scope)
            .field("lazy", &self.lazy)
            .field("primary", &self.primary)
            .field("qualifier", &self.qualifier)
            .field(
                "factory_operation",
                &self.factory_operation.as_ref().map(|op| op.method),
            )
            .finish()
    }
}

/// Serializable view of a registered definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionSummary {
    pub produced_type: String,
    pub scope: Scope,
    pub lazy: bool,
    pub primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory: Option<String>,
}
