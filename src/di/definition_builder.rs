//! Turns declared metadata into bean definitions.

use super::definition::{BeanDefinition, FactoryOperation};
use crate::error::{ContainerError, Result};
use crate::metadata::{MethodDescriptor, Tag, TypeDescriptor, TypeKey};
use std::sync::{Arc, OnceLock};

/// Builds the definition of a manageable or configuration type.
pub fn from_type(descriptor: Arc<TypeDescriptor>) -> Result<BeanDefinition> {
    let tags = descriptor.tags();
    if !tags.is_manageable() && !tags.is_configuration() {
        return Err(ContainerError::InvalidDefinition {
            type_name: descriptor.key().name().to_string(),
            reason: "type is neither manageable nor a configuration unit".to_string(),
        });
    }

    Ok(BeanDefinition {
        scope: tags.scope().unwrap_or_default(),
        lazy: tags.has(&Tag::Lazy),
        primary: tags.has(&Tag::Primary),
        qualifier: tags.qualifier().unwrap_or_default().to_string(),
        factory_operation: None,
        factory_instance: OnceLock::new(),
        descriptor,
    })
}

/// Builds the definition of a bean produced by `method` of the configuration type `owner`.
///
/// The qualifier defaults to the method name.
pub fn from_factory_operation(owner: TypeKey, method: &MethodDescriptor) -> Result<BeanDefinition> {
    let invalid = |reason: &str| ContainerError::InvalidDefinition {
        type_name: format!("{}::{}", owner.name(), method.name()),
        reason: reason.to_string(),
    };

    let tags = method.tags();
    if !tags.has(&Tag::Produces) {
        return Err(invalid("method is not tagged as a producer"));
    }
    let producer = method
        .producer_body()
        .ok_or_else(|| invalid("method has no producing body"))?;
    if producer.produced().key() != producer.returns() {
        return Err(invalid("produced descriptor does not match the return type"));
    }

    Ok(BeanDefinition {
        descriptor: Arc::clone(producer.produced()),
        scope: tags.scope().unwrap_or_default(),
        lazy: tags.has(&Tag::Lazy),
        primary: tags.has(&Tag::Primary),
        qualifier: tags.qualifier().unwrap_or(method.name()).to_string(),
        factory_operation: Some(FactoryOperation {
            owner,
            method: method.name(),
            producer: producer.clone(),
        }),
        factory_instance: OnceLock::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Scope;

    #[derive(Default)]
    struct Plain;

    #[derive(Default)]
    struct Settings;

    struct Limit(u32);

    #[test]
    fn test_from_type_reads_tags() {
        let descriptor = TypeDescriptor::builder::<Plain>()
            .tags([
                Tag::Manageable,
                Tag::Scope(Scope::PerRequest),
                Tag::Lazy,
                Tag::Qualifier("plain".to_string()),
            ])
            .default_constructor()
            .build();

        let definition = from_type(Arc::new(descriptor)).unwrap();
        assert_eq!(definition.produced_type(), TypeKey::of::<Plain>());
        assert_eq!(definition.scope(), Scope::PerRequest);
        assert!(definition.is_lazy());
        assert!(!definition.is_primary());
        assert_eq!(definition.qualifier(), "plain");
        assert!(definition.factory_operation().is_none());
    }

    #[test]
    fn test_from_type_defaults() {
        let descriptor = TypeDescriptor::builder::<Plain>()
            .tag(Tag::Manageable)
            .build();

        let definition = from_type(Arc::new(descriptor)).unwrap();
        assert_eq!(definition.scope(), Scope::Shared);
        assert_eq!(definition.qualifier(), "");
    }

    #[test]
    fn test_from_type_rejects_untagged() {
        let err = from_type(Arc::new(TypeDescriptor::plain::<Plain>())).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_from_factory_operation_qualifier() {
        let descriptor = TypeDescriptor::builder::<Settings>()
            .tag(Tag::Configuration)
            .produces::<Limit, _>("limit", [], |_| Ok(Limit(10)))
            .produces::<u8, _>("small", [Tag::Qualifier("tiny".to_string()), Tag::Primary], |_| {
                Ok(1)
            })
            .build();
        let owner = descriptor.key();
        let methods = descriptor.methods();

        let by_name = from_factory_operation(owner, &methods[0]).unwrap();
        assert_eq!(by_name.produced_type(), TypeKey::of::<Limit>());
        assert_eq!(by_name.qualifier(), "limit");
        assert!(by_name.factory_instance().is_none());

        let overridden = from_factory_operation(owner, &methods[1]).unwrap();
        assert_eq!(overridden.qualifier(), "tiny");
        assert!(overridden.is_primary());
        assert_eq!(overridden.factory_operation().unwrap().method, "small");
    }

    #[test]
    fn test_from_factory_operation_requires_produces_tag() {
        let method = MethodDescriptor::producer::<Settings, Limit, _>(
            "limit",
            [],
            TypeDescriptor::plain::<Limit>(),
            |_| Ok(Limit(1)),
        );
        let err = from_factory_operation(TypeKey::of::<Settings>(), &method).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidDefinition { .. }));

        let mismatched = MethodDescriptor::producer::<Settings, Limit, _>(
            "limit",
            [Tag::Produces],
            TypeDescriptor::plain::<Plain>(),
            |_| Ok(Limit(1)),
        );
        assert!(from_factory_operation(TypeKey::of::<Settings>(), &mismatched).is_err());
    }
}
