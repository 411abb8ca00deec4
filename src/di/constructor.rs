use crate::error::{ContainerError, Result};
use crate::metadata::{Instance, TypeDescriptor};

/// Creates a bare instance of the described type.
///
/// Uses the constructor tagged `Inject` if there is one, else the zero-argument one.
/// Constructors with parameters are not resolved.
pub fn create_bare(descriptor: &TypeDescriptor) -> Result<Instance> {
    let type_name = descriptor.key().name();
    let failed = |reason: String| ContainerError::Instantiation {
        type_name: type_name.to_string(),
        source: reason.into(),
    };

    let constructors = descriptor.constructors();
    let selected = constructors
        .iter()
        .find(|c| c.is_injectable())
        .or_else(|| constructors.iter().find(|c| c.arity() == 0))
        .ok_or_else(|| failed("no injectable or zero-argument constructor".to_string()))?;

    if selected.arity() > 0 {
        return Err(failed(format!(
            "constructor takes {} parameter(s); only zero-argument construction is supported",
            selected.arity()
        )));
    }

    selected.invoke().map_err(|source| ContainerError::Instantiation {
        type_name: type_name.to_string(),
        source: source.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ConstructorDescriptor, Tag, TypeKey};
    use anyhow::bail;

    #[derive(Debug, Default, PartialEq)]
    struct Counter(u32);

    fn counter(instance: Instance) -> Counter {
        *instance.downcast::<Counter>().unwrap()
    }

    #[test]
    fn test_prefers_injectable_constructor() {
        let descriptor = TypeDescriptor::builder::<Counter>()
            .default_constructor()
            .constructor([Tag::Inject], || Ok(Counter(7)))
            .build();

        assert_eq!(counter(create_bare(&descriptor).unwrap()), Counter(7));
    }

    #[test]
    fn test_falls_back_to_zero_argument_constructor() {
        let descriptor = TypeDescriptor::builder::<Counter>()
            .default_constructor()
            .build();

        assert_eq!(counter(create_bare(&descriptor).unwrap()), Counter(0));
    }

    #[test]
    fn test_missing_constructor() {
        let err = create_bare(&TypeDescriptor::plain::<Counter>()).unwrap_err();
        assert!(matches!(err, ContainerError::Instantiation { .. }));
    }

    #[test]
    fn test_parameterized_constructor_rejected() {
        let constructor = ConstructorDescriptor::new([Tag::Inject], || Ok(Counter(1)))
            .with_parameters(vec![TypeKey::of::<String>()]);
        let descriptor = TypeDescriptor::builder::<Counter>()
            .constructor_descriptor(constructor)
            .build();

        let err = create_bare(&descriptor).unwrap_err();
        assert!(err.to_string().contains("1 parameter(s)"));
    }

    #[test]
    fn test_constructor_failure_is_wrapped() {
        let descriptor = TypeDescriptor::builder::<Counter>()
            .constructor([], || bail!("disk full"))
            .build();

        let err = create_bare(&descriptor).unwrap_err();
        assert!(matches!(err, ContainerError::Instantiation { .. }));
        assert!(err.to_string().contains("disk full"));
    }
}
