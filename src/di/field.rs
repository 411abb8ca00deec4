use crate::error::{ContainerError, Result};
use crate::metadata::{BeanRef, Erased, TypeDescriptor, TypeKey};

/// Where the field resolver obtains dependencies from.
pub trait BeanSource {
    /// Resolves a bean viewed as `key`.
    fn get_bean(&mut self, key: TypeKey) -> Result<BeanRef>;
}

/// Assigns every `Inject`-tagged field of `instance`.
///
/// Optional fields whose type has no bean are left unset. Every other failure is wrapped
/// into an injection error naming the field.
pub fn inject_fields(
    instance: &mut Erased,
    descriptor: &TypeDescriptor,
    source: &mut dyn BeanSource,
) -> Result<()> {
    let owner = descriptor.key().name();

    for field in descriptor.fields().iter().filter(|f| f.is_injected()) {
        let wrap = |cause: ContainerError| ContainerError::Injection {
            owner: owner.to_string(),
            field: field.name().to_string(),
            source: Box::new(cause),
        };

        let bean = match source.get_bean(field.declared_type()) {
            Ok(bean) => bean,
            Err(err) if err.is_not_found() && field.is_optional() => {
                tracing::debug!(
                    "No bean for optional field {}.{}, leaving it unset",
                    owner,
                    field.name()
                );
                continue;
            }
            Err(err) => return Err(wrap(err)),
        };

        if !field.assign(instance, &bean) {
            return Err(wrap(ContainerError::type_mismatch(
                field.declared_type().name(),
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Tag;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct Clock;
    struct Mailer;

    #[derive(Default)]
    struct Notifier {
        clock: Option<Arc<Clock>>,
        mailer: Option<Arc<Mailer>>,
        untouched: Option<Arc<Clock>>,
    }

    struct MapSource(HashMap<TypeKey, BeanRef>);

    impl BeanSource for MapSource {
        fn get_bean(&mut self, key: TypeKey) -> Result<BeanRef> {
            self.0
                .get(&key)
                .cloned()
                .ok_or_else(|| ContainerError::NoBeanFound {
                    requested: key.name().to_string(),
                })
        }
    }

    fn notifier_descriptor(mailer_optional: bool) -> TypeDescriptor {
        let builder = TypeDescriptor::builder::<Notifier>()
            .inject::<Clock, _>("clock", |n, c| n.clock = Some(c))
            .field::<Clock, _>("untouched", [], |n, c| n.untouched = Some(c));
        if mailer_optional {
            builder
                .inject_optional::<Mailer, _>("mailer", |n, m| n.mailer = Some(m))
                .build()
        } else {
            builder
                .inject::<Mailer, _>("mailer", |n, m| n.mailer = Some(m))
                .build()
        }
    }

    fn clock_only() -> MapSource {
        let mut beans = HashMap::new();
        beans.insert(TypeKey::of::<Clock>(), BeanRef::new(Arc::new(Clock)));
        MapSource(beans)
    }

    #[test]
    fn test_optional_field_is_skipped() {
        let mut notifier = Notifier::default();
        inject_fields(&mut notifier, &notifier_descriptor(true), &mut clock_only()).unwrap();

        assert!(notifier.clock.is_some());
        assert!(notifier.mailer.is_none());
        assert!(notifier.untouched.is_none());
    }

    #[test]
    fn test_required_field_failure_names_field() {
        let mut notifier = Notifier::default();
        let err = inject_fields(&mut notifier, &notifier_descriptor(false), &mut clock_only())
            .unwrap_err();

        match err {
            ContainerError::Injection { field, source, .. } => {
                assert_eq!(field, "mailer");
                assert!(source.is_not_found());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_bean_type_is_a_mismatch() {
        let mut beans = HashMap::new();
        beans.insert(TypeKey::of::<Clock>(), BeanRef::new(Arc::new(Mailer)));
        let descriptor = TypeDescriptor::builder::<Notifier>()
            .field::<Clock, _>("clock", [Tag::Inject], |n, c| n.clock = Some(c))
            .build();

        let mut notifier = Notifier::default();
        let err = inject_fields(&mut notifier, &descriptor, &mut MapSource(beans)).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            ContainerError::TypeMismatch { .. }
        ));
    }
}
