use super::definition::BeanDefinition;
use crate::error::{ContainerError, Result};
use crate::metadata::TypeKey;
use std::collections::HashMap;
use std::sync::Arc;

/// Bean definitions indexed by produced type and by name.
///
/// Filled during the build phase only; read-only afterwards.
#[derive(Default)]
pub struct Registry {
    by_type: HashMap<TypeKey, Arc<BeanDefinition>>,
    by_name: HashMap<String, Arc<BeanDefinition>>,
    order: Vec<TypeKey>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `definition` under its produced type, and under its qualifier when set.
    ///
    /// A later registration for the same type or name replaces the earlier one.
    pub fn register(&mut self, definition: BeanDefinition) -> Arc<BeanDefinition> {
        let key = definition.produced_type();
        let definition = Arc::new(definition);

        if self.by_type.insert(key, Arc::clone(&definition)).is_some() {
            tracing::warn!("Replacing bean definition for {}", key);
        } else {
            self.order.push(key);
        }
        if !definition.qualifier.is_empty() {
            self.insert_name(definition.qualifier.clone(), Arc::clone(&definition));
        }

        tracing::debug!("Registered bean definition: {:?}", definition);
        definition
    }

    /// Makes the definition registered for `key` reachable as `name`.
    pub fn register_alias(&mut self, name: impl Into<String>, key: TypeKey) -> Result<()> {
        let name = name.into();
        let definition = self
            .by_type
            .get(&key)
            .cloned()
            .ok_or_else(|| ContainerError::UnknownType {
                alias: name.clone(),
                type_name: key.name().to_string(),
            })?;
        self.insert_name(name, definition);
        Ok(())
    }

    fn insert_name(&mut self, name: String, definition: Arc<BeanDefinition>) {
        let replaced = self.by_name.insert(name.clone(), Arc::clone(&definition));
        if let Some(previous) = replaced.filter(|p| !Arc::ptr_eq(p, &definition)) {
            tracing::warn!(
                "Qualifier '{}' previously bound to {} was overwritten",
                name,
                previous.produced_type()
            );
        }
    }

    pub fn get_by_type(&self, key: TypeKey) -> Option<&Arc<BeanDefinition>> {
        self.by_type.get(&key)
    }

    pub fn get_by_qualifier(&self, name: &str) -> Option<&Arc<BeanDefinition>> {
        self.by_name.get(name)
    }

    /// All definitions, in first-registration order
    pub fn definitions(&self) -> impl Iterator<Item = &Arc<BeanDefinition>> {
        self.order.iter().filter_map(|key| self.by_type.get(key))
    }

    pub fn contains_type(&self, key: TypeKey) -> bool {
        self.by_type.contains_key(&key)
    }

    pub fn contains_qualifier(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::definition_builder;
    use crate::metadata::{Tag, TypeDescriptor};

    struct Repository;
    struct Cache;

    fn definition<T: Send + Sync + 'static>(tags: Vec<Tag>) -> BeanDefinition {
        let descriptor = TypeDescriptor::builder::<T>()
            .tag(Tag::Manageable)
            .tags(tags)
            .build();
        definition_builder::from_type(Arc::new(descriptor)).unwrap()
    }

    #[test]
    fn test_register_by_type_and_qualifier() {
        let mut registry = Registry::new();
        registry.register(definition::<Repository>(vec![Tag::Qualifier("repo".to_string())]));

        let by_type = registry.get_by_type(TypeKey::of::<Repository>()).unwrap();
        let by_name = registry.get_by_qualifier("repo").unwrap();
        assert!(Arc::ptr_eq(by_type, by_name));
        assert!(registry.get_by_qualifier("").is_none());
        assert!(registry.get_by_type(TypeKey::of::<Cache>()).is_none());
    }

    #[test]
    fn test_register_last_write_wins() {
        let mut registry = Registry::new();
        registry.register(definition::<Repository>(vec![]));
        registry.register(definition::<Repository>(vec![Tag::Primary]));

        assert_eq!(registry.len(), 1);
        assert!(registry.get_by_type(TypeKey::of::<Repository>()).unwrap().is_primary());
        assert_eq!(registry.definitions().count(), 1);
    }

    #[test]
    fn test_alias_overwrites_silently() {
        let mut registry = Registry::new();
        registry.register(definition::<Repository>(vec![Tag::Qualifier("store".to_string())]));
        registry.register(definition::<Cache>(vec![]));

        registry.register_alias("store", TypeKey::of::<Cache>()).unwrap();
        let store = registry.get_by_qualifier("store").unwrap();
        assert_eq!(store.produced_type(), TypeKey::of::<Cache>());
    }

    #[test]
    fn test_alias_for_unknown_type_fails() {
        let mut registry = Registry::new();
        let err = registry
            .register_alias("missing", TypeKey::of::<Cache>())
            .unwrap_err();

        assert!(matches!(err, ContainerError::UnknownType { alias, .. } if alias == "missing"));
        assert!(!registry.contains_qualifier("missing"));
        assert!(registry.is_empty());
    }
}
