//! Component discovery
//!
//! A discovery source hands the container the descriptors of every manageable and
//! configuration type reachable from a root module path.

use crate::di::Component;
use crate::error::{ContainerError, Result};
use crate::metadata::TypeDescriptor;
use std::collections::HashSet;
use std::sync::Arc;

/// Supplies the candidate types of a container.
pub trait DiscoverySource: Send + Sync {
    /// Returns the descriptors found under `root`.
    ///
    /// The result is treated as an unordered set; duplicates are ignored.
    fn scan(&self, root: &str) -> Result<Vec<Arc<TypeDescriptor>>>;
}

impl<F> DiscoverySource for F
where
    F: Fn(&str) -> Vec<Arc<TypeDescriptor>> + Send + Sync,
{
    fn scan(&self, root: &str) -> Result<Vec<Arc<TypeDescriptor>>> {
        Ok(self(root))
    }
}

/// In-memory discovery source holding explicitly listed components.
///
/// # Example
/// ```
/// use sprig::{ComponentCatalog, DiscoverySource, Tag, TypeDescriptor};
///
/// #[derive(Default)]
/// struct Clock;
///
/// let catalog = ComponentCatalog::new().register(
///     TypeDescriptor::builder::<Clock>()
///         .tag(Tag::Manageable)
///         .default_constructor()
///         .build(),
/// );
///
/// assert_eq!(catalog.scan("").unwrap().len(), 1);
/// assert!(catalog.scan("elsewhere").unwrap().is_empty());
/// ```
#[derive(Clone, Default)]
pub struct ComponentCatalog {
    descriptors: Vec<Arc<TypeDescriptor>>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, descriptor: impl Into<Arc<TypeDescriptor>>) -> Self {
        self.descriptors.push(descriptor.into());
        self
    }

    /// Adds the descriptor of a [`Component`] type
    pub fn with<T: Component>(self) -> Self {
        self.register(T::descriptor())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl DiscoverySource for ComponentCatalog {
    /// Fails with [`ContainerError::Discovery`] if `root` is neither empty nor a module path.
    fn scan(&self, root: &str) -> Result<Vec<Arc<TypeDescriptor>>> {
        if !root.is_empty() && !is_module_path(root) {
            return Err(ContainerError::Discovery {
                root: root.to_string(),
                message: "root is not a module path".to_string(),
            });
        }

        let mut seen = HashSet::new();
        let found: Vec<_> = self
            .descriptors
            .iter()
            .filter(|d| d.tags().is_manageable() || d.tags().is_configuration())
            .filter(|d| d.key().is_under(root))
            .filter(|d| seen.insert(d.key()))
            .cloned()
            .collect();

        tracing::debug!("Discovered {} components under '{}'", found.len(), root);
        Ok(found)
    }
}

/// `crate::module::sub`, each segment an identifier
fn is_module_path(root: &str) -> bool {
    root.split("::").all(|segment| {
        let mut chars = segment.chars();
        chars
            .next()
            .is_some_and(|first| first.is_alphabetic() || first == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Tag, TypeKey};

    struct Clock;
    struct Untagged;

    fn clock() -> TypeDescriptor {
        TypeDescriptor::builder::<Clock>().tag(Tag::Manageable).build()
    }

    #[test]
    fn test_catalog_filters_and_dedups() {
        let catalog = ComponentCatalog::new()
            .register(clock())
            .register(clock())
            .register(TypeDescriptor::plain::<Untagged>());
        assert_eq!(catalog.len(), 3);

        let found = catalog.scan("").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key(), TypeKey::of::<Clock>());
    }

    #[test]
    fn test_catalog_scans_by_module_path() {
        let catalog = ComponentCatalog::new().register(clock());

        assert_eq!(catalog.scan(module_path!()).unwrap().len(), 1);
        assert_eq!(catalog.scan("sprig").unwrap().len(), 1);
        assert!(catalog.scan("sprig::di").unwrap().is_empty());
    }

    #[test]
    fn test_catalog_rejects_malformed_roots() {
        let catalog = ComponentCatalog::new().register(clock());

        for root in ["sprig::", "::sprig", "sprig::::di", "my app", "sprig.di", "9lives"] {
            match catalog.scan(root) {
                Err(ContainerError::Discovery { root: reported, .. }) => {
                    assert_eq!(reported, root)
                }
                Err(other) => panic!("unexpected error for {root:?}: {other}"),
                Ok(_) => panic!("expected a discovery failure for {root:?}"),
            }
        }
        assert!(catalog.scan("r#sprig").is_err());
        assert_eq!(catalog.scan("sprig::discovery").unwrap().len(), 1);
    }

    #[test]
    fn test_closure_is_a_source() {
        let source = |root: &str| {
            if root == "app" {
                vec![Arc::new(clock())]
            } else {
                Vec::new()
            }
        };

        assert_eq!(source.scan("app").unwrap().len(), 1);
        assert!(source.scan("other").unwrap().is_empty());
    }
}
