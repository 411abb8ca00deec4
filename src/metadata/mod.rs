//! Declarative metadata consumed by the container
//!
//! Types are described by explicit, statically built records instead of runtime
//! introspection. A [`TypeDescriptor`] carries the tags attached to a type and to each of
//! its members, together with the typed closures the container needs to construct the
//! type, assign its fields and call its hooks.

mod descriptor;
mod tags;

pub use descriptor::{
    ConstructorDescriptor, DescriptorBuilder, FieldDescriptor, MethodBody, MethodDescriptor,
    Producer, Provision, TypeDescriptor,
};
pub use tags::{Scope, Tag, TagSet};

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A bare, not yet shared instance.
///
/// Instances stay unshared while fields are injected and post-initialize hooks run, and
/// are sealed into a [`BeanRef`] only once every step succeeded.
pub type Instance = Box<Erased>;

/// Any `'static` value that can cross threads.
pub type Erased = dyn Any + Send + Sync;

/// Stable identity of a type, usable for concrete types and `dyn Trait` alike.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, as reported by `std::any::type_name`
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if the type's path is `root` or lives under `root::`
    pub fn is_under(&self, root: &str) -> bool {
        if root.is_empty() {
            return true;
        }
        // Generic arguments are not part of the module path.
        let path = self.name.split('<').next().unwrap_or(self.name);
        path == root
            || path
                .strip_prefix(root)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Type-erased shared handle to a bean.
///
/// A `BeanRef` viewed as key `K` always holds an `Arc<K>`, whether `K` is the bean's
/// concrete type or an interface type it provides. [`BeanRef::downcast`] therefore works
/// the same way for `T` and for `dyn Trait`.
#[derive(Clone)]
pub struct BeanRef {
    key: TypeKey,
    handle: Arc<dyn Any + Send + Sync>,
}

impl BeanRef {
    pub fn new<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            handle: Arc::new(instance),
        }
    }

    /// The type this handle is viewed as
    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.handle.downcast_ref::<Arc<T>>().cloned()
    }
}

impl fmt::Debug for BeanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanRef").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[test]
    fn test_type_key_identity() {
        assert_eq!(TypeKey::of::<English>(), TypeKey::of::<English>());
        assert_ne!(TypeKey::of::<English>(), TypeKey::of::<dyn Greeter>());
        assert!(TypeKey::of::<English>().name().ends_with("English"));
    }

    #[test]
    fn test_type_key_is_under() {
        let key = TypeKey::of::<English>();
        let module = key.name().rsplit_once("::").map(|(m, _)| m).unwrap();

        assert!(key.is_under(""));
        assert!(key.is_under(module));
        assert!(key.is_under(key.name()));
        assert!(!key.is_under("other_crate"));
        // Prefix of a segment is not a parent module
        assert!(!key.is_under(&module[..module.len() - 1]));
    }

    #[test]
    fn test_bean_ref_downcast_concrete_and_trait() {
        let concrete = Arc::new(English);
        let as_concrete = BeanRef::new(Arc::clone(&concrete));
        let as_trait = BeanRef::new(Arc::clone(&concrete) as Arc<dyn Greeter>);

        let resolved = as_concrete.downcast::<English>().unwrap();
        assert!(Arc::ptr_eq(&resolved, &concrete));
        assert!(as_concrete.downcast::<dyn Greeter>().is_none());

        let greeter = as_trait.downcast::<dyn Greeter>().unwrap();
        assert_eq!(greeter.greet(), "hello");
        assert_eq!(as_trait.key(), TypeKey::of::<dyn Greeter>());
    }
}
