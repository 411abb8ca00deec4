use crate::metadata::TypeDescriptor;

/// Types that describe themselves to the container
///
/// This trait is typically implemented automatically via the `#[derive(Component)]` macro.
///
/// # Example
/// ```
/// use sprig::prelude::*;
/// use std::sync::Arc;
///
/// trait UserRepository: Send + Sync {}
///
/// #[derive(Default, Component)]
/// #[component(provides(dyn UserRepository))]
/// pub struct MemoryRepository;
///
/// impl UserRepository for MemoryRepository {}
///
/// #[derive(Default, Component)]
/// #[component(scope = "per_request")]
/// pub struct UserService {
///     // Resolved from the container after construction
///     #[inject]
///     repository: Option<Arc<dyn UserRepository>>,
/// }
///
/// let descriptor = UserService::descriptor();
/// assert_eq!(descriptor.fields()[0].name(), "repository");
/// ```
pub trait Component: Sized + Send + Sync + 'static {
    /// Declares the tags, constructors, fields and hooks of the type.
    fn descriptor() -> TypeDescriptor;
}
