use proc_macro::TokenStream;

mod component;

/// Derive macro describing a struct to the Sprig container
///
/// # Example
/// ```ignore
/// use sprig::prelude::*;
///
/// #[derive(Default, Component)]
/// #[component(scope = "per_request", post_initialize = "connect")]
/// pub struct UserService {
///     #[inject]
///     repository: Option<Arc<dyn UserRepository>>,
///     #[inject(optional)]
///     cache: Option<Arc<Cache>>,
/// }
/// ```
///
/// Struct options, inside `#[component(...)]`:
/// - `configuration`: the type is a configuration unit instead of a plain component
/// - `scope = "shared" | "per_request"`
/// - `lazy`, `primary`
/// - `qualifier = "name"`
/// - `constructor = "fn_name"`: an associated `fn() -> Self` used instead of `Default`
/// - `provides(dyn Trait, ...)`: interface types the bean can be resolved as
/// - `post_initialize = "method"`, `pre_destroy = "method"`: repeatable hooks
/// - `customize = "path::to::fn"`: receives and returns the descriptor builder
///
/// Injected fields must be declared as `Option<Arc<T>>`.
#[proc_macro_derive(Component, attributes(component, inject))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    component::derive_component(input)
}
