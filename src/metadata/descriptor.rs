use super::{BeanRef, Erased, Instance, Tag, TagSet, TypeKey};
use anyhow::anyhow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type ConstructFn = Arc<dyn Fn() -> anyhow::Result<Instance> + Send + Sync>;
type AssignFn = Arc<dyn Fn(&mut Erased, &BeanRef) -> bool + Send + Sync>;
type InitFn = Arc<dyn Fn(&mut Erased) -> anyhow::Result<()> + Send + Sync>;
type FinalizeFn = Arc<dyn Fn(&BeanRef) -> anyhow::Result<()> + Send + Sync>;
type ProduceFn = Arc<dyn Fn(&BeanRef) -> anyhow::Result<Instance> + Send + Sync>;
type CastFn = Arc<dyn Fn(&BeanRef) -> Option<BeanRef> + Send + Sync>;
type SealFn = fn(Instance) -> Option<BeanRef>;

fn seal<T: Send + Sync + 'static>(instance: Instance) -> Option<BeanRef> {
    instance
        .downcast::<T>()
        .ok()
        .map(|boxed| BeanRef::new(Arc::<T>::from(boxed)))
}

/// A declared constructor of a type.
#[derive(Clone)]
pub struct ConstructorDescriptor {
    tags: TagSet,
    parameters: Vec<TypeKey>,
    invoke: ConstructFn,
}

impl ConstructorDescriptor {
    pub fn new<T, F>(tags: impl IntoIterator<Item = Tag>, construct: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            tags: tags.into_iter().collect(),
            parameters: Vec::new(),
            invoke: Arc::new(move || construct().map(|value| Box::new(value) as Instance)),
        }
    }

    /// Declares the parameter types of a dependency-bearing constructor
    pub fn with_parameters(mut self, parameters: Vec<TypeKey>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn parameters(&self) -> &[TypeKey] {
        &self.parameters
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_injectable(&self) -> bool {
        self.tags.has(&Tag::Inject)
    }

    pub fn invoke(&self) -> anyhow::Result<Instance> {
        (self.invoke)()
    }
}

/// A declared field, with a setter able to assign a resolved bean into it.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    declared_type: TypeKey,
    tags: TagSet,
    assign: AssignFn,
}

impl FieldDescriptor {
    pub fn new<O, D, F>(name: &'static str, tags: impl IntoIterator<Item = Tag>, setter: F) -> Self
    where
        O: Send + Sync + 'static,
        D: ?Sized + Send + Sync + 'static,
        F: Fn(&mut O, Arc<D>) + Send + Sync + 'static,
    {
        let assign: AssignFn = Arc::new(move |target: &mut Erased, bean: &BeanRef| {
            match (target.downcast_mut::<O>(), bean.downcast::<D>()) {
                (Some(owner), Some(value)) => {
                    setter(owner, value);
                    true
                }
                _ => false,
            }
        });
        Self {
            name,
            declared_type: TypeKey::of::<D>(),
            tags: tags.into_iter().collect(),
            assign,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared_type(&self) -> TypeKey {
        self.declared_type
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn is_injected(&self) -> bool {
        self.tags.has(&Tag::Inject)
    }

    pub fn is_optional(&self) -> bool {
        self.tags.has(&Tag::Optional)
    }

    /// Assigns `bean` into the field of `target`.
    ///
    /// Returns false if either side is not of the declared type.
    pub fn assign(&self, target: &mut Erased, bean: &BeanRef) -> bool {
        (self.assign)(target, bean)
    }
}

/// A zero-argument operation of a configuration unit producing another bean.
#[derive(Clone)]
pub struct Producer {
    returns: TypeKey,
    produced: Arc<TypeDescriptor>,
    invoke: ProduceFn,
}

impl Producer {
    /// Declared return type of the operation
    pub fn returns(&self) -> TypeKey {
        self.returns
    }

    /// Descriptor of the produced type, used for its fields and hooks
    pub fn produced(&self) -> &Arc<TypeDescriptor> {
        &self.produced
    }

    pub fn invoke(&self, owner: &BeanRef) -> anyhow::Result<Instance> {
        (self.invoke)(owner)
    }
}

#[derive(Clone)]
pub enum MethodBody {
    /// Runs against the unshared instance, before it is sealed
    Initializer(InitFn),
    /// Runs against the sealed, shared instance
    Finalizer(FinalizeFn),
    Producer(Producer),
}

/// A declared method of a type.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: &'static str,
    tags: TagSet,
    body: MethodBody,
}

impl MethodDescriptor {
    pub fn initializer<T, F>(name: &'static str, tags: impl IntoIterator<Item = Tag>, hook: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let body = MethodBody::Initializer(Arc::new(move |target: &mut Erased| {
            let receiver = target
                .downcast_mut::<T>()
                .ok_or_else(|| anyhow!("receiver is not a {}", std::any::type_name::<T>()))?;
            hook(receiver)
        }));
        Self {
            name,
            tags: tags.into_iter().collect(),
            body,
        }
    }

    pub fn finalizer<T, F>(name: &'static str, tags: impl IntoIterator<Item = Tag>, hook: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let body = MethodBody::Finalizer(Arc::new(move |bean: &BeanRef| {
            let receiver = bean
                .downcast::<T>()
                .ok_or_else(|| anyhow!("receiver is not a {}", std::any::type_name::<T>()))?;
            hook(&*receiver)
        }));
        Self {
            name,
            tags: tags.into_iter().collect(),
            body,
        }
    }

    pub fn producer<O, P, F>(
        name: &'static str,
        tags: impl IntoIterator<Item = Tag>,
        produced: TypeDescriptor,
        produce: F,
    ) -> Self
    where
        O: Send + Sync + 'static,
        P: Send + Sync + 'static,
        F: Fn(&O) -> anyhow::Result<P> + Send + Sync + 'static,
    {
        let invoke: ProduceFn = Arc::new(move |owner: &BeanRef| {
            let owner = owner
                .downcast::<O>()
                .ok_or_else(|| anyhow!("factory owner is not a {}", std::any::type_name::<O>()))?;
            produce(&*owner).map(|value| Box::new(value) as Instance)
        });
        Self {
            name,
            tags: tags.into_iter().collect(),
            body: MethodBody::Producer(Producer {
                returns: TypeKey::of::<P>(),
                produced: Arc::new(produced),
                invoke,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn body(&self) -> &MethodBody {
        &self.body
    }

    pub fn producer_body(&self) -> Option<&Producer> {
        match &self.body {
            MethodBody::Producer(producer) => Some(producer),
            _ => None,
        }
    }
}

/// An interface type a bean can be viewed as.
#[derive(Clone)]
pub struct Provision {
    key: TypeKey,
    cast: CastFn,
}

impl Provision {
    pub fn key(&self) -> TypeKey {
        self.key
    }
}

/// Everything the container knows about one type.
#[derive(Clone)]
pub struct TypeDescriptor {
    key: TypeKey,
    tags: TagSet,
    constructors: Vec<ConstructorDescriptor>,
    fields: Vec<FieldDescriptor>,
    methods: Vec<MethodDescriptor>,
    provisions: Vec<Provision>,
    seal: SealFn,
}

impl TypeDescriptor {
    pub fn builder<T: Send + Sync + 'static>() -> DescriptorBuilder<T> {
        DescriptorBuilder {
            descriptor: TypeDescriptor {
                key: TypeKey::of::<T>(),
                tags: TagSet::new(),
                constructors: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                provisions: Vec::new(),
                seal: seal::<T>,
            },
            _marker: PhantomData,
        }
    }

    /// A descriptor with no tags and no members
    pub fn plain<T: Send + Sync + 'static>() -> Self {
        Self::builder::<T>().build()
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Methods carrying `tag`, in declaration order
    pub fn methods_tagged<'a>(&'a self, tag: &'a Tag) -> impl Iterator<Item = &'a MethodDescriptor> {
        self.methods.iter().filter(move |method| method.tags.has(tag))
    }

    pub fn provisions(&self) -> &[Provision] {
        &self.provisions
    }

    /// Returns true if a bean of this type can be handed out as `key`
    pub fn is_assignable_to(&self, key: TypeKey) -> bool {
        self.key == key || self.provisions.iter().any(|p| p.key == key)
    }

    /// Re-views a bean of this type as `key`
    pub fn view(&self, bean: &BeanRef, key: TypeKey) -> Option<BeanRef> {
        if bean.key() == key {
            return Some(bean.clone());
        }
        self.provisions
            .iter()
            .find(|p| p.key == key)
            .and_then(|p| (p.cast)(bean))
    }

    /// Turns a finished instance into a shared handle
    pub fn seal(&self, instance: Instance) -> Option<BeanRef> {
        (self.seal)(instance)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("key", &self.key)
            .field("tags", &self.tags)
            .field("constructors", &self.constructors.len())
            .field(
                "fields",
                &self.fields.iter().map(|f| f.name).collect::<Vec<_>>(),
            )
            .field(
                "methods",
                &self.methods.iter().map(|m| m.name).collect::<Vec<_>>(),
            )
            .field(
                "provides",
                &self.provisions.iter().map(|p| p.key).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Typed builder for a [`TypeDescriptor`]
///
/// # Example
/// ```
/// use sprig::{Scope, Tag, TypeDescriptor};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Repository;
///
/// #[derive(Default)]
/// struct Service {
///     repository: Option<Arc<Repository>>,
/// }
///
/// let descriptor = TypeDescriptor::builder::<Service>()
///     .tag(Tag::Manageable)
///     .tag(Tag::Scope(Scope::PerRequest))
///     .default_constructor()
///     .inject::<Repository, _>("repository", |s, r| s.repository = Some(r))
///     .build();
///
/// assert_eq!(descriptor.fields().len(), 1);
/// ```
pub struct DescriptorBuilder<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> DescriptorBuilder<T> {
    pub fn tag(mut self, tag: Tag) -> Self {
        self.descriptor.tags.insert(tag);
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.descriptor.tags.extend(tags);
        self
    }

    pub fn constructor<F>(mut self, tags: impl IntoIterator<Item = Tag>, construct: F) -> Self
    where
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.descriptor
            .constructors
            .push(ConstructorDescriptor::new(tags, construct));
        self
    }

    /// Declares `Default::default` as the untagged zero-argument constructor
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(std::iter::empty(), || Ok(T::default()))
    }

    pub fn constructor_descriptor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.descriptor.constructors.push(constructor);
        self
    }

    pub fn field<D, F>(mut self, name: &'static str, tags: impl IntoIterator<Item = Tag>, setter: F) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    {
        self.descriptor
            .fields
            .push(FieldDescriptor::new::<T, D, F>(name, tags, setter));
        self
    }

    /// Declares a field tagged for injection
    pub fn inject<D, F>(self, name: &'static str, setter: F) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    {
        self.field::<D, F>(name, [Tag::Inject], setter)
    }

    /// Declares a best-effort injected field
    pub fn inject_optional<D, F>(self, name: &'static str, setter: F) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    {
        self.field::<D, F>(name, [Tag::Inject, Tag::Optional], setter)
    }

    pub fn post_initialize<F>(mut self, name: &'static str, hook: F) -> Self
    where
        F: Fn(&mut T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.descriptor.methods.push(MethodDescriptor::initializer::<T, F>(
            name,
            [Tag::PostInitialize],
            hook,
        ));
        self
    }

    pub fn pre_destroy<F>(mut self, name: &'static str, hook: F) -> Self
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.descriptor.methods.push(MethodDescriptor::finalizer::<T, F>(
            name,
            [Tag::PreDestroy],
            hook,
        ));
        self
    }

    /// Declares a factory operation producing a plain `P`
    pub fn produces<P, F>(self, name: &'static str, tags: impl IntoIterator<Item = Tag>, produce: F) -> Self
    where
        P: Send + Sync + 'static,
        F: Fn(&T) -> anyhow::Result<P> + Send + Sync + 'static,
    {
        self.produces_with::<P, F>(name, tags, TypeDescriptor::plain::<P>(), produce)
    }

    /// Declares a factory operation whose product has its own fields or hooks
    pub fn produces_with<P, F>(
        mut self,
        name: &'static str,
        tags: impl IntoIterator<Item = Tag>,
        produced: TypeDescriptor,
        produce: F,
    ) -> Self
    where
        P: Send + Sync + 'static,
        F: Fn(&T) -> anyhow::Result<P> + Send + Sync + 'static,
    {
        let tags = std::iter::once(Tag::Produces).chain(tags);
        self.descriptor
            .methods
            .push(MethodDescriptor::producer::<T, P, F>(name, tags, produced, produce));
        self
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.descriptor.methods.push(method);
        self
    }

    /// Declares that beans of this type can be handed out as `U`
    pub fn provides<U, F>(mut self, upcast: F) -> Self
    where
        U: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<U> + Send + Sync + 'static,
    {
        let cast: CastFn = Arc::new(move |bean: &BeanRef| {
            bean.downcast::<T>()
                .map(|concrete| BeanRef::new(upcast(concrete)))
        });
        self.descriptor.provisions.push(Provision {
            key: TypeKey::of::<U>(),
            cast,
        });
        self
    }

    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}
