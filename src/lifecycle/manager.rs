use crate::error::{ContainerError, Result};
use crate::metadata::{BeanRef, Erased, MethodBody, Tag, TypeDescriptor};
use serde::Serialize;
use std::sync::Arc;

/// Runs the post-initialize hooks of `descriptor` against a finished, unshared instance.
///
/// Hooks run in declaration order; the first failure aborts.
pub fn run_post_initialize(instance: &mut Erased, descriptor: &TypeDescriptor) -> Result<()> {
    for method in descriptor.methods_tagged(&Tag::PostInitialize) {
        let MethodBody::Initializer(hook) = method.body() else {
            continue;
        };
        tracing::debug!(
            "Running post-initialize {}::{}",
            descriptor.key(),
            method.name()
        );
        hook(&mut *instance).map_err(|e| {
            tracing::error!(
                "Post-initialize {} failed for {}: {}",
                method.name(),
                descriptor.key(),
                e
            );
            ContainerError::PostInit {
                type_name: descriptor.key().name().to_string(),
                method: method.name().to_string(),
                source: e.into(),
            }
        })?;
    }
    Ok(())
}

/// A shared bean registered for teardown
struct DestroyHook {
    bean: BeanRef,
    descriptor: Arc<TypeDescriptor>,
}

/// Outcome of a container shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownSummary {
    /// Shared beans released
    pub beans: usize,
    /// Pre-destroy hooks that ran
    pub hooks_run: usize,
    /// Pre-destroy hooks that failed
    pub hooks_failed: usize,
}

/// Tracks shared beans in creation order and tears them down in reverse.
///
/// # Example
///
/// ```rust,ignore
/// let mut manager = LifecycleManager::new();
/// manager.register(bean, descriptor);
/// // ... container runs ...
/// let summary = manager.call_pre_destroy();
/// ```
#[derive(Default)]
pub struct LifecycleManager {
    destroy_hooks: Vec<DestroyHook>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly cached shared bean
    pub fn register(&mut self, bean: BeanRef, descriptor: Arc<TypeDescriptor>) {
        self.destroy_hooks.push(DestroyHook { bean, descriptor });
    }

    /// Executes all PreDestroy hooks
    ///
    /// Beans are destroyed in **reverse creation order**, so a bean goes away before the
    /// beans it was injected with. Within one bean, hooks run in declaration order.
    pub fn call_pre_destroy(&mut self) -> ShutdownSummary {
        tracing::info!("Calling PreDestroy hooks...");

        let mut summary = ShutdownSummary::default();
        for entry in self.destroy_hooks.drain(..).rev() {
            summary.beans += 1;
            let key = entry.descriptor.key();
            for method in entry.descriptor.methods_tagged(&Tag::PreDestroy) {
                let MethodBody::Finalizer(hook) = method.body() else {
                    continue;
                };
                tracing::debug!("Destroying: {}::{}", key, method.name());
                summary.hooks_run += 1;
                if let Err(e) = hook(&entry.bean) {
                    // Log error but continue with other hooks
                    tracing::error!("PreDestroy {} failed for {}: {}", method.name(), key, e);
                    summary.hooks_failed += 1;
                }
            }
        }

        tracing::info!(
            "PreDestroy complete ({} beans, {} hooks executed, {} failed)",
            summary.beans,
            summary.hooks_run,
            summary.hooks_failed
        );
        summary
    }

    pub fn len(&self) -> usize {
        self.destroy_hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destroy_hooks.is_empty()
    }
}
