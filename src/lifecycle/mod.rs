//! Lifecycle hooks of managed beans
//!
//! ```text
//! 1. Construction (constructor or factory method)
//!    ↓
//! 2. Field injection
//!    ↓
//! 3. PostInitialize hooks        ← declaration order, on the unshared instance
//!    ↓
//! 4. Sealed and, for SHARED beans, cached
//!    ↓
//! [Running...]
//!    ↓
//! 5. PreDestroy hooks            ← reverse creation order, on container shutdown
//! ```
//!
//! A failing post-initialize hook aborts the resolution and the instance is discarded.
//! A failing pre-destroy hook is logged and the remaining hooks still run.

mod manager;

pub use manager::{run_post_initialize, LifecycleManager, ShutdownSummary};
