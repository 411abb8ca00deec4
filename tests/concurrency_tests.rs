//! Shared beans under concurrent first access

use sprig::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

#[derive(Component)]
#[component(constructor = "connect")]
pub struct SlowConnection {
    id: usize,
}

impl SlowConnection {
    fn connect() -> Self {
        // Widen the window in which racing callers could both construct
        std::thread::sleep(Duration::from_millis(20));
        Self {
            id: CONSTRUCTED.fetch_add(1, Ordering::SeqCst),
        }
    }
}

#[derive(Default, Component)]
#[component(scope = "per_request")]
pub struct Handler {
    #[inject]
    connection: Option<Arc<SlowConnection>>,
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_bean_is_created_once_under_contention() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let catalog = ComponentCatalog::new()
        .with::<SlowConnection>()
        .with::<Handler>();
    let container = Arc::new(Container::build(&catalog, "").unwrap());

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let container = Arc::clone(&container);
            tokio::task::spawn_blocking(move || container.get_bean::<Handler>())
        })
        .collect();

    let mut handlers = Vec::new();
    for task in tasks {
        handlers.push(task.await.unwrap().unwrap());
    }

    assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 1);
    let first = handlers[0].connection.as_ref().unwrap();
    assert_eq!(first.id, 0);
    for handler in &handlers {
        assert!(Arc::ptr_eq(first, handler.connection.as_ref().unwrap()));
    }
}
