//! Runtime abstraction layer for async operations
//!
//! Reverse lookups and debounced searches are spawned through this module so
//! the widget itself never names a particular executor. Tokio is the default
//! spawner; hosts with their own executor install one with [`init_runtime`].

use crate::prelude::{Future, Pin};
use std::time::Duration;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(
        &self,
        future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
    ) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Convenience function for spawning with type safety
pub fn spawn<F>(future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    log::trace!("spawning async task");
    runtime().spawn_boxed(Box::pin(future))
}

/// Wait for `duration` without blocking the executor
pub async fn sleep(duration: Duration) {
    #[cfg(feature = "tokio-runtime")]
    {
        ::tokio::time::sleep(duration).await;
    }

    #[cfg(not(feature = "tokio-runtime"))]
    {
        let (tx, rx) = futures::channel::oneshot::channel::<()>();
        std::thread::spawn(move || {
            std::thread::sleep(duration);
            let _ = tx.send(());
        });
        let _ = rx.await;
    }
}

/// Default spawner implementations
pub mod spawners {
    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::super::*;
        use ::tokio::task::JoinHandle;

        /// Tokio-based async spawner
        pub struct TokioSpawner;

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(
                &self,
                future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
            ) -> Box<dyn AsyncHandle> {
                let handle = ::tokio::spawn(future);
                Box::new(TokioHandle(handle))
            }
        }

        struct TokioHandle(JoinHandle<()>);

        impl AsyncHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }

            fn cancel(&self) {
                self.0.abort();
            }
        }
    }
}

/// Global runtime instance
static RUNTIME: std::sync::OnceLock<Box<dyn AsyncSpawner>> = std::sync::OnceLock::new();

/// Initialize the runtime with a specific spawner
pub fn init_runtime(spawner: Box<dyn AsyncSpawner>) {
    if RUNTIME.set(spawner).is_err() {
        log::warn!("async runtime already initialized, keeping the existing spawner");
    }
}

/// Get the global runtime spawner
pub fn runtime() -> &'static dyn AsyncSpawner {
    RUNTIME
        .get_or_init(|| {
            #[cfg(feature = "tokio-runtime")]
            {
                Box::new(spawners::tokio_impl::TokioSpawner)
            }

            #[cfg(not(feature = "tokio-runtime"))]
            {
                panic!("No async runtime available. Enable 'tokio-runtime' or call init_runtime().");
            }
        })
        .as_ref()
}
