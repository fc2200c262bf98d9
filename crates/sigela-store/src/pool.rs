//! Process-wide connection pool, created on first use.
//!
//! Concurrent cold callers all await the same initialization and receive the
//! same pool; a failed initialization leaves the slot empty so the next caller
//! retries.

use std::future::Future;

use tokio::sync::OnceCell;

/// Lazily initialized shared resource.
#[derive(Debug)]
pub struct LazyPool<P> {
    cell: OnceCell<P>,
}

impl<P> Default for LazyPool<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> LazyPool<P> {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Return the pool, running `init` if no caller has succeeded yet.
    ///
    /// Only one `init` runs at a time; callers arriving while it runs wait
    /// for its result.
    pub async fn get_or_try_init<E, F, Fut>(&self, init: F) -> Result<&P, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<P, E>>,
    {
        self.cell.get_or_try_init(init).await
    }

    /// The pool, if it has been initialized.
    pub fn get(&self) -> Option<&P> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_first_use_initializes_once() {
        let slot: Arc<LazyPool<Vec<u8>>> = Arc::new(LazyPool::new());
        let inits = Arc::new(AtomicUsize::new(0));

        let start = |slot: Arc<LazyPool<Vec<u8>>>, inits: Arc<AtomicUsize>| async move {
            let pool = slot
                .get_or_try_init(|| async {
                    inits.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok::<_, std::convert::Infallible>(vec![1, 2, 3])
                })
                .await
                .unwrap();
            pool as *const Vec<u8> as usize
        };

        let (a, b) = tokio::join!(
            tokio::spawn(start(slot.clone(), inits.clone())),
            tokio::spawn(start(slot.clone(), inits.clone())),
        );

        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap(), b.unwrap());
        assert!(slot.is_initialized());
    }

    #[tokio::test]
    async fn failed_initialization_is_retried() {
        let slot: LazyPool<u32> = LazyPool::new();

        let first = slot
            .get_or_try_init(|| async { Err::<u32, _>("unreachable database") })
            .await;
        assert!(first.is_err());
        assert!(slot.get().is_none());

        let second = slot
            .get_or_try_init(|| async { Ok::<_, &str>(5) })
            .await
            .unwrap();
        assert_eq!(*second, 5);
    }
}
