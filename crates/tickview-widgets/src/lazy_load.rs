//! Background loading whose result is dropped once its consumer goes away.
//!
//! The consumer hands a [`CancellationToken`] to [`LazyLoad`] and cancels it
//! when it no longer wants the result. Loading runs to the end either way;
//! only [`Loaded::apply`] checks the token.

use std::path::Path;
use std::thread::{self, JoinHandle};
use tickview_core::CancellationToken;
use tracing::{debug, trace};

/// Runs loading closures on behalf of a cancellable consumer.
#[derive(Debug, Clone)]
pub struct LazyLoad {
    token: CancellationToken,
}

impl LazyLoad {
    /// Loader whose results are dropped once `token` is cancelled.
    #[must_use]
    pub const fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Load on the calling thread.
    pub fn run<T, F>(&self, load: F) -> Loaded<T>
    where
        F: FnOnce() -> Option<T>,
    {
        Loaded {
            value: load(),
            token: self.token.clone(),
        }
    }

    /// Load on a new thread.
    pub fn spawn<T, F>(&self, load: F) -> JoinHandle<Loaded<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Option<T> + Send + 'static,
    {
        let token = self.token.clone();
        thread::spawn(move || Loaded {
            value: load(),
            token,
        })
    }

    /// Read a whole file on a new thread. A missing or unreadable file
    /// loads nothing.
    pub fn spawn_read(&self, path: impl AsRef<Path>) -> JoinHandle<Loaded<Vec<u8>>> {
        let path = path.as_ref().to_path_buf();
        self.spawn(move || match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                debug!(path = %path.display(), %err, "lazy read found nothing");
                None
            }
        })
    }
}

/// Outcome of a load, waiting to be applied.
#[derive(Debug)]
pub struct Loaded<T> {
    value: Option<T>,
    token: CancellationToken,
}

impl<T> Loaded<T> {
    /// Whether the load produced anything.
    pub const fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Hand the result to `apply` if there is one and the consumer is still
    /// interested. Returns whether `apply` ran.
    pub fn apply<F: FnOnce(T)>(self, apply: F) -> bool {
        if self.token.is_cancelled() {
            trace!("lazy load cancelled, result dropped");
            return false;
        }
        match self.value {
            Some(value) => {
                apply(value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_delivers_value() {
        let loader = LazyLoad::new(CancellationToken::new());
        let mut got = None;
        assert!(loader.run(|| Some(7)).apply(|v| got = Some(v)));
        assert_eq!(got, Some(7));
    }

    #[test]
    fn test_apply_skips_empty_result() {
        let loader = LazyLoad::new(CancellationToken::new());
        let loaded = loader.run(|| None::<u8>);
        assert!(!loaded.has_value());
        assert!(!loaded.apply(|_| panic!("applied nothing")));
    }

    #[test]
    fn test_cancel_before_apply_drops_result() {
        let token = CancellationToken::new();
        let loader = LazyLoad::new(token.clone());
        let loaded = loader.run(|| Some("thumb"));
        token.cancel();
        assert!(!loaded.apply(|_| panic!("consumer is gone")));
    }

    #[test]
    fn test_spawned_load_cancelled_during_load() {
        let token = CancellationToken::new();
        let loader = LazyLoad::new(token.clone());
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let handle = loader.spawn(move || {
            rx.recv().ok();
            Some(vec![1u8, 2, 3])
        });
        token.cancel();
        tx.send(()).unwrap();
        let loaded = handle.join().unwrap();
        assert!(loaded.has_value());
        assert!(!loaded.apply(|_| panic!("consumer is gone")));
    }

    #[test]
    fn test_spawn_read_missing_file() {
        let loader = LazyLoad::new(CancellationToken::new());
        let loaded = loader
            .spawn_read("/nonexistent/tickview/thumb.png")
            .join()
            .unwrap();
        assert!(!loaded.has_value());
    }

    #[test]
    fn test_spawn_read_existing_file() {
        let path = std::env::temp_dir().join(format!("tickview-lazy-{}.bin", std::process::id()));
        std::fs::write(&path, b"pixels").unwrap();
        let loader = LazyLoad::new(CancellationToken::new());
        let mut bytes = Vec::new();
        let applied = loader
            .spawn_read(&path)
            .join()
            .unwrap()
            .apply(|b| bytes = b);
        std::fs::remove_file(&path).ok();
        assert!(applied);
        assert_eq!(bytes, b"pixels");
    }
}
