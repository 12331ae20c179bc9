//! Cancellation contract (spec §5).
//!
//! A trait object rather than a hard dependency on `tokio_util`'s
//! `CancellationToken`, so a host on a different async runtime can still
//! implement it; `tokio` itself is already a dependency for the `async fn`
//! entry points, but the cancellation *signal* is kept runtime-agnostic.

pub trait CancellationToken: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// Never cancels; the default when a host passes no token.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// An `AtomicBool`-backed token a host can flip from another task.
#[derive(Debug, Default, Clone)]
pub struct AtomicCancellationToken(std::sync::Arc<std::sync::atomic::AtomicBool>);

impl AtomicCancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

impl CancellationToken for AtomicCancellationToken {
    fn is_cancelled(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}
