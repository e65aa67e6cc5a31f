//! Global admission gate serializing GPU-bound design jobs.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

/// Process-wide mutual exclusion for design jobs.
///
/// Both design families contend for the same GPU, so one gate is shared
/// between their engines. Cloning the handle shares the underlying lock;
/// waiters are woken in FIFO order by the tokio mutex.
#[derive(Clone, Default)]
pub struct DesignGate {
    inner: Arc<Mutex<()>>,
}

impl DesignGate {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(())),
        }
    }

    /// Wait until no other job holds the gate, then hold it.
    /// The gate is released when the returned guard is dropped.
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().await
    }

    /// Non-blocking probe: true when no job currently holds the gate.
    pub fn is_free(&self) -> bool {
        self.inner.try_lock().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gate_is_free_after_guard_drops() {
        let gate = DesignGate::new();
        assert!(gate.is_free());
        {
            let _guard = gate.acquire().await;
            assert!(!gate.is_free());
        }
        assert!(gate.is_free());
    }

    #[tokio::test]
    async fn test_cloned_handles_share_the_lock() {
        let gate = DesignGate::new();
        let other = gate.clone();
        let _guard = gate.acquire().await;
        assert!(!other.is_free());
    }
}
