//! Deferred reclamation.
//!
//! Unloading a context does not free it. The context hands its loaded units
//! to the reclaimer, and they are released in two steps: a sweep
//! ([`Reclaimer::collect`]) moves everything pending onto the finalization
//! queue, and [`Reclaimer::run_pending_finalizers`] drops it. Whatever the
//! units were the last owner of is freed at that point.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace};

struct Pending {
    label: String,
    payload: Box<dyn Any + Send>,
}

/// The deferred-reclamation queue.
#[derive(Default)]
pub struct Reclaimer {
    pending: Mutex<Vec<Pending>>,
    finalizable: Mutex<Vec<Pending>>,
    sweeps: AtomicUsize,
    finalized: AtomicUsize,
}

impl Reclaimer {
    /// Create an empty reclaimer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `payload` for release on a later sweep.
    pub fn defer<T: Send + 'static>(&self, label: impl Into<String>, payload: T) {
        let label = label.into();
        debug!("Deferring reclamation of {}", label);
        self.pending.lock().push(Pending {
            label,
            payload: Box::new(payload),
        });
    }

    /// Sweep: move every pending payload to the finalization queue.
    ///
    /// Returns the number of payloads moved.
    pub fn collect(&self) -> usize {
        let swept = std::mem::take(&mut *self.pending.lock());
        let count = swept.len();
        self.finalizable.lock().extend(swept);
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        trace!("Sweep moved {} payloads to finalization", count);
        count
    }

    /// Drop every payload found by earlier sweeps.
    ///
    /// Returns the number of payloads released.
    pub fn run_pending_finalizers(&self) -> usize {
        // Take the queue out first; dropping a payload may free a context
        // whose own drop logic must not run under our lock.
        let ready = std::mem::take(&mut *self.finalizable.lock());
        let count = ready.len();
        for pending in ready {
            trace!("Finalizing {}", pending.label);
            drop(pending.payload);
        }
        self.finalized.fetch_add(count, Ordering::Relaxed);
        count
    }

    /// Payloads waiting for a sweep or for finalization.
    pub fn outstanding(&self) -> usize {
        self.pending.lock().len() + self.finalizable.lock().len()
    }

    /// Number of sweeps performed so far.
    pub fn sweeps(&self) -> usize {
        self.sweeps.load(Ordering::Relaxed)
    }

    /// Number of payloads released so far.
    pub fn finalized(&self) -> usize {
        self.finalized.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for Reclaimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reclaimer")
            .field("outstanding", &self.outstanding())
            .field("sweeps", &self.sweeps())
            .field("finalized", &self.finalized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_release_needs_sweep_then_finalize() {
        let reclaimer = Reclaimer::new();
        let tracked = Arc::new(());
        let weak = Arc::downgrade(&tracked);

        reclaimer.defer("tracked", tracked);
        assert_eq!(reclaimer.outstanding(), 1);

        // Finalizers alone do nothing before a sweep.
        assert_eq!(reclaimer.run_pending_finalizers(), 0);
        assert!(weak.upgrade().is_some());

        assert_eq!(reclaimer.collect(), 1);
        assert!(weak.upgrade().is_some());

        assert_eq!(reclaimer.run_pending_finalizers(), 1);
        assert!(weak.upgrade().is_none());
        assert_eq!(reclaimer.outstanding(), 0);
        assert_eq!(reclaimer.sweeps(), 1);
        assert_eq!(reclaimer.finalized(), 1);
    }
}
