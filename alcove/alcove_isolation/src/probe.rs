//! Liveness probing.
//!
//! A [`LivenessHandle`] observes a context without owning it. The
//! [`LivenessProbe`] drives the reclaimer and polls the handle until the
//! context is gone or the retry budget runs out.

use std::sync::{Arc, Weak};

use alcove_core::error::{ProbeError, Result};
use tracing::{debug, warn};

use crate::context::IsolatedContext;
use crate::loaded::LoadContext;
use crate::reclaimer::Reclaimer;

/// Retry ceiling used when none is configured.
pub const DEFAULT_MAX_RETRIES: usize = 10;

/// A non-owning observation of an isolated context.
#[derive(Debug, Clone)]
pub struct LivenessHandle {
    context: Weak<IsolatedContext>,
    name: String,
}

impl LivenessHandle {
    /// Start observing `context`.
    pub fn observe(context: &Arc<IsolatedContext>) -> Self {
        Self {
            context: Arc::downgrade(context),
            name: context.name().to_string(),
        }
    }

    /// Name of the observed context.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the context is still reachable.
    pub fn is_alive(&self) -> bool {
        self.context.strong_count() > 0
    }
}

/// Sweeps and checks a handle until the context is gone.
#[derive(Debug, Clone)]
pub struct LivenessProbe {
    reclaimer: Arc<Reclaimer>,
    max_retries: usize,
}

impl LivenessProbe {
    /// Create a probe driving `reclaimer` at most `max_retries` times.
    pub fn new(reclaimer: Arc<Reclaimer>, max_retries: usize) -> Self {
        Self {
            reclaimer,
            max_retries,
        }
    }

    /// The retry ceiling.
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Returns `true` once the context is confirmed collected.
    pub fn probe(&self, handle: &LivenessHandle) -> bool {
        let mut retries = 0;
        while handle.is_alive() && retries < self.max_retries {
            self.reclaimer.collect();
            self.reclaimer.run_pending_finalizers();
            retries += 1;
            std::thread::yield_now();
        }

        let collected = !handle.is_alive();
        if collected {
            debug!(
                "Context {} collected after {} sweeps",
                handle.name(),
                retries
            );
        } else {
            warn!(
                "Context {} still alive after {} sweeps",
                handle.name(),
                retries
            );
        }
        collected
    }

    /// Like [`LivenessProbe::probe`], but a surviving context is an error.
    pub fn verify(&self, handle: &LivenessHandle) -> Result<()> {
        if self.probe(handle) {
            Ok(())
        } else {
            Err(ProbeError::Timeout {
                context: handle.name().to_string(),
                retries: self.max_retries,
            }
            .into())
        }
    }
}
