//! The attempt orchestrator.
//!
//! Runs one attempt per strategy. Each attempt gets a fresh isolated
//! context: load the module type, resolve it, invoke it, unload the context
//! and probe whether it was reclaimed. Errors end the attempt, never the run.

use std::sync::Arc;

use alcove_core::error::{Error, Result};
use alcove_core::TypeKey;
use alcove_isolation::{
    HostContext, IsolatedContext, LivenessHandle, LivenessProbe, ModulePackage, Reclaimer,
};
use alcove_module::MODULE_CAPABILITY;
use chrono::Utc;
use tracing::{info, warn};

use super::lifecycle::{AttemptLifecycle, AttemptState};
use super::report::{AttemptFailure, AttemptOutcome, AttemptReport};
use crate::resolver::ResolverStrategy;

/// Runs attempts against one module package.
pub struct AttemptOrchestrator {
    host: Arc<HostContext>,
    reclaimer: Arc<Reclaimer>,
    package: ModulePackage,
    module_type: String,
    probe: LivenessProbe,
    attempts: usize,
}

impl AttemptOrchestrator {
    /// Create an orchestrator.
    ///
    /// # Arguments
    ///
    /// * `host` - The host context every isolated context falls back to.
    /// * `reclaimer` - The reclaimer contexts hand their units to on unload.
    /// * `package` - The module package loaded by every attempt.
    /// * `module_type` - Name of the module's entry type.
    /// * `max_retries` - Sweep budget of the liveness probe.
    pub fn new(
        host: Arc<HostContext>,
        reclaimer: Arc<Reclaimer>,
        package: ModulePackage,
        module_type: impl Into<String>,
        max_retries: usize,
    ) -> Self {
        let probe = LivenessProbe::new(Arc::clone(&reclaimer), max_retries);
        Self {
            host,
            reclaimer,
            package,
            module_type: module_type.into(),
            probe,
            attempts: 0,
        }
    }

    /// Number of attempts run so far.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// The reclaimer shared by every context.
    pub fn reclaimer(&self) -> &Arc<Reclaimer> {
        &self.reclaimer
    }

    /// Run one attempt with `strategy`.
    pub fn run_attempt(&mut self, strategy: &dyn ResolverStrategy) -> AttemptReport {
        self.attempts += 1;
        let started_at = Utc::now();
        let mut lifecycle = AttemptLifecycle::new(self.attempts, strategy.kind());
        info!(
            "Attempt #{} started with strategy '{}'",
            lifecycle.number(),
            strategy.kind()
        );

        let (handle, error) = self.execute(strategy, &mut lifecycle);

        // Nothing created during the attempt is held past this point.
        let probed = self.probe.verify(&handle);
        lifecycle.transition_to(AttemptState::Probed);
        let collected = probed.is_ok();

        let failure = match (error, probed) {
            (Some(e), _) | (None, Err(e)) => Some(AttemptFailure::from(&e)),
            (None, Ok(())) => None,
        };
        let outcome = if failure.is_none() {
            AttemptOutcome::Pass
        } else {
            AttemptOutcome::Fail
        };

        let report = AttemptReport {
            number: lifecycle.number(),
            strategy: lifecycle.strategy(),
            outcome,
            collected,
            expected_collectible: lifecycle.strategy().expected_collectible(),
            reached: lifecycle.furthest_before_unload(),
            failure,
            started_at,
            duration_ms: lifecycle.elapsed().as_millis() as u64,
        };
        match &report.failure {
            None => info!("Attempt #{} passed", report.number),
            Some(failure) => warn!(
                "Attempt #{} failed ({:?}): {}",
                report.number, failure.kind, failure.message
            ),
        }
        report
    }

    /// Run every strategy in order, calling `on_report` after each attempt.
    pub fn run_all<F>(
        &mut self,
        strategies: &[Box<dyn ResolverStrategy>],
        mut on_report: F,
    ) -> Vec<AttemptReport>
    where
        F: FnMut(&AttemptReport),
    {
        strategies
            .iter()
            .map(|strategy| {
                let report = self.run_attempt(strategy.as_ref());
                on_report(&report);
                report
            })
            .collect()
    }

    /// Create a context, drive it as far as it goes and always unload it.
    ///
    /// Returns only a weak handle, so every strong reference made here is
    /// gone once this returns.
    fn execute(
        &self,
        strategy: &dyn ResolverStrategy,
        lifecycle: &mut AttemptLifecycle,
    ) -> (LivenessHandle, Option<Error>) {
        let context = IsolatedContext::create(
            self.package.clone(),
            Arc::clone(&self.host),
            Arc::clone(&self.reclaimer),
        );
        let handle = LivenessHandle::observe(&context);

        let result = self.load_resolve_invoke(&context, strategy, lifecycle);

        context.unload();
        lifecycle.transition_to(AttemptState::Unloaded);
        (handle, result.err())
    }

    fn load_resolve_invoke(
        &self,
        context: &Arc<IsolatedContext>,
        strategy: &dyn ResolverStrategy,
        lifecycle: &mut AttemptLifecycle,
    ) -> Result<()> {
        context.load_entry()?;
        let module_type = context.load_capability_type(&self.module_type)?;
        lifecycle.transition_to(AttemptState::Loaded);

        let instance = strategy.resolve(&module_type)?;
        let module = instance.as_module(&TypeKey::host(MODULE_CAPABILITY))?;
        lifecycle.transition_to(AttemptState::Resolved);

        module.report();
        lifecycle.transition_to(AttemptState::Invoked);
        Ok(())
    }
}
