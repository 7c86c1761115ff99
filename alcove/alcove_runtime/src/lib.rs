//! Alcove Runtime - load, resolve, unload and probe module contexts
//!
//! This crate provides the host side of Alcove: the dependency container,
//! the resolver strategies, the attempt orchestrator and the runner
//! configuration.

pub mod attempt;
pub mod container;
pub mod host;
pub mod resolver;
pub mod system;

use std::sync::Arc;

use alcove_core::error::Result;
use alcove_core::LogSink;
use alcove_isolation::{BoundaryRegistry, HostContext, Reclaimer};
use tracing::info;

pub use attempt::{AttemptOrchestrator, AttemptOutcome, AttemptReport, AttemptState};
pub use container::Container;
pub use resolver::{ContainerFactory, ResolverStrategy, StrategyKind};
pub use system::RunnerConfig;

/// Runner facade that wires the host, the shared container and the
/// orchestrator together.
pub struct Playground {
    /// The validated configuration
    config: RunnerConfig,

    /// The host context
    host: Arc<HostContext>,

    /// Reclaimer shared by every isolated context
    reclaimer: Arc<Reclaimer>,

    /// The long-lived container shared across attempts
    shared: Arc<Container>,

    /// Builds throwaway containers
    factory: ContainerFactory,
}

impl Playground {
    /// Create a new Playground writing module output to `sink`
    pub fn new(config: RunnerConfig, sink: Arc<dyn LogSink>) -> Result<Self> {
        info!("Initializing Alcove playground");
        config.validate()?;

        let registry = Arc::new(BoundaryRegistry::new());
        let host = host::build_host(registry, sink)?;

        let factory_host = Arc::clone(&host);
        let factory: ContainerFactory = Arc::new(move || host::prepared_container(&factory_host));
        let shared = Arc::new(factory()?);

        info!(
            "Playground ready: {} strategies, probe budget {}",
            config.strategies.len(),
            config.max_probe_retries
        );

        Ok(Self {
            config,
            host,
            reclaimer: Arc::new(Reclaimer::new()),
            shared,
            factory,
        })
    }

    /// The configuration in use
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// The host context
    pub fn host(&self) -> &Arc<HostContext> {
        &self.host
    }

    /// The long-lived container
    pub fn shared_container(&self) -> &Arc<Container> {
        &self.shared
    }

    /// The configured strategies, in order
    pub fn strategies(&self) -> Vec<Box<dyn ResolverStrategy>> {
        self.config
            .strategies
            .iter()
            .map(|kind| kind.build(&self.shared, &self.factory))
            .collect()
    }

    /// Run every configured strategy once
    pub fn run(&self) -> Result<Vec<AttemptReport>> {
        self.run_with(|_| {})
    }

    /// Run every configured strategy once, calling `on_report` after each
    /// attempt
    pub fn run_with<F>(&self, on_report: F) -> Result<Vec<AttemptReport>>
    where
        F: FnMut(&AttemptReport),
    {
        let package = self.config.build_package()?;
        let mut orchestrator = AttemptOrchestrator::new(
            Arc::clone(&self.host),
            Arc::clone(&self.reclaimer),
            package,
            self.config.module_type.clone(),
            self.config.max_probe_retries,
        );

        let reports = orchestrator.run_all(&self.strategies(), on_report);
        info!(
            "Ran {} attempts, {} passed",
            reports.len(),
            reports.iter().filter(|r| r.successful()).count()
        );
        Ok(reports)
    }
}
