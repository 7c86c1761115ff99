use std::sync::Arc;

use alcove_core::{FailureKind, MemorySink, TypeKey};
use alcove_isolation::{IsolatedContext, LivenessHandle, LivenessProbe, Reclaimer};
use alcove_module::{BadException, GREETING, MODULE_CAPABILITY, MODULE_TYPE};
use alcove_runtime::{AttemptOutcome, AttemptState, Playground, RunnerConfig, StrategyKind};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

// Initialize tracing for tests
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn expected_lines() -> Vec<String> {
    vec![
        format!("[Playground] {}", GREETING),
        format!("[Playground] Received {}", BadException),
        "[Playground] module::Dependency".to_string(),
    ]
}

#[test]
fn test_four_attempts_end_to_end() {
    init_tracing();
    let sink = MemorySink::new();
    let playground = Playground::new(RunnerConfig::default(), Arc::new(sink.clone())).unwrap();

    let mut per_attempt = Vec::new();
    let reports = playground
        .run_with(|_| per_attempt.push(sink.drain()))
        .unwrap();

    let outcomes: Vec<bool> = reports.iter().map(|r| r.successful()).collect();
    assert_eq!(outcomes, vec![true, false, true, false]);

    for (index, report) in reports.iter().enumerate() {
        assert_eq!(report.number, index + 1);
        assert_eq!(report.strategy, StrategyKind::ALL[index]);
        assert_eq!(report.reached, AttemptState::Invoked);
        assert!(report.matches_expectation());
        assert_eq!(per_attempt[index], expected_lines());
    }

    assert_eq!(reports[1].failure.as_ref().unwrap().kind, FailureKind::ProbeTimeout);
    assert_eq!(reports[3].to_string(), "Attempt #4 successful: false");
}

#[test]
fn test_shipped_interface_fails_every_strategy() {
    init_tracing();
    let sink = MemorySink::new();
    let mut config = RunnerConfig::default();
    config.ship_interface();
    let playground = Playground::new(config, Arc::new(sink.clone())).unwrap();

    let reports = playground.run().unwrap();
    assert_eq!(reports.len(), 4);
    for report in &reports {
        assert_eq!(report.outcome, AttemptOutcome::Fail);
        assert_eq!(report.reached, AttemptState::Loaded);
        assert_eq!(
            report.failure.as_ref().unwrap().kind,
            FailureKind::ConstructionError
        );
    }
    assert!(sink.lines().is_empty());
}

#[test]
fn test_strategy_order_follows_configuration() {
    let config = RunnerConfig {
        strategies: vec![StrategyKind::Container, StrategyKind::BoundaryAware],
        ..RunnerConfig::default()
    };
    let playground = Playground::new(config, Arc::new(MemorySink::new())).unwrap();

    let reports = playground.run().unwrap();
    let summary: Vec<(usize, StrategyKind, bool)> = reports
        .iter()
        .map(|r| (r.number, r.strategy, r.successful()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, StrategyKind::Container, false),
            (2, StrategyKind::BoundaryAware, true),
        ]
    );
}

#[test]
fn test_double_unload_keeps_the_outcome() {
    init_tracing();
    for kind in [StrategyKind::BoundaryAware, StrategyKind::Container] {
        let sink = MemorySink::new();
        let playground = Playground::new(RunnerConfig::default(), Arc::new(sink)).unwrap();
        let reclaimer = Arc::new(Reclaimer::new());
        let strategy = playground.strategies().into_iter().find(|s| s.kind() == kind).unwrap();

        let handle = {
            let package = playground.config().build_package().unwrap();
            let ctx = IsolatedContext::create(package, Arc::clone(playground.host()), Arc::clone(&reclaimer));
            ctx.load_entry().unwrap();
            let module_type = ctx.load_capability_type(MODULE_TYPE).unwrap();
            strategy
                .resolve(&module_type)
                .unwrap()
                .as_module(&TypeKey::host(MODULE_CAPABILITY))
                .unwrap()
                .report();
            ctx.unload();
            ctx.unload();
            LivenessHandle::observe(&ctx)
        };

        let collected = LivenessProbe::new(reclaimer, 10).probe(&handle);
        assert_eq!(collected, kind.expected_collectible());
    }
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let config = RunnerConfig {
        max_probe_retries: 0,
        ..RunnerConfig::default()
    };
    assert!(Playground::new(config, Arc::new(MemorySink::new())).is_err());
}
