//! Resolver strategies.
//!
//! A resolver turns a module type loaded in an isolated context into a live
//! instance. The strategies differ in where the instances of shared
//! dependencies come from, and therefore in whether anything long-lived ends
//! up referencing the module's context.

mod boundary_aware;
mod direct;
mod fresh;
mod reflective;

pub use boundary_aware::BoundaryAwareResolver;
pub use direct::ContainerResolver;
pub use fresh::FreshContainerResolver;
pub use reflective::ReflectiveResolver;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alcove_core::error::{Error, Result};
use alcove_isolation::{Instance, LoadedType};
use serde::{Deserialize, Serialize};

use crate::container::Container;

/// Builds a container with the host registrations.
pub type ContainerFactory = Arc<dyn Fn() -> Result<Container> + Send + Sync>;

/// Produces a module instance from a module type.
pub trait ResolverStrategy: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> StrategyKind;

    /// Resolve `module_type` and all of its dependencies.
    fn resolve(&self, module_type: &Arc<LoadedType>) -> Result<Instance>;
}

/// The available strategies, in the order they are run by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// A new container for every resolve
    FreshContainer,

    /// Walk the dependencies, resolve each from the shared container
    Reflective,

    /// Shared container for host types, manual construction for module types
    BoundaryAware,

    /// Hand the module type straight to the shared container
    Container,
}

impl StrategyKind {
    /// Every strategy, in default order.
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::FreshContainer,
        StrategyKind::Reflective,
        StrategyKind::BoundaryAware,
        StrategyKind::Container,
    ];

    /// The name used in configuration and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreshContainer => "fresh-container",
            Self::Reflective => "reflective",
            Self::BoundaryAware => "boundary-aware",
            Self::Container => "container",
        }
    }

    /// One line description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::FreshContainer => "resolve through a container created for this call only",
            Self::Reflective => "satisfy each declared dependency from the shared container",
            Self::BoundaryAware => {
                "use the shared container for host types, construct module types in place"
            }
            Self::Container => "resolve the module type directly through the shared container",
        }
    }

    /// Whether the module's context is expected to be reclaimed after
    /// unload when this strategy was used.
    pub fn expected_collectible(&self) -> bool {
        matches!(self, Self::FreshContainer | Self::BoundaryAware)
    }

    /// Instantiate the strategy.
    pub fn build(
        &self,
        shared: &Arc<Container>,
        factory: &ContainerFactory,
    ) -> Box<dyn ResolverStrategy> {
        match self {
            Self::FreshContainer => Box::new(FreshContainerResolver::new(Arc::clone(factory))),
            Self::Reflective => Box::new(ReflectiveResolver::new(Arc::clone(shared))),
            Self::BoundaryAware => Box::new(BoundaryAwareResolver::new(Arc::clone(shared))),
            Self::Container => Box::new(ContainerResolver::new(Arc::clone(shared))),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.to_lowercase())
            .ok_or_else(|| {
                Error::Config(format!(
                    "unknown strategy '{}', expected one of: {}",
                    s,
                    Self::ALL.map(|k| k.as_str()).join(", ")
                ))
            })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.as_str().parse::<StrategyKind>().unwrap(), kind);
        }
        assert_eq!("Boundary-Aware".parse::<StrategyKind>().unwrap(), StrategyKind::BoundaryAware);
        assert!(matches!(
            "magic".parse::<StrategyKind>(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_expected_outcomes() {
        let expected: Vec<bool> = StrategyKind::ALL
            .iter()
            .map(|k| k.expected_collectible())
            .collect();
        assert_eq!(expected, vec![true, false, true, false]);
    }
}
