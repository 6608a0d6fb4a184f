mod heap;
mod sim;
mod system;

use std::path::PathBuf;

pub use heap::{TrackingAlloc, live_heap_bytes};
pub use sim::SimPlatform;
pub use system::SystemPlatform;

use crate::load::LoadHandle;
use crate::source::CounterSource;

/// Host services a benchmark session runs against.
///
/// Implementations differ by deployment environment; the orchestrator is
/// generic over the trait and startup code picks one through
/// [`create_platform`], so the closed [`HostPlatform`] enum is the only
/// dynamic seam.
pub trait Platform: Send + Sync {
    /// Root directory results are written under.
    fn results_root(&self) -> PathBuf;

    /// Fresh counter source for one run. Opened and disposed once per run,
    /// owned by the scheduler in between.
    fn create_source(&self) -> Box<dyn CounterSource>;

    /// Starts loading `target` and hands back the polling handle.
    fn begin_load(&self, target: &str) -> Box<dyn LoadHandle>;

    /// Cross-run cleanup; may suspend across multiple scheduling steps.
    fn cleanup(
        &self,
        force_reclaim: bool,
        unload_unused: bool,
    ) -> impl std::future::Future<Output = ()> + Send;
}

/// Host platform selection (the string form used by plans and the CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RunMode {
    Auto,
    System,
    Sim,
}

/// Closed set of host platforms.
#[derive(Debug)]
pub enum HostPlatform {
    System(SystemPlatform),
    Sim(SimPlatform),
}

/// Picks the platform for `mode`. `Auto` resolves to the real system host;
/// `results_root` overrides the platform default when given.
#[must_use]
pub fn create_platform(mode: RunMode, results_root: Option<PathBuf>) -> HostPlatform {
    match mode {
        RunMode::Auto | RunMode::System => {
            let root = results_root.unwrap_or_else(|| PathBuf::from("."));
            HostPlatform::System(SystemPlatform::new(root))
        }
        RunMode::Sim => {
            let root = results_root.unwrap_or_else(|| std::env::temp_dir().join("memrun"));
            HostPlatform::Sim(SimPlatform::new(root))
        }
    }
}

impl Platform for HostPlatform {
    fn results_root(&self) -> PathBuf {
        match self {
            Self::System(p) => p.results_root(),
            Self::Sim(p) => p.results_root(),
        }
    }

    fn create_source(&self) -> Box<dyn CounterSource> {
        match self {
            Self::System(p) => p.create_source(),
            Self::Sim(p) => p.create_source(),
        }
    }

    fn begin_load(&self, target: &str) -> Box<dyn LoadHandle> {
        match self {
            Self::System(p) => p.begin_load(target),
            Self::Sim(p) => p.begin_load(target),
        }
    }

    fn cleanup(
        &self,
        force_reclaim: bool,
        unload_unused: bool,
    ) -> impl std::future::Future<Output = ()> + Send {
        async move {
            match self {
                Self::System(p) => p.cleanup(force_reclaim, unload_unused).await,
                Self::Sim(p) => p.cleanup(force_reclaim, unload_unused).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn run_mode_parses_lowercase_names() {
        assert_eq!(RunMode::from_str("auto"), Ok(RunMode::Auto));
        assert_eq!(RunMode::from_str("system"), Ok(RunMode::System));
        assert_eq!(RunMode::from_str("sim"), Ok(RunMode::Sim));
        assert!(RunMode::from_str("editor").is_err());
    }

    #[test]
    fn auto_resolves_to_the_system_host() {
        let platform = create_platform(RunMode::Auto, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(platform, HostPlatform::System(_)));
        assert_eq!(platform.results_root(), PathBuf::from("/tmp/x"));
    }
}
