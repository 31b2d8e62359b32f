// ============================================================================
// File: src/registry/mod.rs
// ----------------------------------------------------------------------------
// Runner registry: discovery, first-match selection and name lookup.
// ============================================================================

mod discovery;

pub use discovery::{DiscoveryConfig, WrapperConfig};


use log::{debug, info};

use crate::runners::spawn::{first_existing_or_first, is_executable};
use crate::runners::{
    DosBoxRunner, LaunchSpec, NativeRunner, Runner, RunnerCapabilities, WineRunner,
};

/// Ordered collection of configured runners.
///
/// Registration order is selection priority: [`select_runner`] walks the
/// list and takes the first capable, available entry. Discovery registers
/// the native runner first so direct execution always wins for games the
/// host can run itself.
///
/// [`select_runner`]: Self::select_runner
#[derive(Debug, Default)]
pub struct RunnerRegistry {
    runners: Vec<Runner>,
}

impl RunnerRegistry {
    /// An empty registry. Callers either [`discover`](Self::discover) or
    /// [`register`](Self::register) runners into it.
    pub fn new() -> Self {
        Self {
            runners: Vec::new(),
        }
    }

    /// A registry populated from the given discovery configuration.
    pub fn discovered(config: &DiscoveryConfig) -> Self {
        let mut registry = Self::new();
        registry.discover(config);
        registry
    }

    /// Probe the host and register every runner the configuration describes,
    /// replacing whatever was registered before.
    ///
    /// Order fixes selection priority: native execution, then Wine, then
    /// Proton-GE installs, then DOSBox, then ISA-translation wrappers.
    /// Runners whose executable is missing are still registered; they show
    /// up in capability listings as unavailable and are skipped during
    /// selection.
    pub fn discover(&mut self, config: &DiscoveryConfig) {
        info!("discovering game runners");
        self.runners.clear();

        self.register(Runner::Native(NativeRunner::new()));

        if let Some(wine_path) = first_existing_or_first(&config.wine_paths) {
            self.register(Runner::Wine(WineRunner::new(wine_path)));
        }

        for proton in discovery::scan_proton_installs(&config.proton_roots) {
            self.register(Runner::Proton(proton));
        }

        // Prefer a candidate with the execute bit over one that merely exists
        let dosbox_path = config
            .dosbox_paths
            .iter()
            .find(|path| is_executable(path))
            .or_else(|| config.dosbox_paths.first());
        if let Some(dosbox_path) = dosbox_path {
            self.register(Runner::DosBox(DosBoxRunner::new(dosbox_path.clone())));
        }

        for wrapper in &config.wrappers {
            self.register(Runner::Wrapper(wrapper.to_runner()));
        }

        info!("runner discovery finished: {} registered", self.runners.len());
    }

    /// Append a runner at the lowest selection priority.
    pub fn register(&mut self, runner: Runner) {
        info!(
            "registered runner: {} (available: {})",
            runner.name(),
            runner.is_available()
        );
        self.runners.push(runner);
    }

    /// All registered runners in priority order.
    pub fn runners(&self) -> &[Runner] {
        &self.runners
    }

    /// Capability snapshot of every registered runner, available or not;
    /// the `available` flag tells them apart.
    pub fn runner_capabilities(&self) -> Vec<RunnerCapabilities> {
        self.runners.iter().map(Runner::capabilities).collect()
    }

    /// Capability snapshots of just the runners that could launch something
    /// right now.
    pub fn available_runners(&self) -> Vec<RunnerCapabilities> {
        self.runners
            .iter()
            .filter(|runner| runner.is_available())
            .map(Runner::capabilities)
            .collect()
    }

    /// First registered runner that can run the given launch and is present
    /// on the host.
    pub fn select_runner(&self, spec: &LaunchSpec) -> Option<&Runner> {
        for runner in &self.runners {
            if !runner.can_run(spec) {
                continue;
            }
            if !runner.is_available() {
                debug!(
                    "runner {} matches {} but is not available",
                    runner.name(),
                    spec.platform
                );
                continue;
            }
            info!("selected runner {} for {}", runner.name(), spec.platform);
            return Some(runner);
        }
        None
    }

    pub fn runner_named(&self, name: &str) -> Option<&Runner> {
        self.runners.iter().find(|runner| runner.name() == name)
    }

    pub fn runner_named_mut(&mut self, name: &str) -> Option<&mut Runner> {
        self.runners.iter_mut().find(|runner| runner.name() == name)
    }
}
