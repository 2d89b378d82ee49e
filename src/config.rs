use std::path::PathBuf;
use std::time::Duration;

/// Runtime knobs for one collection run.
///
/// The source sites hard-code their item caps; here the target count and the
/// discovery-pass budget are configuration so the same collector drives every
/// site.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Stop once this many records have been retained.
    pub target_count: usize,
    /// Maximum number of discovery passes (scroll/click attempts).
    pub max_passes: usize,
    /// Wait after a growth action before re-querying the list.
    pub settle: Duration,
    /// Wait after a navigation when no ready anchor is configured.
    pub nav_settle: Duration,
    /// Wait after a reveal interaction (scroll-into-view + hover).
    pub reveal_wait: Duration,
    /// Budget for waiting on a ready anchor.
    pub wait_timeout: Duration,
    pub headless: bool,
    pub debug: bool,
    pub output_dir: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            target_count: 25,
            max_passes: 15,
            settle: Duration::from_secs(2),
            nav_settle: Duration::from_secs(3),
            reveal_wait: Duration::from_millis(500),
            wait_timeout: Duration::from_secs(10),
            headless: true,
            debug: false,
            output_dir: PathBuf::from("./data"),
        }
    }
}

impl HarvestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_count(mut self, target_count: usize) -> Self {
        self.target_count = target_count;
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}
