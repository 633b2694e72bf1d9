use crate::backends::js::runtime_helpers::{Helper, close_over_requirements, render_helpers};
use rustc_hash::FxHashSet;

/// The runtime helpers a unit references.
/// Filled in while lowering, read by the backend and the helper manifest.
#[derive(Debug, Clone, Default)]
pub struct HelperUsage {
    used: FxHashSet<Helper>,
}

impl HelperUsage {
    pub fn record(&mut self, helper: Helper) {
        self.used.insert(helper);
    }

    pub fn contains(&self, helper: Helper) -> bool {
        self.used.contains(&helper)
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn merge(&mut self, other: &HelperUsage) {
        self.used.extend(other.used.iter().copied());
    }

    /// Everything to emit, dependencies included, in canonical order.
    pub fn emission_order(&self) -> Vec<Helper> {
        close_over_requirements(&self.used)
    }

    pub fn render(&self) -> String {
        render_helpers(&self.used)
    }
}
