//! Read-only view of the externally persisted ability toggle switches.

use std::collections::{BTreeMap, HashMap};

/// Lookup for per-ability toggle state. Unset abilities are off.
pub trait ToggleState {
    fn is_enabled(&self, ability_id: &str) -> bool;
}

impl ToggleState for HashMap<String, bool> {
    fn is_enabled(&self, ability_id: &str) -> bool {
        self.get(ability_id).copied().unwrap_or(false)
    }
}

impl ToggleState for BTreeMap<String, bool> {
    fn is_enabled(&self, ability_id: &str) -> bool {
        self.get(ability_id).copied().unwrap_or(false)
    }
}

/// Every toggle reports off.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllTogglesOff;

impl ToggleState for AllTogglesOff {
    fn is_enabled(&self, _ability_id: &str) -> bool {
        false
    }
}
