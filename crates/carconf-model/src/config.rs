//! Configuration options for the configuration engine.

use serde::{Deserialize, Serialize};

/// How to proceed when several styles tie for the fewest core changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleTieBreak {
    /// Hand every tied candidate back to the caller.
    #[default]
    Ask,
    /// Apply the first tied candidate in catalog order.
    First,
}

/// Options controlling engine behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Re-resolve locking base codes when a non-core change stays inside
    /// their OR group, instead of replacing the old value's activation.
    pub reapply_or_groups: bool,

    /// Log a warning when activating the default list changes a core or
    /// non-core value.
    pub warn_on_default_drift: bool,

    /// Fall back to same-market styles when no style's availability holds.
    pub market_fallback: bool,

    pub style_tie_break: StyleTieBreak,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            reapply_or_groups: true,
            warn_on_default_drift: true,
            market_fallback: true,
            style_tie_break: StyleTieBreak::Ask,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_reapply_or_groups(mut self, enable: bool) -> Self {
        self.reapply_or_groups = enable;
        self
    }

    #[must_use]
    pub fn with_market_fallback(mut self, enable: bool) -> Self {
        self.market_fallback = enable;
        self
    }

    #[must_use]
    pub fn with_style_tie_break(mut self, tie_break: StyleTieBreak) -> Self {
        self.style_tie_break = tie_break;
        self
    }
}
