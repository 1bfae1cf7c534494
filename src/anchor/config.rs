//! Anchor Binding Configuration

use serde::{Deserialize, Serialize};

/// Anchor alignment and content binding settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// React to localization transitions by aligning and rebinding
    pub auto_align_on_localized: bool,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            auto_align_on_localized: true,
        }
    }
}
