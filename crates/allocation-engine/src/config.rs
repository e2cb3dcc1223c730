//! Engine settings: the business window occupancy is drawn against and the
//! recurrence cap.
//!
//! Settings are plain data loaded from TOML by the host; the engine itself never
//! reads files or the environment.
//!
//! ```toml
//! recurrence_cap = 120
//!
//! [business_window]
//! start = "08:00"
//! end = "19:30"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::intervals::BusinessWindow;
use crate::recurrence::DEFAULT_RECURRENCE_CAP;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub business_window: BusinessWindowConfig,
    pub recurrence_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            business_window: BusinessWindowConfig::default(),
            recurrence_cap: DEFAULT_RECURRENCE_CAP,
        }
    }
}

/// Business window bounds as `"HH:MM"` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessWindowConfig {
    pub start: String,
    pub end: String,
}

impl Default for BusinessWindowConfig {
    fn default() -> Self {
        Self {
            start: "07:00".to_string(),
            end: "18:00".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` for malformed TOML, and the window or
    /// cap errors of [`EngineConfig::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the business window parses and is non-empty and that the cap is
    /// at least 1.
    pub fn validate(&self) -> Result<()> {
        self.business_window()?;
        if self.recurrence_cap == 0 {
            return Err(EngineError::InvalidConfig(
                "recurrence_cap must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The configured business window in minutes.
    pub fn business_window(&self) -> Result<BusinessWindow> {
        BusinessWindow::parse(&self.business_window.start, &self.business_window.end)
    }
}
