//! Tunnel configuration parameters
//!
//! All tunable parameters for sheet tracking.  Supplied once at startup;
//! there is no runtime reconfiguration path.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tracking::queue::SHEET_SLOTS;

/// Core tracking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelConfig {
    // --- Occlusion filter ---
    /// Occlusions shorter than this are treated as noise (milliseconds)
    pub min_occlusion_ms: u32,
    /// A sensor covered longer than this is stuck (milliseconds)
    pub max_occlusion_ms: u32,

    // --- Matching ---
    /// Allowed |outfeed - infeed| difference for the same sheet (milliseconds)
    pub max_duration_tolerance_ms: u32,
    /// Maximum number of sheets tracked inside the tunnel at once
    pub max_queue_len: u8,

    // --- Watchdog ---
    /// Stuck-sheet deadline, restarted on every matched sheet (seconds)
    pub tunnel_timeout_secs: u16,

    // --- Timing ---
    /// Stuck-sensor check period while a sensor is covered (milliseconds)
    pub occlusion_check_interval_ms: u32,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            // Occlusion filter
            min_occlusion_ms: 300,
            max_occlusion_ms: 4000,

            // Matching
            max_duration_tolerance_ms: 300,
            max_queue_len: 3,

            // Watchdog
            tunnel_timeout_secs: 5,

            // Timing
            occlusion_check_interval_ms: 1000, // 1 Hz
        }
    }
}

impl TunnelConfig {
    /// Parse a JSON document and validate it.  Missing fields take their
    /// default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values instead of clamping them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_occlusion_ms >= self.max_occlusion_ms {
            return Err(ConfigError::ValidationFailed(
                "min_occlusion_ms must be below max_occlusion_ms",
            ));
        }
        if self.max_queue_len == 0 {
            return Err(ConfigError::ValidationFailed("max_queue_len must be at least 1"));
        }
        // One slot stays free for the over-capacity entry that trips the fault.
        if usize::from(self.max_queue_len) >= SHEET_SLOTS {
            return Err(ConfigError::ValidationFailed(
                "max_queue_len exceeds sheet queue storage",
            ));
        }
        if self.tunnel_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed("tunnel_timeout_secs must be non-zero"));
        }
        if self.occlusion_check_interval_ms == 0
            || self.occlusion_check_interval_ms > self.max_occlusion_ms
        {
            return Err(ConfigError::ValidationFailed(
                "occlusion_check_interval_ms must be within (0, max_occlusion_ms]",
            ));
        }
        Ok(())
    }

    pub fn tunnel_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.tunnel_timeout_secs))
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.occlusion_check_interval_ms))
    }
}
