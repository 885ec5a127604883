//! Quadrant Shadow Configuration
//!
//! Resolution split and update policy for the four quadrant casters, with
//! serde support so the settings can live in a config file.

use serde::{Serialize, Deserialize};

/// Smallest shadow map edge accepted by `validate`
pub const MIN_RESOLUTION: u32 = 64;
/// Largest shadow map edge accepted by `validate`
pub const MAX_RESOLUTION: u32 = 8192;

/// Allocator configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadShadowConfig {
    /// Shadow map edge for the caster covering the viewer's quadrant
    pub high_resolution: u32,

    /// Shadow map edge for the three remaining casters
    pub low_resolution: u32,

    /// How often low-resolution maps are flagged for re-render
    pub low_res_update: ShadowUpdateMode,

    /// Widens the clip containment test to `(-(1 + s), 1 + s)`
    pub clip_slack: f32,
}

impl Default for QuadShadowConfig {
    fn default() -> Self {
        Self {
            high_resolution: 4096,
            low_resolution: 256,
            low_res_update: ShadowUpdateMode::EveryFrame,
            clip_slack: 0.0,
        }
    }
}

impl QuadShadowConfig {
    /// Sharper distant quadrants at a higher memory cost
    pub fn high_quality() -> Self {
        Self {
            high_resolution: 8192,
            low_resolution: 1024,
            ..Default::default()
        }
    }

    /// Cheap settings for low-end targets
    pub fn low_quality() -> Self {
        Self {
            high_resolution: 2048,
            low_resolution: 128,
            low_res_update: ShadowUpdateMode::Interval(4),
            ..Default::default()
        }
    }

    /// Clamp values to valid ranges
    pub fn validate(&mut self) {
        let high = clamp_resolution(self.high_resolution);
        let low = clamp_resolution(self.low_resolution);

        if high != self.high_resolution || low != self.low_resolution {
            log::warn!(
                "Quadrant shadow resolutions adjusted: {}/{} -> {}/{}",
                self.high_resolution, self.low_resolution, high, low
            );
        }

        self.high_resolution = high;
        self.low_resolution = low.min(high);

        if let ShadowUpdateMode::Interval(0) = self.low_res_update {
            self.low_res_update = ShadowUpdateMode::Interval(1);
        }

        self.clip_slack = if self.clip_slack.is_finite() {
            self.clip_slack.clamp(0.0, 0.99)
        } else {
            0.0
        };
    }

    /// Resolution for a caster slot
    pub fn resolution_for_slot(&self, slot: usize) -> u32 {
        if slot == 0 {
            self.high_resolution
        } else {
            self.low_resolution
        }
    }
}

fn clamp_resolution(resolution: u32) -> u32 {
    resolution
        .clamp(MIN_RESOLUTION, MAX_RESOLUTION)
        .next_power_of_two()
        .min(MAX_RESOLUTION)
}

/// Shadow map update mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadowUpdateMode {
    /// Update every frame
    #[default]
    EveryFrame,
    /// Update every N frames
    Interval(u32),
    /// Only update when the quadrant assignment or the light moved
    OnChange,
}

impl ShadowUpdateMode {
    /// Check if a shadow map should update this frame
    pub fn should_update(&self, frame: u64, changed: bool) -> bool {
        match self {
            Self::EveryFrame => true,
            Self::Interval(n) => frame % (*n).max(1) as u64 == 0,
            Self::OnChange => changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = QuadShadowConfig::default();
        assert_eq!(config.high_resolution, 4096);
        assert_eq!(config.low_resolution, 256);
        assert_eq!(config.resolution_for_slot(0), 4096);
        assert_eq!(config.resolution_for_slot(3), 256);
    }

    #[test]
    fn test_config_validate() {
        let mut config = QuadShadowConfig {
            high_resolution: 3000,
            low_resolution: 10,
            low_res_update: ShadowUpdateMode::Interval(0),
            clip_slack: -1.0,
        };

        config.validate();

        assert_eq!(config.high_resolution, 4096);
        assert_eq!(config.low_resolution, 64);
        assert_eq!(config.low_res_update, ShadowUpdateMode::Interval(1));
        assert_eq!(config.clip_slack, 0.0);
    }

    #[test]
    fn test_config_validate_low_not_above_high() {
        let mut config = QuadShadowConfig {
            high_resolution: 512,
            low_resolution: 2048,
            ..Default::default()
        };
        config.validate();
        assert_eq!(config.low_resolution, 512);
    }

    #[test]
    fn test_config_serialization() {
        let config = QuadShadowConfig::low_quality();
        let json = serde_json::to_string(&config).unwrap();
        let restored: QuadShadowConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);

        // Missing fields fall back to defaults
        let partial: QuadShadowConfig = serde_json::from_str(r#"{"low_resolution":512}"#).unwrap();
        assert_eq!(partial.low_resolution, 512);
        assert_eq!(partial.high_resolution, 4096);
    }

    #[test]
    fn test_update_mode() {
        assert!(ShadowUpdateMode::EveryFrame.should_update(7, false));
        assert!(ShadowUpdateMode::Interval(4).should_update(8, false));
        assert!(!ShadowUpdateMode::Interval(4).should_update(9, false));
        assert!(ShadowUpdateMode::OnChange.should_update(1, true));
        assert!(!ShadowUpdateMode::OnChange.should_update(1, false));
    }
}
