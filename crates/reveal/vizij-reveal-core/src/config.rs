//! Core configuration for vizij-reveal-core.

use serde::{Deserialize, Serialize};

use crate::geometry::ViewportRegion;
use crate::policy::TriggerPolicy;
use crate::variant::Transition;

/// Engine-wide defaults and feature flags.
/// Every field has a default so hosts can pass a partial JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Policy for targets attached without one.
    pub default_policy: TriggerPolicy,
    /// Viewport region for targets attached without one.
    pub default_region: ViewportRegion,
    /// Base transition that variant definitions override field by field.
    pub default_transition: Transition,
    /// Emit a frame for every live target every tick. When false, only changed styles are emitted.
    pub emit_settled_frames: bool,
    /// False for hosts that can never measure geometry; the engine then starts degraded
    /// and every target is shown immediately.
    pub geometry_available: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_policy: TriggerPolicy::default(),
            default_region: ViewportRegion::default(),
            default_transition: Transition {
                duration: Some(DEFAULT_DURATION),
                ..Transition::default()
            },
            emit_settled_frames: true,
            geometry_available: true,
        }
    }
}

/// Seconds used when neither the variant nor its easing implies a duration.
pub const DEFAULT_DURATION: f32 = 0.3;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::TriggerMode;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: Config =
            serde_json::from_str(r#"{ "default_policy": { "mode": "once", "amount": "some" } }"#).unwrap();
        assert_eq!(cfg.default_policy.mode, TriggerMode::Once);
        assert_eq!(Config::default().default_policy.mode, TriggerMode::Repeat);
        assert_eq!(cfg.default_transition.duration, Some(DEFAULT_DURATION));
        assert!(cfg.emit_settled_frames);
        assert!(cfg.geometry_available);
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = Config::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
