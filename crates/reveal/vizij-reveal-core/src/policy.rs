//! Trigger policy: gates observer records into enter/exit fires per target.
//!
//! The gate is a pure function of the record, the target's policy and its prior
//! presence. Because `fire_enter` requires a hidden prior and `fire_exit` a visible one,
//! fires for a single target always alternate, starting with an enter.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, RevealError};
use crate::observer::ObservationRecord;

/// How often a target replays.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerMode {
    /// Reveal on first qualifying entry, never exit.
    Once,
    /// Reveal on every entry, hide on every exit.
    #[default]
    Repeat,
    /// Driven only by explicit show/hide commands (menus, sidebars).
    Manual,
}

/// Mode plus the fraction of the target that must be visible.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerPolicy {
    pub mode: TriggerMode,
    /// 0.0 means any visible pixel, 1.0 means fully visible. Also accepts `"some"` / `"all"`.
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f32,
}

/// `repeat` on any contact, the behaviour of a plain `whileInView`.
impl Default for TriggerPolicy {
    fn default() -> Self {
        Self {
            mode: TriggerMode::Repeat,
            amount: 0.0,
        }
    }
}

impl TriggerPolicy {
    pub const fn once(amount: f32) -> Self {
        Self {
            mode: TriggerMode::Once,
            amount,
        }
    }

    pub const fn repeat(amount: f32) -> Self {
        Self {
            mode: TriggerMode::Repeat,
            amount,
        }
    }

    pub const fn manual() -> Self {
        Self {
            mode: TriggerMode::Manual,
            amount: 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.amount) {
            return Err(RevealError::InvalidParameter {
                reason: format!("policy.amount must lie in [0, 1] (got {})", self.amount),
            });
        }
        Ok(())
    }

    /// Whether a record satisfies the visibility threshold (`>=`, ties count).
    pub fn satisfied_by(&self, record: &ObservationRecord) -> bool {
        record.is_intersecting && record.ratio >= self.amount
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountSpec {
    Number(f32),
    Keyword(String),
}

fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    match AmountSpec::deserialize(deserializer)? {
        AmountSpec::Number(n) => Ok(n),
        AmountSpec::Keyword(k) => match k.as_str() {
            "some" => Ok(0.0),
            "all" => Ok(1.0),
            other => Err(serde::de::Error::custom(format!(
                "unknown amount '{other}', expected a number, \"some\" or \"all\""
            ))),
        },
    }
}

/// Logical visibility of a target as seen by the gate (the last fired edge).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    #[default]
    Hidden,
    Visible,
}

/// Outcome of gating one record.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireDecision {
    pub fire_enter: bool,
    pub fire_exit: bool,
}

impl FireDecision {
    pub const NONE: FireDecision = FireDecision {
        fire_enter: false,
        fire_exit: false,
    };
    pub const ENTER: FireDecision = FireDecision {
        fire_enter: true,
        fire_exit: false,
    };
    pub const EXIT: FireDecision = FireDecision {
        fire_enter: false,
        fire_exit: true,
    };
}

/// Decide whether `record` fires an enter or exit for a target with `policy` that is
/// currently `prior`.
pub fn should_fire(record: &ObservationRecord, policy: &TriggerPolicy, prior: Presence) -> FireDecision {
    let satisfied = policy.satisfied_by(record);
    match policy.mode {
        TriggerMode::Manual => FireDecision::NONE,
        // Once a once-target is visible its prior never flips back, so later records are inert.
        TriggerMode::Once => {
            if satisfied && prior != Presence::Visible {
                FireDecision::ENTER
            } else {
                FireDecision::NONE
            }
        }
        TriggerMode::Repeat => match (satisfied, prior) {
            (true, Presence::Hidden) => FireDecision::ENTER,
            (false, Presence::Visible) => FireDecision::EXIT,
            _ => FireDecision::NONE,
        },
    }
}
