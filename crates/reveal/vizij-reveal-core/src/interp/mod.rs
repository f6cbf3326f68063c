//! Easing curves and the registry that resolves them by name.
//!
//! Built-in curves are cubic beziers (`linear`, `easeIn`, `easeOut`, `easeInOut`) and a
//! spring approximation. Anything else is a host-provided [`EaseFn`] registered by name.

pub mod functions;
pub mod spring;

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RevealError};
pub use spring::SpringParams;

pub const EASE_IN: [f32; 4] = [0.42, 0.0, 1.0, 1.0];
pub const EASE_OUT: [f32; 4] = [0.0, 0.0, 0.58, 1.0];
pub const EASE_IN_OUT: [f32; 4] = [0.42, 0.0, 0.58, 1.0];

/// Pluggable timing curve. Maps progress in [0,1] to an eased position.
pub trait EaseFn: Send + Sync {
    fn ease(&self, t: f32) -> f32;

    /// Preferred duration in seconds when the transition doesn't set one.
    fn natural_duration(&self) -> Option<f32> {
        None
    }
}

impl<F> EaseFn for F
where
    F: Fn(f32) -> f32 + Send + Sync,
{
    fn ease(&self, t: f32) -> f32 {
        self(t)
    }
}

/// Resolved easing attached to a transition.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "EaseSpec", into = "EaseSpec")]
pub enum Easing {
    Linear,
    /// Control points (x1, y1, x2, y2).
    CubicBezier([f32; 4]),
    Spring(SpringParams),
    Custom { name: String, f: Arc<dyn EaseFn> },
}

impl Easing {
    /// Eased position for progress `t`; exactly 0 at t <= 0 and exactly 1 at t >= 1.
    pub fn apply(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Easing::Linear => t,
            Easing::CubicBezier(ctrl) => functions::bezier_ease(t, *ctrl),
            Easing::Spring(params) => params.ease(t),
            Easing::Custom { f, .. } => f.ease(t),
        }
    }

    /// Duration implied by the curve itself (springs settle on their own clock).
    pub fn natural_duration(&self) -> Option<f32> {
        match self {
            Easing::Spring(params) => Some(params.settle_duration()),
            Easing::Custom { f, .. } => f.natural_duration(),
            _ => None,
        }
    }

    /// Look up a built-in curve by name. Accepts camelCase, snake_case and kebab-case.
    pub fn builtin(name: &str) -> Option<Easing> {
        let key: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "linear" => Some(Easing::Linear),
            "easein" => Some(Easing::CubicBezier(EASE_IN)),
            "easeout" => Some(Easing::CubicBezier(EASE_OUT)),
            "easeinout" => Some(Easing::CubicBezier(EASE_IN_OUT)),
            _ => None,
        }
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => write!(f, "Linear"),
            Easing::CubicBezier(c) => f.debug_tuple("CubicBezier").field(c).finish(),
            Easing::Spring(p) => f.debug_tuple("Spring").field(p).finish(),
            Easing::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
        }
    }
}

/// Custom easings compare by registered name.
impl PartialEq for Easing {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Easing::Linear, Easing::Linear) => true,
            (Easing::CubicBezier(a), Easing::CubicBezier(b)) => a == b,
            (Easing::Spring(a), Easing::Spring(b)) => a == b,
            (Easing::Custom { name: a, .. }, Easing::Custom { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// Authoring form of an easing, as it appears in variant JSON:
/// `"easeInOut"`, `[0.42, 0, 0.58, 1]` or `{ "type": "spring", "stiffness": 150, "damping": 10 }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EaseSpec {
    Named(String),
    Bezier([f32; 4]),
    Spring(SpringSpec),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: SpringParams,
}

impl TryFrom<EaseSpec> for Easing {
    type Error = RevealError;

    /// Built-ins only; custom names need an [`EasingRegistry`].
    fn try_from(spec: EaseSpec) -> Result<Self> {
        EasingRegistry::default().resolve(&spec)
    }
}

impl From<Easing> for EaseSpec {
    fn from(easing: Easing) -> Self {
        match easing {
            Easing::Linear => EaseSpec::Named("linear".into()),
            Easing::CubicBezier(ctrl) => EaseSpec::Bezier(ctrl),
            Easing::Spring(params) => EaseSpec::Spring(SpringSpec {
                kind: "spring".into(),
                params,
            }),
            Easing::Custom { name, .. } => EaseSpec::Named(name),
        }
    }
}

/// Name -> custom easing table consulted after the built-ins.
#[derive(Default)]
pub struct EasingRegistry {
    custom: HashMap<String, Arc<dyn EaseFn>>,
}

impl fmt::Debug for EasingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EasingRegistry")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EasingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a named custom easing.
    pub fn register(&mut self, name: &str, f: Arc<dyn EaseFn>) {
        self.custom.insert(name.to_string(), f);
    }

    pub fn contains(&self, name: &str) -> bool {
        Easing::builtin(name).is_some() || self.custom.contains_key(name)
    }

    pub fn resolve(&self, spec: &EaseSpec) -> Result<Easing> {
        match spec {
            EaseSpec::Named(name) => {
                if let Some(builtin) = Easing::builtin(name) {
                    return Ok(builtin);
                }
                self.custom
                    .get(name)
                    .map(|f| Easing::Custom {
                        name: name.clone(),
                        f: Arc::clone(f),
                    })
                    .ok_or_else(|| RevealError::UnknownEasing { name: name.clone() })
            }
            EaseSpec::Bezier(ctrl) => {
                if ctrl.iter().any(|c| !c.is_finite()) || !(0.0..=1.0).contains(&ctrl[0]) || !(0.0..=1.0).contains(&ctrl[2]) {
                    return Err(RevealError::InvalidParameter {
                        reason: format!("cubic bezier x control points must lie in [0,1]: {ctrl:?}"),
                    });
                }
                Ok(Easing::CubicBezier(*ctrl))
            }
            EaseSpec::Spring(spring) => {
                if spring.kind != "spring" {
                    return Err(RevealError::UnknownEasing {
                        name: spring.kind.clone(),
                    });
                }
                spring
                    .params
                    .validate()
                    .map_err(|reason| RevealError::InvalidParameter { reason })?;
                Ok(Easing::Spring(spring.params))
            }
        }
    }
}
