//! Input contracts for the reveal engine.
//!
//! The view layer builds one `Inputs` per frame: the current viewport, any element
//! geometry that changed, and explicit commands (menu toggles, replays).

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, ViewportRegion};
use crate::ids::ElementHandle;
use crate::policy::TriggerPolicy;
use crate::variant::VariantRef;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Inputs {
    /// Current viewport in document coordinates. None keeps the last known viewport.
    #[serde(default)]
    pub viewport: Option<Rect>,
    /// The host cannot measure geometry at all (non-visual context). Degrades the engine
    /// permanently: every target is shown immediately.
    #[serde(default)]
    pub geometry_unavailable: bool,
    /// Element bounds that changed since the previous frame.
    #[serde(default)]
    pub geometry: Vec<GeometryUpdate>,
    /// Commands applied before observation.
    #[serde(default)]
    pub commands: Vec<RevealCommand>,
}

impl Inputs {
    pub fn with_viewport(viewport: Rect) -> Self {
        Self {
            viewport: Some(viewport),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryUpdate {
    pub handle: ElementHandle,
    pub bounds: Rect,
}

/// Explicit, observer-independent triggers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RevealCommand {
    /// Enter if currently hidden.
    Show { handle: ElementHandle },
    /// Exit if currently visible. Ignored for once-targets.
    Hide { handle: ElementHandle },
    /// Show when hidden, hide when visible.
    Toggle { handle: ElementHandle },
    /// Exit if visible, then restart hidden under a fresh `TargetId`.
    Replay { handle: ElementHandle },
}

impl RevealCommand {
    pub fn handle(&self) -> &str {
        match self {
            RevealCommand::Show { handle }
            | RevealCommand::Hide { handle }
            | RevealCommand::Toggle { handle }
            | RevealCommand::Replay { handle } => handle,
        }
    }
}

/// Configuration for attaching a target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttachCfg {
    pub variant: VariantRef,
    /// Policy override; the engine default applies when absent.
    #[serde(default)]
    pub policy: Option<TriggerPolicy>,
    /// Current bounds. Required unless the policy is manual; None means "detached".
    #[serde(default)]
    pub bounds: Option<Rect>,
    #[serde(default)]
    pub region: Option<ViewportRegion>,
}

impl AttachCfg {
    pub fn new(variant: impl Into<VariantRef>, bounds: Rect) -> Self {
        Self {
            variant: variant.into(),
            policy: None,
            bounds: Some(bounds),
            region: None,
        }
    }

    /// A manually driven target (no geometry needed).
    pub fn manual(variant: impl Into<VariantRef>) -> Self {
        Self {
            variant: variant.into(),
            policy: Some(TriggerPolicy::manual()),
            bounds: None,
            region: None,
        }
    }

    pub fn with_policy(mut self, policy: TriggerPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_region(mut self, region: ViewportRegion) -> Self {
        self.region = Some(region);
        self
    }
}
