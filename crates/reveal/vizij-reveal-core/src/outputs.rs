//! Output contracts from the reveal engine.
//!
//! Each tick yields one style frame per live target (the per-target style stream) and
//! the discrete events fired during that tick. Adapters apply the frames to elements.

use serde::{Deserialize, Serialize};

use crate::ids::{ElementHandle, TargetId};
use crate::machine::AnimState;
use crate::style::StyleSnapshot;

/// Style to apply to one element this frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleFrame {
    pub target: TargetId,
    pub handle: ElementHandle,
    pub state: AnimState,
    pub style: StyleSnapshot,
}

/// Discrete signals emitted during a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RevealEvent {
    /// The gate fired an enter; the target is now Entering.
    Enter {
        target: TargetId,
        handle: ElementHandle,
    },
    /// The gate fired an exit; the target is now Exiting.
    Exit {
        target: TargetId,
        handle: ElementHandle,
    },
    /// A run finished and the target rests in `state`.
    Settled {
        target: TargetId,
        handle: ElementHandle,
        state: AnimState,
    },
    /// Geometry is unavailable; every target is shown without animation from now on.
    Degraded,
}

impl RevealEvent {
    pub fn target(&self) -> Option<TargetId> {
        match self {
            RevealEvent::Enter { target, .. }
            | RevealEvent::Exit { target, .. }
            | RevealEvent::Settled { target, .. } => Some(*target),
            RevealEvent::Degraded => None,
        }
    }
}

/// Outputs returned by Engine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub frames: Vec<StyleFrame>,
    #[serde(default)]
    pub events: Vec<RevealEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.frames.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_frame(&mut self, frame: StyleFrame) {
        self.frames.push(frame);
    }

    #[inline]
    pub fn push_event(&mut self, event: RevealEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty() && self.events.is_empty()
    }

    /// Frame for a handle, if one was emitted this tick.
    pub fn frame(&self, handle: &str) -> Option<&StyleFrame> {
        self.frames.iter().find(|f| f.handle == handle)
    }
}
