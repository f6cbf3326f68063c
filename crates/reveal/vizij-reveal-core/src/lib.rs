//! Vizij Reveal Core (engine-agnostic)
//!
//! Scroll-triggered reveal animations for arbitrary trees of visual elements. The host
//! registers elements with their bounds, feeds the viewport every frame and applies the
//! style frames it gets back.
//!
//! - `observer`: intersection ratios and threshold-crossing records per target.
//! - `policy`: once / repeat / manual gating of records into enter and exit fires.
//! - `machine`: Hidden → Entering → Visible → Exiting state per target, time-driven runs.
//! - `variant` + `interp`: named hidden/visible snapshot pairs, easing curves, springs.
//! - `engine`: the public API tying it together, stepped once per frame.

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod inputs;
pub mod interp;
pub mod machine;
pub mod observer;
pub mod outputs;
pub mod policy;
pub mod style;
pub mod variant;

// Re-exports for consumers (adapters)
pub use config::Config;
pub use engine::{Engine, TickControl, TickHook};
pub use error::{Result, RevealError};
pub use geometry::{intersection_ratio, Margin, Rect, ViewportRegion};
pub use ids::{ElementHandle, SubscriptionId, TargetId, VariantId};
pub use inputs::{AttachCfg, GeometryUpdate, Inputs, RevealCommand};
pub use interp::{EaseFn, EaseSpec, Easing, EasingRegistry, SpringParams, EASE_IN, EASE_IN_OUT, EASE_OUT};
pub use machine::{AnimState, AnimationRun, Machine};
pub use observer::{ObservationRecord, ViewportObserver};
pub use outputs::{Outputs, RevealEvent, StyleFrame};
pub use policy::{should_fire, FireDecision, Presence, TriggerMode, TriggerPolicy};
pub use style::StyleSnapshot;
pub use variant::{parse_variants_json, Transition, Variant, VariantDef, VariantRef};
