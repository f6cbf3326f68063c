//! Variants: named hidden/visible snapshot pairs plus transition parameters.
//!
//! Definitions arrive either from Rust (`Variant::new`) or as JSON shaped like the
//! motion-library variant objects authored on the sites:
//!
//! ```json
//! { "name": "slideUp",
//!   "hidden":  { "y": 50, "opacity": 0 },
//!   "visible": { "y": 0, "opacity": 1,
//!                "transition": { "duration": 1.2, "ease": "easeInOut", "staggerChildren": 2 } } }
//! ```
//!
//! Variants are immutable once registered and shared between targets via `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RevealError};
use crate::ids::{IdAllocator, VariantId};
use crate::interp::{EaseSpec, Easing, EasingRegistry, SpringParams, SpringSpec};
use crate::style::StyleSnapshot;

/// Timing of a reveal. Seconds throughout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transition {
    /// Explicit duration; falls back to the easing's natural duration, then the engine default.
    pub duration: Option<f32>,
    /// Postpones the start of Entering (progress pinned at 0 meanwhile).
    pub delay: f32,
    pub ease: Easing,
    /// Offset between consecutive children's entering starts.
    pub stagger_children: f32,
    /// Extra offset before the first child starts.
    pub delay_children: f32,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            duration: None,
            delay: 0.0,
            ease: Easing::CubicBezier(crate::interp::EASE_OUT),
            stagger_children: 0.0,
            delay_children: 0.0,
        }
    }
}

impl Transition {
    /// Duration in seconds, resolved against the engine-wide fallback.
    pub fn effective_duration(&self, fallback: f32) -> f32 {
        self.duration
            .or_else(|| self.ease.natural_duration())
            .unwrap_or(fallback)
            .max(0.0)
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("duration", self.duration.unwrap_or(0.0)),
            ("delay", self.delay),
            ("staggerChildren", self.stagger_children),
            ("delayChildren", self.delay_children),
        ];
        for (field, v) in checks {
            if !v.is_finite() || v < 0.0 {
                return Err(RevealError::InvalidParameter {
                    reason: format!("transition.{field} must be a finite, non-negative number (got {v})"),
                });
            }
        }
        Ok(())
    }
}

/// Authoring form of a transition: every field optional, merged over the engine default.
///
/// Besides `ease`, a spring may be written the way motion transitions spell it, flat on
/// the transition: `{ "type": "spring", "stiffness": 150, "damping": 10, "delay": 0.2 }`.
/// Physics keys without a `type` also mean a spring. Unknown keys are rejected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TransitionDef {
    pub duration: Option<f32>,
    pub delay: Option<f32>,
    pub ease: Option<EaseSpec>,
    pub stagger_children: Option<f32>,
    pub delay_children: Option<f32>,
    /// `"spring"` or `"tween"`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damping: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass: Option<f32>,
}

impl TransitionDef {
    /// Fields set here override `base`.
    pub fn resolve(&self, base: &Transition, easings: &EasingRegistry) -> Result<Transition> {
        let spec = match self.flat_spring()? {
            Some(spring) => Some(spring),
            None => self.ease.clone(),
        };
        let ease = match &spec {
            Some(spec) => easings.resolve(spec)?,
            None => base.ease.clone(),
        };
        // A spring (or custom curve) chosen here brings its own duration unless one is set.
        let inherited = if spec.is_some() && ease.natural_duration().is_some() {
            None
        } else {
            base.duration
        };
        Ok(Transition {
            duration: self.duration.or(inherited),
            delay: self.delay.unwrap_or(base.delay),
            ease,
            stagger_children: self.stagger_children.unwrap_or(base.stagger_children),
            delay_children: self.delay_children.unwrap_or(base.delay_children),
        })
    }

    /// The spring spelled with flat `type`/`stiffness`/`damping`/`mass` keys, if any.
    fn flat_spring(&self) -> Result<Option<EaseSpec>> {
        let has_physics = self.stiffness.is_some() || self.damping.is_some() || self.mass.is_some();
        match self.kind.as_deref() {
            Some("spring") => {}
            None if has_physics => {}
            None | Some("tween") => return Ok(None),
            Some(other) => {
                return Err(RevealError::UnknownEasing {
                    name: other.to_string(),
                })
            }
        }
        let defaults = SpringParams::default();
        Ok(Some(EaseSpec::Spring(SpringSpec {
            kind: "spring".into(),
            params: SpringParams {
                stiffness: self.stiffness.unwrap_or(defaults.stiffness),
                damping: self.damping.unwrap_or(defaults.damping),
                mass: self.mass.unwrap_or(defaults.mass),
            },
        })))
    }

    fn overlay(&self, over: &TransitionDef) -> TransitionDef {
        TransitionDef {
            duration: over.duration.or(self.duration),
            delay: over.delay.or(self.delay),
            ease: over.ease.clone().or_else(|| self.ease.clone()),
            stagger_children: over.stagger_children.or(self.stagger_children),
            delay_children: over.delay_children.or(self.delay_children),
            kind: over.kind.clone().or_else(|| self.kind.clone()),
            stiffness: over.stiffness.or(self.stiffness),
            damping: over.damping.or(self.damping),
            mass: over.mass.or(self.mass),
        }
    }
}

/// The `visible` key may carry its own `transition`, as motion variants do.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibleDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionDef>,
    #[serde(flatten)]
    pub style: BTreeMap<String, f32>,
}

/// Unvalidated variant definition. `hidden`/`visible` are optional here so their absence
/// can be reported as [`RevealError::MissingVariantKey`] instead of a parse failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariantDef {
    pub name: String,
    pub hidden: Option<BTreeMap<String, f32>>,
    pub visible: Option<VisibleDef>,
    pub transition: Option<TransitionDef>,
}

/// Validated, immutable variant.
#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    pub name: String,
    pub hidden: StyleSnapshot,
    pub visible: StyleSnapshot,
    pub transition: Transition,
}

impl Variant {
    /// Build and validate a variant from snapshots.
    pub fn new(
        name: &str,
        hidden: StyleSnapshot,
        visible: StyleSnapshot,
        transition: Transition,
    ) -> Result<Self> {
        if name.is_empty() {
            return Err(RevealError::InvalidParameter {
                reason: "variant name must not be empty".into(),
            });
        }
        if let Some(property) = hidden.first_unpaired(&visible) {
            return Err(RevealError::PropertyMismatch {
                name: name.to_string(),
                property: property.to_string(),
            });
        }
        for (property, v) in hidden.iter().chain(visible.iter()) {
            if !v.is_finite() {
                return Err(RevealError::InvalidParameter {
                    reason: format!("variant '{name}': property '{property}' is not finite"),
                });
            }
        }
        transition.validate()?;
        Ok(Self {
            name: name.to_string(),
            hidden,
            visible,
            transition,
        })
    }

    /// Validate a JSON-shaped definition. `defaults` supplies unset transition fields.
    pub fn from_def(def: &VariantDef, defaults: &Transition, easings: &EasingRegistry) -> Result<Self> {
        let hidden = def.hidden.as_ref().ok_or_else(|| RevealError::MissingVariantKey {
            name: def.name.clone(),
            key: "hidden".into(),
        })?;
        let visible = def.visible.as_ref().ok_or_else(|| RevealError::MissingVariantKey {
            name: def.name.clone(),
            key: "visible".into(),
        })?;
        let outer = def.transition.clone().unwrap_or_default();
        let merged = match &visible.transition {
            Some(inner) => outer.overlay(inner),
            None => outer,
        };
        let transition = merged.resolve(defaults, easings)?;
        Variant::new(
            &def.name,
            hidden.iter().map(|(k, v)| (k.as_str(), *v)).collect(),
            visible.style.iter().map(|(k, v)| (k.as_str(), *v)).collect(),
            transition,
        )
    }
}

/// Either a registered variant name or an inline definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariantRef {
    Named(String),
    Inline(VariantDef),
}

impl From<&str> for VariantRef {
    fn from(name: &str) -> Self {
        VariantRef::Named(name.to_string())
    }
}

/// Registry of named variants.
#[derive(Debug, Default)]
pub struct VariantRegistry {
    by_name: HashMap<String, VariantId>,
    items: Vec<(VariantId, Arc<Variant>)>,
}

impl VariantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variant. Re-defining an identical variant returns the existing id;
    /// any difference is a [`RevealError::DuplicateVariant`].
    pub fn define(&mut self, variant: Variant, ids: &mut IdAllocator) -> Result<VariantId> {
        if let Some(existing) = self.by_name.get(&variant.name).copied() {
            return match self.get_by_id(existing) {
                Some(current) if **current == variant => Ok(existing),
                _ => Err(RevealError::DuplicateVariant { name: variant.name }),
            };
        }
        let id = ids.alloc_variant();
        self.by_name.insert(variant.name.clone(), id);
        self.items.push((id, Arc::new(variant)));
        Ok(id)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Variant>> {
        self.by_name.get(name).and_then(|id| self.get_by_id(*id))
    }

    pub fn get_by_id(&self, id: VariantId) -> Option<&Arc<Variant>> {
        self.items
            .iter()
            .find_map(|(vid, v)| if *vid == id { Some(v) } else { None })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VariantDoc {
    One(VariantDef),
    Many(Vec<VariantDef>),
    Named(BTreeMap<String, VariantDef>),
}

/// Parse variant definitions from JSON: a single definition, an array of definitions, or
/// an object keyed by variant name (`{ "slideUp": { "hidden": .., "visible": .. } }`).
pub fn parse_variants_json(json: &str) -> Result<Vec<VariantDef>> {
    let doc: VariantDoc = serde_json::from_str(json)?;
    Ok(match doc {
        VariantDoc::One(def) => vec![def],
        VariantDoc::Many(defs) => defs,
        VariantDoc::Named(map) => map
            .into_iter()
            .map(|(name, mut def)| {
                if def.name.is_empty() {
                    def.name = name;
                }
                def
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::EASE_IN_OUT;

    const SLIDE_UP: &str = r#"{
        "name": "slideUp",
        "hidden": { "y": 50, "opacity": 0 },
        "visible": { "y": 0, "opacity": 1,
            "transition": { "staggerChildren": 2, "duration": 1.2, "ease": "easeInOut" } }
    }"#;

    fn build(json: &str) -> Result<Variant> {
        let defs = parse_variants_json(json)?;
        Variant::from_def(&defs[0], &Transition::default(), &EasingRegistry::new())
    }

    #[test]
    fn nested_visible_transition_is_honoured() {
        let v = build(SLIDE_UP).unwrap();
        assert_eq!(v.hidden.get("y"), Some(50.0));
        assert_eq!(v.visible.get("opacity"), Some(1.0));
        assert_eq!(v.transition.duration, Some(1.2));
        assert_eq!(v.transition.stagger_children, 2.0);
        assert_eq!(v.transition.ease, Easing::CubicBezier(EASE_IN_OUT));
    }

    #[test]
    fn missing_keys_are_rejected() {
        let err = build(r#"{ "name": "a", "visible": { "opacity": 1 } }"#).unwrap_err();
        assert_eq!(
            err,
            RevealError::MissingVariantKey {
                name: "a".into(),
                key: "hidden".into()
            }
        );
        let err = build(r#"{ "name": "b", "hidden": { "opacity": 0 } }"#).unwrap_err();
        assert!(matches!(err, RevealError::MissingVariantKey { key, .. } if key == "visible"));
    }

    #[test]
    fn snapshots_must_share_properties() {
        let err = build(r#"{ "name": "c", "hidden": { "opacity": 0, "y": 10 }, "visible": { "opacity": 1 } }"#)
            .unwrap_err();
        assert_eq!(
            err,
            RevealError::PropertyMismatch {
                name: "c".into(),
                property: "y".into()
            }
        );
    }

    #[test]
    fn identical_redefinition_is_idempotent_but_changes_conflict() {
        let mut reg = VariantRegistry::new();
        let mut ids = IdAllocator::new();
        let v = build(SLIDE_UP).unwrap();
        let a = reg.define(v.clone(), &mut ids).unwrap();
        let b = reg.define(v.clone(), &mut ids).unwrap();
        assert_eq!(a, b);
        assert_eq!(reg.len(), 1);

        let mut changed = v;
        changed.visible.set("y", 10.0);
        assert_eq!(
            reg.define(changed, &mut ids),
            Err(RevealError::DuplicateVariant {
                name: "slideUp".into()
            })
        );
    }

    #[test]
    fn keyed_documents_take_names_from_keys() {
        let defs = parse_variants_json(
            r#"{ "zoomIn": { "hidden": { "scale": 0.5 }, "visible": { "scale": 1 } } }"#,
        )
        .unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "zoomIn");
    }

    #[test]
    fn negative_delay_is_invalid() {
        let err = build(r#"{ "name": "d", "hidden": { "x": 0 }, "visible": { "x": 1 }, "transition": { "delay": -1 } }"#)
            .unwrap_err();
        assert!(matches!(err, RevealError::InvalidParameter { .. }));
    }
}
