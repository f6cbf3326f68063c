//! Engine: owns targets, variants and the observer, and steps them once per frame.
//!
//! Methods:
//! - new, define_variant / load_variants_json, register_easing
//! - attach, attach_child, detach
//! - update / update_with_hook (geometry → commands → observe → gate → machines → frames)

use std::sync::Arc;

use hashbrown::HashMap;

use crate::config::{Config, DEFAULT_DURATION};
use crate::error::{Result, RevealError};
use crate::geometry::{Rect, ViewportRegion};
use crate::ids::{ElementHandle, IdAllocator, SubscriptionId, TargetId, VariantId};
use crate::inputs::{AttachCfg, Inputs, RevealCommand};
use crate::interp::{EaseFn, EasingRegistry};
use crate::machine::{AnimState, Machine};
use crate::observer::{thresholds_for, ViewportObserver};
use crate::outputs::{Outputs, RevealEvent, StyleFrame};
use crate::policy::{should_fire, Presence, TriggerMode, TriggerPolicy};
use crate::style::StyleSnapshot;
use crate::variant::{parse_variants_json, Transition, Variant, VariantDef, VariantRef, VariantRegistry};

/// Receives events as they are emitted during a tick.
pub trait TickHook {
    fn on_event(&mut self, event: &RevealEvent, ctl: &mut TickControl);
}

impl<F> TickHook for F
where
    F: FnMut(&RevealEvent, &mut TickControl),
{
    fn on_event(&mut self, event: &RevealEvent, ctl: &mut TickControl) {
        self(event, ctl)
    }
}

/// Requests a hook can make mid-tick. Detaches take effect immediately (the target
/// stops receiving records and frames) but storage is reclaimed at the end of the tick.
#[derive(Debug, Default)]
pub struct TickControl {
    detaches: Vec<ElementHandle>,
}

impl TickControl {
    pub fn detach(&mut self, handle: &str) {
        self.detaches.push(handle.to_string());
    }
}

/// A registered element.
#[derive(Debug)]
struct Target {
    id: TargetId,
    handle: ElementHandle,
    variant: Arc<Variant>,
    policy: TriggerPolicy,
    region: ViewportRegion,
    bounds: Option<Rect>,
    subscription: Option<SubscriptionId>,
    parent: Option<TargetId>,
    children: Vec<TargetId>,
    presence: Presence,
    machine: Machine,
    last_style: Option<StyleSnapshot>,
    alive: bool,
}

impl Target {
    fn transition(&self) -> &Transition {
        &self.variant.transition
    }
}

/// Reveal engine (core), driven by the host's per-frame callback.
#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    variants: VariantRegistry,
    easings: EasingRegistry,
    observer: ViewportObserver,
    targets: Vec<Target>,
    handles: HashMap<ElementHandle, TargetId>,

    now: f32,
    viewport: Option<Rect>,
    degraded: bool,

    // Per-tick outputs
    outputs: Outputs,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    /// Create a new engine with the given config.
    pub fn new(cfg: Config) -> Self {
        let degraded = !cfg.geometry_available;
        Self {
            cfg,
            ids: IdAllocator::new(),
            variants: VariantRegistry::new(),
            easings: EasingRegistry::new(),
            observer: ViewportObserver::new(),
            targets: Vec::new(),
            handles: HashMap::new(),
            now: 0.0,
            viewport: None,
            degraded,
            outputs: Outputs::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Frame clock in seconds (sum of all `dt`s).
    pub fn now(&self) -> f32 {
        self.now
    }

    /// True once the engine fell back to showing everything immediately.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    // ---- Variants ----

    /// Register a named variant from snapshots.
    pub fn define_variant(
        &mut self,
        name: &str,
        hidden: StyleSnapshot,
        visible: StyleSnapshot,
        transition: Transition,
    ) -> Result<VariantId> {
        let variant = Variant::new(name, hidden, visible, transition)?;
        self.variants.define(variant, &mut self.ids)
    }

    /// Register a variant from its JSON-shaped definition.
    pub fn define_variant_def(&mut self, def: &VariantDef) -> Result<VariantId> {
        let variant = Variant::from_def(def, &self.cfg.default_transition, &self.easings)?;
        self.variants.define(variant, &mut self.ids)
    }

    /// Define every variant in a JSON document. Valid definitions are kept even when a
    /// sibling fails; the first failure is returned.
    pub fn load_variants_json(&mut self, json: &str) -> Result<Vec<VariantId>> {
        let defs = parse_variants_json(json)?;
        let mut ids = Vec::with_capacity(defs.len());
        let mut first_err = None;
        for def in &defs {
            match self.define_variant_def(def) {
                Ok(id) => ids.push(id),
                Err(err) => {
                    log::warn!("variant '{}' rejected: {err}", def.name);
                    first_err.get_or_insert(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(ids),
        }
    }

    pub fn variant(&self, name: &str) -> Option<Arc<Variant>> {
        self.variants.get(name).cloned()
    }

    /// Register a custom easing referenced by name from variant definitions.
    pub fn register_easing(&mut self, name: &str, f: Arc<dyn EaseFn>) {
        self.easings.register(name, f);
    }

    fn resolve_variant(&self, handle: &str, variant: &VariantRef) -> Result<Arc<Variant>> {
        match variant {
            VariantRef::Named(name) => self
                .variants
                .get(name)
                .cloned()
                .ok_or_else(|| RevealError::UnknownVariant { name: name.clone() }),
            VariantRef::Inline(def) => {
                let mut def = def.clone();
                if def.name.is_empty() {
                    def.name = handle.to_string();
                }
                Variant::from_def(&def, &self.cfg.default_transition, &self.easings).map(Arc::new)
            }
        }
    }

    // ---- Targets ----

    /// Attach an element. Fails with `InvalidTarget` for observed targets without
    /// measurable bounds; the caller should then show the element as-is.
    pub fn attach(&mut self, handle: &str, cfg: AttachCfg) -> Result<TargetId> {
        if self.handles.contains_key(handle) {
            return Err(RevealError::DuplicateTarget {
                handle: handle.to_string(),
            });
        }
        let variant = self.resolve_variant(handle, &cfg.variant)?;
        let policy = cfg.policy.unwrap_or(self.cfg.default_policy);
        policy.validate()?;
        let region = cfg.region.unwrap_or(self.cfg.default_region);

        let id = self.ids.alloc_target();
        let mut subscription = None;
        if !self.degraded && policy.mode != TriggerMode::Manual {
            let bounds = cfg.bounds.ok_or_else(|| RevealError::InvalidTarget {
                handle: handle.to_string(),
                reason: "element is detached (no bounds)".into(),
            })?;
            subscription = Some(self.observer.register(
                &mut self.ids,
                id,
                handle,
                bounds,
                region,
                thresholds_for(policy.amount),
            )?);
        }

        let mut target = Target {
            id,
            handle: handle.to_string(),
            variant,
            policy,
            region,
            bounds: cfg.bounds,
            subscription,
            parent: None,
            children: Vec::new(),
            presence: Presence::Hidden,
            machine: Machine::new(),
            last_style: None,
            alive: true,
        };
        if self.degraded {
            target.presence = Presence::Visible;
            target.machine.snap_visible();
        }
        log::debug!("attach {handle} as {id:?} ({:?}, amount {})", policy.mode, policy.amount);
        self.targets.push(target);
        self.handles.insert(handle.to_string(), id);
        Ok(id)
    }

    /// Attach an element whose reveal is orchestrated by `parent`: it enters when the
    /// parent enters, offset by the parent's stagger, and exits with it.
    pub fn attach_child(&mut self, parent: &str, handle: &str, variant: VariantRef) -> Result<TargetId> {
        if self.handles.contains_key(handle) {
            return Err(RevealError::DuplicateTarget {
                handle: handle.to_string(),
            });
        }
        let parent_id = self.lookup(parent)?;
        let variant = self.resolve_variant(handle, &variant)?;
        let pidx = self
            .index_of(parent_id)
            .ok_or_else(|| RevealError::UnknownTarget {
                handle: parent.to_string(),
            })?;
        let parent_policy = self.targets[pidx].policy;
        let parent_region = self.targets[pidx].region;
        let parent_presence = self.targets[pidx].presence;

        let id = self.ids.alloc_target();
        let mut target = Target {
            id,
            handle: handle.to_string(),
            variant,
            policy: parent_policy,
            region: parent_region,
            bounds: None,
            subscription: None,
            parent: Some(parent_id),
            children: Vec::new(),
            presence: Presence::Hidden,
            machine: Machine::new(),
            last_style: None,
            alive: true,
        };
        if self.degraded {
            target.presence = Presence::Visible;
            target.machine.snap_visible();
        } else if parent_presence == Presence::Visible {
            // Late child of an already revealed parent: enter now with its own delay only.
            let delay = target.transition().delay;
            let duration = target.transition().effective_duration(self.fallback_duration());
            target.machine.fire_enter(self.now, delay, duration);
            target.presence = Presence::Visible;
        }
        self.targets[pidx].children.push(id);
        self.targets.push(target);
        self.handles.insert(handle.to_string(), id);
        log::debug!("attach child {handle} as {id:?} under {parent}");
        Ok(id)
    }

    /// Release everything held for an element (and its children). Calling again is a no-op.
    pub fn detach(&mut self, handle: &str) {
        if self.mark_dead(handle) {
            self.sweep();
        }
    }

    pub fn target_id(&self, handle: &str) -> Option<TargetId> {
        self.handles.get(handle).copied()
    }

    pub fn state(&self, handle: &str) -> Option<AnimState> {
        self.get(handle).map(|t| t.machine.state())
    }

    pub fn presence(&self, handle: &str) -> Option<Presence> {
        self.get(handle).map(|t| t.presence)
    }

    /// Style the element should show at the current clock.
    pub fn style(&self, handle: &str) -> Option<StyleSnapshot> {
        self.get(handle).map(|t| self.sample(t))
    }

    /// Whether the observer is still watching the element. False for manual targets,
    /// once-targets that already entered, and anything detached.
    pub fn is_observed(&self, handle: &str) -> bool {
        self.get(handle)
            .and_then(|t| t.subscription)
            .is_some_and(|sub| self.observer.is_live(sub))
    }

    /// Number of attached targets.
    pub fn target_count(&self) -> usize {
        self.targets.iter().filter(|t| t.alive).count()
    }

    fn lookup(&self, handle: &str) -> Result<TargetId> {
        self.target_id(handle).ok_or_else(|| RevealError::UnknownTarget {
            handle: handle.to_string(),
        })
    }

    fn get(&self, handle: &str) -> Option<&Target> {
        let id = self.target_id(handle)?;
        self.targets.iter().find(|t| t.id == id && t.alive)
    }

    fn index_of(&self, id: TargetId) -> Option<usize> {
        self.targets.iter().position(|t| t.id == id && t.alive)
    }

    /// Duration for transitions that set none and whose easing implies none.
    fn fallback_duration(&self) -> f32 {
        self.cfg.default_transition.effective_duration(DEFAULT_DURATION)
    }

    fn sample(&self, t: &Target) -> StyleSnapshot {
        let v = &t.variant;
        t.machine.sample(&v.hidden, &v.visible, &v.transition.ease, self.now)
    }

    /// Mark a target and its descendants dead. Returns whether anything was live.
    fn mark_dead(&mut self, handle: &str) -> bool {
        let Some(root) = self.handles.remove(handle) else {
            return false;
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(idx) = self.index_of(id) else {
                continue;
            };
            let t = &mut self.targets[idx];
            t.alive = false;
            if let Some(sub) = t.subscription.take() {
                self.observer.unregister(sub);
            }
            stack.extend(t.children.iter().copied());
            let child_handle = t.handle.clone();
            let parent = t.parent;
            if id != root {
                self.handles.remove(&child_handle);
            }
            if let Some(pidx) = parent.and_then(|p| self.index_of(p)) {
                self.targets[pidx].children.retain(|c| *c != id);
            }
            log::debug!("detach {child_handle} ({id:?})");
        }
        true
    }

    fn sweep(&mut self) {
        self.targets.retain(|t| t.alive);
        self.observer.sweep();
    }

    // ---- Stepping ----

    /// Step by dt seconds with this frame's inputs.
    pub fn update(&mut self, dt: f32, inputs: Inputs) -> &Outputs {
        self.update_with_hook(dt, inputs, &mut |_: &RevealEvent, _: &mut TickControl| {})
    }

    /// Step by dt seconds, reporting each event to `hook` as it is emitted.
    pub fn update_with_hook(&mut self, dt: f32, inputs: Inputs, hook: &mut dyn TickHook) -> &Outputs {
        self.outputs.clear();
        // 1) Advance the frame clock
        if dt.is_finite() && dt > 0.0 {
            self.now += dt;
        }
        let now = self.now;

        // 2) Degrade when the host can't measure anything
        if inputs.geometry_unavailable && !self.degraded {
            self.degrade(hook);
        }

        // 3) Geometry changes
        for upd in &inputs.geometry {
            let Some(idx) = self.target_id(&upd.handle).and_then(|id| self.index_of(id)) else {
                continue;
            };
            let t = &mut self.targets[idx];
            t.bounds = Some(upd.bounds);
            if let Some(sub) = t.subscription {
                self.observer.set_bounds(sub, upd.bounds);
            }
        }

        // 4) Commands
        for cmd in inputs.commands {
            self.apply_command(cmd, now, hook);
        }

        // 5) Observe and gate
        if let Some(vp) = inputs.viewport {
            self.viewport = Some(vp);
        }
        if let (false, Some(vp)) = (self.degraded, self.viewport) {
            for record in self.observer.observe(&vp, now) {
                let Some(idx) = self.index_of(record.target) else {
                    continue;
                };
                let t = &self.targets[idx];
                let decision = should_fire(&record, &t.policy, t.presence);
                let id = t.id;
                if decision.fire_enter {
                    self.fire_enter(id, now, 0.0, hook);
                    self.release_if_once(id);
                } else if decision.fire_exit {
                    self.fire_exit(id, now, hook);
                }
            }
        }

        // 6) Settle finished runs
        for idx in 0..self.targets.len() {
            if !self.targets[idx].alive {
                continue;
            }
            if let Some(state) = self.targets[idx].machine.advance(now) {
                let t = &self.targets[idx];
                log::debug!("{} settled {state:?}", t.handle);
                let event = RevealEvent::Settled {
                    target: t.id,
                    handle: t.handle.clone(),
                    state,
                };
                self.emit(event, hook);
            }
        }

        // 7) Style frames
        for idx in 0..self.targets.len() {
            if !self.targets[idx].alive {
                continue;
            }
            let style = self.sample(&self.targets[idx]);
            let t = &mut self.targets[idx];
            let changed = t.last_style.as_ref() != Some(&style);
            if self.cfg.emit_settled_frames || changed {
                self.outputs.push_frame(StyleFrame {
                    target: t.id,
                    handle: t.handle.clone(),
                    state: t.machine.state(),
                    style: style.clone(),
                });
            }
            t.last_style = Some(style);
        }

        // 8) Reclaim anything detached during the tick
        self.sweep();
        &self.outputs
    }

    fn emit(&mut self, event: RevealEvent, hook: &mut dyn TickHook) {
        let mut ctl = TickControl::default();
        hook.on_event(&event, &mut ctl);
        self.outputs.push_event(event);
        for handle in ctl.detaches {
            self.mark_dead(&handle);
        }
    }

    /// Enter `id` and its descendants. `offset` is the stagger delay accumulated from ancestors.
    fn fire_enter(&mut self, id: TargetId, now: f32, offset: f32, hook: &mut dyn TickHook) {
        let Some(idx) = self.index_of(id) else {
            return;
        };
        let fallback = self.fallback_duration();
        let t = &mut self.targets[idx];
        if t.presence == Presence::Visible {
            return;
        }
        let tr = t.variant.transition.clone();
        let duration = tr.effective_duration(fallback);
        t.machine.fire_enter(now, offset + tr.delay, duration);
        t.presence = Presence::Visible;
        let children = t.children.clone();
        let event = RevealEvent::Enter {
            target: t.id,
            handle: t.handle.clone(),
        };
        log::debug!("enter {} at {now:.3}", t.handle);
        self.emit(event, hook);

        for (i, child) in children.into_iter().enumerate() {
            let child_offset = offset + tr.delay_children + i as f32 * tr.stagger_children;
            self.fire_enter(child, now, child_offset, hook);
        }
    }

    /// Exit `id` and its descendants together.
    fn fire_exit(&mut self, id: TargetId, now: f32, hook: &mut dyn TickHook) {
        let Some(idx) = self.index_of(id) else {
            return;
        };
        let fallback = self.fallback_duration();
        let t = &mut self.targets[idx];
        if t.presence == Presence::Hidden {
            return;
        }
        let duration = t.transition().effective_duration(fallback);
        t.machine.fire_exit(now, duration);
        t.presence = Presence::Hidden;
        let children = t.children.clone();
        let event = RevealEvent::Exit {
            target: t.id,
            handle: t.handle.clone(),
        };
        log::debug!("exit {} at {now:.3}", t.handle);
        self.emit(event, hook);

        for child in children {
            self.fire_exit(child, now, hook);
        }
    }

    /// A once-target never needs another record after its enter.
    fn release_if_once(&mut self, id: TargetId) {
        if let Some(idx) = self.index_of(id) {
            let t = &mut self.targets[idx];
            if t.policy.mode == TriggerMode::Once {
                if let Some(sub) = t.subscription.take() {
                    self.observer.unregister(sub);
                }
            }
        }
    }

    fn apply_command(&mut self, cmd: RevealCommand, now: f32, hook: &mut dyn TickHook) {
        if self.degraded {
            return;
        }
        let Some(idx) = self.target_id(cmd.handle()).and_then(|id| self.index_of(id)) else {
            log::debug!("command for unknown target {}", cmd.handle());
            return;
        };
        let t = &self.targets[idx];
        if t.parent.is_some() {
            log::debug!("{} is driven by its parent; ignoring {cmd:?}", t.handle);
            return;
        }
        let (id, mode, presence) = (t.id, t.policy.mode, t.presence);
        let hide_allowed = mode != TriggerMode::Once;
        match cmd {
            RevealCommand::Show { .. } => {
                self.fire_enter(id, now, 0.0, hook);
                self.release_if_once(id);
            }
            RevealCommand::Hide { .. } if hide_allowed => self.fire_exit(id, now, hook),
            RevealCommand::Toggle { .. } => match presence {
                Presence::Hidden => {
                    self.fire_enter(id, now, 0.0, hook);
                    self.release_if_once(id);
                }
                Presence::Visible if hide_allowed => self.fire_exit(id, now, hook),
                Presence::Visible => {}
            },
            RevealCommand::Replay { .. } => self.replay(id, now, hook),
            RevealCommand::Hide { .. } => {
                log::debug!("once-target {:?} ignores hide", id);
            }
        }
    }

    /// Restart a target tree. A revealed tree exits first, so enter and exit fires keep
    /// alternating. Every target in the tree then gets a fresh `TargetId` (a new
    /// lifetime), snaps to Hidden and the root is resubscribed, so the next qualifying
    /// observation reveals it again.
    fn replay(&mut self, id: TargetId, now: f32, hook: &mut dyn TickHook) {
        self.fire_exit(id, now, hook);

        let mut tree = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(idx) = self.index_of(cur) else {
                continue;
            };
            tree.push(cur);
            stack.extend(self.targets[idx].children.iter().copied());
        }
        if tree.is_empty() {
            return;
        }
        let renamed: Vec<(TargetId, TargetId)> =
            tree.iter().map(|old| (*old, self.ids.alloc_target())).collect();
        let rename = |old: TargetId| {
            renamed
                .iter()
                .find_map(|(from, to)| (*from == old).then_some(*to))
                .unwrap_or(old)
        };
        for (old, new) in &renamed {
            let Some(idx) = self.index_of(*old) else {
                continue;
            };
            let t = &mut self.targets[idx];
            t.id = *new;
            t.parent = t.parent.map(rename);
            t.children = t.children.iter().copied().map(rename).collect();
            t.machine.reset();
            t.presence = Presence::Hidden;
            self.handles.insert(t.handle.clone(), *new);
        }
        let root = rename(id);
        log::debug!("replay {id:?} as {root:?}");

        let Some(idx) = self.index_of(root) else {
            return;
        };
        let t = &mut self.targets[idx];
        if let Some(sub) = t.subscription.take() {
            self.observer.unregister(sub);
        }
        if t.policy.mode == TriggerMode::Manual {
            return;
        }
        let Some(bounds) = t.bounds else {
            log::warn!("cannot replay {}: no bounds", t.handle);
            return;
        };
        match self.observer.register(
            &mut self.ids,
            t.id,
            &t.handle,
            bounds,
            t.region,
            thresholds_for(t.policy.amount),
        ) {
            Ok(sub) => t.subscription = Some(sub),
            Err(err) => log::warn!("cannot replay {}: {err}", t.handle),
        }
    }

    /// Switch permanently to the always-visible fallback.
    fn degrade(&mut self, hook: &mut dyn TickHook) {
        log::warn!("geometry unavailable; revealing all targets without animation");
        self.degraded = true;
        for t in self.targets.iter_mut().filter(|t| t.alive) {
            if let Some(sub) = t.subscription.take() {
                self.observer.unregister(sub);
            }
            t.machine.snap_visible();
            t.presence = Presence::Visible;
        }
        self.emit(RevealEvent::Degraded, hook);
    }
}
