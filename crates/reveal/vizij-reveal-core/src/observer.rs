//! Viewport observer: tracks registered targets against the viewport and reports
//! threshold crossings.
//!
//! Records are only emitted when a target's intersection ratio moves into a different
//! threshold bucket (entering the region, passing the policy amount, becoming fully
//! contained, and the reverse), not on every scrolled pixel. The first observation of a
//! subscription always emits.
//!
//! `unregister` only marks a subscription dead; the slot is reclaimed by `sweep`, which
//! the engine runs at the end of each tick.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RevealError};
use crate::geometry::{intersection_ratio, Rect, ViewportRegion};
use crate::ids::{IdAllocator, SubscriptionId, TargetId};

/// Per-target intersection sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub target: TargetId,
    /// Visible fraction of the target's area, 0.0..=1.0.
    pub ratio: f32,
    pub is_intersecting: bool,
    /// Frame clock time of the sample.
    pub time: f32,
}

#[derive(Debug)]
struct Subscription {
    id: SubscriptionId,
    target: TargetId,
    bounds: Rect,
    region: ViewportRegion,
    thresholds: Vec<f32>,
    last_bucket: Option<usize>,
    latest: Option<ObservationRecord>,
    alive: bool,
}

/// Threshold set for a policy amount: always includes 0 (enter/exit) and 1 (fully contained).
pub fn thresholds_for(amount: f32) -> Vec<f32> {
    let mut t = vec![0.0, amount.clamp(0.0, 1.0), 1.0];
    t.sort_by(f32::total_cmp);
    t.dedup();
    t
}

/// Number of thresholds satisfied. Threshold 0 is satisfied by any intersection.
fn bucket(ratio: f32, is_intersecting: bool, thresholds: &[f32]) -> usize {
    thresholds
        .iter()
        .filter(|t| {
            if **t == 0.0 {
                is_intersecting
            } else {
                ratio >= **t
            }
        })
        .count()
}

#[derive(Debug, Default)]
pub struct ViewportObserver {
    subs: Vec<Subscription>,
}

impl ViewportObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin watching `target`. Fails with `InvalidTarget` when `bounds` can't be measured.
    pub fn register(
        &mut self,
        ids: &mut IdAllocator,
        target: TargetId,
        handle: &str,
        bounds: Rect,
        region: ViewportRegion,
        thresholds: Vec<f32>,
    ) -> Result<SubscriptionId> {
        if !bounds.is_measurable() {
            return Err(RevealError::InvalidTarget {
                handle: handle.to_string(),
                reason: format!("no measurable geometry ({bounds:?})"),
            });
        }
        let id = ids.alloc_subscription();
        self.subs.push(Subscription {
            id,
            target,
            bounds,
            region,
            thresholds,
            last_bucket: None,
            latest: None,
            alive: true,
        });
        Ok(id)
    }

    /// Stop watching. Returns whether the subscription was live; repeated calls are no-ops.
    pub fn unregister(&mut self, id: SubscriptionId) -> bool {
        match self.subs.iter_mut().find(|s| s.id == id && s.alive) {
            Some(sub) => {
                sub.alive = false;
                true
            }
            None => false,
        }
    }

    pub fn is_live(&self, id: SubscriptionId) -> bool {
        self.subs.iter().any(|s| s.id == id && s.alive)
    }

    /// Update a target's geometry (layout change, resize).
    pub fn set_bounds(&mut self, id: SubscriptionId, bounds: Rect) {
        if let Some(sub) = self.subs.iter_mut().find(|s| s.id == id && s.alive) {
            if !bounds.is_measurable() {
                log::warn!(
                    "target {:?} lost measurable geometry ({bounds:?}); treating as out of view",
                    sub.target
                );
            }
            sub.bounds = bounds;
        }
    }

    /// Most recent sample for a subscription; overwritten every observe.
    pub fn latest(&self, id: SubscriptionId) -> Option<ObservationRecord> {
        self.subs.iter().find(|s| s.id == id).and_then(|s| s.latest)
    }

    /// Sample every live subscription against `viewport`, returning the records whose
    /// threshold bucket changed since the previous observation.
    pub fn observe(&mut self, viewport: &Rect, now: f32) -> Vec<ObservationRecord> {
        let mut out = Vec::new();
        for sub in self.subs.iter_mut().filter(|s| s.alive) {
            let (ratio, is_intersecting) = intersection_ratio(&sub.bounds, viewport, &sub.region);
            let record = ObservationRecord {
                target: sub.target,
                ratio,
                is_intersecting,
                time: now,
            };
            sub.latest = Some(record);
            let b = bucket(ratio, is_intersecting, &sub.thresholds);
            if sub.last_bucket != Some(b) {
                log::trace!("observer: {:?} ratio={ratio:.3} bucket={b}", sub.target);
                sub.last_bucket = Some(b);
                out.push(record);
            }
        }
        out
    }

    /// Drop dead subscriptions. Run once per tick after all records were processed.
    pub fn sweep(&mut self) {
        self.subs.retain(|s| s.alive);
    }

    /// Live subscription count.
    pub fn len(&self) -> usize {
        self.subs.iter().filter(|s| s.alive).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
