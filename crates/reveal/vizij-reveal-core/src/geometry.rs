//! Viewport geometry: rectangles in document space, root margins and intersection ratios.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in document coordinates (y grows downward).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// A rect the observer can compute a ratio against: finite and with positive area.
    pub fn is_measurable(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Overlapping region, or None when the rects are disjoint.
    /// Edge-adjacent rects yield a zero-area intersection.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Translate vertically, as scrolling a viewport does.
    pub fn offset_y(&self, dy: f32) -> Rect {
        Rect::new(self.x, self.y + dy, self.width, self.height)
    }
}

/// Root margin applied to the viewport before intersecting.
/// Positive values grow the region, negative values shrink it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margin {
    pub const fn uniform(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

/// Region of the viewport a target must intersect to count as visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportRegion {
    pub margin: Margin,
}

impl ViewportRegion {
    pub const fn with_margin(margin: Margin) -> Self {
        Self { margin }
    }

    /// Apply the margin to a viewport rect. A margin that inverts the rect yields an empty region.
    pub fn resolve(&self, viewport: &Rect) -> Rect {
        let m = self.margin;
        let width = (viewport.width + m.left + m.right).max(0.0);
        let height = (viewport.height + m.top + m.bottom).max(0.0);
        Rect::new(viewport.x - m.left, viewport.y - m.top, width, height)
    }
}

/// Fraction of `target`'s area inside the region, plus whether they intersect at all.
///
/// A fully contained target reports exactly 1.0. Unmeasurable targets report (0.0, false).
pub fn intersection_ratio(target: &Rect, viewport: &Rect, region: &ViewportRegion) -> (f32, bool) {
    if !target.is_measurable() {
        return (0.0, false);
    }
    let root = region.resolve(viewport);
    if root.area() <= 0.0 {
        return (0.0, false);
    }
    match target.intersection(&root) {
        Some(hit) => {
            if hit == *target {
                return (1.0, true);
            }
            let ratio = (hit.area() / target.area()).clamp(0.0, 1.0);
            (ratio, true)
        }
        None => (0.0, false),
    }
}
