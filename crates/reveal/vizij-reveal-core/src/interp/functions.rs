//! Interpolation helpers:
//! - lerp_f32 (endpoint-exact scalar blend)
//! - bezier_ease (cubic-bezier timing curve)
//! - interpolate (component-wise blend between two style snapshots)

use crate::style::StyleSnapshot;

/// Linear interpolation of scalars. Exact at t == 0 and t == 1.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Given control points (x1, y1, x2, y2) and an input t in [0,1],
/// compute the eased y by inverting the x bezier via binary search.
#[inline]
pub fn bezier_ease(t: f32, ctrl: [f32; 4]) -> f32 {
    let [x1, y1, x2, y2] = ctrl;
    let t = t.clamp(0.0, 1.0);
    // Bezier(0,0,1,1) is exactly linear
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    // Monotonic X in [0,1] assumed for x1/x2 in [0,1]
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

/// Component-wise blend of two snapshots at an eased position.
///
/// Returns `hidden` verbatim at 0 and `visible` verbatim at 1. Properties missing from
/// `visible` keep their hidden value (variants are validated, so this is fail-soft only).
pub fn interpolate(hidden: &StyleSnapshot, visible: &StyleSnapshot, eased: f32) -> StyleSnapshot {
    if eased == 0.0 {
        return hidden.clone();
    }
    if eased == 1.0 {
        return visible.clone();
    }
    hidden
        .iter()
        .map(|(prop, from)| {
            let to = visible.get(prop).unwrap_or(from);
            (prop, lerp_f32(from, to, eased))
        })
        .collect()
}
