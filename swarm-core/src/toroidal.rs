//! Toroidal-space helpers.
//!
//! In a wrapped world the right edge touches the left edge and the bottom
//! edge touches the top.  Two objects near opposite edges are therefore
//! close, and the shortest vector between them crosses the seam.

use crate::{Rect, Vec2};

/// Fold a 1-D difference into `[-span/2, span/2)`.
#[inline(always)]
fn wrap_axis(delta: f32, span: f32) -> f32 {
    if span <= 0.0 {
        return delta;
    }
    let half = span * 0.5;
    let mut d = delta % span;
    if d >= half {
        d -= span;
    } else if d < -half {
        d += span;
    }
    d
}

/// Shortest vector from `start` to `end` on the torus spanned by `bounds`.
#[inline]
pub fn toroidal_delta(start: Vec2, end: Vec2, bounds: &Rect) -> Vec2 {
    Vec2::new(
        wrap_axis(end.x - start.x, bounds.width),
        wrap_axis(end.y - start.y, bounds.height),
    )
}

#[inline]
pub fn toroidal_distance_sq(a: Vec2, b: Vec2, bounds: &Rect) -> f32 {
    toroidal_delta(a, b, bounds).length_sq()
}

#[inline]
pub fn toroidal_distance(a: Vec2, b: Vec2, bounds: &Rect) -> f32 {
    toroidal_distance_sq(a, b, bounds).sqrt()
}

/// Map `p` back into `[origin, origin + size)` on both axes.
pub fn wrap_position(p: Vec2, bounds: &Rect) -> Vec2 {
    Vec2::new(
        wrap_coord(p.x, bounds.x, bounds.width),
        wrap_coord(p.y, bounds.y, bounds.height),
    )
}

#[inline(always)]
fn wrap_coord(v: f32, origin: f32, span: f32) -> f32 {
    if span <= 0.0 {
        return v;
    }
    let mut r = (v - origin).rem_euclid(span);
    // rem_euclid can round up to `span` for tiny negative inputs.
    if r >= span {
        r -= span;
    }
    origin + r
}
