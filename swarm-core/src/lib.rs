//! # swarm-core — geometry shared by the swarm crates
//!
//! Plain `Copy` value types for positions and world rectangles, plus the
//! toroidal-space helpers used by simulations whose world wraps at the edges.
//!
//! ## Modules
//!
//! - [`toroidal`] — shortest wrapped deltas, distances and position wrapping

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

pub mod toroidal;

pub use toroidal::{toroidal_delta, toroidal_distance, toroidal_distance_sq, wrap_position};

/// A 2-D point or vector in world units.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline(always)]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline(always)]
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    /// Both components are finite (not NaN or infinite).
    #[inline(always)]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    #[inline(always)]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    #[inline(always)]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    #[inline(always)]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned world rectangle stored as origin + size.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline(always)]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin.
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline(always)]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Point-in-rect test, inclusive on all four edges.
    #[inline(always)]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Returns a copy pushed outward by `margin` on every side.
    pub fn grown(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Width and height are finite and strictly positive.
    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_ops() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -1.0);
        assert_eq!(a + b, Vec2::new(4.0, 1.0));
        assert_eq!(b - a, Vec2::new(2.0, -3.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(Vec2::new(3.0, 4.0).length(), 5.0);
    }

    #[test]
    fn test_vec2_finite() {
        assert!(Vec2::new(0.0, 1.0).is_finite());
        assert!(!Vec2::new(f32::NAN, 1.0).is_finite());
        assert!(!Vec2::new(0.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_rect_grown() {
        let r = Rect::new(0.0, 0.0, 400.0, 300.0).grown(1.0);
        assert_eq!(r, Rect::new(-1.0, -1.0, 402.0, 302.0));
        assert_eq!(r.right(), 401.0);
        assert_eq!(r.bottom(), 301.0);
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::from_size(100.0, 100.0);
        assert!(r.contains(Vec2::new(0.0, 0.0)));
        assert!(r.contains(Vec2::new(100.0, 100.0)));
        assert!(!r.contains(Vec2::new(100.5, 50.0)));
        assert!(!r.contains(Vec2::new(50.0, -0.5)));
    }

    #[test]
    fn test_rect_has_area() {
        assert!(Rect::from_size(1.0, 1.0).has_area());
        assert!(!Rect::from_size(0.0, 1.0).has_area());
        assert!(!Rect::from_size(1.0, -3.0).has_area());
        assert!(!Rect::from_size(f32::NAN, 1.0).has_area());
    }

    #[test]
    fn test_rect_serde() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0,"width":3.0,"height":4.0}"#);
        let back: Rect = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
