//! Small vector helpers shared by mascots, projectiles and the grid.

pub use glam::Vec2;
use mascot_config::ViewportSettings;
use rand::Rng;
use std::f32::consts::TAU;

/// The visible area mascots are confined to, top-left origin, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Largest top-left corner that keeps a `w`×`h` box fully visible.
    pub fn max_corner(&self, w: f32, h: f32) -> Vec2 {
        Vec2::new((self.width - w).max(0.0), (self.height - h).max(0.0))
    }
}

impl From<&ViewportSettings> for Viewport {
    fn from(settings: &ViewportSettings) -> Self {
        Self::new(settings.width, settings.height)
    }
}

/// Uniformly distributed direction.
pub fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let angle = rng.gen::<f32>() * TAU;
    Vec2::new(angle.cos(), angle.sin())
}

/// Rotates `v` by `angle` radians.
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

pub fn is_finite(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// Mutable access to two distinct elements of a slice.
/// Returns `None` when the indices coincide or either is out of range.
pub fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> Option<(&mut T, &mut T)> {
    if a == b || a >= items.len() || b >= items.len() {
        return None;
    }
    if a < b {
        let (left, right) = items.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = items.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_mut_returns_both_orders() {
        let mut values = vec![1, 2, 3];
        {
            let (a, b) = pair_mut(&mut values, 2, 0).unwrap();
            *a += 10;
            *b += 20;
        }
        assert_eq!(values, vec![21, 2, 13]);
        assert!(pair_mut(&mut values, 1, 1).is_none());
        assert!(pair_mut(&mut values, 0, 5).is_none());
    }

    #[test]
    fn max_corner_never_negative() {
        let viewport = Viewport::new(100.0, 50.0);
        assert_eq!(viewport.max_corner(64.0, 64.0), Vec2::new(36.0, 0.0));
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = rotate(Vec2::X, std::f32::consts::FRAC_PI_2);
        assert!((v.x).abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }
}
