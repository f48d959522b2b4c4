use std::ops::{Add, Mul, Sub};

/// Lightweight 2D vector for raster-space coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Squared distance from `p` to the closed segment `a..b`.
///
/// A degenerate segment (`a == b`) measures the distance to the single point,
/// which is what gives a zero-length stroke its round dot.
pub fn distance_sq_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    };
    let closest = a + ab * t;
    let d = p - closest;
    d.dot(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(distance_sq_to_segment(Vec2::new(5.0, 3.0), a, b), 9.0);
        assert_eq!(distance_sq_to_segment(Vec2::new(-4.0, 3.0), a, b), 25.0);
        assert_eq!(distance_sq_to_segment(Vec2::new(13.0, 4.0), a, b), 25.0);
    }

    #[test]
    fn degenerate_segment_is_a_point() {
        let a = Vec2::new(2.0, 2.0);
        assert_eq!(distance_sq_to_segment(Vec2::new(5.0, 6.0), a, a), 25.0);
    }
}
