//! Points, vectors, and output bounds.

use serde::{Deserialize, Serialize};

/// A 2D point (landmark position or cursor position).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Vector pointing from `origin` to `self`.
    pub fn offset_from(&self, origin: &Point2D) -> Vector2 {
        Vector2::new(self.x - origin.x, self.y - origin.y)
    }

    /// Point translated by `v`.
    pub fn translate(&self, v: Vector2) -> Point2D {
        Point2D::new(self.x + v.dx, self.y + v.dy)
    }

    /// Arithmetic mean of a set of points. `None` for an empty slice.
    pub fn centroid(points: &[Point2D]) -> Option<Point2D> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point2D::new(sx / n, sy / n))
    }
}

/// A 2D displacement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vector2 {
    pub dx: f64,
    pub dy: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector.
    pub fn unit(&self) -> Option<Vector2> {
        let len = self.length();
        if len <= f64::EPSILON {
            return None;
        }
        Some(Vector2::new(self.dx / len, self.dy / len))
    }

    /// Vector scaled by `factor`.
    pub fn scale(&self, factor: f64) -> Vector2 {
        Vector2::new(self.dx * factor, self.dy * factor)
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

/// Rectangular output area in screen pixels.
///
/// `(x, y)` is the top-left corner; the right and bottom edges are inclusive
/// so a 1920x1080 screen spans `0.0..=1919.0` horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    /// Bounds of a screen with its origin at `(0, 0)`.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    /// Right-most addressable coordinate.
    pub fn max_x(&self) -> f64 {
        self.x + self.width - 1.0
    }

    /// Bottom-most addressable coordinate.
    pub fn max_y(&self) -> f64 {
        self.y + self.height - 1.0
    }

    /// Center point.
    pub fn center(&self) -> Point2D {
        Point2D::new(
            (self.x + self.max_x()) / 2.0,
            (self.y + self.max_y()) / 2.0,
        )
    }

    /// Check if a point is inside the bounds.
    pub fn contains(&self, p: &Point2D) -> bool {
        p.x >= self.x && p.x <= self.max_x() && p.y >= self.y && p.y <= self.max_y()
    }

    /// Clamp a point into the bounds.
    pub fn clamp(&self, p: Point2D) -> Point2D {
        Point2D::new(
            p.x.clamp(self.x, self.max_x().max(self.x)),
            p.y.clamp(self.y, self.max_y().max(self.y)),
        )
    }

    /// Map normalized `[0.0, 1.0]` coordinates into the bounds.
    pub fn denormalize(&self, nx: f64, ny: f64) -> Point2D {
        Point2D::new(
            self.x + nx.clamp(0.0, 1.0) * (self.width - 1.0),
            self.y + ny.clamp(0.0, 1.0) * (self.height - 1.0),
        )
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::from_size(1920, 1080)
    }
}
