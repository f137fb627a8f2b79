//! Geometric primitives: affine transforms, points, bounding boxes and
//! page geometry.
//!
//! All coordinates are in device space with a bottom-left origin (y grows
//! upward), the same orientation PDF user space uses.

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A 2×3 affine matrix `(a, b, c, d, e, f)`.
///
/// Maps `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// A pure translation by `(tx, ty)`.
    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Build from a `[a, b, c, d, e, f]` array.
    pub fn from_array(m: [f64; 6]) -> Self {
        Self::new(m[0], m[1], m[2], m[3], m[4], m[5])
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Matrix product `self × other`.
    ///
    /// Applying the result is the same as applying `self` first and
    /// `other` second, so `cm` operands compose as `operand.concat(&ctm)`.
    pub fn concat(&self, other: &Transform) -> Transform {
        Transform {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point (translation included).
    pub fn apply(&self, x: f64, y: f64) -> Point {
        Point::new(
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Transform a displacement vector (translation ignored).
    pub fn apply_delta(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.a * dx + self.c * dy, self.b * dx + self.d * dy)
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Axis-aligned bounding box in device space (`y0` is the bottom edge).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build a normalized box from two opposite corners.
    pub fn from_corners(ax: f64, ay: f64, bx: f64, by: f64) -> Self {
        Self::new(ax.min(bx), ay.min(by), ax.max(bx), ay.max(by))
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center_x(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn center_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }

    /// Compute the union of two bounding boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Whether the point lies inside the box (edges included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// Size and `/Rotate` value of a page.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageGeometry {
    /// Unrotated page width (media box width).
    pub width: f64,
    /// Unrotated page height (media box height).
    pub height: f64,
    /// Clockwise display rotation in degrees; normalized to 0, 90, 180 or 270.
    pub rotate: i32,
}

impl Default for PageGeometry {
    /// US Letter, unrotated.
    fn default() -> Self {
        Self::new(612.0, 792.0)
    }
}

impl PageGeometry {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            rotate: 0,
        }
    }

    pub fn with_rotation(mut self, rotate: i32) -> Self {
        self.rotate = rotate;
        self
    }

    /// The rotation snapped to a multiple of 90 in `0..360`.
    pub fn normalized_rotation(&self) -> i32 {
        let r = self.rotate.rem_euclid(360);
        (r / 90) * 90
    }

    /// Transform from user space into the displayed page (device space).
    pub fn page_transform(&self) -> Transform {
        let (w, h) = (self.width, self.height);
        match self.normalized_rotation() {
            90 => Transform::new(0.0, -1.0, 1.0, 0.0, 0.0, w),
            180 => Transform::new(-1.0, 0.0, 0.0, -1.0, w, h),
            270 => Transform::new(0.0, 1.0, -1.0, 0.0, h, 0.0),
            _ => Transform::identity(),
        }
    }

    /// Width and height of the page as displayed.
    pub fn device_size(&self) -> (f64, f64) {
        match self.normalized_rotation() {
            90 | 270 => (self.height, self.width),
            _ => (self.width, self.height),
        }
    }

    /// Bounds of the displayed page in device space.
    pub fn device_bounds(&self) -> BBox {
        let (w, h) = self.device_size();
        BBox::new(0.0, 0.0, w, h)
    }
}
