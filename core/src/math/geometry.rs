use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned box in two-corner form `(x1, y1)`–`(x2, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Builds a box from top-left corner plus width and height.
    pub fn from_tlwh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x1, self.y1, self.width(), self.height()]
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Maps detector-resolution coordinates onto another resolution.
    pub fn scaled(&self, scale_x: f64, scale_y: f64) -> Self {
        Self {
            x1: (self.x1 as f64 * scale_x) as f32,
            y1: (self.y1 as f64 * scale_y) as f32,
            x2: (self.x2 as f64 * scale_x) as f32,
            y2: (self.y2 as f64 * scale_y) as f32,
        }
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Intersection-over-union of two boxes, in `[0, 1]`.
///
/// Boxes that do not overlap, and degenerate pairs whose union has no area,
/// both yield exactly 0.
pub fn iou(a: &BBox, b: &BBox) -> f32 {
    let ix1 = a.x1.max(b.x1);
    let iy1 = a.y1.max(b.y1);
    let ix2 = a.x2.min(b.x2);
    let iy2 = a.y2.min(b.y2);

    let inter_w = ix2 - ix1;
    let inter_h = iy2 - iy1;
    if inter_w <= 0.0 || inter_h <= 0.0 {
        return 0.0;
    }

    let intersection = inter_w * inter_h;
    let union = a.area() + b.area() - intersection;
    if union > 0.0 {
        (intersection / union).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
