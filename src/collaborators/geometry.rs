//! Pixel-space rectangles reported by OCR and bubble detection.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BoundingBox {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// True if the centre of `other` lies inside this rectangle.
    pub fn contains_center_of(&self, other: &BoundingBox) -> bool {
        let cx = other.x as u64 * 2 + other.width as u64;
        let cy = other.y as u64 * 2 + other.height as u64;
        cx >= self.x as u64 * 2
            && cx <= self.right() as u64 * 2
            && cy >= self.y as u64 * 2
            && cy <= self.bottom() as u64 * 2
    }

    /// Converts to `(x, y, width, height)` fractions of the image size,
    /// clamped to the unit square. Returns None for a zero-sized image.
    pub fn to_unit(&self, image_width: u32, image_height: u32) -> Option<(f64, f64, f64, f64)> {
        if image_width == 0 || image_height == 0 {
            return None;
        }
        let w = image_width as f64;
        let h = image_height as f64;
        let x = (self.x as f64 / w).clamp(0.0, 1.0);
        let y = (self.y as f64 / h).clamp(0.0, 1.0);
        let width = (self.width as f64 / w).clamp(0.0, 1.0 - x);
        let height = (self.height as f64 / h).clamp(0.0, 1.0 - y);
        Some((x, y, width, height))
    }
}
