use image::RgbImage;
use imageproc::point::Point;
use serde::Serialize;

/// Closed boundary traced in a binary image
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    /// Length of the closed polyline through all points
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }

        (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                let dx = (b.x - a.x) as f64;
                let dy = (b.y - a.y) as f64;
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }
}

/// Axis-aligned rectangle in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlateRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PlateRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Share of a `width x height` image covered by this rectangle, in percent
    pub fn area_percent_of(&self, width: u32, height: u32) -> f64 {
        let total = width as f64 * height as f64;
        if total == 0.0 {
            return 0.0;
        }
        self.area() as f64 / total * 100.0
    }

    /// Pixel-exact copy of the region, no padding
    pub fn crop(&self, img: &RgbImage) -> RgbImage {
        image::imageops::crop_imm(img, self.x, self.y, self.width, self.height).to_image()
    }
}

/// Rectangle that passed the shape, size and aspect filters
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub rect: PlateRect,
    pub polygon: Vec<Point<i32>>,
}

impl Candidate {
    pub fn area(&self) -> u64 {
        self.rect.area()
    }
}

pub(crate) fn bounding_rect(points: &[Point<i32>]) -> Option<PlateRect> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    if min_x < 0 || min_y < 0 {
        return None;
    }

    Some(PlateRect {
        x: min_x as u32,
        y: min_y as u32,
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
    })
}
