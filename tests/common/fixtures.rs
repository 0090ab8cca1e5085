#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::point::Point;
use imageproc::rect::Rect;
use platescan::{Candidate, DetectorConfig, PlateDetector, PlateRect};

pub const CANVAS_W: u32 = 640;
pub const CANVAS_H: u32 = 480;

pub const BACKGROUND: Rgb<u8> = Rgb([30, 35, 40]);
pub const PLATE_FILL: Rgb<u8> = Rgb([235, 235, 225]);

/// Detected rectangles may sit this many pixels off the drawn ones
pub const EDGE_TOLERANCE: u32 = 2;

/// Uniform canvas with no edges at all
pub fn blank_canvas(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, BACKGROUND)
}

/// Dark canvas with a bright filled rectangle for every entry of `plates`
pub fn canvas_with_plates(width: u32, height: u32, plates: &[PlateRect]) -> DynamicImage {
    let mut img = blank_canvas(width, height);
    for p in plates {
        draw_filled_rect_mut(
            &mut img,
            Rect::at(p.x as i32, p.y as i32).of_size(p.width, p.height),
            PLATE_FILL,
        );
    }
    DynamicImage::ImageRgb8(img)
}

/// One 150x33 plate (aspect ~4.5, area ~5000) on a 640x480 canvas
pub fn one_plate_scene() -> (DynamicImage, PlateRect) {
    let plate = PlateRect::new(245, 223, 150, 33);
    (canvas_with_plates(CANVAS_W, CANVAS_H, &[plate]), plate)
}

/// Two plates whose areas are within 50% of each other
pub fn two_plate_scene() -> (DynamicImage, [PlateRect; 2]) {
    let plates = [
        PlateRect::new(60, 100, 150, 33),
        PlateRect::new(360, 300, 140, 35),
    ];
    (canvas_with_plates(CANVAS_W, CANVAS_H, &plates), plates)
}

/// Candidate with an exact rectangular polygon
pub fn candidate(x: u32, y: u32, width: u32, height: u32) -> Candidate {
    let (x0, y0) = (x as i32, y as i32);
    let (x1, y1) = (x0 + width as i32 - 1, y0 + height as i32 - 1);
    Candidate {
        rect: PlateRect::new(x, y, width, height),
        polygon: vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ],
    }
}

/// Every boundary pixel of a rectangle, clockwise from the top-left corner
pub fn rect_boundary(x: i32, y: i32, width: i32, height: i32) -> Vec<Point<i32>> {
    let (x1, y1) = (x + width - 1, y + height - 1);
    let mut points = Vec::new();
    for px in x..=x1 {
        points.push(Point::new(px, y));
    }
    for py in (y + 1)..=y1 {
        points.push(Point::new(x1, py));
    }
    for px in (x..x1).rev() {
        points.push(Point::new(px, y1));
    }
    for py in ((y + 1)..y1).rev() {
        points.push(Point::new(x, py));
    }
    points
}

pub fn default_detector() -> PlateDetector {
    PlateDetector::new(DetectorConfig::default()).expect("default config is valid")
}

/// True when `found` matches `expected` up to edge-detector jitter
pub fn roughly_equal(found: &PlateRect, expected: &PlateRect) -> bool {
    let close = |a: u32, b: u32| a.abs_diff(b) <= EDGE_TOLERANCE;
    close(found.x, expected.x)
        && close(found.y, expected.y)
        && close(found.width, expected.width)
        && close(found.height, expected.height)
}
