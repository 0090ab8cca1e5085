mod common;

use common::*;
use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use platescan::detection::candidates::{
    approximate_polygon, candidate_from_contour, filter_candidates,
};
use platescan::detection::contours::{compress_chain, find_external_contours};
use platescan::Contour;

fn rect_contour(x: i32, y: i32, w: i32, h: i32) -> Contour {
    Contour::new(compress_chain(&rect_boundary(x, y, w, h)))
}

#[test]
fn straight_runs_collapse_to_corners() {
    let points = compress_chain(&rect_boundary(5, 7, 100, 30));
    assert_eq!(
        points,
        vec![
            Point::new(5, 7),
            Point::new(104, 7),
            Point::new(104, 36),
            Point::new(5, 36),
        ]
    );
}

#[test]
fn dense_rectangle_approximates_to_four_vertices() {
    let boundary = rect_boundary(0, 0, 100, 30);
    let contour = Contour::new(boundary.clone());
    let polygon = approximate_polygon(&boundary, 0.02 * contour.perimeter());
    assert_eq!(polygon.len(), 4);
    for corner in [
        Point::new(0, 0),
        Point::new(99, 0),
        Point::new(99, 29),
        Point::new(0, 29),
    ] {
        assert!(polygon.contains(&corner), "missing corner {:?}", corner);
    }
}

#[test]
fn plate_shaped_rectangle_passes() {
    let config = DetectorConfig::default();
    let cand = candidate_from_contour(&rect_contour(20, 40, 100, 30), &config)
        .expect("100x30 is a plate shape");
    assert_eq!(cand.rect, PlateRect::new(20, 40, 100, 30));
    assert_eq!(cand.polygon.len(), 4);
}

#[test]
fn triangles_are_rejected() {
    let config = DetectorConfig::default();
    let triangle = Contour::new(vec![
        Point::new(0, 0),
        Point::new(200, 0),
        Point::new(100, 60),
    ]);
    assert!(candidate_from_contour(&triangle, &config).is_none());
}

#[test]
fn small_rectangles_are_rejected() {
    let config = DetectorConfig::default();
    // 40x15 = 600 px
    assert!(candidate_from_contour(&rect_contour(0, 0, 40, 15), &config).is_none());
}

#[test]
fn aspect_band_is_inclusive() {
    let config = DetectorConfig::default();
    // 2.0 and 6.5 exactly
    assert!(candidate_from_contour(&rect_contour(0, 0, 100, 50), &config).is_some());
    assert!(candidate_from_contour(&rect_contour(0, 0, 130, 20), &config).is_some());
    // square and 7.0
    assert!(candidate_from_contour(&rect_contour(0, 0, 60, 60), &config).is_none());
    assert!(candidate_from_contour(&rect_contour(0, 0, 140, 20), &config).is_none());
}

#[test]
fn candidates_come_out_in_reading_order() {
    let config = DetectorConfig::default();
    let contours = vec![
        rect_contour(300, 200, 120, 30),
        rect_contour(400, 20, 120, 30),
        rect_contour(10, 200, 120, 30),
    ];
    let rects: Vec<(u32, u32)> = filter_candidates(&contours, &config)
        .iter()
        .map(|c| (c.rect.x, c.rect.y))
        .collect();
    assert_eq!(rects, vec![(400, 20), (10, 200), (300, 200)]);
}

/// (min_x, min_y, max_x, max_y) of a traced contour
fn extent(contour: &Contour) -> (i32, i32, i32, i32) {
    let xs = contour.points.iter().map(|p| p.x);
    let ys = contour.points.iter().map(|p| p.y);
    (
        xs.clone().min().unwrap(),
        ys.clone().min().unwrap(),
        xs.max().unwrap(),
        ys.max().unwrap(),
    )
}

#[test]
fn region_touching_the_frame_is_traced() {
    let mut edges = GrayImage::new(80, 30);
    draw_filled_rect_mut(&mut edges, Rect::at(0, 0).of_size(50, 20), Luma([255u8]));

    let contours = find_external_contours(&edges);
    assert_eq!(contours.len(), 1);
    assert_eq!(extent(&contours[0]), (0, 0, 49, 19));
}

#[test]
fn band_spanning_the_width_is_one_contour() {
    let mut edges = GrayImage::new(100, 40);
    draw_filled_rect_mut(&mut edges, Rect::at(0, 10).of_size(100, 5), Luma([255u8]));

    let contours = find_external_contours(&edges);
    assert_eq!(contours.len(), 1);
    assert_eq!(extent(&contours[0]), (0, 10, 99, 14));
}

#[test]
fn hole_inside_a_ring_is_dropped() {
    let mut edges = GrayImage::new(60, 40);
    draw_hollow_rect_mut(&mut edges, Rect::at(10, 10).of_size(40, 20), Luma([255u8]));

    let contours = find_external_contours(&edges);
    assert_eq!(contours.len(), 1);
    assert_eq!(extent(&contours[0]), (10, 10, 49, 29));
}
