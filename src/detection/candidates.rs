use imageproc::point::Point;

use crate::config::DetectorConfig;
use crate::models::{bounding_rect, Candidate, Contour};

/// Reduce contours to plate-shaped rectangles, sorted in reading order
pub fn filter_candidates(contours: &[Contour], config: &DetectorConfig) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = contours
        .iter()
        .filter_map(|c| candidate_from_contour(c, config))
        .collect();

    sort_reading_order(&mut candidates);
    candidates
}

/// Apply the quadrilateral, area and aspect-ratio tests to one contour
pub fn candidate_from_contour(contour: &Contour, config: &DetectorConfig) -> Option<Candidate> {
    let perimeter = contour.perimeter();
    if perimeter <= 0.0 {
        return None;
    }

    let polygon = approximate_polygon(&contour.points, config.approx_epsilon_ratio * perimeter);
    if polygon.len() != 4 {
        return None;
    }

    let rect = bounding_rect(&polygon)?;
    if rect.area() < config.min_area {
        return None;
    }

    let aspect = rect.aspect_ratio();
    if aspect < config.min_aspect || aspect > config.max_aspect {
        return None;
    }

    Some(Candidate { rect, polygon })
}

/// Top-to-bottom, then left-to-right
pub fn sort_reading_order(candidates: &mut [Candidate]) {
    candidates.sort_by_key(|c| (c.rect.y, c.rect.x));
}

/// Douglas-Peucker simplification of a closed curve.
///
/// The curve is split at two mutually distant points and each half is
/// simplified as an open chain, so the result never repeats its first vertex.
pub fn approximate_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let a = farthest_from(points, 0);
    let b = farthest_from(points, a);
    if points[a] == points[b] {
        return vec![points[a]];
    }

    let (start, end) = (a.min(b), a.max(b));
    let first = &points[start..=end];
    let second: Vec<Point<i32>> = points[end..]
        .iter()
        .chain(points[..=start].iter())
        .copied()
        .collect();

    let mut polygon = douglas_peucker(first, epsilon);
    let tail = douglas_peucker(&second, epsilon);
    // tail runs end -> start; both ends are already in `polygon`
    if tail.len() > 2 {
        polygon.extend_from_slice(&tail[1..tail.len() - 1]);
    }
    polygon
}

fn farthest_from(points: &[Point<i32>], origin: usize) -> usize {
    let o = points[origin];
    let mut best = origin;
    let mut best_dist = 0i64;
    for (i, p) in points.iter().enumerate() {
        let dx = (p.x - o.x) as i64;
        let dy = (p.y - o.y) as i64;
        let dist = dx * dx + dy * dy;
        if dist > best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

/// Open-chain Douglas-Peucker; both end points are always kept
fn douglas_peucker(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0, last)];
    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_index = start;
        for i in (start + 1)..end {
            let dist = distance_to_line(points[i], points[start], points[end]);
            if dist > max_dist {
                max_dist = dist;
                max_index = i;
            }
        }

        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((start, max_index));
            stack.push((max_index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn distance_to_line(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);
    let dx = bx - ax;
    let dy = by - ay;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    ((px - ax) * dy - (py - ay) * dx).abs() / len
}
