use crate::models::Candidate;

/// Decision of the single-plate heuristic over a candidate set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// No candidate survived filtering
    Empty,
    /// Index of the winning candidate
    Plate(usize),
    /// More than one candidate is comparably large; refuse to pick
    Ambiguous { dominant: usize },
}

/// Pick the plate among `candidates`.
///
/// With several candidates, those whose area is strictly greater than
/// `dominance_ratio * max_area` are dominant. More than one dominant
/// candidate is ambiguous; otherwise the largest wins (first one on ties).
pub fn select_single(candidates: &[Candidate], dominance_ratio: f64) -> Selection {
    match candidates {
        [] => Selection::Empty,
        [_] => Selection::Plate(0),
        _ => {
            let areas: Vec<u64> = candidates.iter().map(Candidate::area).collect();
            let (largest, max_area) = largest_area(&areas);
            let threshold = dominance_ratio * max_area as f64;
            let dominant = areas.iter().filter(|&&a| a as f64 > threshold).count();

            if dominant > 1 {
                Selection::Ambiguous { dominant }
            } else {
                Selection::Plate(largest)
            }
        }
    }
}

fn largest_area(areas: &[u64]) -> (usize, u64) {
    let mut best = (0, 0);
    for (i, &area) in areas.iter().enumerate() {
        if area > best.1 {
            best = (i, area);
        }
    }
    best
}
