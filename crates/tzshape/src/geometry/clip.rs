/// Sutherland-Hodgman clipping of rings against an axis-aligned window
use super::ring::Ring;
use crate::types::BoundingBox;

#[derive(Debug, Clone, Copy)]
enum Edge {
    Left(f64),
    Right(f64),
    Bottom(f64),
    Top(f64),
}

impl Edge {
    fn inside(self, [x, y]: [f64; 2]) -> bool {
        match self {
            Edge::Left(min_x) => x >= min_x,
            Edge::Right(max_x) => x <= max_x,
            Edge::Bottom(min_y) => y >= min_y,
            Edge::Top(max_y) => y <= max_y,
        }
    }

    /// Intersection of segment `a`-`b` with this edge's line. Only called when
    /// the segment actually crosses the line.
    fn intersect(self, [ax, ay]: [f64; 2], [bx, by]: [f64; 2]) -> [f64; 2] {
        match self {
            Edge::Left(x) | Edge::Right(x) => {
                let t = (x - ax) / (bx - ax);
                [x, ay + t * (by - ay)]
            }
            Edge::Bottom(y) | Edge::Top(y) => {
                let t = (y - ay) / (by - ay);
                [ax + t * (bx - ax), y]
            }
        }
    }
}

/// Clips `ring` to `window`, returning `None` when fewer than three distinct
/// points survive.
///
/// Parts of the ring running outside the window collapse onto the window
/// border as zero-area spurs. The result is good for extents and area checks,
/// not for point tests on the border.
pub(crate) fn clip_ring(ring: &Ring, window: &BoundingBox) -> Option<Ring> {
    let edges = [
        Edge::Left(window.min_lon),
        Edge::Right(window.max_lon),
        Edge::Bottom(window.min_lat),
        Edge::Top(window.max_lat),
    ];

    // Work on the open form; the closing point is re-added at the end.
    let points = ring.points();
    let mut output: Vec<[f64; 2]> = points[..points.len() - 1].to_vec();

    for edge in edges {
        if output.is_empty() {
            return None;
        }
        let input = std::mem::take(&mut output);
        let mut previous = input[input.len() - 1];

        for &current in &input {
            match (edge.inside(current), edge.inside(previous)) {
                (true, true) => output.push(current),
                (true, false) => {
                    output.push(edge.intersect(previous, current));
                    output.push(current);
                }
                (false, true) => output.push(edge.intersect(previous, current)),
                (false, false) => {}
            }
            previous = current;
        }
    }

    output.dedup();
    if output.len() > 1 && output.first() == output.last() {
        output.pop();
    }
    let first = *output.first()?;
    output.push(first);

    Ring::from_closed_points(output).ok()
}
