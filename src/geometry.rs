//! Pure geometry and path-description helpers for the generator programs.
//!
//! Plain functions from numeric parameters to point sequences or SVG path
//! strings. No I/O, no state: the same parameters always produce the same
//! output, which is what lets a generator be invoked repeatedly across
//! reload passes and still render byte-identical markup.

use crate::svg::fmt_num;
use kurbo::{Point, Vec2};

/// Interior lattice of a centered `size`-wide square: `cells` rows of
/// `cells` points each, laid out row-major, excluding the square's border.
pub fn grid_points(size: f64, cells: u32) -> Vec<Vec<Point>> {
    let offset = -(size / 2.0);
    let step = size / (f64::from(cells) + 1.0);
    (1..=cells)
        .map(|row| {
            (1..=cells)
                .map(|col| Point::new(f64::from(row) * step + offset, f64::from(col) * step + offset))
                .collect()
        })
        .collect()
}

/// Sierpiński square curve as a closed polyline, scaled and centered to
/// fit a `size`-wide box around the origin.
///
/// L-system: axiom `F+XF+F+XF`, rule `X → XF-F+F-XF+F+XF-F+F-X`, 90°
/// turns. The expanded program is walked by a unit-step turtle and the
/// resulting trail is fit to the box, so every segment ends up the same
/// length — the dash-animation generators depend on that uniformity.
pub fn sierpinski_square(size: f64, iterations: u32) -> Vec<Point> {
    let mut program = String::from("F+XF+F+XF");
    for _ in 0..iterations {
        let mut next = String::with_capacity(program.len() * 4);
        for symbol in program.chars() {
            match symbol {
                'X' => next.push_str("XF-F+F-XF+F+XF-F+F-X"),
                other => next.push(other),
            }
        }
        program = next;
    }

    let headings = [
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(-1.0, 0.0),
        Vec2::new(0.0, -1.0),
    ];
    let mut heading = 0usize;
    let mut position = Point::new(0.0, 0.0);
    let mut points = vec![position];
    for symbol in program.chars() {
        match symbol {
            'F' => {
                position += headings[heading];
                points.push(position);
            }
            '+' => heading = (heading + 1) % 4,
            '-' => heading = (heading + 3) % 4,
            _ => {}
        }
    }

    fit_to_box(points, size)
}

/// Uniformly scale and recenter a trail so its longer side spans `size`.
fn fit_to_box(points: Vec<Point>, size: f64) -> Vec<Point> {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in &points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let span = (max_x - min_x).max(max_y - min_y);
    let scale = if span > 0.0 { size / span } else { 0.0 };
    let center = Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    points
        .into_iter()
        .map(|p| Point::new((p.x - center.x) * scale, (p.y - center.y) * scale))
        .collect()
}

/// Path description for an axis-aligned square around `center`.
///
/// Winding matters to the callers: a counter-clockwise square combined
/// with a clockwise shape under `fill-rule: evenodd` punches a hole.
pub fn square_path(size: f64, center: Point, counter_clockwise: bool) -> String {
    let h = size / 2.0;
    let mut corners = [
        Point::new(center.x - h, center.y - h),
        Point::new(center.x + h, center.y - h),
        Point::new(center.x + h, center.y + h),
        Point::new(center.x - h, center.y + h),
    ];
    if counter_clockwise {
        corners.reverse();
        corners.rotate_left(3);
    }
    format!(
        "M {} {} L {} {} L {} {} L {} {} Z",
        fmt_num(corners[0].x),
        fmt_num(corners[0].y),
        fmt_num(corners[1].x),
        fmt_num(corners[1].y),
        fmt_num(corners[2].x),
        fmt_num(corners[2].y),
        fmt_num(corners[3].x),
        fmt_num(corners[3].y),
    )
}

/// Encode a point sequence as a polyline/polygon `points` attribute.
pub fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_cells_squared_points() {
        let rows = grid_points(200.0, 10);
        assert_eq!(rows.len(), 10);
        assert!(rows.iter().all(|row| row.len() == 10));
    }

    #[test]
    fn grid_is_centered_and_excludes_border() {
        let rows = grid_points(200.0, 10);
        let first = rows[0][0];
        let last = rows[9][9];
        // symmetric about the origin
        assert!((first.x + last.x).abs() < 1e-9);
        assert!((first.y + last.y).abs() < 1e-9);
        // strictly inside the square
        assert!(first.x > -100.0 && last.x < 100.0);
    }

    #[test]
    fn sierpinski_zero_iterations_is_the_axiom_walk() {
        // axiom F+XF+F+XF has four forward steps
        let points = sierpinski_square(90.0, 0);
        assert_eq!(points.len(), 5);
    }

    #[test]
    fn sierpinski_segments_are_uniform() {
        let points = sierpinski_square(90.0, 3);
        let first = points[0].distance(points[1]);
        for pair in points.windows(2) {
            assert!((pair[0].distance(pair[1]) - first).abs() < 1e-9);
        }
    }

    #[test]
    fn sierpinski_fits_the_requested_box() {
        let points = sierpinski_square(90.0, 4);
        let max = points
            .iter()
            .flat_map(|p| [p.x.abs(), p.y.abs()])
            .fold(0.0f64, f64::max);
        assert!(max <= 45.0 + 1e-9);
        // and actually spans it
        assert!(max > 40.0);
    }

    #[test]
    fn sierpinski_is_deterministic() {
        assert_eq!(sierpinski_square(90.0, 3), sierpinski_square(90.0, 3));
    }

    #[test]
    fn square_path_closes_and_starts_at_top_left() {
        let path = square_path(70.0, Point::new(50.0, 50.0), false);
        assert_eq!(path, "M 15 15 L 85 15 L 85 85 L 15 85 Z");
    }

    #[test]
    fn square_path_winding_reverses() {
        let cw = square_path(70.0, Point::new(50.0, 50.0), false);
        let ccw = square_path(70.0, Point::new(50.0, 50.0), true);
        assert_ne!(cw, ccw);
        // same starting corner, opposite direction
        assert!(cw.starts_with("M 15 15 L 85 15"));
        assert!(ccw.starts_with("M 15 15 L 15 85"));
    }

    #[test]
    fn points_attr_encodes_pairs() {
        let points = [Point::new(0.0, 0.0), Point::new(1.5, -2.0)];
        assert_eq!(points_attr(&points), "0,0 1.5,-2");
    }
}
