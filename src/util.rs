use geo::{Area, Coord, Intersects, Line, LineString, Polygon};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortAxis {
    X,
    Y,
}

impl SortAxis {
    pub const ALL: [SortAxis; 2] = [SortAxis::X, SortAxis::Y];
}

pub fn axis_mean(points: &[[f64; 2]], axis: SortAxis) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let component = match axis {
        SortAxis::X => 0,
        SortAxis::Y => 1,
    };
    points.iter().map(|p| p[component]).sum::<f64>() / points.len() as f64
}

pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn ring_coords(points: &[[f64; 2]]) -> Vec<Coord<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(points.len());
    for &[x, y] in points {
        let coord = Coord { x, y };
        if coords.last() != Some(&coord) {
            coords.push(coord);
        }
    }
    while coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    coords
}

// None unless the ring is a simple polygon with area
pub(crate) fn to_geo_poly(points: &[[f64; 2]]) -> Option<Polygon<f64>> {
    if points.iter().any(|p| !p[0].is_finite() || !p[1].is_finite()) {
        return None;
    }
    let coords = ring_coords(points);
    if coords.len() < 3 || !is_simple_ring(&coords) {
        return None;
    }
    let polygon = Polygon::new(LineString::new(coords), vec![]);
    if polygon.unsigned_area() > 0.0 {
        Some(polygon)
    } else {
        None
    }
}

fn is_simple_ring(coords: &[Coord<f64>]) -> bool {
    let n = coords.len();
    let edge = |k: usize| Line::new(coords[k], coords[(k + 1) % n]);

    for k in 0..n {
        let d1 = edge((k + n - 1) % n).delta();
        let d2 = edge(k).delta();
        let cross = d1.x * d2.y - d1.y * d2.x;
        let dot = d1.x * d2.x + d1.y * d2.y;
        if cross == 0.0 && dot < 0.0 {
            // spike
            return false;
        }
    }

    for i in 0..n {
        for j in i + 2..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if edge(i).intersects(&edge(j)) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_is_valid() {
        let poly = to_geo_poly(&[[0.0, 0.0], [10.0, 0.0], [10.0, 5.0], [0.0, 5.0]]);
        assert!(poly.is_some());
        assert_eq!(poly.unwrap().unsigned_area(), 50.0);
    }

    #[test]
    fn closed_ring_and_repeated_points_are_tolerated() {
        let poly = to_geo_poly(&[
            [0.0, 0.0],
            [0.0, 0.0],
            [4.0, 0.0],
            [4.0, 4.0],
            [0.0, 4.0],
            [0.0, 0.0],
        ]);
        assert_eq!(poly.map(|p| p.unsigned_area()), Some(16.0));
    }

    #[test]
    fn bowtie_is_rejected() {
        assert!(to_geo_poly(&[[0.0, 0.0], [10.0, 10.0], [10.0, 0.0], [0.0, 10.0]]).is_none());
    }

    #[test]
    fn degenerate_rings_are_rejected() {
        assert!(to_geo_poly(&[[0.0, 0.0], [1.0, 1.0]]).is_none());
        assert!(to_geo_poly(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]).is_none());
        assert!(to_geo_poly(&[[3.0, 3.0], [3.0, 3.0], [3.0, 3.0], [3.0, 3.0]]).is_none());
        assert!(to_geo_poly(&[[0.0, 0.0], [f64::NAN, 0.0], [1.0, 1.0]]).is_none());
    }

    #[test]
    fn spike_is_rejected() {
        assert!(to_geo_poly(&[[0.0, 0.0], [10.0, 0.0], [5.0, 0.0], [5.0, 5.0]]).is_none());
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_text("Exit  Only\t"), "exitonly");
        assert_eq!(char_len("Ünï"), 3);
    }

    #[test]
    fn axis_means() {
        let pts = [[0.0, 2.0], [4.0, 2.0], [4.0, 6.0], [0.0, 6.0]];
        assert_eq!(axis_mean(&pts, SortAxis::X), 2.0);
        assert_eq!(axis_mean(&pts, SortAxis::Y), 4.0);
        assert_eq!(axis_mean(&[], SortAxis::X), 0.0);
    }
}
