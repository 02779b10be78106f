//! Plane geometry on `(x, y)` pairs. Callers decide the units.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Rotate about the origin by `theta` radians (counter-clockwise).
    pub fn rotated(self, theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self { x: self.x * c - self.y * s, y: self.x * s + self.y * c }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Bounds { min_x: first.x, max_x: first.x, min_y: first.y, max_y: first.y };
        for p in &points[1..] {
            b.min_x = b.min_x.min(p.x);
            b.max_x = b.max_x.max(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_y = b.max_y.max(p.y);
        }
        Some(b)
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// Shoelace area; positive for counter-clockwise rings.
pub fn signed_area(ring: &[Point]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        acc += a.x * b.y - b.x * a.y;
    }
    acc / 2.0
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn within_box(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Closed-segment intersection, collinear overlap included.
pub fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && within_box(q1, q2, p1))
        || (d2 == 0.0 && within_box(q1, q2, p2))
        || (d3 == 0.0 && within_box(p1, p2, q1))
        || (d4 == 0.0 && within_box(p1, p2, q2))
}

/// True when no two non-adjacent edges of the closed ring touch.
pub fn is_simple(ring: &[Point]) -> bool {
    let n = ring.len();
    for i in 0..n {
        let (a1, a2) = (ring[i], ring[(i + 1) % n]);
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if adjacent {
                continue;
            }
            let (b1, b2) = (ring[j], ring[(j + 1) % n]);
            if segments_intersect(a1, a2, b1, b2) {
                return false;
            }
        }
    }
    true
}

// Ray casting polygon test
pub fn contains(ring: &[Point], p: Point) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (ring[i], ring[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x = pi.x + (p.y - pi.y) * (pj.x - pi.x) / (pj.y - pi.y);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// x positions where the horizontal line at `y` crosses the ring, ascending.
/// Edges are half-open in y so a vertex on the line is counted once.
pub fn crossings_at(ring: &[Point], y: f64) -> Vec<f64> {
    let n = ring.len();
    let mut xs = Vec::new();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (pi, pj) = (ring[i], ring[j]);
        if (pi.y > y) != (pj.y > y) {
            xs.push(pi.x + (y - pi.y) * (pj.x - pi.x) / (pj.y - pi.y));
        }
        j = i;
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    xs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0), Point::new(1.0, 1.0), Point::new(1.0, 0.0)]
    }

    #[test]
    fn bowtie_is_not_simple() {
        let bowtie = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
        assert!(!is_simple(&bowtie));
        assert!(is_simple(&square()));
    }

    #[test]
    fn area_sign_follows_winding() {
        assert_eq!(signed_area(&square()), -1.0);
        let mut ccw = square();
        ccw.reverse();
        assert_eq!(signed_area(&ccw), 1.0);
    }

    #[test]
    fn ray_casting_inside_and_outside() {
        let sq = square();
        assert!(contains(&sq, Point::new(0.5, 0.5)));
        assert!(!contains(&sq, Point::new(1.5, 0.5)));
        assert!(!contains(&sq, Point::new(0.5, -0.1)));
    }

    #[test]
    fn concave_ring_has_four_crossings_through_the_notch() {
        // U shape open to the top
        let u = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 3.0),
            Point::new(2.0, 3.0),
            Point::new(2.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 3.0),
            Point::new(0.0, 3.0),
        ];
        assert_eq!(crossings_at(&u, 2.0), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(crossings_at(&u, 0.5), vec![0.0, 3.0]);
    }
}
