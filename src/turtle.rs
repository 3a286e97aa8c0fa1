// Turtle interpretation of expanded sequences.
//
// Screen coordinates throughout: x grows right, y grows down, matching the
// pixel buffers the geometry is drawn into. The cursor starts pointing up
// (heading -90 degrees), '+' subtracts the turn angle, '-' adds it.

use rand::Rng;

use crate::error::LsystemError;

/// Fluctuation samples a fresh multiplicative factor in this band for every
/// forward step and every turn. It never accumulates into the base values.
pub const JITTER_MIN: f64 = 0.8;
pub const JITTER_MAX: f64 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn length(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, Debug)]
struct Cursor {
    pos: Point,
    heading: f64,
}

/// Output of one interpretation run: segments for line rendering and leaf
/// points marking where branches closed.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub segments: Vec<Segment>,
    pub leaves: Vec<Point>,
}

impl Geometry {
    /// Bounding box over all segment endpoints and leaves, or None when the
    /// geometry is empty.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut points = self
            .segments
            .iter()
            .flat_map(|s| [s.start, s.end])
            .chain(self.leaves.iter().copied());
        let first = points.next()?;
        let (mut min, mut max) = (first, first);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }
}

/// Walk `sequence` with a turtle cursor and collect the drawn geometry.
///
/// `F` draws a step, `f` moves silently, `+`/`-` turn by `angle_deg`,
/// `[` saves the cursor and `]` restores it, recording a leaf point at the
/// branch tip first. Every other symbol is inert. A `]` with nothing saved
/// fails the whole run with [`LsystemError::UnbalancedPop`]; callers keep
/// whatever geometry they had before.
pub fn interpret(
    sequence: &str,
    angle_deg: f64,
    length: f64,
    origin: Point,
    fluctuation: bool,
) -> Result<Geometry, LsystemError> {
    interpret_with_rng(
        sequence,
        angle_deg,
        length,
        origin,
        fluctuation,
        &mut rand::thread_rng(),
    )
}

/// Like [`interpret`] with an explicit randomness source for the
/// fluctuation jitter.
pub fn interpret_with_rng<R: Rng>(
    sequence: &str,
    angle_deg: f64,
    length: f64,
    origin: Point,
    fluctuation: bool,
    rng: &mut R,
) -> Result<Geometry, LsystemError> {
    if !angle_deg.is_finite() {
        return Err(LsystemError::NonFinite {
            name: "angle",
            value: angle_deg,
        });
    }
    if !length.is_finite() {
        return Err(LsystemError::NonFinite {
            name: "length",
            value: length,
        });
    }

    let angle = angle_deg.to_radians();
    let mut cursor = Cursor {
        pos: origin,
        heading: (-90.0f64).to_radians(),
    };
    let mut stack: Vec<Cursor> = Vec::new();
    let mut geometry = Geometry::default();

    for (position, command) in sequence.chars().enumerate() {
        match command {
            'F' | 'f' => {
                let step = if fluctuation {
                    length * rng.gen_range(JITTER_MIN..JITTER_MAX)
                } else {
                    length
                };
                let next = Point::new(
                    cursor.pos.x + step * cursor.heading.cos(),
                    cursor.pos.y + step * cursor.heading.sin(),
                );
                if command == 'F' {
                    geometry.segments.push(Segment {
                        start: cursor.pos,
                        end: next,
                    });
                }
                cursor.pos = next;
            }
            '+' | '-' => {
                let turn = if fluctuation {
                    angle * rng.gen_range(JITTER_MIN..JITTER_MAX)
                } else {
                    angle
                };
                if command == '+' {
                    cursor.heading -= turn;
                } else {
                    cursor.heading += turn;
                }
            }
            '[' => stack.push(cursor),
            ']' => {
                let saved = stack
                    .pop()
                    .ok_or(LsystemError::UnbalancedPop { position })?;
                geometry.leaves.push(cursor.pos);
                cursor = saved;
            }
            _ => {} // grammar-only symbols (X, Y, ...) carry no geometry
        }
    }

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const EPS: f64 = 1e-9;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPS, "{a} vs {b}");
    }

    fn origin() -> Point {
        Point::new(0.0, 0.0)
    }

    #[test]
    fn empty_sequence_yields_empty_geometry() {
        let geometry = interpret("", 25.0, 5.0, origin(), false).unwrap();
        assert!(geometry.segments.is_empty());
        assert!(geometry.leaves.is_empty());
    }

    #[test]
    fn forward_draws_one_unit_up() {
        let geometry = interpret("F", 90.0, 1.0, origin(), false).unwrap();
        assert_eq!(geometry.segments.len(), 1);
        assert_close(geometry.segments[0].end.x, 0.0);
        assert_close(geometry.segments[0].end.y, -1.0);
    }

    #[test]
    fn right_angle_pair_is_perpendicular() {
        let geometry = interpret("F+F", 90.0, 1.0, origin(), false).unwrap();
        assert_eq!(geometry.segments.len(), 2);
        assert_close(geometry.segments[0].length(), 1.0);
        assert_close(geometry.segments[1].length(), 1.0);

        let a = &geometry.segments[0];
        let b = &geometry.segments[1];
        let dot = (a.end.x - a.start.x) * (b.end.x - b.start.x)
            + (a.end.y - a.start.y) * (b.end.y - b.start.y);
        assert_close(dot, 0.0);
        // The second segment continues from the first's tip.
        assert_eq!(b.start, a.end);
    }

    #[test]
    fn koch_pass_draws_one_segment_per_f() {
        let sequence = "F-F++F-F++F-F++F-F++F-F++F-F";
        let f_count = sequence.chars().filter(|&c| c == 'F').count();
        let geometry = interpret(sequence, 60.0, 2.0, origin(), false).unwrap();
        assert_eq!(geometry.segments.len(), f_count);
        for segment in &geometry.segments {
            assert_close(segment.length(), 2.0);
        }
    }

    #[test]
    fn pop_restores_position_and_heading() {
        let geometry = interpret("F[+F]F", 90.0, 1.0, origin(), false).unwrap();
        assert_eq!(geometry.segments.len(), 3);
        // Branch leaf recorded at the tip before the restore.
        assert_eq!(geometry.leaves.len(), 1);
        assert_close(geometry.leaves[0].x, -1.0);
        assert_close(geometry.leaves[0].y, -1.0);
        // Third segment resumes from where the first ended, still heading up.
        assert_eq!(geometry.segments[2].start, geometry.segments[0].end);
        assert_close(geometry.segments[2].end.x, 0.0);
        assert_close(geometry.segments[2].end.y, -2.0);
    }

    #[test]
    fn leaf_count_matches_branch_closures() {
        let sequence = "F[+F][-F[+F]]F";
        let pops = sequence.chars().filter(|&c| c == ']').count();
        let geometry = interpret(sequence, 25.0, 5.0, origin(), false).unwrap();
        assert_eq!(geometry.leaves.len(), pops);
    }

    #[test]
    fn orphan_pop_is_a_structural_error() {
        let err = interpret("]", 25.0, 5.0, origin(), false).unwrap_err();
        assert!(matches!(err, LsystemError::UnbalancedPop { position: 0 }));

        let err = interpret("F[F]]", 25.0, 5.0, origin(), false).unwrap_err();
        assert!(matches!(err, LsystemError::UnbalancedPop { position: 4 }));
    }

    #[test]
    fn lowercase_f_moves_without_drawing() {
        let geometry = interpret("FfF", 90.0, 1.0, origin(), false).unwrap();
        assert_eq!(geometry.segments.len(), 2);
        // The silent move leaves a one-unit gap between the segments.
        assert_close(geometry.segments[1].start.y, -2.0);
        assert_close(geometry.segments[1].end.y, -3.0);
    }

    #[test]
    fn inert_symbols_are_ignored() {
        let plain = interpret("F+F", 60.0, 3.0, origin(), false).unwrap();
        let noisy = interpret("XFA+YFZ", 60.0, 3.0, origin(), false).unwrap();
        assert_eq!(plain.segments, noisy.segments);
        assert!(noisy.leaves.is_empty());
    }

    #[test]
    fn non_finite_parameters_are_rejected() {
        assert!(interpret("F", f64::NAN, 1.0, origin(), false).is_err());
        assert!(interpret("F", 90.0, f64::INFINITY, origin(), false).is_err());
    }

    #[test]
    fn fluctuation_stays_in_band() {
        let sequence = "F".repeat(200);
        let mut rng = StdRng::seed_from_u64(7);
        let geometry =
            interpret_with_rng(&sequence, 0.0, 10.0, origin(), true, &mut rng).unwrap();
        assert_eq!(geometry.segments.len(), 200);

        let mut varied = false;
        for segment in &geometry.segments {
            let len = segment.length();
            assert!(len >= 10.0 * JITTER_MIN - EPS, "too short: {len}");
            assert!(len < 10.0 * JITTER_MAX + EPS, "too long: {len}");
            if (len - 10.0).abs() > EPS {
                varied = true;
            }
        }
        assert!(varied, "jitter produced no variation");
    }

    #[test]
    fn origin_offsets_all_geometry() {
        let geometry = interpret("F", 90.0, 2.0, Point::new(10.0, 20.0), false).unwrap();
        assert_close(geometry.segments[0].start.x, 10.0);
        assert_close(geometry.segments[0].start.y, 20.0);
        assert_close(geometry.segments[0].end.y, 18.0);
    }

    #[test]
    fn bounds_cover_segments_and_leaves() {
        let geometry = interpret("F[+F]F", 90.0, 1.0, origin(), false).unwrap();
        let (min, max) = geometry.bounds().unwrap();
        assert_close(min.x, -1.0);
        assert_close(min.y, -2.0);
        assert_close(max.x, 0.0);
        assert_close(max.y, 0.0);
        assert!(Geometry::default().bounds().is_none());
    }
}
