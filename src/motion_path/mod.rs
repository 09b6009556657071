//! Motion-path geometry.
//!
//! Parses SVG path data into a segment list with measured lengths and maps a
//! normalized progress value to a position plus tangent angle. Parses are
//! memoized in an explicit, LRU-bounded [`PathCache`] keyed by the raw path
//! string, so identical paths across tracks share one parse.

mod parser;

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Parameter steps used to estimate bezier segment length by chord summing.
const LENGTH_SAMPLES: usize = 20;

const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Geometry configuration attached to a motion-path track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionPathConfig {
    pub path_data: String,
    #[serde(default)]
    pub auto_rotate: bool,
    #[serde(default)]
    pub rotate_offset: f64,
}

impl MotionPathConfig {
    pub fn new(path_data: impl Into<String>) -> Self {
        Self {
            path_data: path_data.into(),
            auto_rotate: false,
            rotate_offset: 0.0,
        }
    }
}

/// A sampled point on a path. `angle` is the tangent direction in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl PathPoint {
    /// Fallback for empty or zero-length paths.
    pub const ORIGIN: PathPoint = PathPoint {
        x: 0.0,
        y: 0.0,
        angle: 0.0,
    };
}

/// One drawable path segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Line {
        from: Point2<f64>,
        to: Point2<f64>,
    },
    Cubic {
        from: Point2<f64>,
        c1: Point2<f64>,
        c2: Point2<f64>,
        to: Point2<f64>,
    },
    Quadratic {
        from: Point2<f64>,
        c1: Point2<f64>,
        to: Point2<f64>,
    },
    /// Elliptical arc reduced to its endpoints and radii; length and
    /// point/tangent evaluation are chord-based approximations.
    Arc {
        from: Point2<f64>,
        to: Point2<f64>,
        rx: f64,
        ry: f64,
    },
}

impl Segment {
    pub(crate) fn line(from: Point2<f64>, to: Point2<f64>) -> Self {
        Segment::Line { from, to }
    }

    pub(crate) fn cubic(
        from: Point2<f64>,
        c1: Point2<f64>,
        c2: Point2<f64>,
        to: Point2<f64>,
    ) -> Self {
        Segment::Cubic { from, c1, c2, to }
    }

    pub(crate) fn quadratic(from: Point2<f64>, c1: Point2<f64>, to: Point2<f64>) -> Self {
        Segment::Quadratic { from, c1, to }
    }

    pub(crate) fn arc(from: Point2<f64>, to: Point2<f64>, rx: f64, ry: f64) -> Self {
        Segment::Arc { from, to, rx, ry }
    }

    /// Position at local parameter u ∈ [0,1].
    pub fn point_at(&self, u: f64) -> Point2<f64> {
        match self {
            Segment::Line { from, to } | Segment::Arc { from, to, .. } => {
                from + (to - from) * u
            }
            Segment::Cubic { from, c1, c2, to } => {
                let v = 1.0 - u;
                let p = from.coords * (v * v * v)
                    + c1.coords * (3.0 * v * v * u)
                    + c2.coords * (3.0 * v * u * u)
                    + to.coords * (u * u * u);
                Point2::from(p)
            }
            Segment::Quadratic { from, c1, to } => {
                let v = 1.0 - u;
                let p = from.coords * (v * v)
                    + c1.coords * (2.0 * v * u)
                    + to.coords * (u * u);
                Point2::from(p)
            }
        }
    }

    /// Tangent direction at local parameter u. Lines are exact, beziers use
    /// the analytic derivative, arcs fall back to the chord direction.
    pub fn tangent_at(&self, u: f64) -> Vector2<f64> {
        match self {
            Segment::Line { from, to } | Segment::Arc { from, to, .. } => to - from,
            Segment::Cubic { from, c1, c2, to } => {
                let v = 1.0 - u;
                (c1 - from) * (3.0 * v * v)
                    + (c2 - c1) * (6.0 * v * u)
                    + (to - c2) * (3.0 * u * u)
            }
            Segment::Quadratic { from, c1, to } => {
                (c1 - from) * (2.0 * (1.0 - u)) + (to - c1) * (2.0 * u)
            }
        }
    }

    /// Measured segment length. Lines are exact; beziers sum chords over
    /// uniform parameter steps; arcs use `max(chord, avg_radius * pi/2)`.
    pub fn length(&self) -> f64 {
        match self {
            Segment::Line { from, to } => (to - from).norm(),
            Segment::Cubic { .. } | Segment::Quadratic { .. } => {
                let mut total = 0.0;
                let mut prev = self.point_at(0.0);
                for i in 1..=LENGTH_SAMPLES {
                    let next = self.point_at(i as f64 / LENGTH_SAMPLES as f64);
                    total += (next - prev).norm();
                    prev = next;
                }
                total
            }
            Segment::Arc { from, to, rx, ry } => {
                let chord = (to - from).norm();
                let avg_radius = (rx.abs() + ry.abs()) / 2.0;
                chord.max(avg_radius * std::f64::consts::FRAC_PI_2)
            }
        }
    }
}

/// A parsed path: segments with their measured lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPath {
    segments: Vec<Segment>,
    lengths: Vec<f64>,
    total_length: f64,
}

impl ParsedPath {
    /// Parse path data. Malformed content degrades to a partial or empty
    /// path, never an error.
    pub fn parse(data: &str) -> Self {
        let segments = parser::parse_segments(data);
        let lengths: Vec<f64> = segments.iter().map(Segment::length).collect();
        let total_length = lengths.iter().sum();
        Self {
            segments,
            lengths,
            total_length,
        }
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Map progress ∈ [0,1] (clamped) along the path's arc length to a
    /// position and tangent angle. Empty or zero-length paths yield the
    /// origin at angle 0.
    pub fn point_at_progress(&self, progress: f64) -> PathPoint {
        if self.segments.is_empty() || self.total_length <= 0.0 {
            return PathPoint::ORIGIN;
        }

        let target = progress.clamp(0.0, 1.0) * self.total_length;
        let mut consumed = 0.0;
        for (segment, &length) in self.segments.iter().zip(&self.lengths) {
            if length > 0.0 && target <= consumed + length {
                let u = (target - consumed) / length;
                return sample(segment, u);
            }
            consumed += length;
        }

        // Accumulated float error past the end; land on the last segment.
        match self.segments.last() {
            Some(segment) => sample(segment, 1.0),
            None => PathPoint::ORIGIN,
        }
    }
}

fn sample(segment: &Segment, u: f64) -> PathPoint {
    let point = segment.point_at(u);
    let tangent = segment.tangent_at(u);
    let angle = if tangent.norm_squared() > 0.0 {
        tangent.y.atan2(tangent.x).to_degrees()
    } else {
        0.0
    };
    PathPoint {
        x: point.x,
        y: point.y,
        angle,
    }
}

/// Evaluate a motion-path point for a config: tangent angle is offset by
/// `rotate_offset` when `auto_rotate` is set.
pub fn motion_path_point(path: &ParsedPath, config: &MotionPathConfig, progress: f64) -> PathPoint {
    let mut point = path.point_at_progress(progress);
    if config.auto_rotate {
        point.angle += config.rotate_offset;
    }
    point
}

/// LRU-bounded memo of parsed paths keyed by the raw path-data string.
///
/// Owned by whichever component samples paths (one per `Timeline`); parses
/// are shared via `Arc` so eviction never invalidates a handed-out path.
#[derive(Debug)]
pub struct PathCache {
    entries: LruCache<String, Arc<ParsedPath>>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Zero capacity is bumped to 1 so the cache type stays total.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Fetch the parse for `path_data`, parsing and inserting on a miss.
    pub fn get(&mut self, path_data: &str) -> Arc<ParsedPath> {
        if let Some(parsed) = self.entries.get(path_data) {
            return Arc::clone(parsed);
        }
        let parsed = Arc::new(ParsedPath::parse(path_data));
        self.entries.put(path_data.to_string(), Arc::clone(&parsed));
        parsed
    }

    /// Drop every cached parse.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// it should hit the midpoint of a straight line with a flat tangent
    #[test]
    fn straight_line_midpoint() {
        let path = ParsedPath::parse("M 0 0 L 100 0");
        let p = path.point_at_progress(0.5);
        assert_abs_diff_eq!(p.x, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.angle, 0.0, epsilon = 1e-9);
    }

    /// it should clamp progress outside [0,1]
    #[test]
    fn progress_clamped() {
        let path = ParsedPath::parse("M 0 0 L 100 0");
        assert_eq!(path.point_at_progress(-1.0).x, 0.0);
        assert_eq!(path.point_at_progress(2.0).x, 100.0);
    }

    /// it should yield the origin for empty or zero-length paths
    #[test]
    fn empty_path_is_origin() {
        assert_eq!(ParsedPath::parse("").point_at_progress(0.5), PathPoint::ORIGIN);
        assert_eq!(
            ParsedPath::parse("M 5 5").point_at_progress(0.5),
            PathPoint::ORIGIN
        );
    }

    /// it should walk cumulative segment lengths
    #[test]
    fn multi_segment_walk() {
        // Two legs of 100 each; progress 0.75 is halfway up the second leg.
        let path = ParsedPath::parse("M 0 0 L 100 0 L 100 100");
        assert_abs_diff_eq!(path.total_length(), 200.0, epsilon = 1e-9);
        let p = path.point_at_progress(0.75);
        assert_abs_diff_eq!(p.x, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.angle, 90.0, epsilon = 1e-9);
    }

    /// it should start a cubic along its initial control direction
    #[test]
    fn cubic_tangent_at_start() {
        let path = ParsedPath::parse("M 0 0 C 0 100 100 100 100 0");
        let p = path.point_at_progress(0.0);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-9);
        // First control point is straight up.
        assert_abs_diff_eq!(p.angle, 90.0, epsilon = 1e-9);
    }

    /// it should bound arc length below by the chord
    #[test]
    fn arc_length_heuristic() {
        let flat = ParsedPath::parse("M 0 0 A 1 1 0 0 0 100 0");
        assert_abs_diff_eq!(flat.total_length(), 100.0, epsilon = 1e-9);

        let round = ParsedPath::parse("M 0 0 A 100 100 0 0 0 10 0");
        assert_abs_diff_eq!(
            round.total_length(),
            100.0 * std::f64::consts::FRAC_PI_2,
            epsilon = 1e-9
        );
    }

    /// it should share one parse per distinct path string
    #[test]
    fn cache_shares_parses() {
        let mut cache = PathCache::with_capacity(4);
        let a = cache.get("M 0 0 L 100 0");
        let b = cache.get("M 0 0 L 100 0");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        // Evicted parses stay alive through their Arc.
        assert_abs_diff_eq!(a.total_length(), 100.0, epsilon = 1e-9);
    }

    /// it should evict least-recently-used parses at capacity
    #[test]
    fn cache_evicts_lru() {
        let mut cache = PathCache::with_capacity(2);
        cache.get("M 0 0 L 1 0");
        cache.get("M 0 0 L 2 0");
        cache.get("M 0 0 L 3 0");
        assert_eq!(cache.len(), 2);
    }

    /// it should apply rotate_offset only when auto_rotate is set
    #[test]
    fn rotate_offset_applies_with_auto_rotate() {
        let path = ParsedPath::parse("M 0 0 L 100 0");
        let mut config = MotionPathConfig::new("M 0 0 L 100 0");
        config.rotate_offset = 90.0;

        assert_abs_diff_eq!(
            motion_path_point(&path, &config, 0.5).angle,
            0.0,
            epsilon = 1e-9
        );

        config.auto_rotate = true;
        assert_abs_diff_eq!(
            motion_path_point(&path, &config, 0.5).angle,
            90.0,
            epsilon = 1e-9
        );
    }
}
