//! Keyframe tracks and value-at-time evaluation.
//!
//! A `Track` binds an ordered keyframe list to one `(target, property)` pair.
//! Keyframes are stable-sorted by time once at construction and the
//! interpolation arm is resolved from the first keyframe's value shape, so
//! sampling never re-inspects value types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::easing::Easing;
use crate::interpolate::Interpolation;
use crate::motion_path::MotionPathConfig;
use crate::value::Value;

/// One (time, value, optional incoming easing) triple.
///
/// `easing` shapes interpolation *into* this keyframe from its predecessor,
/// not out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Time in milliseconds from timeline start.
    pub time: f64,
    pub value: Value,
    // Always emitted (as null when absent) so the binary codec sees a fixed
    // field layout.
    #[serde(default)]
    pub easing: Option<Easing>,
}

impl Keyframe {
    pub fn new(time: f64, value: impl Into<Value>) -> Self {
        Self {
            time,
            value: value.into(),
            easing: None,
        }
    }

    pub fn with_easing(time: f64, value: impl Into<Value>, easing: Easing) -> Self {
        Self {
            time,
            value: value.into(),
            easing: Some(easing),
        }
    }
}

/// An animation track: keyframes for one property of one target.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    id: String,
    target: String,
    property: String,
    keyframes: Vec<Keyframe>,
    interpolation: Interpolation,
    motion_path: Option<MotionPathConfig>,
}

impl Track {
    /// Build a track, stable-sorting keyframes by time. A fresh UUID is
    /// assigned when `id` is None.
    pub fn new(
        id: Option<String>,
        target: impl Into<String>,
        property: impl Into<String>,
        mut keyframes: Vec<Keyframe>,
    ) -> Self {
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        let interpolation = keyframes
            .first()
            .map(|k| Interpolation::for_value(&k.value))
            .unwrap_or(Interpolation::Discrete);
        Self {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            target: target.into(),
            property: property.into(),
            keyframes,
            interpolation,
            motion_path: None,
        }
    }

    /// Build a motion-path track: keyframes carry scalar progress in [0,1]
    /// and `config` describes the path geometry.
    pub fn new_motion_path(
        id: Option<String>,
        target: impl Into<String>,
        keyframes: Vec<Keyframe>,
        config: MotionPathConfig,
    ) -> Self {
        let mut track = Self::new(id, target, "motionPath", keyframes);
        track.motion_path = Some(config);
        track
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[inline]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[inline]
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    #[inline]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    #[inline]
    pub fn motion_path(&self) -> Option<&MotionPathConfig> {
        self.motion_path.as_ref()
    }

    /// Time of the last keyframe, 0 for an empty track.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Evaluate the track at time `t` (milliseconds).
    ///
    /// Returns None for an empty track; clamps to the first/last keyframe
    /// outside the keyed range; exact keyframe hits return the stored value
    /// without float fuzz.
    pub fn value_at(&self, t: f64) -> Option<Value> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;

        if self.keyframes.len() == 1 || t <= first.time {
            return Some(first.value.clone());
        }
        if t >= last.time {
            return Some(last.value.clone());
        }

        // First bracketing pair in sort order; duplicate times keep the
        // earlier-registered keyframe as the `from` endpoint.
        for pair in self.keyframes.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            if from.time <= t && t <= to.time {
                if t == from.time {
                    return Some(from.value.clone());
                }
                let local = (t - from.time) / (to.time - from.time);
                let eased = to.easing.unwrap_or_default().evaluate(local);
                return Some(self.interpolation.apply(&from.value, &to.value, eased));
            }
        }

        Some(last.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::EasingName;

    fn numeric_track() -> Track {
        Track::new(
            None,
            "box",
            "opacity",
            vec![Keyframe::new(0.0, 0.0), Keyframe::new(1000.0, 1.0)],
        )
    }

    /// it should interpolate linearly and clamp outside the keyed range
    #[test]
    fn linear_midpoint_and_clamps() {
        let track = numeric_track();
        assert_eq!(track.value_at(500.0), Some(Value::Number(0.5)));
        assert_eq!(track.value_at(-50.0), Some(Value::Number(0.0)));
        assert_eq!(track.value_at(5000.0), Some(Value::Number(1.0)));
    }

    /// it should return None for an empty track and the lone value otherwise
    #[test]
    fn degenerate_tracks() {
        let empty = Track::new(None, "box", "x", vec![]);
        assert_eq!(empty.value_at(0.0), None);
        assert_eq!(empty.duration(), 0.0);

        let single = Track::new(None, "box", "x", vec![Keyframe::new(200.0, 7.0)]);
        assert_eq!(single.value_at(0.0), Some(Value::Number(7.0)));
        assert_eq!(single.value_at(9999.0), Some(Value::Number(7.0)));
    }

    /// it should sort keyframes by time at construction
    #[test]
    fn sorts_on_construction() {
        let track = Track::new(
            None,
            "box",
            "x",
            vec![Keyframe::new(1000.0, 10.0), Keyframe::new(0.0, 0.0)],
        );
        assert_eq!(track.keyframes()[0].time, 0.0);
        assert_eq!(track.value_at(500.0), Some(Value::Number(5.0)));
        assert_eq!(track.duration(), 1000.0);
    }

    /// it should return exact keyframe values without interpolation fuzz
    #[test]
    fn exact_hit() {
        let track = Track::new(
            None,
            "box",
            "x",
            vec![
                Keyframe::new(0.0, 0.0),
                Keyframe::with_easing(500.0, 3.0, Easing::Named(EasingName::EaseInCubic)),
                Keyframe::new(1000.0, 10.0),
            ],
        );
        assert_eq!(track.value_at(500.0), Some(Value::Number(3.0)));
    }

    /// it should apply the destination keyframe's easing
    #[test]
    fn easing_into_keyframe() {
        let track = Track::new(
            None,
            "box",
            "x",
            vec![
                Keyframe::new(0.0, 0.0),
                Keyframe::with_easing(1000.0, 100.0, Easing::Named(EasingName::EaseInQuad)),
            ],
        );
        // easeInQuad(0.5) == 0.25
        assert_eq!(track.value_at(500.0), Some(Value::Number(25.0)));
    }

    /// it should keep the first-registered keyframe as the from endpoint on
    /// duplicate times
    #[test]
    fn duplicate_time_tie_break() {
        let track = Track::new(
            None,
            "box",
            "x",
            vec![
                Keyframe::new(0.0, 0.0),
                Keyframe::new(500.0, 1.0),
                Keyframe::new(500.0, 2.0),
                Keyframe::new(1000.0, 2.0),
            ],
        );
        assert_eq!(track.value_at(500.0), Some(Value::Number(1.0)));
        assert_eq!(track.value_at(750.0), Some(Value::Number(2.0)));
    }

    /// it should hold discrete string values until completion
    #[test]
    fn discrete_track() {
        let track = Track::new(
            None,
            "box",
            "display",
            vec![Keyframe::new(0.0, "none"), Keyframe::new(1000.0, "block")],
        );
        assert_eq!(track.value_at(999.0), Some(Value::Text("none".into())));
        assert_eq!(track.value_at(1000.0), Some(Value::Text("block".into())));
    }
}
