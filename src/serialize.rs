//! Plain-data definition format and codecs.
//!
//! `TimelineDef` is the serializable mirror of a `Timeline`: id, name,
//! config, and tracks, every field plain data so the same shape round-trips
//! through JSON and the binary codec alike. Keyframes are re-sorted by time
//! on the way in rather than assumed pre-sorted.

use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::motion_path::MotionPathConfig;
use crate::timeline::{Timeline, TimelineConfig};
use crate::track::{Keyframe, Track};

/// Serializable track definition. Motion-path tracks keep their distinct
/// shape (`property: "motionPath"` plus `motionPathConfig`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDef {
    pub id: String,
    pub target: String,
    pub property: String,
    pub keyframes: Vec<Keyframe>,
    #[serde(default)]
    pub motion_path_config: Option<MotionPathConfig>,
}

impl From<&Track> for TrackDef {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id().to_string(),
            target: track.target().to_string(),
            property: track.property().to_string(),
            keyframes: track.keyframes().to_vec(),
            motion_path_config: track.motion_path().cloned(),
        }
    }
}

impl From<TrackDef> for Track {
    fn from(def: TrackDef) -> Self {
        match def.motion_path_config {
            Some(config) => {
                Track::new_motion_path(Some(def.id), def.target, def.keyframes, config)
            }
            None => Track::new(Some(def.id), def.target, def.property, def.keyframes),
        }
    }
}

/// Serializable timeline definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineDef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub config: TimelineConfig,
    #[serde(default)]
    pub tracks: Vec<TrackDef>,
}

impl From<&Timeline> for TimelineDef {
    fn from(timeline: &Timeline) -> Self {
        Self {
            id: timeline.id().to_string(),
            name: timeline.name().map(str::to_string),
            config: timeline.config().clone(),
            tracks: timeline.tracks().iter().map(TrackDef::from).collect(),
        }
    }
}

impl From<TimelineDef> for Timeline {
    fn from(def: TimelineDef) -> Self {
        let tracks = def.tracks.into_iter().map(Track::from).collect();
        Timeline::from_parts(def.id, def.name, def.config, tracks)
    }
}

/// Encode a timeline as a JSON definition.
pub fn to_json(timeline: &Timeline) -> Result<String, TimelineError> {
    Ok(serde_json::to_string(&TimelineDef::from(timeline))?)
}

/// Decode a timeline from a JSON definition.
pub fn from_json(json: &str) -> Result<Timeline, TimelineError> {
    let def: TimelineDef = serde_json::from_str(json)?;
    Ok(Timeline::from(def))
}

/// Encode a timeline as a binary definition.
pub fn to_bytes(timeline: &Timeline) -> Result<Vec<u8>, TimelineError> {
    Ok(bincode::serialize(&TimelineDef::from(timeline))?)
}

/// Decode a timeline from a binary definition.
pub fn from_bytes(bytes: &[u8]) -> Result<Timeline, TimelineError> {
    let def: TimelineDef = bincode::deserialize(bytes)?;
    Ok(Timeline::from(def))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn sample_timeline() -> Timeline {
        let mut tl = Timeline::new(TimelineConfig {
            duration: Some(2000.0),
            loop_count: 3,
            speed: 1.5,
            alternate: true,
        });
        tl.set_name(Some("demo".into()));
        tl.add_track(Track::new(
            Some("t-x".into()),
            "box",
            "x",
            vec![Keyframe::new(0.0, 0.0), Keyframe::new(1000.0, 100.0)],
        ));
        tl.add_track(Track::new_motion_path(
            Some("t-path".into()),
            "dot",
            vec![Keyframe::new(0.0, 0.0), Keyframe::new(2000.0, 1.0)],
            MotionPathConfig {
                path_data: "M 0 0 L 100 0".into(),
                auto_rotate: true,
                rotate_offset: 45.0,
            },
        ));
        tl
    }

    /// it should round-trip id, config, and per-track keyframes through JSON
    #[test]
    fn json_round_trip() {
        let tl = sample_timeline();
        let json = to_json(&tl).unwrap();
        let restored = from_json(&json).unwrap();

        assert_eq!(restored.id(), tl.id());
        assert_eq!(restored.name(), tl.name());
        assert_eq!(restored.config(), tl.config());
        assert_eq!(restored.len(), tl.len());
        for (a, b) in restored.tracks().iter().zip(tl.tracks()) {
            assert_eq!(a.keyframes(), b.keyframes());
            assert_eq!(a.motion_path(), b.motion_path());
        }
    }

    /// it should round-trip through the binary codec
    #[test]
    fn binary_round_trip() {
        let tl = sample_timeline();
        let bytes = to_bytes(&tl).unwrap();
        let restored = from_bytes(&bytes).unwrap();
        assert_eq!(restored.id(), tl.id());
        assert_eq!(restored.len(), tl.len());
        assert_eq!(restored.config(), tl.config());
    }

    /// it should re-sort keyframes on deserialization
    #[test]
    fn deserialization_sorts_keyframes() {
        let json = r#"{
            "id": "tl-1",
            "config": { "loop": -1 },
            "tracks": [{
                "id": "t1",
                "target": "box",
                "property": "x",
                "keyframes": [
                    { "time": 1000, "value": 100 },
                    { "time": 0, "value": 0 }
                ]
            }]
        }"#;
        let tl = from_json(json).unwrap();
        let track = tl.track("t1").unwrap();
        assert_eq!(track.keyframes()[0].time, 0.0);
        assert_eq!(tl.config().loop_count, -1);
        assert_eq!(tl.config().speed, 1.0);
    }

    /// it should reject malformed JSON with a serialization error
    #[test]
    fn malformed_json_is_an_error() {
        let err = from_json("{not json").unwrap_err();
        assert_eq!(err.category(), "serialization");
    }

    /// it should serialize keyframe values as bare JSON data
    #[test]
    fn definition_is_plain_data() {
        let mut tl = Timeline::new(TimelineConfig::default());
        tl.add_track(Track::new(
            Some("t1".into()),
            "box",
            "color",
            vec![Keyframe::new(0.0, "#ff0000")],
        ));
        let json = to_json(&tl).unwrap();
        assert!(json.contains("\"#ff0000\""));

        let restored = from_json(&json).unwrap();
        assert_eq!(
            restored.track("t1").unwrap().keyframes()[0].value,
            Value::Text("#ff0000".into())
        );
    }
}
