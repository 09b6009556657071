//! Timeline Core
//!
//! A time-based property animation engine: declarative keyframe tracks,
//! per-track interpolation with easing (including numeric cubic-bezier
//! inversion), SVG motion-path geometry, and a looping/reversible playback
//! state machine. Renderer adapters consume the `AnimationState` snapshots
//! it produces; the engine itself knows nothing about rendering surfaces.

pub mod clock;
pub mod easing;
pub mod error;
pub mod interpolate;
pub mod motion_path;
pub mod serialize;
pub mod timeline;
pub mod track;
pub mod value;

// Re-export common types for convenience
pub use clock::Clock;
pub use easing::{CubicBezier, Easing, EasingName};
pub use error::TimelineError;
pub use interpolate::{interpolate_color, Interpolation};
pub use motion_path::{
    motion_path_point, MotionPathConfig, ParsedPath, PathCache, PathPoint, Segment,
};
pub use serialize::{from_bytes, from_json, to_bytes, to_json, TimelineDef, TrackDef};
pub use timeline::{
    AnimationState, Direction, PlaybackState, TickOutput, Timeline, TimelineConfig, TimelineEvent,
};
pub use track::{Keyframe, Track};
pub use value::{Value, ValueKind};

/// Timeline engine result type
pub type Result<T> = std::result::Result<T, TimelineError>;
