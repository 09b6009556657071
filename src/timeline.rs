//! Timeline playback state machine.
//!
//! A `Timeline` orchestrates a set of tracks under a shared clock: playback
//! state crossed with direction, looping with an optional alternate bounce,
//! speed scaling, and snapshot emission. `tick` returns a `TickOutput`
//! carrying at most one `AnimationState` snapshot and any lifecycle events,
//! so the driving loop consumes them as plain values.

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TimelineError;
use crate::motion_path::{motion_path_point, PathCache};
use crate::track::Track;
use crate::value::Value;

/// Upper bound on boundary wraps consumed by a single `tick`, as a runaway
/// guard for huge deltas against short looping timelines.
const MAX_TICK_ITERATIONS: u32 = 1000;

/// Playback state of a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

impl PlaybackState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

impl From<&str> for PlaybackState {
    fn from(s: &str) -> Self {
        match s {
            "playing" => Self::Playing,
            "paused" => Self::Paused,
            _ => Self::Idle,
        }
    }
}

/// Playback direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        }
    }

    #[inline]
    fn flipped(&self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

fn default_speed() -> f64 {
    1.0
}

/// Playback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Explicit duration in milliseconds; when absent, the longest track
    /// determines it.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Extra loop iterations: -1 is infinite, 0 none, n runs n extra times.
    #[serde(rename = "loop", default)]
    pub loop_count: i32,
    /// Playback speed multiplier.
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Bounce between boundaries instead of wrapping.
    #[serde(default)]
    pub alternate: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            duration: None,
            loop_count: 0,
            speed: 1.0,
            alternate: false,
        }
    }
}

/// Lifecycle events surfaced through operation returns and `TickOutput`.
///
/// `Completed` fires exactly once per terminal stop (loop budget exhausted);
/// it never fires on a manual `stop()`. The rest are informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineEvent {
    Started,
    Paused,
    Stopped,
    Completed,
}

/// Point-in-time snapshot of every resolved track value.
///
/// Always freshly built, never mutated in place; consumers must not assume
/// identity across ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationState {
    /// target → property → value.
    pub values: HashMap<String, HashMap<String, Value>>,
    pub current_time: f64,
    pub playback_state: PlaybackState,
    pub direction: Direction,
    pub loop_iteration: u32,
}

/// Result of one `tick`: at most one snapshot plus any lifecycle events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickOutput {
    pub state: Option<AnimationState>,
    pub events: Vec<TimelineEvent>,
}

/// The orchestrating playback state machine over a set of tracks.
#[derive(Debug)]
pub struct Timeline {
    id: String,
    name: Option<String>,
    config: TimelineConfig,
    tracks: Vec<Track>,
    path_cache: PathCache,
    current_time: f64,
    playback_state: PlaybackState,
    direction: Direction,
    boundary_crossings: u32,
}

impl Timeline {
    pub fn new(config: TimelineConfig) -> Self {
        Self::from_parts(Uuid::new_v4().to_string(), None, config, Vec::new())
    }

    /// Assemble a timeline from already-built parts (deserialization entry
    /// point). Playback state starts idle at time 0.
    pub fn from_parts(
        id: String,
        name: Option<String>,
        config: TimelineConfig,
        tracks: Vec<Track>,
    ) -> Self {
        Self {
            id,
            name,
            config,
            tracks,
            path_cache: PathCache::new(),
            current_time: 0.0,
            playback_state: PlaybackState::Idle,
            direction: Direction::Forward,
            boundary_crossings: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Read-only view of the playback configuration.
    #[inline]
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    #[inline]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id() == id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[inline]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    #[inline]
    pub fn playback_state(&self) -> PlaybackState {
        self.playback_state
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Extra loop iterations completed so far: the first boundary arrival
    /// ends the base pass and does not count, every arrival after it does.
    #[inline]
    pub fn loop_iteration(&self) -> u32 {
        self.boundary_crossings.saturating_sub(1)
    }

    /// Explicit configured duration, else the longest track's duration.
    pub fn duration(&self) -> f64 {
        match self.config.duration {
            Some(d) => d,
            None => self
                .tracks
                .iter()
                .map(Track::duration)
                .fold(0.0, f64::max),
        }
    }

    /// Normalized position in [0,1]; 0 when the timeline has no duration.
    pub fn progress(&self) -> f64 {
        let duration = self.duration();
        if duration > 0.0 {
            (self.current_time / duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Add a track, returning its id.
    pub fn add_track(&mut self, track: Track) -> String {
        let id = track.id().to_string();
        self.tracks.push(track);
        id
    }

    pub fn remove_track(&mut self, id: &str) -> Result<Track, TimelineError> {
        match self.tracks.iter().position(|t| t.id() == id) {
            Some(index) => Ok(self.tracks.remove(index)),
            None => Err(TimelineError::TrackNotFound { id: id.to_string() }),
        }
    }

    /// Begin or resume playback. A timeline already run to its boundary in
    /// the current direction restarts from the opposite end.
    pub fn play(&mut self) -> Option<TimelineEvent> {
        let duration = self.duration();
        match self.direction {
            Direction::Forward if duration > 0.0 && self.current_time >= duration => {
                self.current_time = 0.0;
                self.boundary_crossings = 0;
            }
            Direction::Reverse if self.current_time <= 0.0 => {
                self.current_time = duration;
            }
            _ => {}
        }
        if self.playback_state == PlaybackState::Playing {
            return None;
        }
        debug!("timeline {} playing at {}ms", self.id, self.current_time);
        self.playback_state = PlaybackState::Playing;
        Some(TimelineEvent::Started)
    }

    /// Pause in place.
    pub fn pause(&mut self) -> Option<TimelineEvent> {
        if self.playback_state != PlaybackState::Playing {
            return None;
        }
        debug!("timeline {} paused at {}ms", self.id, self.current_time);
        self.playback_state = PlaybackState::Paused;
        Some(TimelineEvent::Paused)
    }

    /// Stop and reset position, loop counter, and direction. Never emits
    /// `Completed`.
    pub fn stop(&mut self) -> Option<TimelineEvent> {
        let was_active = self.playback_state != PlaybackState::Idle;
        self.playback_state = PlaybackState::Idle;
        self.current_time = 0.0;
        self.boundary_crossings = 0;
        self.direction = Direction::Forward;
        if was_active {
            debug!("timeline {} stopped", self.id);
            Some(TimelineEvent::Stopped)
        } else {
            None
        }
    }

    /// Jump to `t`, clamped to `[0, duration]` (unbounded above when the
    /// timeline has no duration).
    pub fn seek(&mut self, t: f64) {
        let duration = self.duration();
        self.current_time = if duration > 0.0 {
            t.clamp(0.0, duration)
        } else {
            t.max(0.0)
        };
    }

    /// Toggle playback direction without touching state or position.
    pub fn reverse(&mut self) {
        self.direction = self.direction.flipped();
    }

    /// Advance playback by `delta` milliseconds (scaled by `speed`).
    ///
    /// No-op unless playing with a positive duration. The snapshot is built
    /// once after all delta is consumed, no matter how many boundary wraps
    /// occurred in between.
    pub fn tick(&mut self, delta: f64) -> TickOutput {
        let duration = self.duration();
        if self.playback_state != PlaybackState::Playing || duration <= 0.0 {
            return TickOutput::default();
        }

        let mut events = Vec::new();
        let mut remaining = delta * self.config.speed;
        let mut iterations = 0u32;

        while remaining > 0.0 {
            iterations += 1;
            if iterations > MAX_TICK_ITERATIONS {
                warn!(
                    "timeline {} consumed {MAX_TICK_ITERATIONS} boundary wraps in one tick; truncating",
                    self.id
                );
                break;
            }

            let available = match self.direction {
                Direction::Forward => duration - self.current_time,
                Direction::Reverse => self.current_time,
            };

            if remaining < available {
                match self.direction {
                    Direction::Forward => self.current_time += remaining,
                    Direction::Reverse => self.current_time -= remaining,
                }
                break;
            }

            remaining -= available;
            self.current_time = match self.direction {
                Direction::Forward => duration,
                Direction::Reverse => 0.0,
            };
            if !self.handle_boundary(&mut events) {
                break;
            }
        }

        TickOutput {
            state: Some(self.state_at(self.current_time)),
            events,
        }
    }

    /// Boundary reached in the current direction. Returns false when
    /// playback terminates.
    fn handle_boundary(&mut self, events: &mut Vec<TimelineEvent>) -> bool {
        // Loop budget is judged on arrivals before this one, so a budget of
        // n permits n wraps beyond the base pass.
        let used = self.boundary_crossings;
        let loops_remain =
            self.config.loop_count == -1 || (used as i64) < self.config.loop_count as i64;
        self.boundary_crossings = self.boundary_crossings.saturating_add(1);

        match self.direction {
            Direction::Forward if loops_remain => {
                if self.config.alternate {
                    // Bounce: next iteration runs backward from here.
                    self.direction = Direction::Reverse;
                } else {
                    self.current_time = 0.0;
                }
                debug!(
                    "timeline {} looped (iteration {})",
                    self.id,
                    self.loop_iteration()
                );
                true
            }
            // The start boundary only loops when alternating.
            Direction::Reverse if loops_remain && self.config.alternate => {
                self.direction = Direction::Forward;
                debug!(
                    "timeline {} bounced forward (iteration {})",
                    self.id,
                    self.loop_iteration()
                );
                true
            }
            _ => {
                self.playback_state = PlaybackState::Idle;
                debug!("timeline {} completed", self.id);
                events.push(TimelineEvent::Completed);
                false
            }
        }
    }

    /// Build a snapshot of every track's value at time `t`.
    ///
    /// Tracks with no value are absent. Motion-path tracks expand their
    /// scalar progress into `motionPathX`/`motionPathY` (and
    /// `motionPathRotate` when auto-rotating) instead of writing the raw
    /// progress. Later-registered tracks overwrite earlier ones on a
    /// duplicate (target, property) pair.
    pub fn state_at(&mut self, t: f64) -> AnimationState {
        let mut values: HashMap<String, HashMap<String, Value>> = HashMap::new();

        for track in &self.tracks {
            let Some(value) = track.value_at(t) else {
                continue;
            };
            let properties = values.entry(track.target().to_string()).or_default();

            if let Some(config) = track.motion_path() {
                let progress = value.as_number().unwrap_or(0.0);
                let parsed = self.path_cache.get(&config.path_data);
                let point = motion_path_point(&parsed, config, progress);
                properties.insert("motionPathX".to_string(), Value::Number(point.x));
                properties.insert("motionPathY".to_string(), Value::Number(point.y));
                if config.auto_rotate {
                    properties.insert("motionPathRotate".to_string(), Value::Number(point.angle));
                }
            } else {
                properties.insert(track.property().to_string(), value);
            }
        }

        AnimationState {
            values,
            current_time: t,
            playback_state: self.playback_state,
            direction: self.direction,
            loop_iteration: self.loop_iteration(),
        }
    }

    /// Drop all memoized path parses.
    pub fn clear_path_cache(&mut self) {
        self.path_cache.clear();
    }
}
