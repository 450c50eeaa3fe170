//! Scripted intro camera path.
//!
//! A linear chain of keyframe segments. Each segment eases the camera from
//! its start to its end position while looking at a fixed point and showing
//! a caption. Time left over when a segment finishes carries into the next.
//! After the last segment the camera snaps to its end, the caption is
//! cleared, and [`CinematicStep::Completed`] is returned exactly once.
//!
//! The intro cannot be skipped.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::sink::DisplaySink;

/// One leg of the intro path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyframeSegment {
    /// Camera position at the start of the segment.
    pub start: Vec3,
    /// Camera position at the end of the segment.
    pub end: Vec3,
    /// Fixed look-at point for the whole segment.
    pub look_target: Vec3,
    /// Segment length in milliseconds.
    pub duration_ms: u64,
    /// Caption shown while the segment plays.
    pub caption: String,
}

impl KeyframeSegment {
    fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Camera placement at normalized progress `k` in `[0, 1]`.
    #[must_use]
    pub fn shot_at(&self, k: f32) -> Shot {
        Shot {
            position: self.start.lerp(self.end, ease_in_out_quad(k)),
            look_target: self.look_target,
        }
    }
}

/// Camera placement produced by the sequencer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    /// Camera position.
    pub position: Vec3,
    /// Look-at point.
    pub look_target: Vec3,
}

/// What one call to [`CinematicSequencer::advance`] produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CinematicStep {
    /// A segment is playing; the camera belongs to the sequencer.
    Playing(Shot),
    /// The last segment just finished. Returned once; carries the final
    /// snapped shot unless the script was empty.
    Completed(Option<Shot>),
    /// The intro already finished earlier.
    Interactive,
}

/// Quadratic ease-in/ease-out on `[0, 1]`.
#[must_use]
pub fn ease_in_out_quad(k: f32) -> f32 {
    let k = k.clamp(0.0, 1.0) * 2.0;
    if k < 1.0 {
        0.5 * k * k
    } else {
        -0.5 * ((k - 1.0) * (k - 3.0) - 1.0)
    }
}

/// Plays [`KeyframeSegment`]s in order, then hands off to interactive control.
#[derive(Clone, Debug)]
pub struct CinematicSequencer {
    segments: Vec<KeyframeSegment>,
    /// Index of the playing segment; equals `segments.len()` once finished.
    index: usize,
    /// Time spent in the playing segment.
    segment_elapsed: Duration,
    started: bool,
}

impl CinematicSequencer {
    /// Create a sequencer at the start of the script.
    #[must_use]
    pub fn new(segments: Vec<KeyframeSegment>) -> Self {
        Self {
            segments,
            index: 0,
            segment_elapsed: Duration::ZERO,
            started: false,
        }
    }

    /// Whether the script has finished and control is interactive.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.started && self.index >= self.segments.len()
    }

    /// Index of the playing segment, if any.
    #[must_use]
    pub fn current_segment(&self) -> Option<usize> {
        (self.index < self.segments.len()).then_some(self.index)
    }

    /// Total scripted length.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.segments.iter().map(KeyframeSegment::duration).sum()
    }

    /// Advance by `dt` and publish captions for every segment entered.
    pub fn advance(&mut self, dt: Duration, sink: &mut dyn DisplaySink) -> CinematicStep {
        if self.is_interactive() {
            return CinematicStep::Interactive;
        }

        if !self.started {
            self.started = true;
            if let Some(first) = self.segments.first() {
                tracing::info!("Intro started ({} segments)", self.segments.len());
                sink.show_caption(&first.caption);
            }
        }

        self.segment_elapsed += dt;
        while let Some(segment) = self.segments.get(self.index) {
            let duration = segment.duration();
            if self.segment_elapsed < duration {
                break;
            }
            self.segment_elapsed -= duration;
            self.index += 1;
            if let Some(next) = self.segments.get(self.index) {
                sink.show_caption(&next.caption);
            }
        }

        match self.segments.get(self.index) {
            Some(segment) => {
                let k = self.segment_elapsed.as_secs_f32() / segment.duration().as_secs_f32();
                CinematicStep::Playing(segment.shot_at(k))
            }
            None => {
                sink.show_caption("");
                tracing::info!("Intro complete, interactive control enabled");
                CinematicStep::Completed(self.segments.last().map(|last| Shot {
                    position: last.end,
                    look_target: last.look_target,
                }))
            }
        }
    }
}
