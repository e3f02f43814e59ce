//! Cancellable highlight animation for one marker.
//!
//! The pulse used to run on fire-and-forget timers that could interleave
//! with later placements. It is modeled here as an explicit task advanced by
//! caller ticks, so a new placement or a panel switch can cancel it cleanly.

use crate::scene::SceneRenderer;
use std::time::{Duration, Instant};

/// Number of scale toggles in one pulse (6 toggles at 300 ms ≈ 1.8 s).
pub const PULSE_TOGGLES: u32 = 6;
/// Cadence between scale toggles.
pub const PULSE_INTERVAL: Duration = Duration::from_millis(300);
/// How long the label stays revealed after a highlight starts.
pub const LABEL_REVEAL_WINDOW: Duration = Duration::from_secs(3);
/// Icon scale while the pulse is in its enlarged phase.
pub const PULSE_SCALE: f64 = 1.6;
/// Resting icon scale.
pub const BASE_SCALE: f64 = 1.0;

/// One in-flight highlight: pulsing icon plus temporarily revealed label.
#[derive(Debug)]
pub struct HighlightTask {
    marker_tag: String,
    label_tag: String,
    toggles_left: u32,
    enlarged: bool,
    next_toggle_at: Instant,
    label_hide_at: Instant,
    label_hidden: bool,
}

impl HighlightTask {
    pub fn start<R: SceneRenderer>(
        renderer: &mut R,
        marker_tag: String,
        label_tag: String,
        now: Instant,
    ) -> Self {
        renderer.set_primitive_visible(&label_tag, true);
        Self {
            marker_tag,
            label_tag,
            toggles_left: PULSE_TOGGLES,
            enlarged: false,
            next_toggle_at: now + PULSE_INTERVAL,
            label_hide_at: now + LABEL_REVEAL_WINDOW,
            label_hidden: false,
        }
    }

    /// Advances the animation to `now`. Returns `true` once finished.
    pub fn tick<R: SceneRenderer>(&mut self, renderer: &mut R, now: Instant) -> bool {
        while self.toggles_left > 0 && now >= self.next_toggle_at {
            self.enlarged = !self.enlarged;
            let scale = if self.enlarged { PULSE_SCALE } else { BASE_SCALE };
            renderer.set_primitive_scale(&self.marker_tag, scale);
            self.toggles_left -= 1;
            self.next_toggle_at += PULSE_INTERVAL;
        }
        if self.toggles_left == 0 && self.enlarged {
            // Even toggle counts end at rest, but guard against drift.
            renderer.set_primitive_scale(&self.marker_tag, BASE_SCALE);
            self.enlarged = false;
        }

        if !self.label_hidden && now >= self.label_hide_at {
            renderer.set_primitive_visible(&self.label_tag, false);
            self.label_hidden = true;
        }

        renderer.request_redraw();
        self.toggles_left == 0 && self.label_hidden
    }

    /// Stops the animation immediately and restores the resting state.
    pub fn cancel<R: SceneRenderer>(&self, renderer: &mut R) {
        renderer.set_primitive_scale(&self.marker_tag, BASE_SCALE);
        renderer.set_primitive_visible(&self.label_tag, false);
        renderer.request_redraw();
    }

    /// Id of the comment whose marker this task animates.
    pub fn marker_tag(&self) -> &str {
        &self.marker_tag
    }
}
