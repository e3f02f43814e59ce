//! Marker lifecycle bound to repository contents.
//!
//! # Responsibility
//! - Maintain exactly one icon+label marker pair per live comment.
//! - Drive the cancellable highlight animation.
//!
//! # Invariants
//! - Markers are keyed by comment id; primitives are addressed through
//!   string tags only, never object references.
//! - The shared icon image is rasterized once and reused for every marker.

use crate::repo::comment_store::CommentRecord;
use crate::scene::highlight::HighlightTask;
use crate::scene::{MarkerIcon, SceneRenderer};
use log::debug;
use std::collections::BTreeSet;
use std::time::Instant;

/// Camera travel time for `highlight`.
pub const FLY_DURATION_SECONDS: f64 = 2.0;

const ICON_SIZE: u32 = 32;

/// Returns the primitive tag for a comment's icon.
pub fn marker_tag(comment_id: &str) -> String {
    format!("comment-marker-{comment_id}")
}

/// Returns the primitive tag for a comment's label.
pub fn label_tag(comment_id: &str) -> String {
    format!("comment-label-{comment_id}")
}

/// Keeps the renderer's marker set in one-to-one sync with the store.
///
/// The renderer is passed into each call so ownership stays with the caller;
/// this type only does bookkeeping.
#[derive(Default)]
pub struct VisualSynchronizer {
    comment_ids: BTreeSet<String>,
    icon: Option<MarkerIcon>,
    highlight: Option<HighlightTask>,
}

impl VisualSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn shared_icon(&mut self) -> &MarkerIcon {
        self.icon.get_or_insert_with(|| MarkerIcon {
            width: ICON_SIZE,
            height: ICON_SIZE,
            svg: render_pin_svg(ICON_SIZE),
        })
    }

    /// Registers the icon+label pair for one comment.
    pub fn add_visual<R: SceneRenderer>(&mut self, renderer: &mut R, record: &CommentRecord) {
        let icon = self.shared_icon().clone();
        renderer.add_icon_primitive(record.position, &icon, &marker_tag(&record.id));
        renderer.add_label_primitive(
            record.position,
            &record.text,
            &label_tag(&record.id),
            true,
        );
        self.comment_ids.insert(record.id.clone());
        renderer.request_redraw();
    }

    /// Tears down every marker and rebuilds from the authoritative list.
    ///
    /// Full rebuild over incremental diffing, chosen for correctness on
    /// wholesale changes (scene switch, import, bulk clear).
    pub fn refresh_all<R: SceneRenderer>(&mut self, renderer: &mut R, records: &[CommentRecord]) {
        self.remove_all(renderer);
        for record in records {
            self.add_visual(renderer, record);
        }
        debug!(
            "event=visuals_refresh module=scene status=ok markers={}",
            records.len()
        );
    }

    /// Removes only the matching icon+label pair.
    pub fn remove_visual<R: SceneRenderer>(&mut self, renderer: &mut R, comment_id: &str) {
        if !self.comment_ids.remove(comment_id) {
            return;
        }
        if let Some(task) = &self.highlight {
            if task.marker_tag() == marker_tag(comment_id) {
                self.highlight = None;
            }
        }
        renderer.remove_primitive(&marker_tag(comment_id));
        renderer.remove_primitive(&label_tag(comment_id));
        renderer.request_redraw();
    }

    /// Flies the camera to the comment and starts the pulse animation.
    ///
    /// Any previous highlight is cancelled first; the pulse never interleaves
    /// with a stale one.
    pub fn highlight<R: SceneRenderer>(
        &mut self,
        renderer: &mut R,
        record: &CommentRecord,
        now: Instant,
    ) {
        self.cancel_highlight(renderer);
        renderer.fly_to(record.position, FLY_DURATION_SECONDS);
        self.highlight = Some(HighlightTask::start(
            renderer,
            marker_tag(&record.id),
            label_tag(&record.id),
            now,
        ));
    }

    /// Stops a running highlight and restores the marker's resting state.
    pub fn cancel_highlight<R: SceneRenderer>(&mut self, renderer: &mut R) {
        if let Some(task) = self.highlight.take() {
            task.cancel(renderer);
        }
    }

    /// Advances the running highlight, if any. Safe to call on every frame
    /// or timer callback.
    pub fn tick<R: SceneRenderer>(&mut self, renderer: &mut R, now: Instant) {
        if let Some(task) = &mut self.highlight {
            if task.tick(renderer, now) {
                self.highlight = None;
            }
        }
    }

    /// Whether a highlight animation is currently running.
    pub fn highlight_active(&self) -> bool {
        self.highlight.is_some()
    }

    /// Number of comments currently represented by markers.
    pub fn marker_count(&self) -> usize {
        self.comment_ids.len()
    }

    /// Removes all owned primitives and drops the cached icon so nothing
    /// outlives the view.
    pub fn teardown<R: SceneRenderer>(&mut self, renderer: &mut R) {
        self.remove_all(renderer);
        self.icon = None;
    }

    fn remove_all<R: SceneRenderer>(&mut self, renderer: &mut R) {
        self.cancel_highlight(renderer);
        for id in std::mem::take(&mut self.comment_ids) {
            renderer.remove_primitive(&marker_tag(&id));
            renderer.remove_primitive(&label_tag(&id));
        }
        renderer.request_redraw();
    }
}

/// Builds the shared pin icon as a small inline SVG.
fn render_pin_svg(size: u32) -> String {
    let half = size / 2;
    let head = size / 3;
    format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{s}\" height=\"{s}\">",
            "<circle cx=\"{h}\" cy=\"{r}\" r=\"{r}\" fill=\"#d9534f\" stroke=\"#ffffff\" stroke-width=\"2\"/>",
            "<path d=\"M {h} {s} L {q} {m} L {t} {m} Z\" fill=\"#d9534f\"/>",
            "</svg>"
        ),
        s = size,
        h = half,
        r = head,
        q = half - head / 2,
        t = half + head / 2,
        m = head * 2,
    )
}

#[cfg(test)]
mod tests {
    use super::{label_tag, marker_tag, render_pin_svg};

    #[test]
    fn tags_are_derived_from_comment_id() {
        assert_eq!(marker_tag("c-1"), "comment-marker-c-1");
        assert_eq!(label_tag("c-1"), "comment-label-c-1");
    }

    #[test]
    fn pin_svg_is_well_formed_enough() {
        let svg = render_pin_svg(32);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("circle"));
    }
}
