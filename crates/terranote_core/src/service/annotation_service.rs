//! Annotation use-case facade.
//!
//! # Responsibility
//! - Expose the full application-facing operation set: placement, CRUD,
//!   interchange, highlight, teardown.
//! - Keep scene markers in sync with every repository change.
//!
//! # Invariants
//! - Starting a new placement cancels any stale highlight animation.
//! - Wholesale document changes (scene switch, import, clear) rebuild all
//!   markers; single deletes remove only the matching pair.

use crate::repo::comment_store::{CommentRecord, CommentStore, StoreError, StoreResult, StoreStats};
use crate::repo::document_storage::DocumentStorage;
use crate::scene::visuals::VisualSynchronizer;
use crate::scene::{SceneRenderer, ScreenPoint};
use crate::workflow::placement::{
    ActivationError, CommitOutcome, PickOutcome, PlacementState, PlacementWorkflow,
};
use std::time::Instant;

/// Facade owning the comment store, the placement workflow, the visual
/// synchronizer and the renderer handle.
pub struct AnnotationService<S: DocumentStorage, R: SceneRenderer> {
    store: CommentStore<S>,
    workflow: PlacementWorkflow,
    visuals: VisualSynchronizer,
    renderer: R,
    author: String,
    active_scene: Option<String>,
}

impl<S: DocumentStorage, R: SceneRenderer> AnnotationService<S, R> {
    pub fn new(store: CommentStore<S>, renderer: R) -> Self {
        Self {
            store,
            workflow: PlacementWorkflow::new(),
            visuals: VisualSynchronizer::new(),
            renderer,
            author: String::new(),
            active_scene: None,
        }
    }

    /// Sets the author recorded on newly placed comments.
    pub fn set_author(&mut self, author: &str) {
        self.author = author.trim().to_string();
    }

    /// Switches the active scene: loads its comments and rebuilds all
    /// markers. Any in-flight placement or highlight is dropped.
    pub fn switch_scene(&mut self, scene_key: &str) {
        self.workflow.deactivate();
        self.active_scene = Some(scene_key.to_string());
        let records = self.store.comments_for_scene(scene_key);
        self.visuals.refresh_all(&mut self.renderer, &records);
    }

    /// Arms comment placement for the active scene.
    pub fn activate_placement(&mut self) -> Result<(), ActivationError> {
        // A fresh placement must not run under a stale pulse.
        self.visuals.cancel_highlight(&mut self.renderer);
        let scene_key = self.active_scene.clone().unwrap_or_default();
        self.workflow.activate(&self.author, &scene_key)
    }

    /// Routes a scene click into the placement workflow.
    pub fn on_scene_pick(&mut self, screen: ScreenPoint) -> PickOutcome {
        self.workflow.on_scene_pick(&self.renderer, screen)
    }

    /// Commits the pending placement; a new marker appears on success.
    pub fn commit_comment(&mut self, text: &str) -> StoreResult<CommitOutcome> {
        let outcome = self.workflow.commit(&mut self.store, text)?;
        if let CommitOutcome::Committed(record) = &outcome {
            self.visuals.add_visual(&mut self.renderer, record);
        }
        Ok(outcome)
    }

    /// Aborts a pending placement without saving.
    pub fn cancel_placement(&mut self) {
        self.workflow.cancel();
    }

    /// Force-returns the workflow to idle and stops any highlight. Wired to
    /// escape-key and panel-switch interruptions.
    pub fn deactivate_placement(&mut self) {
        self.workflow.deactivate();
        self.visuals.cancel_highlight(&mut self.renderer);
    }

    /// Ordered comments for one scene, cache-served when possible.
    pub fn comments(&mut self, scene_key: &str) -> Vec<CommentRecord> {
        self.store.comments_for_scene(scene_key)
    }

    /// Edits a comment's text, then refreshes the affected scene's markers.
    pub fn update_comment(&mut self, id: &str, scene_key: &str, text: &str) -> StoreResult<()> {
        self.store.update_comment(id, scene_key, text)?;
        if self.is_active_scene(scene_key) {
            self.refresh_active_scene();
        }
        Ok(())
    }

    /// Deletes one comment; its marker pair is removed without a rebuild.
    /// Returns whether a comment was actually removed.
    pub fn delete_comment(&mut self, id: &str, scene_key: &str) -> StoreResult<bool> {
        let removed = self.store.delete_comment(id, scene_key)?;
        if removed && self.is_active_scene(scene_key) {
            self.visuals.remove_visual(&mut self.renderer, id);
        }
        Ok(removed)
    }

    pub fn export_json(&self) -> StoreResult<String> {
        self.store.export_json()
    }

    /// Transactional JSON import; markers are rebuilt on success.
    pub fn import_json(&mut self, payload: &str) -> StoreResult<()> {
        self.store.import_json(payload)?;
        self.refresh_active_scene();
        Ok(())
    }

    pub fn export_csv(&self) -> String {
        self.store.export_csv()
    }

    /// Transactional CSV import; markers are rebuilt on success. Returns the
    /// number of imported comments.
    pub fn import_csv(&mut self, text: &str) -> StoreResult<usize> {
        let imported = self.store.import_csv(text)?;
        self.refresh_active_scene();
        Ok(imported)
    }

    /// Flies the camera to a comment of the active scene and pulses its
    /// marker. Fails with `NotFound` for unknown ids.
    pub fn highlight_comment(&mut self, id: &str, now: Instant) -> StoreResult<()> {
        let scene_key = self.active_scene.clone().unwrap_or_default();
        let record = self
            .store
            .comments_for_scene(&scene_key)
            .into_iter()
            .find(|record| record.id == id)
            .ok_or_else(|| StoreError::NotFound {
                scene_key: scene_key.clone(),
                id: Some(id.to_string()),
            })?;
        self.visuals.highlight(&mut self.renderer, &record, now);
        Ok(())
    }

    /// Drops every comment in every scene and clears all markers.
    pub fn clear_all_data(&mut self) -> StoreResult<()> {
        self.store.clear_all()?;
        self.visuals.refresh_all(&mut self.renderer, &[]);
        Ok(())
    }

    /// Advances timer-driven animations. Call from the frame/timer loop.
    pub fn tick(&mut self, now: Instant) {
        self.visuals.tick(&mut self.renderer, now);
    }

    /// Releases all scene primitives; call before dropping the view.
    pub fn teardown(&mut self) {
        self.workflow.deactivate();
        self.visuals.teardown(&mut self.renderer);
    }

    pub fn placement_state(&self) -> PlacementState {
        self.workflow.state()
    }

    pub fn stats(&self) -> StoreStats {
        self.store.get_stats()
    }

    pub fn marker_count(&self) -> usize {
        self.visuals.marker_count()
    }

    fn is_active_scene(&self, scene_key: &str) -> bool {
        self.active_scene.as_deref() == Some(scene_key)
    }

    fn refresh_active_scene(&mut self) {
        let Some(scene_key) = self.active_scene.clone() else {
            return;
        };
        let records = self.store.comments_for_scene(&scene_key);
        self.visuals.refresh_all(&mut self.renderer, &records);
    }
}
