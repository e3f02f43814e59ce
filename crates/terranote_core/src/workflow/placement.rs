//! Placement state machine.
//!
//! Separates "where did the user point" (renderer-dependent, may fail) from
//! "is this a committable comment" (author + scene + non-empty text), so a
//! bad pick never corrupts or blocks the session.

use crate::model::comment::WorldPosition;
use crate::repo::comment_store::{CommentRecord, CommentStore, StoreResult};
use crate::repo::document_storage::DocumentStorage;
use crate::scene::{SceneRenderer, ScreenPoint};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upward shift applied to the ground fallback when a picked feature has no
/// resolvable surface position, so the marker clears the geometry.
pub const SURFACE_FALLBACK_LIFT: f64 = 2.0;

/// Workflow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementState {
    /// Not armed; clicks are ignored.
    Inactive,
    /// Armed, waiting for a scene click.
    AwaitingPosition,
    /// A pick has been resolved; waiting for text.
    PositionChosen,
}

/// Failed `activate` preconditions, surfaced as user warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    MissingAuthor,
    NoActiveScene,
}

impl Display for ActivationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAuthor => write!(f, "an author name is required before placing comments"),
            Self::NoActiveScene => write!(f, "a scene must be loaded before placing comments"),
        }
    }
}

impl Error for ActivationError {}

/// Result of resolving one scene click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// A usable position was stored; the workflow moved to `PositionChosen`.
    PositionChosen { feature_name: Option<String> },
    /// No position could be resolved; still armed.
    InvalidPosition,
    /// The workflow was not awaiting a position; the click was ignored.
    NotArmed,
}

/// Result of one commit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The comment was persisted; the workflow returned to `Inactive`.
    Committed(CommentRecord),
    /// Empty text was rejected; the chosen position is kept.
    EmptyText,
    /// No position had been chosen; nothing to save.
    NoPendingPosition,
}

/// State machine turning picks into committed comments.
#[derive(Debug, Default)]
pub struct PlacementWorkflow {
    state: State,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Inactive,
    Awaiting {
        author: String,
        scene_key: String,
    },
    Chosen {
        author: String,
        scene_key: String,
        position: WorldPosition,
        feature_name: Option<String>,
    },
}

impl PlacementWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlacementState {
        match self.state {
            State::Inactive => PlacementState::Inactive,
            State::Awaiting { .. } => PlacementState::AwaitingPosition,
            State::Chosen { .. } => PlacementState::PositionChosen,
        }
    }

    /// Arms the workflow. Requires a non-empty author and a loaded scene;
    /// on failure the workflow stays `Inactive`.
    pub fn activate(&mut self, author: &str, scene_key: &str) -> Result<(), ActivationError> {
        if author.trim().is_empty() {
            warn!("event=placement_activate module=workflow status=rejected reason=missing_author");
            return Err(ActivationError::MissingAuthor);
        }
        if scene_key.is_empty() {
            warn!("event=placement_activate module=workflow status=rejected reason=no_scene");
            return Err(ActivationError::NoActiveScene);
        }

        self.state = State::Awaiting {
            author: author.trim().to_string(),
            scene_key: scene_key.to_string(),
        };
        info!("event=placement_activate module=workflow status=ok scene={scene_key}");
        Ok(())
    }

    /// Resolves a scene click into a pending position.
    ///
    /// A feature hit asks the renderer for a surface position near that
    /// feature, falling back to the ground pick lifted slightly upward when
    /// the feature's own position cannot be resolved. Without a feature the
    /// bare ground pick is used directly.
    pub fn on_scene_pick<R: SceneRenderer>(
        &mut self,
        renderer: &R,
        screen: ScreenPoint,
    ) -> PickOutcome {
        let State::Awaiting { author, scene_key } = &self.state else {
            return PickOutcome::NotArmed;
        };
        let (author, scene_key) = (author.clone(), scene_key.clone());

        let feature = renderer.pick(screen);
        let position = match &feature {
            Some(_) => renderer
                .pick_surface_position(screen)
                .or_else(|| {
                    renderer
                        .pick_ground_position(screen)
                        .map(|ground| ground.lifted(SURFACE_FALLBACK_LIFT))
                }),
            None => renderer.pick_ground_position(screen),
        };

        let Some(position) = position else {
            warn!("event=placement_pick module=workflow status=invalid_position");
            return PickOutcome::InvalidPosition;
        };

        let feature_name = feature.map(|feature| feature.name);
        self.state = State::Chosen {
            author,
            scene_key,
            position,
            feature_name: feature_name.clone(),
        };
        info!("event=placement_pick module=workflow status=ok feature={}",
            feature_name.as_deref().unwrap_or("-"));
        PickOutcome::PositionChosen { feature_name }
    }

    /// Commits the pending position with the given text.
    ///
    /// Empty text keeps the chosen position and state so the user can type
    /// again instead of silently losing the pick. Calls without a pending
    /// position are no-ops. Store failures keep the state so commit can be
    /// retried.
    pub fn commit<S: DocumentStorage>(
        &mut self,
        store: &mut CommentStore<S>,
        text: &str,
    ) -> StoreResult<CommitOutcome> {
        let State::Chosen {
            author,
            scene_key,
            position,
            feature_name,
        } = &self.state
        else {
            return Ok(CommitOutcome::NoPendingPosition);
        };

        if text.trim().is_empty() {
            warn!("event=placement_commit module=workflow status=rejected reason=empty_text");
            return Ok(CommitOutcome::EmptyText);
        }

        let record = store.add_comment(
            scene_key,
            text,
            *position,
            feature_name.clone(),
            author,
        )?;
        self.state = State::Inactive;
        info!("event=placement_commit module=workflow status=ok id={}", record.id);
        Ok(CommitOutcome::Committed(record))
    }

    /// Drops any pending position and returns to `Inactive` without saving.
    pub fn cancel(&mut self) {
        self.state = State::Inactive;
    }

    /// Force-return to `Inactive` from any state. Used for external
    /// interruptions such as an escape key or a panel switch.
    pub fn deactivate(&mut self) {
        self.state = State::Inactive;
    }

    /// Pending resolved position, if one was chosen.
    pub fn pending_position(&self) -> Option<WorldPosition> {
        match &self.state {
            State::Chosen { position, .. } => Some(*position),
            _ => None,
        }
    }
}
