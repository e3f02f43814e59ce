//! Comment and document model.
//!
//! # Responsibility
//! - Define `WorldPosition`, `Comment` and the durable `Document` root.
//! - Keep serde field names pinned to the durable interchange schema.
//!
//! # Invariants
//! - `id` is unique across the whole document, not just within one scene.
//! - `created_at` never changes after creation; `updated_at` moves on edits.
//! - A comment's `scene_key` always matches the document map key it lives
//!   under.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Durable document schema version written into `metadata.version`.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Validation failures raised before data reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentValidationError {
    /// One of x/y/z is NaN or infinite.
    NonFinitePosition { axis: &'static str },
    /// Persisted comment text must not be empty.
    EmptyText,
    /// Scene key must not be empty.
    EmptySceneKey,
    /// Comment id must not be empty.
    EmptyId,
    /// Same id appears twice in one document.
    DuplicateId(String),
    /// Comment carries a scene key different from its document map entry.
    SceneKeyMismatch { expected: String, actual: String },
}

impl Display for CommentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinitePosition { axis } => {
                write!(f, "position component `{axis}` is not a finite number")
            }
            Self::EmptyText => write!(f, "comment text must not be empty"),
            Self::EmptySceneKey => write!(f, "scene key must not be empty"),
            Self::EmptyId => write!(f, "comment id must not be empty"),
            Self::DuplicateId(id) => write!(f, "duplicate comment id: {id}"),
            Self::SceneKeyMismatch { expected, actual } => write!(
                f,
                "comment scene key `{actual}` does not match document entry `{expected}`"
            ),
        }
    }
}

impl Error for CommentValidationError {}

/// A 3D Cartesian coordinate in the scene's shared reference frame.
///
/// Construction is the validation boundary: a `WorldPosition` value always
/// holds three finite numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPosition {
    /// Builds a position, rejecting NaN and infinite components.
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self, CommentValidationError> {
        for (axis, value) in [("x", x), ("y", y), ("z", z)] {
            if !value.is_finite() {
                return Err(CommentValidationError::NonFinitePosition { axis });
            }
        }
        Ok(Self { x, y, z })
    }

    /// Returns a copy shifted upward along the z axis.
    ///
    /// Used for the ground-pick fallback when a feature's own surface
    /// position cannot be resolved. The lift is finite by construction.
    pub fn lifted(self, dz: f64) -> Self {
        Self {
            z: self.z + dz,
            ..self
        }
    }
}

/// One persisted annotation, serialized with the durable schema's field
/// names (`szene`, `user`, `timestamp` are fixed interchange names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Stable id, unique across the whole document.
    pub id: String,
    /// Scene/dataset this comment belongs to.
    #[serde(rename = "szene")]
    pub scene_key: String,
    /// Free-form comment body. Never empty once persisted.
    pub text: String,
    pub position_x: f64,
    pub position_y: f64,
    pub position_z: f64,
    /// Name of the picked 3D feature the comment was anchored to, if any.
    #[serde(rename = "featureName", default)]
    pub feature_name: Option<String>,
    /// Creating user.
    #[serde(rename = "user")]
    pub author: String,
    /// Creation timestamp, ISO-8601. Immutable after creation.
    #[serde(rename = "timestamp")]
    pub created_at: String,
    /// Last-edit timestamp, ISO-8601. Older payloads omit this field; it is
    /// backfilled from `created_at` on load.
    #[serde(rename = "updatedAt", default)]
    pub updated_at: String,
}

impl Comment {
    /// Returns the materialized 3D coordinate.
    ///
    /// Components are finite for any comment that passed `validate()`.
    pub fn position(&self) -> WorldPosition {
        WorldPosition {
            x: self.position_x,
            y: self.position_y,
            z: self.position_z,
        }
    }

    /// Backfills `updated_at` for payloads written before the field existed.
    pub fn normalize(&mut self) {
        if self.updated_at.is_empty() {
            self.updated_at = self.created_at.clone();
        }
    }

    /// Checks per-record invariants.
    pub fn validate(&self) -> Result<(), CommentValidationError> {
        if self.id.is_empty() {
            return Err(CommentValidationError::EmptyId);
        }
        if self.scene_key.is_empty() {
            return Err(CommentValidationError::EmptySceneKey);
        }
        if self.text.is_empty() {
            return Err(CommentValidationError::EmptyText);
        }
        WorldPosition::new(self.position_x, self.position_y, self.position_z)?;
        Ok(())
    }
}

/// Version tag container for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub version: String,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
        }
    }
}

/// Durable root: ordered comment lists per scene plus a version tag.
///
/// `BTreeMap` keeps scene ordering deterministic for exports and stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub comments: BTreeMap<String, Vec<Comment>>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Returns a fresh empty document at the current schema version.
    pub fn empty() -> Self {
        Self {
            comments: BTreeMap::new(),
            metadata: DocumentMetadata::default(),
        }
    }

    /// Total number of comments across all scenes.
    pub fn comment_count(&self) -> usize {
        self.comments.values().map(Vec::len).sum()
    }

    /// Returns whether any scene holds a comment with this id.
    pub fn contains_id(&self, id: &str) -> bool {
        self.comments
            .values()
            .any(|list| list.iter().any(|comment| comment.id == id))
    }

    /// Backfills optional fields on every comment after deserialization.
    pub fn normalize(&mut self) {
        for list in self.comments.values_mut() {
            for comment in list.iter_mut() {
                comment.normalize();
            }
        }
    }

    /// Checks whole-document invariants: per-record validity, map-key
    /// consistency and global id uniqueness.
    pub fn validate(&self) -> Result<(), CommentValidationError> {
        let mut seen = BTreeSet::new();
        for (scene_key, list) in &self.comments {
            if scene_key.is_empty() {
                return Err(CommentValidationError::EmptySceneKey);
            }
            for comment in list {
                comment.validate()?;
                if comment.scene_key != *scene_key {
                    return Err(CommentValidationError::SceneKeyMismatch {
                        expected: scene_key.clone(),
                        actual: comment.scene_key.clone(),
                    });
                }
                if !seen.insert(comment.id.clone()) {
                    return Err(CommentValidationError::DuplicateId(comment.id.clone()));
                }
            }
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Comment, CommentValidationError, Document, WorldPosition, DOCUMENT_VERSION};

    fn sample_comment(id: &str, scene: &str) -> Comment {
        Comment {
            id: id.to_string(),
            scene_key: scene.to_string(),
            text: "sample".to_string(),
            position_x: 1.0,
            position_y: 2.0,
            position_z: 3.0,
            feature_name: None,
            author: "tester".to_string(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn world_position_rejects_non_finite_components() {
        assert!(WorldPosition::new(1.0, 2.0, 3.0).is_ok());
        assert!(matches!(
            WorldPosition::new(f64::NAN, 0.0, 0.0),
            Err(CommentValidationError::NonFinitePosition { axis: "x" })
        ));
        assert!(matches!(
            WorldPosition::new(0.0, f64::INFINITY, 0.0),
            Err(CommentValidationError::NonFinitePosition { axis: "y" })
        ));
    }

    #[test]
    fn lifted_shifts_only_z() {
        let position = WorldPosition::new(10.0, 20.0, 5.0).unwrap().lifted(2.0);
        assert_eq!(position.x, 10.0);
        assert_eq!(position.y, 20.0);
        assert_eq!(position.z, 7.0);
    }

    #[test]
    fn empty_document_carries_current_version() {
        let document = Document::empty();
        assert_eq!(document.metadata.version, DOCUMENT_VERSION);
        assert_eq!(document.comment_count(), 0);
    }

    #[test]
    fn validate_rejects_duplicate_ids_across_scenes() {
        let mut document = Document::empty();
        document
            .comments
            .insert("a".to_string(), vec![sample_comment("c-1", "a")]);
        document
            .comments
            .insert("b".to_string(), vec![sample_comment("c-1", "b")]);
        assert!(matches!(
            document.validate(),
            Err(CommentValidationError::DuplicateId(id)) if id == "c-1"
        ));
    }

    #[test]
    fn validate_rejects_scene_key_mismatch() {
        let mut document = Document::empty();
        document
            .comments
            .insert("a".to_string(), vec![sample_comment("c-1", "elsewhere")]);
        assert!(matches!(
            document.validate(),
            Err(CommentValidationError::SceneKeyMismatch { .. })
        ));
    }

    #[test]
    fn normalize_backfills_updated_at() {
        let mut comment = sample_comment("c-1", "a");
        comment.updated_at.clear();
        comment.normalize();
        assert_eq!(comment.updated_at, comment.created_at);
    }
}
