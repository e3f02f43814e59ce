//! Scene-partitioned comment store.
//!
//! # Responsibility
//! - Own the live document, the bounded scene cache and every CRUD path.
//! - Route interchange payloads through the codecs transactionally.
//!
//! # Invariants
//! - The document is loaded once at construction; read failures degrade to
//!   an empty document and are logged, never surfaced.
//! - Every successful write persists the full document and clears the whole
//!   cache.
//! - Imports stage into a parsed document first; the live document is only
//!   replaced after the entire payload validated.

use crate::codec::{csv, json, CodecError};
use crate::model::comment::{Comment, CommentValidationError, Document, WorldPosition};
use crate::repo::clock::{Clock, SystemClock};
use crate::repo::document_storage::{DocumentStorage, StorageError};
use crate::repo::idgen::{IdGenerator, UuidIdGenerator};
use crate::repo::scene_cache::SceneCache;
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed number of scenes the read cache retains.
pub const SCENE_CACHE_CAPACITY: usize = 8;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store error taxonomy surfaced to callers.
#[derive(Debug)]
pub enum StoreError {
    /// Unknown scene, or unknown comment id within a known scene.
    NotFound {
        scene_key: String,
        id: Option<String>,
    },
    /// Malformed import payload; the live document was left untouched.
    InvalidFormat(String),
    /// Input rejected before reaching the document.
    Validation(CommentValidationError),
    /// Durable read/write failure.
    Storage(StorageError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { scene_key, id } => match id {
                Some(id) => write!(f, "comment `{id}` not found in scene `{scene_key}`"),
                None => write!(f, "scene `{scene_key}` has no comments"),
            },
            Self::InvalidFormat(message) => write!(f, "invalid import payload: {message}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CommentValidationError> for StoreError {
    fn from(value: CommentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        match value {
            CodecError::InvalidFormat(message) => Self::InvalidFormat(message),
        }
    }
}

/// Read model for one comment with the position materialized.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub id: String,
    pub scene_key: String,
    pub text: String,
    pub position: WorldPosition,
    pub feature_name: Option<String>,
    pub author: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CommentRecord {
    fn from_comment(comment: &Comment) -> Self {
        Self {
            id: comment.id.clone(),
            scene_key: comment.scene_key.clone(),
            text: comment.text.clone(),
            position: comment.position(),
            feature_name: comment.feature_name.clone(),
            author: comment.author.clone(),
            created_at: comment.created_at.clone(),
            updated_at: comment.updated_at.clone(),
        }
    }
}

/// Aggregate counts for diagnostics and round-trip checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub scene_count: usize,
    pub comment_count: usize,
    pub per_scene: BTreeMap<String, usize>,
    pub version: String,
}

/// The comment repository: in-memory document, bounded cache, durable
/// write-through.
pub struct CommentStore<S: DocumentStorage> {
    storage: S,
    document: Document,
    cache: SceneCache,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl<S: DocumentStorage> CommentStore<S> {
    /// Opens the store with production id/time sources and loads the
    /// persisted document, degrading to empty on any read failure.
    pub fn open(storage: S) -> Self {
        Self::with_env(storage, Box::new(UuidIdGenerator), Box::new(SystemClock))
    }

    /// Opens the store with injected id generator and clock.
    pub fn with_env(storage: S, ids: Box<dyn IdGenerator>, clock: Box<dyn Clock>) -> Self {
        let document = Self::load_document(&storage);
        Self {
            storage,
            document,
            cache: SceneCache::new(SCENE_CACHE_CAPACITY),
            ids,
            clock,
        }
    }

    fn load_document(storage: &S) -> Document {
        match storage.load_payload() {
            Ok(Some(payload)) => match json::decode_document(&payload) {
                Ok(document) => {
                    info!(
                        "event=store_load module=repo status=ok comments={}",
                        document.comment_count()
                    );
                    document
                }
                Err(err) => {
                    warn!("event=store_load module=repo status=degraded reason=corrupt_payload error={err}");
                    Document::empty()
                }
            },
            Ok(None) => Document::empty(),
            Err(err) => {
                warn!("event=store_load module=repo status=degraded reason=read_failed error={err}");
                Document::empty()
            }
        }
    }

    /// Serializes the live document, writes it through and clears the cache.
    fn persist(&mut self) -> StoreResult<()> {
        let payload = json::encode_document(&self.document)
            .map_err(|err| StoreError::Storage(StorageError::Backend(err.to_string())))?;
        self.storage.save_payload(&payload)?;
        self.cache.clear();
        Ok(())
    }

    /// Persists, rolling the in-memory document back to `previous` on a
    /// durable write failure so memory and storage stay consistent.
    fn persist_or_rollback(&mut self, previous: Document) -> StoreResult<()> {
        if let Err(err) = self.persist() {
            self.document = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Returns the ordered comments of one scene, positions materialized.
    ///
    /// Served from cache when present; a miss materializes from the document
    /// and inserts, evicting the oldest cached scene beyond capacity.
    pub fn comments_for_scene(&mut self, scene_key: &str) -> Vec<CommentRecord> {
        if let Some(records) = self.cache.get(scene_key) {
            return records.clone();
        }

        let records: Vec<CommentRecord> = self
            .document
            .comments
            .get(scene_key)
            .map(|list| list.iter().map(CommentRecord::from_comment).collect())
            .unwrap_or_default();
        self.cache.insert(scene_key.to_string(), records.clone());
        records
    }

    /// Creates a comment, persists, and returns the materialized record so
    /// callers never need a re-read.
    pub fn add_comment(
        &mut self,
        scene_key: &str,
        text: &str,
        position: WorldPosition,
        feature_name: Option<String>,
        author: &str,
    ) -> StoreResult<CommentRecord> {
        if scene_key.is_empty() {
            return Err(CommentValidationError::EmptySceneKey.into());
        }
        if text.is_empty() {
            return Err(CommentValidationError::EmptyText.into());
        }

        let mut id = self.ids.next_id();
        while self.document.contains_id(&id) {
            id = self.ids.next_id();
        }
        let now = self.clock.now_iso();

        let comment = Comment {
            id,
            scene_key: scene_key.to_string(),
            text: text.to_string(),
            position_x: position.x,
            position_y: position.y,
            position_z: position.z,
            feature_name,
            author: author.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        let record = CommentRecord::from_comment(&comment);

        let snapshot = self.document.clone();
        self.document
            .comments
            .entry(scene_key.to_string())
            .or_default()
            .push(comment);
        self.persist_or_rollback(snapshot)?;

        info!(
            "event=comment_add module=repo status=ok scene={scene_key} id={}",
            record.id
        );
        Ok(record)
    }

    /// Replaces a comment's text and refreshes `updated_at`. `id` and
    /// `created_at` never change.
    pub fn update_comment(
        &mut self,
        id: &str,
        scene_key: &str,
        new_text: &str,
    ) -> StoreResult<()> {
        if new_text.is_empty() {
            return Err(CommentValidationError::EmptyText.into());
        }

        let now = self.clock.now_iso();
        let snapshot = self.document.clone();
        let list = self
            .document
            .comments
            .get_mut(scene_key)
            .ok_or_else(|| StoreError::NotFound {
                scene_key: scene_key.to_string(),
                id: None,
            })?;
        let comment = list
            .iter_mut()
            .find(|comment| comment.id == id)
            .ok_or_else(|| StoreError::NotFound {
                scene_key: scene_key.to_string(),
                id: Some(id.to_string()),
            })?;

        comment.text = new_text.to_string();
        comment.updated_at = now;
        self.persist_or_rollback(snapshot)?;

        info!("event=comment_update module=repo status=ok scene={scene_key} id={id}");
        Ok(())
    }

    /// Removes a comment. Returns `Ok(false)` and performs no persistence
    /// when the id was absent — a phantom delete must never report success.
    pub fn delete_comment(&mut self, id: &str, scene_key: &str) -> StoreResult<bool> {
        let list = self
            .document
            .comments
            .get(scene_key)
            .ok_or_else(|| StoreError::NotFound {
                scene_key: scene_key.to_string(),
                id: None,
            })?;

        if !list.iter().any(|comment| comment.id == id) {
            return Ok(false);
        }

        let snapshot = self.document.clone();
        if let Some(list) = self.document.comments.get_mut(scene_key) {
            list.retain(|comment| comment.id != id);
        }
        self.persist_or_rollback(snapshot)?;
        info!("event=comment_delete module=repo status=ok scene={scene_key} id={id}");
        Ok(true)
    }

    /// Serializes the full document to interchange JSON.
    pub fn export_json(&self) -> StoreResult<String> {
        Ok(json::encode_document(&self.document)?)
    }

    /// Replaces the whole document with a validated external JSON payload.
    ///
    /// All-or-nothing: the payload is staged and validated first; on any
    /// failure the live document and cache are untouched.
    pub fn import_json(&mut self, payload: &str) -> StoreResult<()> {
        let staged = json::decode_document(payload)?;
        self.replace_document(staged, "json")
    }

    /// Serializes all comments of all scenes to the flattened CSV view.
    pub fn export_csv(&self) -> String {
        csv::encode_document(&self.document)
    }

    /// Replaces the whole document with the contents of a CSV payload.
    ///
    /// Destructive by contract: after a successful import the store holds
    /// only what the CSV contained. All-or-nothing like `import_json`.
    /// Returns the number of imported comments.
    pub fn import_csv(&mut self, text: &str) -> StoreResult<usize> {
        let staged = csv::decode_document(text)?;
        let imported = staged.comment_count();
        self.replace_document(staged, "csv")?;
        Ok(imported)
    }

    fn replace_document(&mut self, staged: Document, format: &str) -> StoreResult<()> {
        let previous = std::mem::replace(&mut self.document, staged);
        self.persist_or_rollback(previous)?;
        info!(
            "event=store_import module=repo status=ok format={format} comments={}",
            self.document.comment_count()
        );
        Ok(())
    }

    /// Drops every comment in every scene and persists the empty document.
    pub fn clear_all(&mut self) -> StoreResult<()> {
        let previous = std::mem::replace(&mut self.document, Document::empty());
        self.persist_or_rollback(previous)?;
        info!("event=store_clear module=repo status=ok");
        Ok(())
    }

    /// Aggregate counts, deterministic scene ordering.
    pub fn get_stats(&self) -> StoreStats {
        let per_scene: BTreeMap<String, usize> = self
            .document
            .comments
            .iter()
            .map(|(scene, list)| (scene.clone(), list.len()))
            .collect();
        StoreStats {
            scene_count: per_scene.len(),
            comment_count: per_scene.values().sum(),
            per_scene,
            version: self.document.metadata.version.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn cached_scene_count(&self) -> usize {
        self.cache.len()
    }
}
