//! Core domain logic for TerraNote scene annotations.
//!
//! This crate is the single source of truth for comment persistence, the
//! placement workflow and marker synchronization. Rendering itself stays in
//! the embedding application behind the [`scene::SceneRenderer`] seam.

pub mod codec;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scene;
pub mod service;
pub mod workflow;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::comment::{
    Comment, CommentValidationError, Document, WorldPosition, DOCUMENT_VERSION,
};
pub use repo::clock::{Clock, ManualClock, SystemClock};
pub use repo::comment_store::{
    CommentRecord, CommentStore, StoreError, StoreResult, StoreStats, SCENE_CACHE_CAPACITY,
};
pub use repo::document_storage::{
    DocumentStorage, SqliteDocumentStorage, StorageError, DEFAULT_DOCUMENT_NAME,
};
pub use repo::idgen::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use scene::visuals::VisualSynchronizer;
pub use scene::{MarkerIcon, PickedFeature, SceneRenderer, ScreenPoint};
pub use service::annotation_service::AnnotationService;
pub use workflow::placement::{
    ActivationError, CommitOutcome, PickOutcome, PlacementState, PlacementWorkflow,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
