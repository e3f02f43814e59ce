//! Renderer collaborator seam and scene visuals.
//!
//! # Responsibility
//! - Define the narrow capability trait this core consumes from the external
//!   rendering engine.
//! - Keep scene markers in sync with repository state (`visuals`).
//!
//! # Invariants
//! - The core never holds live primitive references; markers are addressed
//!   by plain string tags derived from comment ids.

use crate::model::comment::WorldPosition;

pub mod highlight;
pub mod visuals;

/// A 2D screen coordinate from a click event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// A 3D feature resolved from a pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFeature {
    pub name: String,
}

/// Shared marker icon, rasterized once and reused for every marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerIcon {
    pub width: u32,
    pub height: u32,
    pub svg: String,
}

/// Capabilities this core consumes from the rendering engine.
///
/// Implemented by the embedding application, never by this crate. Pick
/// queries may legitimately return `None` (clicked the sky, feature without
/// a usable surface); callers must treat that as a soft failure.
pub trait SceneRenderer {
    fn pick(&self, screen: ScreenPoint) -> Option<PickedFeature>;
    fn pick_surface_position(&self, screen: ScreenPoint) -> Option<WorldPosition>;
    fn pick_ground_position(&self, screen: ScreenPoint) -> Option<WorldPosition>;
    fn fly_to(&mut self, position: WorldPosition, duration_seconds: f64);
    fn add_icon_primitive(&mut self, position: WorldPosition, icon: &MarkerIcon, tag: &str);
    fn add_label_primitive(&mut self, position: WorldPosition, text: &str, tag: &str, hidden: bool);
    fn remove_primitive(&mut self, tag: &str);
    fn set_primitive_scale(&mut self, tag: &str, scale: f64);
    fn set_primitive_visible(&mut self, tag: &str, visible: bool);
    fn request_redraw(&mut self);
}
