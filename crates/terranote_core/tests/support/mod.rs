//! Shared test doubles: a scriptable recording renderer and an in-memory
//! document storage with failure injection.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;
use terranote_core::repo::document_storage::{DocumentStorage, StorageError, StorageResult};
use terranote_core::{
    CommentStore, ManualClock, MarkerIcon, PickedFeature, SceneRenderer, ScreenPoint,
    SequentialIdGenerator, WorldPosition,
};

#[derive(Debug, Clone, PartialEq)]
pub enum RendererEvent {
    FlyTo {
        position: WorldPosition,
        duration_seconds: f64,
    },
    AddIcon {
        tag: String,
    },
    AddLabel {
        tag: String,
        text: String,
        hidden: bool,
    },
    Remove {
        tag: String,
    },
    SetScale {
        tag: String,
        scale: f64,
    },
    SetVisible {
        tag: String,
        visible: bool,
    },
    Redraw,
}

#[derive(Default)]
pub struct RendererState {
    pub feature: Option<PickedFeature>,
    pub surface: Option<WorldPosition>,
    pub ground: Option<WorldPosition>,
    pub events: Vec<RendererEvent>,
    pub live_tags: BTreeSet<String>,
}

/// Scriptable renderer double. Pick results are configured up front; every
/// mutating call is recorded.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    state: Rc<RefCell<RendererState>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_feature(&self, name: &str) {
        self.state.borrow_mut().feature = Some(PickedFeature {
            name: name.to_string(),
        });
    }

    pub fn set_surface(&self, position: Option<WorldPosition>) {
        self.state.borrow_mut().surface = position;
    }

    pub fn set_ground(&self, position: Option<WorldPosition>) {
        self.state.borrow_mut().ground = position;
    }

    pub fn events(&self) -> Vec<RendererEvent> {
        self.state.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    pub fn live_tags(&self) -> BTreeSet<String> {
        self.state.borrow().live_tags.clone()
    }
}

impl SceneRenderer for RecordingRenderer {
    fn pick(&self, _screen: ScreenPoint) -> Option<PickedFeature> {
        self.state.borrow().feature.clone()
    }

    fn pick_surface_position(&self, _screen: ScreenPoint) -> Option<WorldPosition> {
        self.state.borrow().surface
    }

    fn pick_ground_position(&self, _screen: ScreenPoint) -> Option<WorldPosition> {
        self.state.borrow().ground
    }

    fn fly_to(&mut self, position: WorldPosition, duration_seconds: f64) {
        self.state.borrow_mut().events.push(RendererEvent::FlyTo {
            position,
            duration_seconds,
        });
    }

    fn add_icon_primitive(&mut self, _position: WorldPosition, _icon: &MarkerIcon, tag: &str) {
        let mut state = self.state.borrow_mut();
        state.live_tags.insert(tag.to_string());
        state.events.push(RendererEvent::AddIcon {
            tag: tag.to_string(),
        });
    }

    fn add_label_primitive(
        &mut self,
        _position: WorldPosition,
        text: &str,
        tag: &str,
        hidden: bool,
    ) {
        let mut state = self.state.borrow_mut();
        state.live_tags.insert(tag.to_string());
        state.events.push(RendererEvent::AddLabel {
            tag: tag.to_string(),
            text: text.to_string(),
            hidden,
        });
    }

    fn remove_primitive(&mut self, tag: &str) {
        let mut state = self.state.borrow_mut();
        state.live_tags.remove(tag);
        state.events.push(RendererEvent::Remove {
            tag: tag.to_string(),
        });
    }

    fn set_primitive_scale(&mut self, tag: &str, scale: f64) {
        self.state.borrow_mut().events.push(RendererEvent::SetScale {
            tag: tag.to_string(),
            scale,
        });
    }

    fn set_primitive_visible(&mut self, tag: &str, visible: bool) {
        self.state
            .borrow_mut()
            .events
            .push(RendererEvent::SetVisible {
                tag: tag.to_string(),
                visible,
            });
    }

    fn request_redraw(&mut self) {
        self.state.borrow_mut().events.push(RendererEvent::Redraw);
    }
}

/// In-memory storage double with save counting and failure injection.
#[derive(Default)]
pub struct MemoryStorage {
    pub payload: RefCell<Option<String>>,
    pub saves: Cell<usize>,
    pub fail_saves: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: &str) -> Self {
        Self {
            payload: RefCell::new(Some(payload.to_string())),
            ..Self::default()
        }
    }
}

impl DocumentStorage for MemoryStorage {
    fn load_payload(&self) -> StorageResult<Option<String>> {
        Ok(self.payload.borrow().clone())
    }

    fn save_payload(&self, payload: &str) -> StorageResult<()> {
        if self.fail_saves.get() {
            return Err(StorageError::Backend("simulated quota exceeded".to_string()));
        }
        self.saves.set(self.saves.get() + 1);
        *self.payload.borrow_mut() = Some(payload.to_string());
        Ok(())
    }
}

impl DocumentStorage for &MemoryStorage {
    fn load_payload(&self) -> StorageResult<Option<String>> {
        (**self).load_payload()
    }

    fn save_payload(&self, payload: &str) -> StorageResult<()> {
        (**self).save_payload(payload)
    }
}

/// Store over borrowed storage with deterministic ids and a controllable
/// clock. Ids come out as `c-1`, `c-2`, ...
pub fn deterministic_store(storage: &MemoryStorage) -> (CommentStore<&MemoryStorage>, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new(1_700_000_000_000));
    let store = CommentStore::with_env(
        storage,
        Box::new(SequentialIdGenerator::new("c")),
        Box::new(clock.clone()),
    );
    (store, clock)
}

pub fn position(x: f64, y: f64, z: f64) -> WorldPosition {
    WorldPosition::new(x, y, z).unwrap()
}
