use std::path::Path;

use eframe::egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

use crate::geometry::{BoxGeometry, GeometryRecord};
use crate::interaction::{suppresses_click, HitTarget, InteractionState};
use crate::storage::Storage;

/// Storage key prefix for persisted box geometry records.
pub const BOX_KEY_PREFIX: &str = "textbox-";

/// One box on the board, as declared in `boxes.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    /// Stable identifier for persistence. When absent, a key is derived from
    /// the tags and text, with the original's collision caveat: two boxes
    /// deriving the same key share one record, last writer wins.
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    /// Link boxes carry a target; a click opens it unless the pointer
    /// travelled more than the click slop between press and release.
    #[serde(default)]
    pub href: Option<String>,
    /// Style tags. The first recognised tag picks an accent fill; all tags
    /// feed the derived key.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Initial left/top/width/height percentages, the layout the box keeps
    /// until a persisted record overrides it.
    pub rect: [f32; 4],
}

impl BoxSpec {
    pub fn is_link(&self) -> bool {
        self.href.is_some()
    }

    /// Identity used to index the persisted geometry record.
    pub fn key(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => derived_key(&self.tags, &self.text),
        }
    }

    pub fn storage_key(&self) -> String {
        format!("{BOX_KEY_PREFIX}{}", self.key())
    }

    pub fn initial_geometry(&self) -> BoxGeometry {
        BoxGeometry::new(self.rect[0], self.rect[1], self.rect[2], self.rect[3])
    }
}

/// Fallback identity: the tags joined with `-`, then the first 20 characters
/// of the trimmed text with whitespace runs collapsed to `-`.
pub fn derived_key(tags: &[String], text: &str) -> String {
    let prefix: String = text.trim().chars().take(20).collect();
    let mut content = String::with_capacity(prefix.len());
    let mut in_whitespace = false;
    for ch in prefix.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                content.push('-');
            }
            in_whitespace = true;
        } else {
            content.push(ch);
            in_whitespace = false;
        }
    }
    format!("{}-{}", tags.join("-"), content)
}

/// Board definition loaded at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub boxes: Vec<BoxSpec>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            debug_logging: false,
            boxes: vec![
                BoxSpec {
                    id: Some("welcome".into()),
                    text: "Drag me anywhere. Select me and pull a handle to resize.".into(),
                    href: None,
                    tags: vec!["note".into()],
                    rect: [10.0, 10.0, 30.0, 12.0],
                },
                BoxSpec {
                    id: Some("scratch".into()),
                    text: "Everything you move is remembered across restarts.".into(),
                    href: None,
                    tags: vec!["accent".into()],
                    rect: [50.0, 30.0, 28.0, 10.0],
                },
                BoxSpec {
                    id: Some("docs-link".into()),
                    text: "egui documentation".into(),
                    href: Some("https://docs.rs/egui".into()),
                    tags: vec!["link".into()],
                    rect: [15.0, 60.0, 22.0, 8.0],
                },
            ],
        }
    }
}

impl BoardConfig {
    /// Load the board from `path`. A missing or empty file yields the
    /// built-in demo board; a present but malformed file is an error.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Owns the gesture state and live geometry of a single box.
#[derive(Debug, Clone)]
pub struct BoxController {
    spec: BoxSpec,
    pub geometry: BoxGeometry,
    pub selected: bool,
    pub state: InteractionState,
    press_origin: Option<Pos2>,
}

impl BoxController {
    pub fn new(spec: BoxSpec) -> Self {
        let geometry = spec.initial_geometry();
        Self {
            spec,
            geometry,
            selected: false,
            state: InteractionState::Idle,
            press_origin: None,
        }
    }

    pub fn spec(&self) -> &BoxSpec {
        &self.spec
    }

    pub fn pointer_down(&mut self, pointer: Pos2, target: HitTarget) {
        self.press_origin = Some(pointer);
        self.state.pointer_down(pointer, target, self.geometry);
    }

    pub fn pointer_moved(&mut self, pointer: Pos2, canvas: Rect) {
        if let Some(geometry) = self.state.pointer_moved(pointer, canvas) {
            self.geometry = geometry;
        }
    }

    /// End the gesture. `true` means an interaction finished and the
    /// geometry should be persisted.
    pub fn pointer_up(&mut self) -> bool {
        self.state.pointer_up()
    }

    /// Whether a click released at `pointer` should be swallowed instead of
    /// following the box's link.
    pub fn suppresses_click(&self, pointer: Pos2) -> bool {
        self.press_origin
            .is_some_and(|press| suppresses_click(press, pointer))
    }

    pub fn record(&self) -> GeometryRecord {
        GeometryRecord::from_geometry(&self.geometry)
    }
}

/// The board: one controller per configured box, plus the restore/persist
/// and selection plumbing.
#[derive(Debug, Clone)]
pub struct BoardManager {
    boxes: Vec<BoxController>,
}

impl BoardManager {
    /// Build controllers for every configured box and restore any persisted
    /// geometry. Boxes without a valid record keep their configured layout.
    pub fn new(config: &BoardConfig, storage: &Storage) -> Self {
        let boxes = config
            .boxes
            .iter()
            .cloned()
            .map(|spec| {
                let mut controller = BoxController::new(spec);
                if let Some(geometry) = load_box_state(storage, controller.spec()) {
                    controller.geometry = geometry;
                }
                controller
            })
            .collect();
        Self { boxes }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BoxController> {
        self.boxes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut BoxController> {
        self.boxes.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoxController> {
        self.boxes.iter()
    }

    /// Select one box, deselecting every other.
    pub fn select_only(&mut self, index: usize) {
        for (i, controller) in self.boxes.iter_mut().enumerate() {
            controller.selected = i == index;
        }
    }

    /// Click-outside-to-deselect.
    pub fn deselect_all(&mut self) {
        for controller in &mut self.boxes {
            controller.selected = false;
        }
    }

    /// The box currently mid-gesture, if any. At most one box can be active
    /// at a time since a single pointer drives the board.
    pub fn active_controller(&mut self) -> Option<&mut BoxController> {
        self.boxes
            .iter_mut()
            .find(|controller| controller.state.is_active())
    }

    /// Persist the box's current geometry under its storage key.
    pub fn save_box_state(&self, index: usize, storage: &mut Storage) {
        let Some(controller) = self.boxes.get(index) else {
            return;
        };
        storage.set_json(&controller.spec().storage_key(), &controller.record());
        tracing::debug!("saved geometry for {}", controller.spec().key());
    }
}

/// Look up and validate the persisted geometry for `spec`. Malformed or
/// out-of-range records are skipped silently.
pub fn load_box_state(storage: &Storage, spec: &BoxSpec) -> Option<BoxGeometry> {
    storage
        .get_json::<GeometryRecord>(&spec.storage_key())?
        .parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    fn spec(id: &str, rect: [f32; 4]) -> BoxSpec {
        BoxSpec {
            id: Some(id.into()),
            text: format!("box {id}"),
            href: None,
            tags: Vec::new(),
            rect,
        }
    }

    #[test]
    fn derived_key_joins_tags_and_normalised_text() {
        let tags = vec!["accent".to_string(), "wide".to_string()];
        assert_eq!(
            derived_key(&tags, "  Hello   brave new\tworld of boxes  "),
            "accent-wide-Hello-brave-new-wo"
        );
        assert_eq!(derived_key(&[], "short"), "-short");
    }

    #[test]
    fn spec_key_prefers_explicit_id() {
        let mut s = spec("stable", [0.0, 0.0, 10.0, 5.0]);
        assert_eq!(s.storage_key(), "textbox-stable");
        s.id = None;
        assert_eq!(s.storage_key(), "textbox--box-stable");
    }

    #[test]
    fn manager_restores_persisted_geometry() {
        let mut storage = Storage::in_memory();
        let config = BoardConfig {
            debug_logging: false,
            boxes: vec![spec("a", [10.0, 10.0, 20.0, 10.0])],
        };
        storage.set_json(
            "textbox-a",
            &GeometryRecord::from_geometry(&BoxGeometry::new(40.0, 20.0, 15.0, 8.0)),
        );

        let manager = BoardManager::new(&config, &storage);
        assert_eq!(
            manager.get(0).unwrap().geometry,
            BoxGeometry::new(40.0, 20.0, 15.0, 8.0)
        );
    }

    #[test]
    fn malformed_record_keeps_configured_layout() {
        let mut storage = Storage::in_memory();
        storage.set("textbox-a", "{\"left\":\"banana\"}");
        let config = BoardConfig {
            debug_logging: false,
            boxes: vec![spec("a", [10.0, 10.0, 20.0, 10.0])],
        };

        let manager = BoardManager::new(&config, &storage);
        assert_eq!(
            manager.get(0).unwrap().geometry,
            BoxGeometry::new(10.0, 10.0, 20.0, 10.0)
        );
    }

    #[test]
    fn select_only_is_exclusive() {
        let config = BoardConfig {
            debug_logging: false,
            boxes: vec![spec("a", [0.0; 4]), spec("b", [0.0; 4])],
        };
        let mut manager = BoardManager::new(&config, &Storage::in_memory());
        manager.select_only(1);
        assert!(!manager.get(0).unwrap().selected);
        assert!(manager.get(1).unwrap().selected);
        manager.deselect_all();
        assert!(manager.iter().all(|c| !c.selected));
    }

    #[test]
    fn active_controller_tracks_the_gesture() {
        let config = BoardConfig {
            debug_logging: false,
            boxes: vec![spec("a", [10.0, 10.0, 20.0, 10.0])],
        };
        let mut manager = BoardManager::new(&config, &Storage::in_memory());
        assert!(manager.active_controller().is_none());

        manager
            .get_mut(0)
            .unwrap()
            .pointer_down(pos2(0.0, 0.0), HitTarget::Body);
        assert!(manager.active_controller().is_some());

        assert!(manager.get_mut(0).unwrap().pointer_up());
        assert!(manager.active_controller().is_none());
    }
}
