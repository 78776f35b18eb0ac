use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::{
    export::{self, CopyState, CopyStatus, ExportError},
    font_store::FontStore,
    layout::{Bounds, StageLayout, compute_layout},
    measure::LineMeasurer,
    renderer::{Pixmap, StageRenderer},
    state::{Dimension, StageState, split_lines},
    storage::{self, STORAGE_KEY, StateStore, StorageResult},
    style::{FontWeight, StyleConfig},
};

/// High-level entry point for the checklist stage.
///
/// This struct coordinates the font store, the stage state, the renderer,
/// and the copy status machine behind one shareable value. Every edit keeps
/// the state normalized and, when a backing store is attached, persisted.
///
/// Use `Mutex` to allow shared mutable access, which is common in UI
/// frameworks.
///
/// The font store and renderer fields are public to allow direct access
/// when necessary (e.g. pre-warming fonts or clearing the glyph cache).
pub struct Stage {
    /// The underlying font store.
    pub font_store: Mutex<FontStore>,
    /// The CPU stage renderer.
    pub renderer: Mutex<StageRenderer>,

    state: Mutex<StageState>,
    copy_state: Mutex<CopyState>,
    store: Option<Box<dyn StateStore>>,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    /// Creates a stage with default state, an empty font store, and no
    /// persistence. Load fonts before rendering; without any face the
    /// stage falls back to heuristic measurement and text-less rendering.
    pub fn new() -> Self {
        Self {
            font_store: Mutex::new(FontStore::new()),
            renderer: Mutex::new(StageRenderer::new()),
            state: Mutex::new(StageState::default()),
            copy_state: Mutex::new(CopyState::new()),
            store: None,
        }
    }

    /// Creates a stage backed by a state store.
    ///
    /// The stored record is loaded and normalized; a missing or damaged
    /// record falls back to defaults. Subsequent edits are written back
    /// automatically.
    pub fn with_store(store: Box<dyn StateStore>) -> Self {
        let state = storage::load_or_default(store.as_ref());
        Self {
            font_store: Mutex::new(FontStore::new()),
            renderer: Mutex::new(StageRenderer::new()),
            state: Mutex::new(state),
            copy_state: Mutex::new(CopyState::new()),
            store: Some(store),
        }
    }
}

/// font loading
impl Stage {
    /// Loads the system fonts into the store.
    pub fn load_system_fonts(&self) {
        self.font_store.lock().load_system_fonts();
    }

    /// Loads a font from binary data.
    pub fn load_font_binary(&self, data: impl Into<Vec<u8>>) {
        self.font_store.lock().load_font_binary(data);
    }

    /// Loads a font from a file path.
    pub fn load_font_file(&self, path: PathBuf) -> Result<(), std::io::Error> {
        self.font_store.lock().load_font_file(path)
    }

    /// Loads all fonts from a directory.
    pub fn load_fonts_dir(&self, dir: PathBuf) {
        self.font_store.lock().load_fonts_dir(dir)
    }

    /// Checks if the font store has no faces.
    pub fn is_empty(&self) -> bool {
        self.font_store.lock().is_empty()
    }

    /// Returns the number of registered faces.
    pub fn len(&self) -> usize {
        self.font_store.lock().len()
    }
}

/// state editing
impl Stage {
    /// Returns a snapshot of the current state.
    pub fn state(&self) -> StageState {
        self.state.lock().clone()
    }

    /// Returns the style resolved from the current state.
    pub fn style(&self) -> StyleConfig {
        self.state.lock().style()
    }

    /// Replaces the checklist text, one row per line.
    pub fn set_raw_text(&self, text: impl Into<String>) {
        self.update_state(|state| state.raw_text = text.into());
    }

    /// Selects a font preset by id. Unknown ids are kept and resolve to
    /// the first preset at lookup time.
    pub fn set_font_id(&self, id: impl Into<String>) {
        self.update_state(|state| state.font_id = id.into());
    }

    /// Sets the font weight.
    pub fn set_font_weight(&self, weight: FontWeight) {
        self.update_state(|state| state.font_weight = weight.token().to_string());
    }

    /// Sets the text fill color. Values outside the preset set fall back
    /// to the default fill.
    pub fn set_text_color(&self, hex: impl Into<String>) {
        self.update_state(|state| state.text_color = hex.into());
    }

    /// Sets the outline color. Values outside the preset set fall back to
    /// the default outline color.
    pub fn set_stroke_color(&self, hex: impl Into<String>) {
        self.update_state(|state| state.stroke_color = hex.into());
    }

    /// Sets the outline width, snapped to the discrete width set.
    pub fn set_outline_width(&self, width: f32) {
        self.update_state(|state| state.outline_width = width);
    }

    /// Applies a textual dimension edit. Junk input is ignored and leaves
    /// the current value in place; numeric input is clamped to the allowed
    /// range. Returns whether the edit was applied.
    pub fn update_dimension(&self, dimension: Dimension, raw: &str) -> bool {
        let mut state = self.state.lock();
        let applied = state.update_dimension(dimension, raw);
        if applied {
            let snapshot = state.clone();
            drop(state);
            self.autosave(&snapshot);
        }
        applied
    }

    /// Restores every field to its default value.
    pub fn reset(&self) {
        self.update_state(|state| *state = StageState::default());
    }

    fn update_state(&self, f: impl FnOnce(&mut StageState)) {
        let mut state = self.state.lock();
        f(&mut state);
        *state = state.normalize();
        let snapshot = state.clone();
        drop(state);
        self.autosave(&snapshot);
    }

    fn autosave(&self, state: &StageState) {
        if let Some(store) = &self.store
            && let Err(err) = store.save(STORAGE_KEY, state)
        {
            log::error!("failed to persist stage state: {err}");
        }
    }
}

/// layout and rendering
impl Stage {
    /// Returns the current checklist rows, blank rows dropped.
    pub fn lines(&self) -> Vec<String> {
        split_lines(&self.state.lock().raw_text)
    }

    /// Computes the stage layout for the current state.
    pub fn layout(&self) -> StageLayout {
        let state = self.state.lock().clone();
        let lines = split_lines(&state.raw_text);
        let style = state.style();
        let bounds = Bounds::new(state.max_width, state.max_height);

        let mut font_store = self.font_store.lock();
        let mut measurer = LineMeasurer::new(&mut font_store);
        compute_layout(&lines, &style, bounds, &mut measurer)
    }

    /// Renders the current state into an RGBA pixmap.
    ///
    /// Layout and rendering run under one font store lock, so the widths
    /// the layout measured are the widths the renderer draws.
    pub fn render(&self) -> Pixmap {
        let state = self.state.lock().clone();
        let lines = split_lines(&state.raw_text);
        let style = state.style();
        let bounds = Bounds::new(state.max_width, state.max_height);

        let mut font_store = self.font_store.lock();
        let layout = {
            let mut measurer = LineMeasurer::new(&mut font_store);
            compute_layout(&lines, &style, bounds, &mut measurer)
        };

        self.renderer.lock().render(&lines, &style, &layout, &mut font_store)
    }
}

/// export
impl Stage {
    /// Renders and encodes the stage as PNG bytes.
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        export::encode_png(&self.render())
    }

    /// Renders and writes the stage into `dir` under a timestamped name.
    /// Returns the written path.
    pub fn save_image(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        export::save_png(&self.render(), dir)
    }

    /// Renders and copies the stage to the system clipboard, recording the
    /// outcome in the copy status machine. Failures are logged, never
    /// propagated; the returned status is what a caller should display.
    pub fn copy_image(&self) -> CopyStatus {
        let pixmap = self.render();

        let mut copy_state = self.copy_state.lock();
        match export::copy_to_clipboard(&pixmap) {
            Ok(()) => copy_state.note_success(),
            Err(err) => {
                log::error!("failed to copy image to clipboard: {err}");
                copy_state.note_error();
            }
        }
        copy_state.current()
    }

    /// Reports the copy outcome, decayed to idle when stale.
    pub fn copy_status(&self) -> CopyStatus {
        self.copy_state.lock().current()
    }

    /// Clears the copy outcome immediately.
    pub fn reset_copy_status(&self) {
        self.copy_state.lock().reset();
    }

    /// Whether copying to the clipboard can work on this host.
    pub fn clipboard_supported(&self) -> bool {
        export::clipboard_supported()
    }
}

/// persistence
impl Stage {
    /// Writes the current state to the backing store, if any.
    pub fn persist(&self) -> StorageResult<()> {
        match &self.store {
            Some(store) => {
                let state = self.state.lock();
                store.save(STORAGE_KEY, &state)
            }
            None => Ok(()),
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::tempdir;

    #[test]
    fn junk_dimension_input_is_ignored() {
        let stage = Stage::new();
        assert!(!stage.update_dimension(Dimension::MaxWidth, "abc"));
        assert!(!stage.update_dimension(Dimension::MaxHeight, ""));
        assert_eq!(stage.state().max_width, 900.0);
        assert_eq!(stage.state().max_height, 1200.0);
    }

    #[test]
    fn dimension_input_is_clamped() {
        let stage = Stage::new();
        assert!(stage.update_dimension(Dimension::MaxWidth, "99999"));
        assert_eq!(stage.state().max_width, 2400.0);
        assert!(stage.update_dimension(Dimension::MaxHeight, "5"));
        assert_eq!(stage.state().max_height, 200.0);
    }

    #[test]
    fn setters_keep_the_state_normalized() {
        let stage = Stage::new();

        stage.set_outline_width(5.0);
        assert_eq!(stage.state().outline_width, 4.0);

        stage.set_text_color("#EF4444");
        assert_eq!(stage.state().text_color, "#ef4444");

        stage.set_text_color("not-a-color");
        assert_eq!(stage.state().text_color, StageState::default().text_color);

        stage.set_font_weight(FontWeight::Regular);
        assert_eq!(stage.state().font_weight, "regular");

        stage.set_font_id("unknown-font");
        assert_eq!(stage.state().font_id, "unknown-font");
        // Unknown ids resolve to the first preset.
        assert_eq!(stage.style().font.id, "biz-ud-gothic");
    }

    #[test]
    fn reset_restores_defaults() {
        let stage = Stage::new();
        stage.set_raw_text("One\nTwo");
        stage.set_outline_width(0.0);

        stage.reset();
        assert_eq!(stage.state(), StageState::default());
    }

    #[test]
    fn edits_autosave_through_the_store() {
        let dir = tempdir().unwrap();

        let stage =
            Stage::with_store(Box::new(FileStore::new(dir.path().to_path_buf()).unwrap()));
        stage.set_raw_text("One\nTwo");
        stage.set_outline_width(2.0);
        drop(stage);

        let reloaded =
            Stage::with_store(Box::new(FileStore::new(dir.path().to_path_buf()).unwrap()));
        assert_eq!(reloaded.state().raw_text, "One\nTwo");
        assert_eq!(reloaded.state().outline_width, 2.0);
    }

    #[test]
    fn stored_garbage_is_normalized_at_startup() {
        let store = MemoryStore::new();
        let garbage = StageState {
            text_color: "purple-ish".to_string(),
            outline_width: 7.0,
            max_width: 1e9,
            ..StageState::default()
        };
        store.save(STORAGE_KEY, &garbage).unwrap();

        let stage = Stage::with_store(Box::new(store));
        let state = stage.state();
        assert_eq!(state.text_color, StageState::default().text_color);
        assert_eq!(state.outline_width, 6.0);
        assert_eq!(state.max_width, 2400.0);
    }

    #[test]
    fn persist_without_a_store_is_a_no_op() {
        let stage = Stage::new();
        stage.persist().unwrap();
    }

    #[test]
    fn facade_renders_the_default_state() {
        let stage = Stage::new();
        let layout = stage.layout();
        assert_eq!((layout.output_width, layout.output_height), (360, 272));

        let pixmap = stage.render();
        assert_eq!((pixmap.width, pixmap.height), (360, 272));

        let png_data = stage.export_png().unwrap();
        assert_eq!(&png_data[1..4], b"PNG");
    }

    #[test]
    fn copy_status_starts_idle() {
        let stage = Stage::new();
        assert_eq!(stage.copy_status(), CopyStatus::Idle);
        stage.reset_copy_status();
        assert_eq!(stage.copy_status(), CopyStatus::Idle);
    }
}
