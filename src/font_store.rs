use std::{collections::HashMap, path::PathBuf, sync::Arc};

use crate::style::{FontPreset, FontWeight};

/// Manages font loading and retrieval using `fontdb` and `fontdue`.
///
/// Combines a database of available faces (`fontdb`) with a cache of parsed
/// font instances (`fontdue`). Faces are registered cheaply up front and the
/// actual font data is parsed lazily, the first time a face is used for
/// measurement or rasterization.
pub struct FontStore {
    /// Every face that has been registered, loaded or system-discovered.
    font_db: fontdb::Database,
    /// Parsed fonts, keyed by face ID. Only faces that have actually been
    /// used for text end up here.
    loaded: HashMap<fontdb::ID, Arc<fontdue::Font>, fxhash::FxBuildHasher>,
}

impl Default for FontStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FontStore {
    /// Creates a new empty font store.
    pub fn new() -> Self {
        Self {
            font_db: fontdb::Database::new(),
            loaded: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
        }
    }

    /// Creates a store pre-populated with the system's installed fonts.
    pub fn with_system_fonts() -> Self {
        let mut store = Self::new();
        store.load_system_fonts();
        store
    }
}

/// Loading faces into fontdb and setting up fallbacks.
impl FontStore {
    /// Loads a font from binary data.
    pub fn load_font_binary(&mut self, data: impl Into<Vec<u8>>) {
        self.font_db.load_font_data(data.into());
    }

    /// Loads a font from a file path.
    pub fn load_font_file(&mut self, path: PathBuf) -> Result<(), std::io::Error> {
        self.font_db.load_font_file(path)
    }

    /// Loads all fonts from a directory.
    pub fn load_fonts_dir(&mut self, dir: PathBuf) {
        self.font_db.load_fonts_dir(dir)
    }

    /// Loads the system fonts.
    pub fn load_system_fonts(&mut self) {
        self.font_db.load_system_fonts();
    }

    /// Checks if the store has no faces at all.
    pub fn is_empty(&self) -> bool {
        self.font_db.is_empty()
    }

    /// Returns the number of registered faces.
    pub fn len(&self) -> usize {
        self.font_db.len()
    }

    /// Sets the family used for the generic "sans-serif" fallback that the
    /// gothic presets end with.
    pub fn set_sans_serif_family(&mut self, family: impl Into<String>) {
        self.font_db.set_sans_serif_family(family);
    }

    /// Sets the family used for the generic "serif" fallback that the
    /// mincho preset ends with.
    pub fn set_serif_family(&mut self, family: impl Into<String>) {
        self.font_db.set_serif_family(family);
    }

    /// Returns an iterator over all registered faces.
    pub fn faces(&self) -> impl Iterator<Item = &fontdb::FaceInfo> {
        self.font_db.faces()
    }
}

/// Get `Font`
impl FontStore {
    /// Resolves a font preset at a given weight to a concrete loaded font.
    ///
    /// Walks the preset's family stack in order and returns the first face
    /// the database can satisfy. `None` means no registered face matches
    /// any family in the stack; callers fall back to heuristic measurement.
    pub fn resolve(
        &mut self,
        preset: &FontPreset,
        weight: FontWeight,
    ) -> Option<(fontdb::ID, Arc<fontdue::Font>)> {
        self.query(&fontdb::Query {
            families: preset.families,
            weight: weight.to_fontdb(),
            ..fontdb::Query::default()
        })
    }

    /// Queries for a font matching the description.
    ///
    /// Returns the ID and the loaded font if found.
    pub fn query(&mut self, query: &fontdb::Query) -> Option<(fontdb::ID, Arc<fontdue::Font>)> {
        let id = self.font_db.query(query)?;
        self.font(id).map(|font| (id, font))
    }

    /// Retrieves a loaded font by ID, parsing it if necessary.
    pub fn font(&mut self, id: fontdb::ID) -> Option<Arc<fontdue::Font>> {
        use std::collections::hash_map::Entry;

        match self.loaded.entry(id) {
            Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let font_result = self.font_db.with_face_data(id, |data, index| {
                    fontdue::Font::from_bytes(
                        data,
                        fontdue::FontSettings {
                            collection_index: index,
                            scale: 40.0,
                            load_substitutions: true,
                        },
                    )
                })?;

                match font_result {
                    Ok(font) => {
                        let r: &mut Arc<fontdue::Font> = entry.insert(Arc::new(font));
                        Some(Arc::clone(r))
                    }
                    Err(e) => {
                        log::error!("Failed to load font (id: {:?}): {}", id, e);
                        None
                    }
                }
            }
        }
    }
}
