use std::collections::HashMap;

use crate::font_store::FontStore;

/// Quantization step for font sizes inside [`GlyphKey`].
///
/// Sizes are stored in 1/256 px steps, so float sizes that differ only by
/// rounding noise share one cache entry.
pub const SIZE_QUANTIZE: f32 = 256f32;

/// Identity of a rasterized glyph: face, glyph index, and quantized size.
///
/// The same glyph is not guaranteed to receive the same key across program
/// runs, because `fontdb::ID` values are assigned at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    font_id: fontdb::ID,
    glyph_index: u16,
    font_size: u32,
}

impl GlyphKey {
    pub fn new(font_id: fontdb::ID, glyph_index: u16, font_size: f32) -> Self {
        Self {
            font_id,
            glyph_index,
            font_size: (font_size * SIZE_QUANTIZE).round() as u32,
        }
    }

    pub fn font_id(&self) -> fontdb::ID {
        self.font_id
    }

    pub fn glyph_index(&self) -> u16 {
        self.glyph_index
    }

    pub fn font_size(&self) -> f32 {
        self.font_size as f32 / SIZE_QUANTIZE
    }
}

/// One cache slot: key plus the outline dilation it was built with.
///
/// Radius zero is the plain fill coverage; a positive radius is the same
/// coverage grown outward for the text outline pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    glyph: GlyphKey,
    dilation_radius: u32,
}

/// Rasterized coverage bitmap, row-major, one byte per pixel.
pub struct CachedGlyph {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

/// Entry cap. The whole cache is dropped when it fills up; a checklist
/// render touches a few dozen distinct glyphs, so this is only a guard
/// against unbounded growth across many style changes.
const GLYPH_CACHE_CAPACITY: usize = 4096;

/// Caches rasterized glyph coverage, plain and dilated.
pub struct GlyphCache {
    glyphs: HashMap<CacheKey, CachedGlyph, fxhash::FxBuildHasher>,
}

impl Default for GlyphCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphCache {
    pub fn new() -> Self {
        Self {
            glyphs: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn clear(&mut self) {
        self.glyphs.clear();
    }

    /// Returns the coverage bitmap for a glyph, rasterizing on first use.
    ///
    /// With `dilation_radius > 0` the bitmap is grown by that many pixels in
    /// every direction (disc-shaped morphological dilation), the shape the
    /// text outline pass paints beneath the fill. `None` means the face is
    /// not available in the store.
    pub fn get(
        &mut self,
        key: GlyphKey,
        dilation_radius: u32,
        font_store: &mut FontStore,
    ) -> Option<&CachedGlyph> {
        let cache_key = CacheKey {
            glyph: key,
            dilation_radius,
        };

        if !self.glyphs.contains_key(&cache_key) {
            let font = font_store.font(key.font_id())?;
            let (metrics, coverage) = font.rasterize_indexed(key.glyph_index(), key.font_size());

            let cached = if dilation_radius == 0 {
                CachedGlyph {
                    width: metrics.width,
                    height: metrics.height,
                    data: coverage,
                }
            } else {
                dilate(
                    &coverage,
                    metrics.width,
                    metrics.height,
                    dilation_radius as usize,
                )
            };

            if self.glyphs.len() >= GLYPH_CACHE_CAPACITY {
                self.glyphs.clear();
            }
            self.glyphs.insert(cache_key, cached);
        }

        self.glyphs.get(&cache_key)
    }
}

/// Grows coverage outward by `radius` pixels using a disc structuring
/// element. The output bitmap is `2 * radius` larger on each axis, so the
/// original coverage sits centered inside it.
fn dilate(coverage: &[u8], width: usize, height: usize, radius: usize) -> CachedGlyph {
    let out_width = width + 2 * radius;
    let out_height = height + 2 * radius;

    if width == 0 || height == 0 {
        return CachedGlyph {
            width: 0,
            height: 0,
            data: Vec::new(),
        };
    }

    let r = radius as i64;
    let r_squared = r * r;
    let mut offsets = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r_squared {
                offsets.push((dx, dy));
            }
        }
    }

    let mut data = vec![0u8; out_width * out_height];
    for out_y in 0..out_height {
        for out_x in 0..out_width {
            let mut best = 0u8;
            for &(dx, dy) in &offsets {
                let src_x = out_x as i64 - r + dx;
                let src_y = out_y as i64 - r + dy;
                if src_x < 0 || src_y < 0 || src_x >= width as i64 || src_y >= height as i64 {
                    continue;
                }
                let value = coverage[src_y as usize * width + src_x as usize];
                if value > best {
                    best = value;
                    if best == 255 {
                        break;
                    }
                }
            }
            data[out_y * out_width + out_x] = best;
        }
    }

    CachedGlyph {
        width: out_width,
        height: out_height,
        data,
    }
}
