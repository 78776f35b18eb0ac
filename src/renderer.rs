mod glyph_cache;
mod pixmap;

use euclid::{Box2D, Point2D, UnknownUnit};

use crate::font_store::FontStore;
use crate::layout::{StageLayout, row_geometry};
use crate::style::{
    CHECKBOX_CORNER_RADIUS, CHECKBOX_STROKE_WIDTH, FontWeight, PLACEHOLDER_COLOR,
    PLACEHOLDER_FONT_SIZE, PLACEHOLDER_TEXT, Rgb, STAGE_PADDING, StyleConfig, TEXT_COLOR_PRESETS,
    stroke_color_rgb, text_color_rgb,
};

pub use glyph_cache::{CachedGlyph, GlyphCache, GlyphKey, SIZE_QUANTIZE};
pub use pixmap::Pixmap;

/// CPU renderer that rasterizes the checklist stage through a glyph cache.
///
/// All geometry arrives in natural coordinates and is multiplied by the
/// layout's scale; glyphs are rasterized directly at the scaled font size
/// rather than resampled, so downscaled output stays sharp.
pub struct StageRenderer {
    cache: GlyphCache,
}

impl Default for StageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StageRenderer {
    pub fn new() -> Self {
        Self {
            cache: GlyphCache::new(),
        }
    }

    /// Renders the row sequence into an RGBA pixmap of the layout's output
    /// size.
    ///
    /// Per row: the rounded checkbox outline, then (when the layout enabled
    /// the stroke) the dilated outline pass of the text, then the fill pass
    /// on top. An empty sequence renders the placeholder message instead.
    /// When no font face resolves the text passes are skipped, never failed.
    pub fn render(
        &mut self,
        lines: &[String],
        style: &StyleConfig,
        layout: &StageLayout,
        font_store: &mut FontStore,
    ) -> Pixmap {
        let mut pixmap = Pixmap::new(layout.output_width, layout.output_height);
        if layout.output_width == 0 || layout.output_height == 0 {
            return pixmap;
        }

        let scale = layout.scale;

        if lines.is_empty() {
            self.draw_placeholder(&mut pixmap, style, scale, font_store);
            return pixmap;
        }

        let stroke_rgb = stroke_color_rgb(&style.stroke_color);
        let fill_rgb = text_color_rgb(&style.text_color).unwrap_or(TEXT_COLOR_PRESETS[5].rgb);

        let resolved = font_store.resolve(style.font, style.font_weight);
        if resolved.is_none() {
            log::warn!(
                "no usable font face for preset '{}'; text is skipped",
                style.font.id
            );
        }

        let font_size = style.font_size_px * scale;
        let dilation_radius = if layout.stroke_enabled {
            (style.outline_width_px as f32 * scale / 2.0).round() as u32
        } else {
            0
        };

        for (index, line) in lines.iter().enumerate() {
            let geometry = row_geometry(index, style);

            if let Some(rgb) = stroke_rgb {
                let checkbox = Box2D::new(
                    Point2D::new(geometry.checkbox.min.x * scale, geometry.checkbox.min.y * scale),
                    Point2D::new(geometry.checkbox.max.x * scale, geometry.checkbox.max.y * scale),
                );
                pixmap.stroke_round_rect(
                    checkbox,
                    CHECKBOX_CORNER_RADIUS * scale,
                    CHECKBOX_STROKE_WIDTH * scale,
                    rgb,
                );
            }

            let Some((font_id, font)) = &resolved else {
                continue;
            };
            let text_origin = Point2D::new(
                geometry.text_pos.x * scale,
                geometry.text_pos.y * scale,
            );

            if dilation_radius > 0
                && let Some(rgb) = stroke_rgb
            {
                self.draw_text_run(
                    &mut pixmap,
                    line,
                    text_origin,
                    *font_id,
                    font.as_ref(),
                    font_size,
                    rgb,
                    dilation_radius,
                    font_store,
                );
            }

            self.draw_text_run(
                &mut pixmap,
                line,
                text_origin,
                *font_id,
                font.as_ref(),
                font_size,
                fill_rgb,
                0,
                font_store,
            );
        }

        pixmap
    }

    /// Draws the empty-stage message: user's font family at regular weight,
    /// fixed size and color, no outline.
    fn draw_placeholder(
        &mut self,
        pixmap: &mut Pixmap,
        style: &StyleConfig,
        scale: f32,
        font_store: &mut FontStore,
    ) {
        let Some((font_id, font)) = font_store.resolve(style.font, FontWeight::Regular) else {
            log::warn!(
                "no usable font face for preset '{}'; placeholder is skipped",
                style.font.id
            );
            return;
        };

        self.draw_text_run(
            pixmap,
            PLACEHOLDER_TEXT,
            Point2D::new(STAGE_PADDING * scale, STAGE_PADDING * scale),
            font_id,
            font.as_ref(),
            PLACEHOLDER_FONT_SIZE * scale,
            PLACEHOLDER_COLOR,
            0,
            font_store,
        );
    }

    /// Rasterizes one run of text with its top-left corner at `top_left`.
    ///
    /// The pen advances by kerned glyph advances; each glyph bitmap is
    /// offset by its own bearing from the baseline. A positive dilation
    /// radius shifts the (larger) dilated bitmap so it stays centered on
    /// the glyph.
    fn draw_text_run(
        &mut self,
        pixmap: &mut Pixmap,
        text: &str,
        top_left: Point2D<f32, UnknownUnit>,
        font_id: fontdb::ID,
        font: &fontdue::Font,
        font_size: f32,
        color: Rgb,
        dilation_radius: u32,
        font_store: &mut FontStore,
    ) {
        let Some(line_metrics) = font.horizontal_line_metrics(font_size) else {
            return;
        };
        let baseline = top_left.y + line_metrics.ascent;
        let radius = dilation_radius as f32;

        let mut pen_x = top_left.x;
        let mut prev_glyph: Option<u16> = None;

        for ch in text.chars() {
            let glyph_idx = font.lookup_glyph_index(ch);
            let metrics = font.metrics_indexed(glyph_idx, font_size);

            if let Some(prev) = prev_glyph {
                pen_x += font
                    .horizontal_kern_indexed(prev, glyph_idx, font_size)
                    .unwrap_or(0.0);
            }

            let key = GlyphKey::new(font_id, glyph_idx, font_size);
            if let Some(cached) = self.cache.get(key, dilation_radius, font_store)
                && cached.width > 0
                && cached.height > 0
            {
                pixmap.draw_coverage(
                    pen_x + metrics.xmin as f32 - radius,
                    baseline - (metrics.ymin as f32 + metrics.height as f32) - radius,
                    cached.width,
                    cached.height,
                    &cached.data,
                    color,
                );
            }

            pen_x += metrics.advance_width;
            prev_glyph = Some(glyph_idx);
        }
    }

    /// Returns a reference to the underlying glyph cache.
    pub fn cache(&self) -> &GlyphCache {
        &self.cache
    }

    /// Returns a mutable reference to the underlying glyph cache.
    pub fn cache_mut(&mut self) -> &mut GlyphCache {
        &mut self.cache
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Bounds, compute_layout};
    use crate::measure::LineMeasurer;
    use crate::state::StageState;

    fn rows(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    fn layout_with(
        store: &mut FontStore,
        lines: &[String],
        style: &StyleConfig,
        bounds: Bounds,
    ) -> StageLayout {
        let mut measurer = LineMeasurer::new(store);
        compute_layout(lines, style, bounds, &mut measurer)
    }

    #[test]
    fn pixmap_matches_output_dimensions() {
        let mut store = FontStore::new();
        let style = StageState::default().style();
        let lines = rows(&["Buy milk", "Walk dog"]);
        let layout = layout_with(&mut store, &lines, &style, Bounds::new(900.0, 1200.0));

        let mut renderer = StageRenderer::new();
        let pixmap = renderer.render(&lines, &style, &layout, &mut store);

        assert_eq!((pixmap.width, pixmap.height), (360, 200));
        assert_eq!(pixmap.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn checkboxes_are_stroked_even_without_fonts() {
        let mut store = FontStore::new();
        let style = StageState::default().style();
        let lines = rows(&["Buy milk", "Walk dog"]);
        let layout = layout_with(&mut store, &lines, &style, Bounds::new(900.0, 1200.0));

        let mut renderer = StageRenderer::new();
        let pixmap = renderer.render(&lines, &style, &layout, &mut store);

        // Midpoint of the first checkbox's top edge, default white stroke.
        let edge = pixmap.pixel(52, 32).unwrap();
        assert!(edge[3] > 200);
        assert_eq!((edge[0], edge[1], edge[2]), (255, 255, 255));
        // Second row sits one pitch (52 px) lower.
        assert!(pixmap.pixel(52, 84).unwrap()[3] > 200);
        // Checkbox interior stays transparent.
        assert_eq!(pixmap.pixel(52, 52), Some([0, 0, 0, 0]));
    }

    #[test]
    fn transparent_stroke_color_suppresses_checkboxes() {
        let mut store = FontStore::new();
        let mut style = StageState::default().style();
        style.stroke_color = "transparent".to_string();
        let lines = rows(&["Buy milk"]);
        let layout = layout_with(&mut store, &lines, &style, Bounds::new(900.0, 1200.0));

        let mut renderer = StageRenderer::new();
        let pixmap = renderer.render(&lines, &style, &layout, &mut store);

        // No stroke and no font face: nothing gets painted at all.
        assert!(pixmap.data.chunks_exact(4).all(|px| px[3] == 0));
    }

    #[test]
    fn empty_rows_without_fonts_render_transparent_placeholder_stage() {
        let mut store = FontStore::new();
        let style = StageState::default().style();
        let lines: Vec<String> = Vec::new();
        let layout = layout_with(&mut store, &lines, &style, Bounds::new(900.0, 1200.0));

        let mut renderer = StageRenderer::new();
        let pixmap = renderer.render(&lines, &style, &layout, &mut store);

        assert_eq!((pixmap.width, pixmap.height), (360, 200));
        assert!(pixmap.data.chunks_exact(4).all(|px| px[3] == 0));
    }

    #[test]
    fn scaled_stage_strokes_scaled_checkboxes() {
        let mut store = FontStore::new();
        let style = StageState::default().style();
        let lines = rows(&["Buy milk", "Walk dog"]);
        let layout = layout_with(&mut store, &lines, &style, Bounds::new(180.0, 1200.0));
        assert_eq!(layout.scale, 0.5);

        let mut renderer = StageRenderer::new();
        let pixmap = renderer.render(&lines, &style, &layout, &mut store);

        assert_eq!((pixmap.width, pixmap.height), (180, 100));
        // Checkbox top edge lands at half its natural position.
        assert!(pixmap.pixel(26, 16).unwrap()[3] > 0);
    }

    #[test]
    fn real_fonts_paint_text_right_of_the_checkbox_column() {
        let mut store = FontStore::with_system_fonts();
        if store.is_empty() {
            // No system fonts in this environment; nothing to assert.
            return;
        }

        // Point the generic fallback at a family that is actually installed,
        // so the preset stack resolves on hosts without the named families.
        let family = store
            .faces()
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()));
        if let Some(name) = family {
            store.set_sans_serif_family(name);
        }

        let style = StageState::default().style();
        if store.resolve(style.font, style.font_weight).is_none() {
            // Faces are registered but none parse; nothing to assert.
            return;
        }
        let lines = rows(&["WWWW"]);
        let layout = layout_with(&mut store, &lines, &style, Bounds::new(900.0, 1200.0));

        let mut renderer = StageRenderer::new();
        let pixmap = renderer.render(&lines, &style, &layout, &mut store);

        let text_region_painted = (0..pixmap.height).any(|y| {
            (88..pixmap.width).any(|x| pixmap.pixel(x, y).map(|px| px[3] > 0).unwrap_or(false))
        });
        assert!(text_region_painted);
        assert!(!renderer.cache().is_empty());
    }
}
