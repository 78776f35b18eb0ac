use crate::{font_store::FontStore, style::StyleConfig};

/// Average advance per character, as a fraction of the font size, assumed
/// when no font face is available to measure with.
const FALLBACK_ADVANCE_FACTOR: f32 = 0.6;

/// Measures checklist rows with the same font resolution the renderer uses,
/// so measured and rendered widths agree.
///
/// Borrows the store mutably because measurement is what triggers the lazy
/// `fontdue` parse of a face the first time it is used.
pub struct LineMeasurer<'a> {
    store: &'a mut FontStore,
}

impl<'a> LineMeasurer<'a> {
    pub fn new(store: &'a mut FontStore) -> Self {
        Self { store }
    }

    /// Returns the advance width of one row of text at the style's font
    /// size.
    ///
    /// When the style's family stack resolves to a loaded face the width is
    /// the kerned sum of glyph advances. When it resolves to nothing (for
    /// example a headless host with no fonts) a per-character heuristic
    /// stands in, so layout stays total rather than failing.
    pub fn measure_width(&mut self, text: &str, style: &StyleConfig) -> f32 {
        if text.is_empty() {
            return 0.0;
        }

        match self.store.resolve(style.font, style.font_weight) {
            Some((_, font)) => advance_width(text, &font, style.font_size_px),
            None => heuristic_width(text, style.font_size_px),
        }
    }

    /// Returns the widest row of the sequence, `0.0` for an empty sequence.
    pub fn max_line_width(&mut self, lines: &[String], style: &StyleConfig) -> f32 {
        lines
            .iter()
            .map(|line| self.measure_width(line, style))
            .fold(0.0, f32::max)
    }
}

/// Sums glyph advances with kerning applied between neighbors.
pub(crate) fn advance_width(text: &str, font: &fontdue::Font, font_size: f32) -> f32 {
    let mut width = 0.0;
    let mut prev_glyph: Option<u16> = None;

    for ch in text.chars() {
        let glyph_idx = font.lookup_glyph_index(ch);
        let metrics = font.metrics_indexed(glyph_idx, font_size);

        if let Some(prev) = prev_glyph {
            width += font
                .horizontal_kern_indexed(prev, glyph_idx, font_size)
                .unwrap_or(0.0);
        }

        width += metrics.advance_width;
        prev_glyph = Some(glyph_idx);
    }

    width
}

fn heuristic_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * FALLBACK_ADVANCE_FACTOR
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StageState;

    fn default_style() -> StyleConfig {
        StageState::default().style()
    }

    #[test]
    fn empty_text_measures_zero() {
        let mut store = FontStore::new();
        let mut measurer = LineMeasurer::new(&mut store);
        assert_eq!(measurer.measure_width("", &default_style()), 0.0);
    }

    #[test]
    fn heuristic_width_scales_with_character_count() {
        // An empty store forces the heuristic path.
        let mut store = FontStore::new();
        let mut measurer = LineMeasurer::new(&mut store);
        let style = default_style();

        let width = measurer.measure_width("Buy milk", &style);
        assert!((width - 8.0 * 36.0 * 0.6).abs() < 1e-3);

        // Multi-byte characters count once each.
        let kana = measurer.measure_width("ラフを描く", &style);
        assert!((kana - 5.0 * 36.0 * 0.6).abs() < 1e-3);
    }

    #[test]
    fn max_line_width_picks_the_widest_row() {
        let mut store = FontStore::new();
        let mut measurer = LineMeasurer::new(&mut store);
        let style = default_style();

        let lines = vec![
            "a".to_string(),
            "a much longer row".to_string(),
            "bb".to_string(),
        ];
        let max = measurer.max_line_width(&lines, &style);
        let longest = measurer.measure_width("a much longer row", &style);
        assert_eq!(max, longest);

        assert_eq!(measurer.max_line_width(&[], &style), 0.0);
    }

    #[test]
    fn real_faces_measure_nonzero_kerned_advances() {
        let mut store = FontStore::with_system_fonts();
        if store.is_empty() {
            // No system fonts in this environment; nothing to assert.
            return;
        }
        let mut measurer = LineMeasurer::new(&mut store);
        let style = default_style();

        let narrow = measurer.measure_width("i", &style);
        let wide = measurer.measure_width("wwww", &style);
        assert!(narrow > 0.0);
        assert!(wide > narrow);
    }
}
