use serde::{Deserialize, Serialize};

use crate::style::{
    CHECKBOX_SIZE, DIMENSION_LIMITS, FONT_SIZE, FontWeight, LINE_GAP, OUTLINE_WIDTH_OPTIONS,
    Rgb, STAGE_PADDING, STROKE_COLOR_PRESETS, StyleConfig, TEXT_COLOR_PRESETS, font_preset,
    stroke_color_rgb, text_color_rgb,
};

/// Checklist text used until the user types their own.
pub const DEFAULT_RAW_TEXT: &str = "今日やること\nラフを描く\n色ラフ作成\n仕上げチェック";

/// The one persisted record: everything needed to rebuild the stage.
///
/// Free-form fields (`raw_text`, colors, font id, weight token) are stored
/// as the user last set them; [`StageState::normalize`] coerces them back
/// onto the closed preset sets. Loading a record always normalizes, so a
/// stored record that was edited by hand cannot push the stage outside its
/// invariants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageState {
    pub raw_text: String,
    pub text_color: String,
    pub stroke_color: String,
    pub font_id: String,
    pub font_weight: String,
    pub max_width: f32,
    pub max_height: f32,
    pub outline_width: f32,
}

impl Default for StageState {
    fn default() -> Self {
        Self {
            raw_text: DEFAULT_RAW_TEXT.to_string(),
            text_color: TEXT_COLOR_PRESETS[5].hex.to_string(),
            stroke_color: STROKE_COLOR_PRESETS[1].hex.to_string(),
            font_id: "noto-sans".to_string(),
            font_weight: FontWeight::Bold.token().to_string(),
            max_width: 900.0,
            max_height: 1200.0,
            outline_width: 8.0,
        }
    }
}

/// Which of the two output caps a textual dimension update targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
    MaxWidth,
    MaxHeight,
}

impl StageState {
    /// Returns a copy with every field coerced back onto its allowed set.
    ///
    /// Idempotent: normalizing an already-normalized record is a no-op.
    /// The font id is deliberately left untouched; unknown ids resolve to
    /// the first preset at lookup time instead.
    pub fn normalize(&self) -> Self {
        let defaults = Self::default();

        Self {
            raw_text: self.raw_text.clone(),
            text_color: normalize_color(&self.text_color, &defaults.text_color, text_color_rgb),
            stroke_color: normalize_color(
                &self.stroke_color,
                &defaults.stroke_color,
                stroke_color_rgb,
            ),
            font_id: self.font_id.clone(),
            font_weight: match FontWeight::parse(&self.font_weight) {
                Some(weight) => weight.token().to_string(),
                None => defaults.font_weight,
            },
            max_width: clamp_dimension(
                self.max_width,
                DIMENSION_LIMITS.min_width,
                DIMENSION_LIMITS.max_width,
                defaults.max_width,
            ),
            max_height: clamp_dimension(
                self.max_height,
                DIMENSION_LIMITS.min_height,
                DIMENSION_LIMITS.max_height,
                defaults.max_height,
            ),
            outline_width: snap_outline_width(self.outline_width),
        }
    }

    /// Resolves the record into the style parameters layout and rendering
    /// consume.
    pub fn style(&self) -> StyleConfig {
        StyleConfig {
            font: font_preset(&self.font_id),
            font_weight: FontWeight::parse(&self.font_weight).unwrap_or_default(),
            font_size_px: FONT_SIZE,
            line_gap_px: LINE_GAP,
            checkbox_size_px: CHECKBOX_SIZE,
            stage_padding_px: STAGE_PADDING,
            text_color: self.text_color.clone(),
            stroke_color: self.stroke_color.clone(),
            outline_width_px: snap_outline_width(self.outline_width) as u32,
        }
    }

    /// Applies a textual dimension update. Input that fails to parse, or
    /// parses to NaN, is rejected and the prior value kept; everything else,
    /// infinities included, is clamped into the allowed range. Returns
    /// whether the update was applied.
    pub fn update_dimension(&mut self, dimension: Dimension, raw: &str) -> bool {
        let Ok(value) = raw.trim().parse::<f32>() else {
            return false;
        };
        if value.is_nan() {
            return false;
        }

        match dimension {
            Dimension::MaxWidth => {
                self.max_width =
                    value.clamp(DIMENSION_LIMITS.min_width, DIMENSION_LIMITS.max_width);
            }
            Dimension::MaxHeight => {
                self.max_height =
                    value.clamp(DIMENSION_LIMITS.min_height, DIMENSION_LIMITS.max_height);
            }
        }
        true
    }
}

fn normalize_color(value: &str, default: &str, lookup: fn(&str) -> Option<Rgb>) -> String {
    if lookup(value).is_some() {
        value.to_lowercase()
    } else {
        default.to_string()
    }
}

fn clamp_dimension(value: f32, min: f32, max: f32, default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

/// Snaps an outline width onto the nearest member of
/// [`OUTLINE_WIDTH_OPTIONS`]. Equidistant values keep the lower member;
/// non-finite input falls back to the default width.
pub fn snap_outline_width(value: f32) -> f32 {
    if !value.is_finite() {
        return StageState::default().outline_width;
    }

    let rounded = value.round();
    let min = OUTLINE_WIDTH_OPTIONS[0] as f32;
    let max = OUTLINE_WIDTH_OPTIONS[OUTLINE_WIDTH_OPTIONS.len() - 1] as f32;
    let clamped = rounded.clamp(min, max);

    let mut closest = min;
    for option in OUTLINE_WIDTH_OPTIONS {
        let option = option as f32;
        if (option - clamped).abs() < (closest - clamped).abs() {
            closest = option;
        }
    }
    closest
}

/// Splits raw checklist text into trimmed, non-empty rows in input order.
pub fn split_lines(raw: &str) -> Vec<String> {
    raw.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
