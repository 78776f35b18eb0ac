use serde::{Deserialize, Serialize};

/// Edge length of the checkbox glyph, in natural (unscaled) pixels.
pub const CHECKBOX_SIZE: f32 = 40.0;
/// Padding between the stage edge and the content on every side.
pub const STAGE_PADDING: f32 = 32.0;
/// Font size used for checklist rows.
pub const FONT_SIZE: f32 = 36.0;
/// Vertical gap between consecutive rows.
pub const LINE_GAP: f32 = 16.0;
/// Horizontal gap between the checkbox and the first glyph of a row.
pub const CHECKBOX_TEXT_GAP: f32 = 16.0;

/// Stroke width of the checkbox outline.
pub const CHECKBOX_STROKE_WIDTH: f32 = 3.0;
/// Corner radius of the checkbox outline.
pub const CHECKBOX_CORNER_RADIUS: f32 = 6.0;

/// Message rendered when the checklist has no rows.
pub const PLACEHOLDER_TEXT: &str = "TODO を入力するとここに表示されます";
/// Font size of the placeholder message. Fixed regardless of the row style.
pub const PLACEHOLDER_FONT_SIZE: f32 = 28.0;
/// Fill color of the placeholder message. Fixed regardless of the row style.
pub const PLACEHOLDER_COLOR: Rgb = Rgb(0x6b, 0x72, 0x80);

/// Allowed text outline widths. Persisted values are snapped to the nearest
/// member, lower member winning ties.
pub const OUTLINE_WIDTH_OPTIONS: [u32; 5] = [0, 2, 4, 6, 8];

/// Inclusive limits for the requested maximum output dimensions. The minimum
/// width and height double as the global floor of the natural stage size.
pub struct DimensionLimits {
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
}

pub const DIMENSION_LIMITS: DimensionLimits = DimensionLimits {
    min_width: 360.0,
    max_width: 2400.0,
    min_height: 200.0,
    max_height: 2400.0,
};

/// Opaque sRGB color. All preset colors are fully opaque; transparency only
/// exists as the `"transparent"` stroke sentinel, which disables the stroke
/// pass entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// A selectable font-family stack.
///
/// The stack is expressed as an ordered `fontdb::Family` slice so the same
/// query drives both measurement and rendering, mirroring a CSS
/// `font-family` list with a generic fallback at the end.
#[derive(Debug, PartialEq)]
pub struct FontPreset {
    pub id: &'static str,
    pub label: &'static str,
    pub families: &'static [fontdb::Family<'static>],
}

pub const FONT_PRESETS: [FontPreset; 3] = [
    FontPreset {
        id: "biz-ud-gothic",
        label: "BIZ UDPゴシック",
        families: &[
            fontdb::Family::Name("BIZ UDPGothic"),
            fontdb::Family::Name("Hiragino Sans"),
            fontdb::Family::Name("Yu Gothic"),
            fontdb::Family::SansSerif,
        ],
    },
    FontPreset {
        id: "biz-ud-mincho",
        label: "BIZ UDP明朝",
        families: &[
            fontdb::Family::Name("BIZ UDPMincho"),
            fontdb::Family::Name("Hiragino Mincho ProN"),
            fontdb::Family::Name("Yu Mincho"),
            fontdb::Family::Serif,
        ],
    },
    FontPreset {
        id: "noto-sans",
        label: "Noto Sans JP",
        families: &[
            fontdb::Family::Name("Noto Sans JP"),
            fontdb::Family::Name("BIZ UDPGothic"),
            fontdb::Family::SansSerif,
        ],
    },
];

/// Looks up a font preset by id, falling back to the first preset for
/// unknown ids.
pub fn font_preset(id: &str) -> &'static FontPreset {
    FONT_PRESETS
        .iter()
        .find(|preset| preset.id == id)
        .unwrap_or(&FONT_PRESETS[0])
}

/// Font weight of the checklist rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Regular,
    #[default]
    Bold,
}

impl FontWeight {
    /// Parses the persisted weight token. Unknown tokens yield `None` so the
    /// caller can fall back to the default.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "regular" => Some(Self::Regular),
            "bold" => Some(Self::Bold),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Bold => "bold",
        }
    }

    pub fn to_fontdb(self) -> fontdb::Weight {
        match self {
            Self::Regular => fontdb::Weight::NORMAL,
            Self::Bold => fontdb::Weight::BOLD,
        }
    }
}

/// A selectable color, keyed by its lowercase hex notation.
#[derive(Debug, PartialEq)]
pub struct ColorPreset {
    pub hex: &'static str,
    pub rgb: Rgb,
}

pub const TEXT_COLOR_PRESETS: [ColorPreset; 9] = [
    ColorPreset { hex: "#ef4444", rgb: Rgb(0xef, 0x44, 0x44) },
    ColorPreset { hex: "#f97316", rgb: Rgb(0xf9, 0x73, 0x16) },
    ColorPreset { hex: "#facc15", rgb: Rgb(0xfa, 0xcc, 0x15) },
    ColorPreset { hex: "#22c55e", rgb: Rgb(0x22, 0xc5, 0x5e) },
    ColorPreset { hex: "#0ea5e9", rgb: Rgb(0x0e, 0xa5, 0xe9) },
    ColorPreset { hex: "#6366f1", rgb: Rgb(0x63, 0x66, 0xf1) },
    ColorPreset { hex: "#ec4899", rgb: Rgb(0xec, 0x48, 0x99) },
    ColorPreset { hex: "#111827", rgb: Rgb(0x11, 0x18, 0x27) },
    ColorPreset { hex: "#f1f5f9", rgb: Rgb(0xf1, 0xf5, 0xf9) },
];

/// A selectable stroke color. The stroke set is intentionally tiny; the
/// outline exists for contrast, not decoration.
#[derive(Debug, PartialEq)]
pub struct StrokeColorPreset {
    pub label: &'static str,
    pub hex: &'static str,
    pub rgb: Rgb,
}

pub const STROKE_COLOR_PRESETS: [StrokeColorPreset; 2] = [
    StrokeColorPreset { label: "黒", hex: "#111111", rgb: Rgb(0x11, 0x11, 0x11) },
    StrokeColorPreset { label: "白", hex: "#ffffff", rgb: Rgb(0xff, 0xff, 0xff) },
];

/// Resolves a text color against the preset set, case-insensitively.
pub fn text_color_rgb(hex: &str) -> Option<Rgb> {
    TEXT_COLOR_PRESETS
        .iter()
        .find(|preset| preset.hex.eq_ignore_ascii_case(hex))
        .map(|preset| preset.rgb)
}

/// Resolves a stroke color against the preset set, case-insensitively.
pub fn stroke_color_rgb(hex: &str) -> Option<Rgb> {
    STROKE_COLOR_PRESETS
        .iter()
        .find(|preset| preset.hex.eq_ignore_ascii_case(hex))
        .map(|preset| preset.rgb)
}

/// Resolved style parameters consumed by measurement, layout, and rendering.
///
/// The metric fields default to the stage constants above; they are carried
/// as fields so layout math stays a pure function of its arguments. Colors
/// stay in hex notation because the stroke color participates in the
/// `"transparent"` sentinel check before any pixel work happens.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleConfig {
    pub font: &'static FontPreset,
    pub font_weight: FontWeight,
    pub font_size_px: f32,
    pub line_gap_px: f32,
    pub checkbox_size_px: f32,
    pub stage_padding_px: f32,
    pub text_color: String,
    pub stroke_color: String,
    /// Always a member of [`OUTLINE_WIDTH_OPTIONS`].
    pub outline_width_px: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        crate::state::StageState::default().style()
    }
}
