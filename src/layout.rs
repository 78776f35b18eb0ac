use euclid::{Box2D, Point2D, UnknownUnit};

use crate::{
    measure::LineMeasurer,
    style::{CHECKBOX_TEXT_GAP, DIMENSION_LIMITS, StyleConfig},
};

/// Maximum output size the stage may occupy, in pixels.
///
/// Values are clamped to at least one pixel; non-finite input collapses to
/// the same one-pixel floor so layout stays total.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub max_width: f32,
    pub max_height: f32,
}

impl Bounds {
    pub fn new(max_width: f32, max_height: f32) -> Self {
        Self {
            max_width: clamp_extent(max_width),
            max_height: clamp_extent(max_height),
        }
    }
}

fn clamp_extent(value: f32) -> f32 {
    if value.is_finite() {
        value.max(1.0)
    } else {
        1.0
    }
}

/// Whether the text outline participates in layout and rendering.
///
/// The outline is active only when it has a positive width and a usable
/// color; an empty or `transparent` color disables it entirely, so the
/// extra width it would reserve never appears.
pub fn is_stroke_enabled(outline_width_px: u32, stroke_color: &str) -> bool {
    if outline_width_px == 0 {
        return false;
    }
    let color = stroke_color.trim().to_lowercase();
    !color.is_empty() && color != "transparent"
}

/// Resolved stage dimensions: the natural (unscaled) canvas size, the
/// uniform scale that fits it inside the caller's bounds, and the rounded
/// output size in device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageLayout {
    pub natural_width: f32,
    pub natural_height: f32,
    /// Uniform fit-within factor, `0 < scale <= 1`. Both axes share it, so
    /// the aspect ratio of the natural canvas is preserved.
    pub scale: f32,
    pub output_width: u32,
    pub output_height: u32,
    pub stroke_enabled: bool,
}

/// Computes the stage size for a row sequence.
///
/// The natural size is what the checklist wants when nothing constrains it:
/// checkbox column, gap, widest measured row, outline bleed, padding on all
/// sides, floored at the global minimum canvas size. The scale then shrinks
/// (never enlarges) that canvas uniformly until it fits `bounds`.
///
/// An empty sequence still reserves one row of height, so the placeholder
/// stage has somewhere to draw.
pub fn compute_layout(
    lines: &[String],
    style: &StyleConfig,
    bounds: Bounds,
    measurer: &mut LineMeasurer<'_>,
) -> StageLayout {
    let max_line_width = measurer.max_line_width(lines, style);

    let stroke_enabled = is_stroke_enabled(style.outline_width_px, &style.stroke_color);
    let outline_padding = if stroke_enabled {
        (style.outline_width_px * 2) as f32
    } else {
        0.0
    };

    let content_width =
        style.checkbox_size_px + CHECKBOX_TEXT_GAP + max_line_width + outline_padding;
    let natural_width =
        (content_width + 2.0 * style.stage_padding_px).max(DIMENSION_LIMITS.min_width);

    let row_count = lines.len().max(1) as f32;
    let content_height = row_count * (style.font_size_px + style.line_gap_px);
    let natural_height =
        (content_height + 2.0 * style.stage_padding_px).max(DIMENSION_LIMITS.min_height);

    let scale = (bounds.max_width / natural_width)
        .min(bounds.max_height / natural_height)
        .min(1.0);

    StageLayout {
        natural_width,
        natural_height,
        scale,
        output_width: (natural_width * scale).round() as u32,
        output_height: (natural_height * scale).round() as u32,
        stroke_enabled,
    }
}

/// Placement of one checklist row in natural (unscaled) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowGeometry {
    /// Checkbox square, padding-aligned on the left edge.
    pub checkbox: Box2D<f32, UnknownUnit>,
    /// Top-left corner of the row's text, vertically centered against the
    /// checkbox. The renderer adds the font ascent to reach the baseline.
    pub text_pos: Point2D<f32, UnknownUnit>,
}

/// Computes row placement. Pure arithmetic on the style metrics; rows stack
/// downward at a fixed pitch of `font_size + line_gap`.
pub fn row_geometry(index: usize, style: &StyleConfig) -> RowGeometry {
    let row_pitch = style.font_size_px + style.line_gap_px;
    let checkbox_min = Point2D::new(
        style.stage_padding_px,
        style.stage_padding_px + index as f32 * row_pitch,
    );
    let checkbox = Box2D::new(
        checkbox_min,
        Point2D::new(
            checkbox_min.x + style.checkbox_size_px,
            checkbox_min.y + style.checkbox_size_px,
        ),
    );

    RowGeometry {
        checkbox,
        text_pos: Point2D::new(
            checkbox.max.x + CHECKBOX_TEXT_GAP,
            checkbox_min.y + (style.checkbox_size_px - style.font_size_px) / 2.0,
        ),
    }
}
