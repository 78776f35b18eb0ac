use euclid::{Box2D, UnknownUnit};

use crate::style::Rgb;

/// RGBA8 raster surface with straight (non-premultiplied) alpha.
///
/// Pixels are arranged in row-major order with the origin at the top-left.
/// A new pixmap is fully transparent, so exported images keep a transparent
/// background wherever nothing was drawn.
pub struct Pixmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Pixmap {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize).saturating_mul(height as usize) * 4;
        Self {
            width,
            height,
            data: vec![0; len],
        }
    }

    /// Returns the RGBA bytes of one pixel, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Composites `color` at `alpha` over one pixel (source-over).
    ///
    /// Out-of-range coordinates are ignored, so callers can blit shapes that
    /// hang over the surface edge without pre-clipping.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgb, alpha: u8) {
        if alpha == 0 || x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }

        let idx = (y as usize * self.width as usize + x as usize) * 4;

        if alpha == 255 {
            self.data[idx] = color.0;
            self.data[idx + 1] = color.1;
            self.data[idx + 2] = color.2;
            self.data[idx + 3] = 255;
            return;
        }

        let sa = alpha as u32;
        let da = self.data[idx + 3] as u32;
        let inv_sa = 255 - sa;

        // Straight-alpha source-over, carried in integer space. The output
        // alpha stays scaled by 255 until the final store: flooring it early
        // lets bright channel quotients reach 256 and wrap. Rounded division
        // keeps drawing onto transparency exact.
        let out_a_num = sa * 255 + da * inv_sa;

        let channel = |src: u8, dst: u8| -> u8 {
            ((src as u32 * sa * 255 + dst as u32 * da * inv_sa + out_a_num / 2) / out_a_num) as u8
        };

        self.data[idx] = channel(color.0, self.data[idx]);
        self.data[idx + 1] = channel(color.1, self.data[idx + 1]);
        self.data[idx + 2] = channel(color.2, self.data[idx + 2]);
        self.data[idx + 3] = ((out_a_num + 127) / 255) as u8;
    }

    /// Blits an 8-bit coverage bitmap as `color`, using coverage as alpha.
    ///
    /// `origin` is the top-left corner of the bitmap on the surface. Rows and
    /// columns falling outside the surface are skipped.
    pub fn draw_coverage(
        &mut self,
        origin_x: f32,
        origin_y: f32,
        bitmap_width: usize,
        bitmap_height: usize,
        coverage: &[u8],
        color: Rgb,
    ) {
        if bitmap_width == 0 || bitmap_height == 0 {
            return;
        }

        for row in 0..bitmap_height {
            let y = (origin_y + row as f32).floor() as i64;
            if y < 0 {
                continue;
            }
            if y >= self.height as i64 {
                break;
            }

            for col in 0..bitmap_width {
                let src_alpha = coverage[row * bitmap_width + col];
                if src_alpha == 0 {
                    continue;
                }

                let x = (origin_x + col as f32).floor() as i64;
                self.blend_pixel(x, y, color, src_alpha);
            }
        }
    }

    /// Strokes a rounded rectangle outline, antialiased over one pixel.
    ///
    /// The stroke is centered on the rectangle boundary, matching how canvas
    /// stroking treats a shape edge.
    pub fn stroke_round_rect(
        &mut self,
        rect: Box2D<f32, UnknownUnit>,
        corner_radius: f32,
        stroke_width: f32,
        color: Rgb,
    ) {
        if stroke_width <= 0.0 || rect.is_empty() {
            return;
        }

        let half_stroke = stroke_width / 2.0;
        let center_x = (rect.min.x + rect.max.x) / 2.0;
        let center_y = (rect.min.y + rect.max.y) / 2.0;
        let half_w = (rect.max.x - rect.min.x) / 2.0;
        let half_h = (rect.max.y - rect.min.y) / 2.0;
        let radius = corner_radius.min(half_w).min(half_h).max(0.0);

        // One extra pixel around the stroke band for the antialias ramp.
        let x_from = (rect.min.x - half_stroke - 1.0).floor().max(0.0) as i64;
        let y_from = (rect.min.y - half_stroke - 1.0).floor().max(0.0) as i64;
        let x_to = ((rect.max.x + half_stroke + 1.0).ceil() as i64).min(self.width as i64);
        let y_to = ((rect.max.y + half_stroke + 1.0).ceil() as i64).min(self.height as i64);

        for y in y_from..y_to {
            for x in x_from..x_to {
                // Signed distance from the pixel center to the rounded
                // rectangle boundary (negative inside).
                let qx = (x as f32 + 0.5 - center_x).abs() - (half_w - radius);
                let qy = (y as f32 + 0.5 - center_y).abs() - (half_h - radius);
                let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
                let distance = outside + qx.max(qy).min(0.0) - radius;

                let alpha = (half_stroke - distance.abs() + 0.5).clamp(0.0, 1.0);
                if alpha > 0.0 {
                    self.blend_pixel(x, y, color, (alpha * 255.0).round() as u8);
                }
            }
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use euclid::Point2D;

    #[test]
    fn new_pixmap_is_transparent() {
        let pixmap = Pixmap::new(4, 3);
        assert_eq!(pixmap.data.len(), 4 * 3 * 4);
        assert!(pixmap.data.iter().all(|&byte| byte == 0));
        assert_eq!(pixmap.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(pixmap.pixel(4, 0), None);
    }

    #[test]
    fn opaque_blend_replaces_the_pixel() {
        let mut pixmap = Pixmap::new(2, 2);
        pixmap.blend_pixel(1, 1, Rgb(10, 20, 30), 255);
        assert_eq!(pixmap.pixel(1, 1), Some([10, 20, 30, 255]));
    }

    #[test]
    fn partial_blend_onto_transparency_keeps_the_source_color() {
        let mut pixmap = Pixmap::new(1, 1);
        pixmap.blend_pixel(0, 0, Rgb(200, 100, 50), 128);
        let [r, g, b, a] = pixmap.pixel(0, 0).unwrap();
        assert_eq!(a, 128);
        assert_eq!((r, g, b), (200, 100, 50));
    }

    #[test]
    fn partial_blend_over_opaque_mixes_channels() {
        let mut pixmap = Pixmap::new(1, 1);
        pixmap.blend_pixel(0, 0, Rgb(0, 0, 0), 255);
        pixmap.blend_pixel(0, 0, Rgb(255, 255, 255), 128);
        let [r, _, _, a] = pixmap.pixel(0, 0).unwrap();
        assert_eq!(a, 255);
        // 128/255 white over black.
        assert!((r as i32 - 128).abs() <= 1);
    }

    #[test]
    fn partial_blend_over_partial_stays_bright() {
        let mut pixmap = Pixmap::new(1, 1);
        pixmap.blend_pixel(0, 0, Rgb(255, 255, 255), 128);
        pixmap.blend_pixel(0, 0, Rgb(255, 255, 255), 128);
        let [r, g, b, a] = pixmap.pixel(0, 0).unwrap();
        assert_eq!((r, g, b), (255, 255, 255));
        assert_eq!(a, 192);
    }

    #[test]
    fn overlapping_coverage_blits_stay_bright() {
        let mut pixmap = Pixmap::new(2, 1);
        let coverage = [128u8, 128];
        pixmap.draw_coverage(0.0, 0.0, 2, 1, &coverage, Rgb(255, 255, 255));
        pixmap.draw_coverage(1.0, 0.0, 2, 1, &coverage, Rgb(255, 255, 255));
        let [r, g, b, a] = pixmap.pixel(1, 0).unwrap();
        assert_eq!((r, g, b), (255, 255, 255));
        assert!(a > 128);
    }

    #[test]
    fn out_of_range_blends_are_ignored() {
        let mut pixmap = Pixmap::new(2, 2);
        pixmap.blend_pixel(-1, 0, Rgb(255, 0, 0), 255);
        pixmap.blend_pixel(0, -7, Rgb(255, 0, 0), 255);
        pixmap.blend_pixel(2, 0, Rgb(255, 0, 0), 255);
        assert!(pixmap.data.iter().all(|&byte| byte == 0));
    }

    #[test]
    fn draw_coverage_clips_at_the_edges() {
        let mut pixmap = Pixmap::new(2, 2);
        let coverage = [255u8; 9];
        // 3x3 bitmap placed so only its bottom-right pixel lands on (0, 0).
        pixmap.draw_coverage(-2.0, -2.0, 3, 3, &coverage, Rgb(5, 6, 7));
        assert_eq!(pixmap.pixel(0, 0), Some([5, 6, 7, 255]));
        assert_eq!(pixmap.pixel(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn stroked_rect_touches_the_boundary_not_the_center() {
        let mut pixmap = Pixmap::new(40, 40);
        let rect = Box2D::new(Point2D::new(8.0, 8.0), Point2D::new(32.0, 32.0));
        pixmap.stroke_round_rect(rect, 6.0, 3.0, Rgb(255, 255, 255));

        // Midpoint of the top edge sits on the stroke center line.
        assert!(pixmap.pixel(20, 8).unwrap()[3] > 200);
        // Center of the rect stays transparent.
        assert_eq!(pixmap.pixel(20, 20), Some([0, 0, 0, 0]));
        // Far corner of the surface stays transparent.
        assert_eq!(pixmap.pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
