use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use anyhow::{Context, Result};
use tiny_skia::{Pixmap, PremultipliedColorU8};

/// Rasterizes the offer label in white on a transparent pixmap.
pub struct LabelPainter {
    font: FontVec,
    size_px: f32,
}

impl LabelPainter {
    pub fn new(font_bytes: Vec<u8>, size_px: f32) -> Result<Self> {
        let font = FontVec::try_from_vec(font_bytes).context("font file is not a valid font")?;
        Ok(Self { font, size_px })
    }

    pub fn render(&self, text: &str) -> Option<Pixmap> {
        let scale = PxScale::from(self.size_px);
        let sf = self.font.as_scaled(scale);

        // Lay out with the baseline at the ascent.
        let mut pen_x = 0.0f32;
        let mut glyphs = Vec::<Glyph>::new();
        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = glyphs.last() {
                pen_x += sf.kern(prev.id, id);
            }
            glyphs.push(Glyph {
                id,
                scale,
                position: point(pen_x, sf.ascent()),
            });
            pen_x += sf.h_advance(id);
        }

        // Union of pixel bounds across the outlined glyphs.
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for g in &glyphs {
            if let Some(out) = self.font.outline_glyph(g.clone()) {
                let b = out.px_bounds();
                min_x = min_x.min(b.min.x);
                min_y = min_y.min(b.min.y);
                max_x = max_x.max(b.max.x);
                max_y = max_y.max(b.max.y);
            }
        }
        if min_x == f32::INFINITY {
            return None;
        }

        let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
        let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
        let mut pm = Pixmap::new(w, h)?;
        let stride = pm.width() as usize;
        let dst = pm.pixels_mut();

        for g in &glyphs {
            if let Some(out) = self.font.outline_glyph(g.clone()) {
                let b = out.px_bounds();
                out.draw(|x, y, cov| {
                    if cov <= f32::EPSILON {
                        return;
                    }
                    let ix = (x as f32 + b.min.x - min_x).floor() as i32;
                    let iy = (y as f32 + b.min.y - min_y).floor() as i32;
                    if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                        return;
                    }
                    let i = iy as usize * stride + ix as usize;
                    // White premultiplied by coverage; overlapping glyph
                    // edges keep the denser value.
                    let v = (cov.clamp(0.0, 1.0) * 255.0) as u8;
                    if v > dst[i].alpha() {
                        if let Some(px) = PremultipliedColorU8::from_rgba(v, v, v, v) {
                            dst[i] = px;
                        }
                    }
                });
            }
        }
        Some(pm)
    }
}
