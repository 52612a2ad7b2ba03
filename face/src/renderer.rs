//! Software renderer using tiny-skia and cosmic-text
//!
//! All rendering is done on the CPU against an RGBA pixel buffer supplied
//! by the host surface. Text is shaped once per (string, size, weight) and
//! cached; a watchface redraws the same handful of strings every second, so
//! the cache is small but hit almost every frame.
#![allow(clippy::too_many_arguments)]

use std::collections::HashMap;

use cosmic_text::{
    Attrs, Buffer, Color as CosmicColor, Family, FontSystem, LayoutGlyph, Metrics, Shaping,
    SwashCache,
};
use mascot_core::RgbaImage;
use tiny_skia::{Color, Paint, PixmapMut, Rect, Transform};

pub use cosmic_text::Weight;

/// Maximum entries in the text shaping cache
const TEXT_CACHE_MAX_ENTRIES: usize = 64;

/// Cached result of text shaping
struct CachedText {
    glyphs: Vec<LayoutGlyph>,
    width: f32,
    height: f32,
    /// LRU tracking: set to the access counter on each hit
    last_used: u64,
}

/// Key: (text content, font size rounded to tenths, weight)
type TextCacheKey = (String, u32, u16);

pub struct Renderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    text_cache: HashMap<TextCacheKey, CachedText>,
    cache_access_counter: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            text_cache: HashMap::with_capacity(16),
            cache_access_counter: 0,
        }
    }

    /// Clear the whole buffer with a color
    pub fn clear(&self, buffer: &mut [u8], width: u32, height: u32, color: Color) {
        if let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) {
            pixmap.fill(color);
        }
    }

    /// Draw a filled rectangle
    pub fn fill_rect(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) else {
            return;
        };
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;

        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Blit a decoded bitmap with per-pixel alpha, clipped to the buffer.
    /// `dest_x`/`dest_y` may be negative to shift art off the left/top edge.
    pub fn blit_image(
        &self,
        buffer: &mut [u8],
        buf_width: u32,
        buf_height: u32,
        image: &RgbaImage,
        dest_x: i32,
        dest_y: i32,
    ) {
        let bw = buf_width as i32;
        let bh = buf_height as i32;

        for sy in 0..image.height as i32 {
            let py = dest_y + sy;
            if py < 0 || py >= bh {
                continue;
            }
            for sx in 0..image.width as i32 {
                let px = dest_x + sx;
                if px < 0 || px >= bw {
                    continue;
                }

                let src = ((sy as u32 * image.width + sx as u32) * 4) as usize;
                let dst = ((py as u32 * buf_width + px as u32) * 4) as usize;
                if src + 3 >= image.pixels.len() || dst + 3 >= buffer.len() {
                    continue;
                }

                let alpha = image.pixels[src + 3] as u32;
                if alpha == 0 {
                    continue;
                }
                if alpha == 255 {
                    buffer[dst..dst + 4].copy_from_slice(&image.pixels[src..src + 4]);
                    continue;
                }

                let inv = 255 - alpha;
                for channel in 0..3 {
                    buffer[dst + channel] = ((image.pixels[src + channel] as u32 * alpha
                        + buffer[dst + channel] as u32 * inv)
                        / 255) as u8;
                }
                buffer[dst + 3] = (alpha + (buffer[dst + 3] as u32 * inv) / 255) as u8;
            }
        }
    }

    /// Draw text with `(x, y)` at the top-left of the line box
    pub fn draw_text(
        &mut self,
        buffer: &mut [u8],
        buf_width: u32,
        buf_height: u32,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        weight: Weight,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, buf_width, buf_height) else {
            return;
        };

        let _ = self.ensure_cached(text, font_size, weight);
        // Clone is needed: swash_cache borrows &mut self below
        let glyphs = self.get_cached_glyphs(text, font_size, weight);

        let text_color = CosmicColor::rgba(
            (color.red() * 255.0) as u8,
            (color.green() * 255.0) as u8,
            (color.blue() * 255.0) as u8,
            (color.alpha() * 255.0) as u8,
        );

        for glyph in &glyphs {
            let physical_glyph = glyph.physical((x, y), 1.0);

            if let Some(image) = self
                .swash_cache
                .get_image(&mut self.font_system, physical_glyph.cache_key)
            {
                let glyph_x = physical_glyph.x + image.placement.left;
                let glyph_y = physical_glyph.y - image.placement.top;

                draw_glyph_to_pixmap(
                    &mut pixmap,
                    &image.data,
                    image.placement.width,
                    image.placement.height,
                    glyph_x,
                    glyph_y,
                    text_color,
                );
            }
        }
    }

    /// Measure text dimensions without drawing
    pub fn measure_text(&mut self, text: &str, font_size: f32, weight: Weight) -> (f32, f32) {
        self.ensure_cached(text, font_size, weight)
    }

    /// Ensure text is shaped and cached. Returns (width, height).
    fn ensure_cached(&mut self, text: &str, font_size: f32, weight: Weight) -> (f32, f32) {
        let size_key = (font_size * 10.0).round() as u32;

        self.cache_access_counter += 1;
        let current_access = self.cache_access_counter;

        if let Some(cached) = self.find_cached(text, size_key, weight) {
            cached.last_used = current_access;
            return (cached.width, cached.height);
        }

        let metrics = Metrics::new(font_size, font_size * 1.2);
        let mut text_buffer = Buffer::new(&mut self.font_system, metrics);

        let attrs = Attrs::new().family(Family::SansSerif).weight(weight);
        text_buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        text_buffer.shape_until_scroll(&mut self.font_system, false);

        let mut glyphs = Vec::new();
        let mut width = 0.0f32;
        let mut height = 0.0f32;

        for run in text_buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
            for glyph in run.glyphs.iter() {
                glyphs.push(glyph.clone());
            }
        }

        self.text_cache.insert(
            (text.to_string(), size_key, weight.0),
            CachedText {
                glyphs,
                width,
                height,
                last_used: current_access,
            },
        );
        self.evict_lru_if_needed();

        (width, height)
    }

    /// Find cached entry by borrowed key (no String allocation on hit)
    fn find_cached(
        &mut self,
        text: &str,
        size_key: u32,
        weight: Weight,
    ) -> Option<&mut CachedText> {
        self.text_cache
            .iter_mut()
            .find(|(k, _)| k.0 == text && k.1 == size_key && k.2 == weight.0)
            .map(|(_, v)| v)
    }

    fn get_cached_glyphs(&mut self, text: &str, font_size: f32, weight: Weight) -> Vec<LayoutGlyph> {
        let size_key = (font_size * 10.0).round() as u32;
        self.find_cached(text, size_key, weight)
            .map(|c| c.glyphs.clone())
            .unwrap_or_default()
    }

    /// Drop the oldest half of the cache when it grows past the cap
    fn evict_lru_if_needed(&mut self) {
        if self.text_cache.len() <= TEXT_CACHE_MAX_ENTRIES {
            return;
        }

        let mut entries: Vec<_> = self
            .text_cache
            .iter()
            .map(|(k, v)| (k.clone(), v.last_used))
            .collect();
        entries.sort_by_key(|(_, last_used)| *last_used);

        for (key, _) in entries.into_iter().take(self.text_cache.len() / 2) {
            self.text_cache.remove(&key);
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw a glyph coverage image onto a pixmap with alpha blending
fn draw_glyph_to_pixmap(
    pixmap: &mut PixmapMut,
    glyph_data: &[u8],
    glyph_width: u32,
    glyph_height: u32,
    dest_x: i32,
    dest_y: i32,
    color: CosmicColor,
) {
    let pixmap_width = pixmap.width() as i32;
    let pixmap_height = pixmap.height() as i32;
    let data = pixmap.data_mut();

    for gy in 0..glyph_height as i32 {
        let py = dest_y + gy;
        if py < 0 || py >= pixmap_height {
            continue;
        }

        for gx in 0..glyph_width as i32 {
            let px = dest_x + gx;
            if px < 0 || px >= pixmap_width {
                continue;
            }

            let glyph_idx = (gy as u32 * glyph_width + gx as u32) as usize;
            if glyph_idx >= glyph_data.len() {
                continue;
            }

            let alpha = glyph_data[glyph_idx];
            if alpha == 0 {
                continue;
            }

            let pixel_idx = ((py as u32 * pixmap_width as u32 + px as u32) * 4) as usize;
            if pixel_idx + 3 >= data.len() {
                continue;
            }

            let src_a = (alpha as u32 * color.a() as u32) / 255;
            let inv_a = 255 - src_a;

            data[pixel_idx] =
                ((color.r() as u32 * src_a + data[pixel_idx] as u32 * inv_a) / 255) as u8;
            data[pixel_idx + 1] =
                ((color.g() as u32 * src_a + data[pixel_idx + 1] as u32 * inv_a) / 255) as u8;
            data[pixel_idx + 2] =
                ((color.b() as u32 * src_a + data[pixel_idx + 2] as u32 * inv_a) / 255) as u8;
            data[pixel_idx + 3] = (src_a + (data[pixel_idx + 3] as u32 * inv_a) / 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(width: u32, height: u32) -> Vec<u8> {
        vec![0u8; (width * height * 4) as usize]
    }

    fn pixel(buf: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * width + x) * 4) as usize;
        [buf[idx], buf[idx + 1], buf[idx + 2], buf[idx + 3]]
    }

    #[test]
    fn test_clear_fills_buffer() {
        let renderer = Renderer::new();
        let mut buf = buffer(4, 4);
        renderer.clear(&mut buf, 4, 4, Color::from_rgba8(10, 20, 30, 255));
        assert_eq!(pixel(&buf, 4, 0, 0), [10, 20, 30, 255]);
        assert_eq!(pixel(&buf, 4, 3, 3), [10, 20, 30, 255]);
    }

    #[test]
    fn test_blit_clips_negative_offset() {
        let renderer = Renderer::new();
        let mut buf = buffer(4, 4);
        let image = RgbaImage {
            width: 4,
            height: 1,
            pixels: vec![
                255, 0, 0, 255, //
                0, 255, 0, 255, //
                0, 0, 255, 255, //
                255, 255, 255, 255,
            ],
        };

        renderer.blit_image(&mut buf, 4, 4, &image, -2, 0);

        // First two source pixels fall off the left edge
        assert_eq!(pixel(&buf, 4, 0, 0), [0, 0, 255, 255]);
        assert_eq!(pixel(&buf, 4, 1, 0), [255, 255, 255, 255]);
        assert_eq!(pixel(&buf, 4, 2, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_blit_skips_transparent_pixels() {
        let renderer = Renderer::new();
        let mut buf = buffer(2, 1);
        buf.copy_from_slice(&[9, 9, 9, 255, 9, 9, 9, 255]);
        let image = RgbaImage {
            width: 2,
            height: 1,
            pixels: vec![255, 0, 0, 0, 0, 255, 0, 255],
        };

        renderer.blit_image(&mut buf, 2, 1, &image, 0, 0);

        assert_eq!(pixel(&buf, 2, 0, 0), [9, 9, 9, 255], "alpha 0 leaves dest");
        assert_eq!(pixel(&buf, 2, 1, 0), [0, 255, 0, 255]);
    }
}
