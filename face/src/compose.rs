//! Watchface frame composition
//!
//! Reads the resolved display state (skin already applied by the engine)
//! and draws one complete frame: background fill, character art, digits and
//! the optional date line. The only mutation is lazily filling an empty
//! cache slot with the freshly decoded background art.

use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Timelike};
use mascot_core::skins::{BLACK, WHITE};
use mascot_core::{
    DisplayInsets, DisplayMode, DisplayState, FaceSettings, ImageProvider, RgbaImage, Skin,
};
use tracing::warn;

use crate::renderer::{Renderer, Weight};
use crate::utils::{color_from_rgba, two_digits};

/// Digits are right-anchored at this fraction of the width
const DIGITS_ANCHOR_X: f32 = 0.63;
/// Hour digits sit on this fraction of the height, minutes below them
const HOURS_ANCHOR_Y: f32 = 0.50;
const MINUTES_ANCHOR_Y: f32 = 0.67;

/// The source art is wider than the display; shifting left by a sixth of
/// the width frames the character correctly.
const ART_SHIFT_DIVISOR: i32 = 6;

/// Digit sizes as a fraction of the display height
const DIGIT_SIZE_FRAC_ROUND: f32 = 0.20;
const DIGIT_SIZE_FRAC_SQUARE: f32 = 0.18;
const DATE_SIZE_FRAC: f32 = 0.08;

/// Compose one frame into `pixels` (RGBA, `width * height * 4`).
#[allow(clippy::too_many_arguments)]
pub fn render_face(
    renderer: &mut Renderer,
    pixels: &mut [u8],
    width: u32,
    height: u32,
    state: &DisplayState,
    skin: &Skin,
    now: DateTime<Local>,
    settings: &FaceSettings,
    insets: DisplayInsets,
    provider: &dyn ImageProvider,
) {
    let w = width as f32;
    let h = height as f32;
    let ambient = state.mode == DisplayMode::Ambient;

    let background = if ambient { BLACK } else { skin.background_color };
    renderer.clear(pixels, width, height, color_from_rgba(background));

    if let Some(image) = background_image(state, skin, width, height, provider) {
        renderer.blit_image(
            pixels,
            width,
            height,
            &image,
            -(width as i32 / ART_SHIFT_DIVISOR),
            0,
        );
    }

    let (hours_color, minutes_color) = if ambient {
        (WHITE, WHITE)
    } else {
        (skin.hours_color, skin.minutes_color)
    };

    let digit_frac = if insets.is_round {
        DIGIT_SIZE_FRAC_ROUND
    } else {
        DIGIT_SIZE_FRAC_SQUARE
    };
    let digit_size = h * digit_frac;

    let hours = format_hour(now.hour(), settings.time_format_24h);
    let (hours_w, hours_h) = renderer.measure_text(&hours, digit_size, Weight::BOLD);
    renderer.draw_text(
        pixels,
        width,
        height,
        &hours,
        w * DIGITS_ANCHOR_X - hours_w,
        h * HOURS_ANCHOR_Y - hours_h,
        digit_size,
        Weight::BOLD,
        color_from_rgba(hours_color),
    );

    let minutes = two_digits(now.minute());
    let (minutes_w, minutes_h) = renderer.measure_text(&minutes, digit_size, Weight::NORMAL);
    renderer.draw_text(
        pixels,
        width,
        height,
        &minutes,
        w * DIGITS_ANCHOR_X - minutes_w,
        h * MINUTES_ANCHOR_Y - minutes_h,
        digit_size,
        Weight::NORMAL,
        color_from_rgba(minutes_color),
    );

    if !ambient && !settings.date_format_pattern.is_empty() {
        if let Some(date) = format_date(&now, &settings.date_format_pattern) {
            let date_size = h * DATE_SIZE_FRAC;
            let (date_w, date_h) = renderer.measure_text(&date, date_size, Weight::NORMAL);
            renderer.draw_text(
                pixels,
                width,
                height,
                &date,
                (w - date_w) / 2.0,
                h - insets.bottom_spacing() as f32 - date_h,
                date_size,
                Weight::NORMAL,
                color_from_rgba(skin.minutes_color),
            );
        }
    }
}

/// Background art for the current mode, from the cache slot or lazily
/// decoded into it. A decode failure only costs the illustration.
fn background_image(
    state: &DisplayState,
    skin: &Skin,
    width: u32,
    height: u32,
    provider: &dyn ImageProvider,
) -> Option<Arc<RgbaImage>> {
    let cache = state.cache();
    match state.mode {
        DisplayMode::Ambient => {
            if let Some(image) = cache.ambient() {
                return Some(image);
            }
            let id = if state.burn_mode_enabled {
                skin.burn_image
            } else {
                skin.ambient_image
            };
            match provider.decode_scaled(id, width, height) {
                Ok(image) => {
                    cache.set_ambient(image.clone());
                    Some(image)
                }
                Err(err) => {
                    warn!(%err, "ambient art unavailable");
                    None
                }
            }
        }
        DisplayMode::Interactive => {
            if let Some(image) = cache.interactive() {
                return Some(image);
            }
            match provider.decode_scaled(skin.static_image, width, height) {
                Ok(image) => {
                    cache.set_interactive(image.clone());
                    Some(image)
                }
                Err(err) => {
                    warn!(%err, "skin art unavailable");
                    None
                }
            }
        }
    }
}

/// Two-digit hour string. In 12-hour form the value is reduced mod 12,
/// except a raw 12 which is preserved; midnight therefore shows "00".
pub fn format_hour(hour24: u32, time_format_24h: bool) -> String {
    let value = if !time_format_24h && hour24 != 12 {
        hour24 % 12
    } else {
        hour24
    };
    two_digits(value)
}

/// Uppercased date line, or None for an invalid strftime pattern
pub fn format_date(now: &DateTime<Local>, pattern: &str) -> Option<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(
        now.format_with_items(items.into_iter())
            .to_string()
            .to_uppercase(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mascot_core::{ImageError, ImageId, SkinCatalog};

    #[test]
    fn test_format_hour() {
        assert_eq!(format_hour(14, true), "14");
        assert_eq!(format_hour(14, false), "02");
        assert_eq!(format_hour(12, false), "12");
        assert_eq!(format_hour(0, false), "00");
        assert_eq!(format_hour(0, true), "00");
        assert_eq!(format_hour(23, false), "11");
    }

    #[test]
    fn test_format_date_rejects_invalid_pattern() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(format_date(&now, "%Q"), None);
    }

    #[test]
    fn test_format_date_uppercases() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let formatted = format_date(&now, "%a %d %b").unwrap();
        assert_eq!(formatted, formatted.to_uppercase());
        assert!(formatted.contains("09"));
    }

    /// Provider returning solid blue art
    struct BlueProvider;

    impl ImageProvider for BlueProvider {
        fn decode_scaled(
            &self,
            _id: ImageId,
            width: u32,
            height: u32,
        ) -> Result<Arc<RgbaImage>, ImageError> {
            let mut pixels = Vec::with_capacity((width * height * 4) as usize);
            for _ in 0..width * height {
                pixels.extend_from_slice(&[0, 0, 255, 255]);
            }
            Ok(Arc::new(RgbaImage {
                width,
                height,
                pixels,
            }))
        }
    }

    fn pixel(buf: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * width + x) * 4) as usize;
        [buf[idx], buf[idx + 1], buf[idx + 2], buf[idx + 3]]
    }

    #[test]
    fn test_interactive_frame_draws_background_and_art() {
        const W: u32 = 60;
        const H: u32 = 60;

        let mut renderer = Renderer::new();
        let mut state = DisplayState::new(0);
        state.set_bounds(W, H);
        let catalog = SkinCatalog::builtin();
        let skin = catalog.get(0);
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap();

        let mut pixels = vec![0u8; (W * H * 4) as usize];
        render_face(
            &mut renderer,
            &mut pixels,
            W,
            H,
            &state,
            skin,
            now,
            &FaceSettings::default(),
            DisplayInsets::default(),
            &BlueProvider,
        );

        // Art covers the left side (shifted by -W/6), background the right edge
        assert_eq!(pixel(&pixels, W, 0, 0), [0, 0, 255, 255]);
        assert_eq!(
            pixel(&pixels, W, W - 1, 0)[..3],
            skin.background_color[..3]
        );
        assert!(
            state.cache().interactive().is_some(),
            "lazy decode fills the slot"
        );
        assert!(state.cache().ambient().is_none());
    }

    #[test]
    fn test_ambient_frame_uses_black_background() {
        const W: u32 = 60;
        const H: u32 = 60;

        let mut renderer = Renderer::new();
        let mut state = DisplayState::new(0);
        state.set_bounds(W, H);
        state.mode = DisplayMode::Ambient;
        let catalog = SkinCatalog::builtin();
        let now = Local.with_ymd_and_hms(2024, 3, 9, 2, 5, 0).unwrap();

        let mut pixels = vec![0u8; (W * H * 4) as usize];
        render_face(
            &mut renderer,
            &mut pixels,
            W,
            H,
            &state,
            catalog.get(0),
            now,
            &FaceSettings::default(),
            DisplayInsets::default(),
            &BlueProvider,
        );

        assert_eq!(pixel(&pixels, W, W - 1, 0), [0, 0, 0, 255]);
        assert!(state.cache().ambient().is_some());
        assert!(state.cache().interactive().is_none());
    }

    /// Provider that always fails, like missing assets on disk
    struct FailingProvider;

    impl ImageProvider for FailingProvider {
        fn decode_scaled(
            &self,
            id: ImageId,
            _width: u32,
            _height: u32,
        ) -> Result<Arc<RgbaImage>, ImageError> {
            Err(ImageError::NotFound(id))
        }
    }

    #[test]
    fn test_decode_failure_still_renders_background() {
        const W: u32 = 40;
        const H: u32 = 40;

        let mut renderer = Renderer::new();
        let mut state = DisplayState::new(0);
        state.set_bounds(W, H);
        let catalog = SkinCatalog::builtin();
        let skin = catalog.get(2);
        let now = Local.with_ymd_and_hms(2024, 3, 9, 8, 15, 0).unwrap();

        let mut pixels = vec![0u8; (W * H * 4) as usize];
        render_face(
            &mut renderer,
            &mut pixels,
            W,
            H,
            &state,
            skin,
            now,
            &FaceSettings::default(),
            DisplayInsets::default(),
            &FailingProvider,
        );

        assert_eq!(
            pixel(&pixels, W, 0, 0)[..3],
            skin.background_color[..3],
            "no art, background still fills the frame"
        );
        assert!(state.cache().interactive().is_none());
    }
}
