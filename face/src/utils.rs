//! Small shared helpers for face rendering

use mascot_core::Rgba;
use tiny_skia::Color;

/// Convert an RGBA array to a tiny_skia Color
#[inline]
pub fn color_from_rgba(rgba: Rgba) -> Color {
    Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Zero-padded two-digit clock field
#[inline]
pub fn two_digits(value: u32) -> String {
    format!("{:02}", value)
}
