//! Composed display state, owned by the engine for the surface lifetime

use std::sync::Arc;

use crate::images::ImageCache;

/// Rendering mode reported by the host surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Interactive,
    /// Reduced-frequency low-power rendering
    Ambient,
}

/// Mutable face state.
///
/// All mutation happens on the engine's event path except the cache slots,
/// which the tap animator also writes (see [`ImageCache`]).
#[derive(Debug)]
pub struct DisplayState {
    pub mode: DisplayMode,
    pub burn_mode_enabled: bool,
    pub current_skin_index: usize,
    /// Unix millis of the last auto-rotation
    pub last_rotation_ms: i64,
    width: u32,
    height: u32,
    cache: Arc<ImageCache>,
}

impl DisplayState {
    pub fn new(now_ms: i64) -> Self {
        Self {
            mode: DisplayMode::Interactive,
            burn_mode_enabled: false,
            current_skin_index: 0,
            last_rotation_ms: now_ms,
            width: 0,
            height: 0,
            cache: Arc::new(ImageCache::default()),
        }
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True once the host has drawn at least one frame
    pub fn has_bounds(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Record the surface pixel bounds. A size change makes both scaled
    /// bitmaps stale, so the slots are cleared.
    pub fn set_bounds(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.cache.clear_both();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::RgbaImage;

    #[test]
    fn test_bounds_change_clears_caches() {
        let mut state = DisplayState::new(0);
        state.set_bounds(100, 100);
        state.cache().set_interactive(Arc::new(RgbaImage {
            width: 100,
            height: 100,
            pixels: vec![0; 100 * 100 * 4],
        }));

        state.set_bounds(100, 100);
        assert!(state.cache().interactive().is_some(), "same bounds keep cache");

        state.set_bounds(120, 100);
        assert!(state.cache().interactive().is_none(), "resize clears cache");
    }
}
