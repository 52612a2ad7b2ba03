//! Decoded images, the shared cache slots and the decode seam
//!
//! Raw asset decoding lives outside the core; the renderer and the tap
//! animator reach it through [`ImageProvider`]. The two cache slots are the
//! only state shared across threads (animator task vs render path), so each
//! is guarded by a mutex held just long enough to swap an `Arc`.

use std::fmt;
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Static key identifying a skin image asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub &'static str);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Decoded RGBA bitmap, already scaled to the display bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// `width * height * 4` bytes, straight alpha
    pub pixels: Vec<u8>,
}

/// Errors while resolving or decoding a skin image asset
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("no image asset named '{0}'")]
    NotFound(ImageId),

    #[error("failed to read image asset '{id}'")]
    Read {
        id: ImageId,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image asset '{id}': {reason}")]
    Decode { id: ImageId, reason: String },

    #[error("invalid target bounds {width}x{height}")]
    InvalidBounds { width: u32, height: u32 },
}

/// Decodes an asset and scales it to the given pixel bounds.
///
/// Implementations must be cheap to share: the engine keeps one instance and
/// hands clones of the `Arc` to the tap animator task.
pub trait ImageProvider: Send + Sync {
    fn decode_scaled(
        &self,
        id: ImageId,
        width: u32,
        height: u32,
    ) -> Result<Arc<RgbaImage>, ImageError>;
}

/// Mode-indexed cache of the currently displayed bitmaps.
///
/// One slot per rendering mode. Slots persist across redraws and are only
/// cleared by skin/burn/bounds changes; an empty slot is lazily refilled by
/// whoever needs it next.
#[derive(Debug, Default)]
pub struct ImageCache {
    interactive: Mutex<Option<Arc<RgbaImage>>>,
    ambient: Mutex<Option<Arc<RgbaImage>>>,
}

impl ImageCache {
    pub fn interactive(&self) -> Option<Arc<RgbaImage>> {
        self.interactive.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn ambient(&self) -> Option<Arc<RgbaImage>> {
        self.ambient.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn set_interactive(&self, image: Arc<RgbaImage>) {
        if let Ok(mut slot) = self.interactive.lock() {
            *slot = Some(image);
        }
    }

    pub fn set_ambient(&self, image: Arc<RgbaImage>) {
        if let Ok(mut slot) = self.ambient.lock() {
            *slot = Some(image);
        }
    }

    /// Skin or bounds changed: bitmaps for both modes are stale.
    pub fn clear_both(&self) {
        if let Ok(mut slot) = self.interactive.lock() {
            *slot = None;
        }
        self.clear_ambient();
    }

    /// Burn flag flipped: only the ambient art is stale.
    pub fn clear_ambient(&self) {
        if let Ok(mut slot) = self.ambient.lock() {
            *slot = None;
        }
    }
}
