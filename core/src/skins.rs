//! Built-in skin catalog
//!
//! A skin is a themed visual variant: four image assets (interactive, tap
//! feedback, ambient, burn-safe) plus a color palette for the digits. The
//! catalog order defines the auto-rotation sequence.

use crate::images::ImageId;

/// RGBA color, straight alpha
pub type Rgba = [u8; 4];

pub const WHITE: Rgba = [255, 255, 255, 255];
pub const BLACK: Rgba = [0, 0, 0, 255];

const MIDDLE_GREY: Rgba = [158, 158, 158, 255];
const DARK_GREY: Rgba = [66, 66, 66, 255];
const ORANGE: Rgba = [255, 152, 0, 255];
const GREEN: Rgba = [76, 175, 80, 255];
const RED: Rgba = [244, 67, 54, 255];
const YELLOW: Rgba = [255, 235, 59, 255];
const BEIGE: Rgba = [245, 245, 220, 255];

/// A themed visual variant of the face
#[derive(Debug, Clone, Copy)]
pub struct Skin {
    /// Illustration shown in interactive mode
    pub static_image: ImageId,
    /// Illustration flashed during the tap animation
    pub tap_image: ImageId,
    /// Simplified illustration for ambient mode
    pub ambient_image: ImageId,
    /// Sparser ambient variant for burn-in mitigation
    pub burn_image: ImageId,
    pub background_color: Rgba,
    pub hours_color: Rgba,
    pub minutes_color: Rgba,
    /// Play the tap animation twice for this skin
    pub plays_tap_twice: bool,
}

const BUILTIN: &[Skin] = &[
    Skin {
        static_image: ImageId("mascot1"),
        tap_image: ImageId("mascot1_tap"),
        ambient_image: ImageId("mascot1_ambient"),
        burn_image: ImageId("mascot1_burn"),
        background_color: MIDDLE_GREY,
        hours_color: ORANGE,
        minutes_color: WHITE,
        plays_tap_twice: false,
    },
    Skin {
        static_image: ImageId("mascot2"),
        tap_image: ImageId("mascot2_tap"),
        ambient_image: ImageId("mascot2_ambient"),
        burn_image: ImageId("mascot2_burn"),
        background_color: GREEN,
        hours_color: RED,
        minutes_color: WHITE,
        plays_tap_twice: true,
    },
    Skin {
        static_image: ImageId("mascot3"),
        tap_image: ImageId("mascot3_tap"),
        ambient_image: ImageId("mascot3_ambient"),
        burn_image: ImageId("mascot3_burn"),
        background_color: YELLOW,
        hours_color: GREEN,
        minutes_color: DARK_GREY,
        plays_tap_twice: false,
    },
    Skin {
        static_image: ImageId("mascot4"),
        tap_image: ImageId("mascot4_tap"),
        ambient_image: ImageId("mascot4_ambient"),
        burn_image: ImageId("mascot4_burn"),
        background_color: ORANGE,
        hours_color: DARK_GREY,
        minutes_color: WHITE,
        plays_tap_twice: false,
    },
    Skin {
        static_image: ImageId("mascot5"),
        tap_image: ImageId("mascot5_tap"),
        ambient_image: ImageId("mascot5_ambient"),
        burn_image: ImageId("mascot5_burn"),
        background_color: RED,
        hours_color: DARK_GREY,
        minutes_color: WHITE,
        plays_tap_twice: true,
    },
    Skin {
        static_image: ImageId("mascot6"),
        tap_image: ImageId("mascot6_tap"),
        ambient_image: ImageId("mascot6_ambient"),
        burn_image: ImageId("mascot6_burn"),
        background_color: GREEN,
        hours_color: BEIGE,
        minutes_color: WHITE,
        plays_tap_twice: true,
    },
];

/// Immutable, ordered table of skins. Index order is rotation order.
#[derive(Debug, Clone, Copy)]
pub struct SkinCatalog(&'static [Skin]);

impl SkinCatalog {
    pub const fn builtin() -> Self {
        Self(BUILTIN)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Skin at `index`, wrapping out-of-range indices into the table
    pub fn get(&self, index: usize) -> &'static Skin {
        &self.0[index % self.0.len()]
    }
}

impl Default for SkinCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
