//! Core logic for the mascot watchface: skin rotation, redraw scheduling,
//! tap animation and the shared image cache.
//!
//! The host surface (rendering shell) feeds events into [`FaceEngine`] and
//! drains its redraw-request channel; everything else in here is either a
//! pure transition function or a timer task owned by the engine.

pub mod engine;
pub mod events;
pub mod images;
pub mod rotation;
pub mod scheduler;
pub mod settings;
pub mod skins;
pub mod state;
pub mod tap;


pub use engine::FaceEngine;
pub use events::{DisplayInsets, HostEvent, TapEvent, TapKind};
pub use images::{ImageCache, ImageError, ImageId, ImageProvider, RgbaImage};
pub use rotation::{Invalidate, Resolution, RotationConfig, resolve_skin};
pub use scheduler::{TickScheduler, delay_to_next_second};
pub use settings::{FaceSettings, SettingsError};
pub use skins::{Rgba, Skin, SkinCatalog};
pub use state::{DisplayMode, DisplayState};
pub use tap::TapAnimator;
