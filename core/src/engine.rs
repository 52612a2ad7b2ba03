//! The imperative shell around the face state
//!
//! `FaceEngine` owns the display state, the tick scheduler and the tap
//! animator. The host delivers every input through [`FaceEngine::handle_event`]
//! on one logical queue, calls [`FaceEngine::prepare_frame`] before drawing,
//! and drains the redraw-request channel returned by [`FaceEngine::new`].
//! Teardown is synchronous: [`FaceEngine::shutdown`] cancels all timers, so
//! no callback can outlive the engine.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::events::{DisplayInsets, HostEvent, TapEvent, TapKind};
use crate::images::ImageProvider;
use crate::rotation::{self, Invalidate};
use crate::scheduler::TickScheduler;
use crate::settings::FaceSettings;
use crate::skins::SkinCatalog;
use crate::state::{DisplayMode, DisplayState};
use crate::tap::TapAnimator;

pub struct FaceEngine {
    catalog: SkinCatalog,
    state: DisplayState,
    settings: FaceSettings,
    insets: DisplayInsets,
    visible: bool,
    /// Burn flag as of the last resolution, for change detection
    last_burn_mode: bool,
    scheduler: TickScheduler,
    animator: TapAnimator,
    provider: Arc<dyn ImageProvider>,
    redraw_tx: UnboundedSender<()>,
}

impl FaceEngine {
    /// Build an engine and the channel its redraw requests arrive on.
    ///
    /// Must be called from within a tokio runtime; the scheduler and the
    /// tap animator spawn their timer tasks on it.
    pub fn new(
        provider: Arc<dyn ImageProvider>,
        settings: FaceSettings,
        now_ms: i64,
    ) -> (Self, UnboundedReceiver<()>) {
        let (redraw_tx, redraw_rx) = mpsc::unbounded_channel();

        let mut state = DisplayState::new(now_ms);
        state.burn_mode_enabled = settings.burn_mode_enabled;

        let scheduler = TickScheduler::new(redraw_tx.clone());
        let animator = TapAnimator::new(
            state.cache().clone(),
            provider.clone(),
            redraw_tx.clone(),
        );

        let engine = Self {
            catalog: SkinCatalog::builtin(),
            last_burn_mode: settings.burn_mode_enabled,
            state,
            settings,
            insets: DisplayInsets::default(),
            visible: false,
            scheduler,
            animator,
            provider,
            redraw_tx,
        };
        (engine, redraw_rx)
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn settings(&self) -> &FaceSettings {
        &self.settings
    }

    pub fn insets(&self) -> DisplayInsets {
        self.insets
    }

    pub fn catalog(&self) -> SkinCatalog {
        self.catalog
    }

    pub fn provider(&self) -> &Arc<dyn ImageProvider> {
        &self.provider
    }

    pub fn is_scheduler_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_active()
    }

    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::VisibilityChanged(visible) => {
                self.visible = visible;
                self.scheduler.update(visible, self.state.mode);
                if visible {
                    self.request_redraw();
                }
            }
            HostEvent::AmbientChanged(ambient) => {
                let mode = if ambient {
                    DisplayMode::Ambient
                } else {
                    DisplayMode::Interactive
                };
                if self.state.mode != mode {
                    debug!(?mode, "display mode changed");
                    self.state.mode = mode;
                    self.request_redraw();
                }
                self.scheduler.update(self.visible, mode);
            }
            HostEvent::Tap(tap) => self.handle_tap(tap),
            HostEvent::ClockChanged => self.request_redraw(),
            HostEvent::InsetsChanged(insets) => self.insets = insets,
            HostEvent::SettingsChanged(settings) => {
                self.settings = settings;
                self.request_redraw();
            }
        }
    }

    /// Apply bounds and skin rotation for the frame about to be drawn.
    ///
    /// Called by the host at the top of every draw; the renderer then reads
    /// the resolved state.
    pub fn prepare_frame(&mut self, now_ms: i64, width: u32, height: u32) {
        self.state.set_bounds(width, height);

        let burn = self.settings.burn_mode_enabled;
        let resolution = rotation::resolve_skin(
            self.state.current_skin_index,
            self.state.last_rotation_ms,
            now_ms,
            &self.settings.rotation_config(),
            burn != self.last_burn_mode,
            self.catalog.len(),
        );

        match resolution.invalidate {
            Invalidate::Both => self.state.cache().clear_both(),
            Invalidate::Ambient => self.state.cache().clear_ambient(),
            Invalidate::None => {}
        }
        if resolution.skin_index != self.state.current_skin_index {
            debug!(
                from = self.state.current_skin_index,
                to = resolution.skin_index,
                "skin changed"
            );
        }
        self.state.current_skin_index = resolution.skin_index;
        self.state.last_rotation_ms = resolution.last_rotation_ms;
        self.state.burn_mode_enabled = burn;
        self.last_burn_mode = burn;
    }

    /// Synchronously cancel all timers. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.scheduler.stop();
        self.animator.stop();
    }

    fn handle_tap(&mut self, tap: TapEvent) {
        if tap.kind != TapKind::Tap {
            return;
        }
        if !self.state.has_bounds() {
            debug!("tap before first frame, ignored");
            return;
        }
        let skin = self.catalog.get(self.state.current_skin_index);
        self.animator
            .trigger(skin, self.state.width(), self.state.height());
    }

    fn request_redraw(&self) {
        let _ = self.redraw_tx.send(());
    }
}

impl Drop for FaceEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
