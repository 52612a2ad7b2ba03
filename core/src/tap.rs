//! Tap-feedback animation
//!
//! A completed tap swaps the interactive bitmap to the skin's tap pose and
//! back, once or twice depending on the skin. The animation runs on its own
//! timer task; the 150 ms hold suspends only that task, never the engine's
//! event path. The task writes the same cache slot the renderer reads,
//! which is why the slot lives behind [`ImageCache`]'s mutex.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::images::{ImageCache, ImageId, ImageProvider};
use crate::skins::Skin;

const TICK_PERIOD: Duration = Duration::from_millis(300);
const HOLD: Duration = Duration::from_millis(150);

/// State of one animation run, owned by the timer task
struct AnimationSession {
    tap_image: ImageId,
    static_image: ImageId,
    play_twice: bool,
    width: u32,
    height: u32,
}

/// Owner of the (at most one) running tap animation
pub struct TapAnimator {
    cache: Arc<ImageCache>,
    provider: Arc<dyn ImageProvider>,
    redraw: UnboundedSender<()>,
    active: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl TapAnimator {
    pub fn new(
        cache: Arc<ImageCache>,
        provider: Arc<dyn ImageProvider>,
        redraw: UnboundedSender<()>,
    ) -> Self {
        Self {
            cache,
            provider,
            redraw,
            active: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Start a session for `skin`. Taps while a session is running are
    /// silently dropped; there is no queueing.
    pub fn trigger(&mut self, skin: &Skin, width: u32, height: u32) {
        if self.active.swap(true, Ordering::AcqRel) {
            debug!("tap ignored, animation already running");
            return;
        }

        let session = AnimationSession {
            tap_image: skin.tap_image,
            static_image: skin.static_image,
            play_twice: skin.plays_tap_twice,
            width,
            height,
        };
        let cache = self.cache.clone();
        let provider = self.provider.clone();
        let redraw = self.redraw.clone();
        let active = self.active.clone();

        self.task = Some(tokio::spawn(async move {
            run_session(session, cache, provider, redraw).await;
            active.store(false, Ordering::Release);
        }));
    }

    /// Teardown: abort a running session. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.active.store(false, Ordering::Release);
    }
}

impl Drop for TapAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_session(
    mut session: AnimationSession,
    cache: Arc<ImageCache>,
    provider: Arc<dyn ImageProvider>,
    redraw: UnboundedSender<()>,
) {
    let mut timer = tokio::time::interval(TICK_PERIOD);
    loop {
        timer.tick().await;

        swap_to(&session, session.tap_image, &cache, provider.as_ref(), &redraw);
        tokio::time::sleep(HOLD).await;
        swap_to(&session, session.static_image, &cache, provider.as_ref(), &redraw);

        if session.play_twice {
            session.play_twice = false;
        } else {
            break;
        }
    }
}

fn swap_to(
    session: &AnimationSession,
    id: ImageId,
    cache: &ImageCache,
    provider: &dyn ImageProvider,
    redraw: &UnboundedSender<()>,
) {
    match provider.decode_scaled(id, session.width, session.height) {
        Ok(image) => {
            cache.set_interactive(image);
            let _ = redraw.send(());
        }
        Err(err) => warn!(%err, "tap animation frame unavailable"),
    }
}
