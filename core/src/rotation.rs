//! Skin rotation
//!
//! [`resolve_skin`] is a pure transition function: given the current state
//! view and the wall clock it decides which skin is displayed and which
//! cache slots became stale. The engine applies the result.

/// How skin rotation is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationConfig {
    /// Auto-rotation period
    pub interval_ms: i64,
    /// `Some(index)` pins that skin regardless of elapsed time
    pub pinned_skin_index: Option<usize>,
}

/// Which cache slots a resolution invalidated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidate {
    None,
    /// Only the ambient slot (burn flag flipped)
    Ambient,
    /// Both slots (skin changed)
    Both,
}

/// Result of a skin resolution, to be applied to the display state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub skin_index: usize,
    pub last_rotation_ms: i64,
    pub invalidate: Invalidate,
}

/// Resolve the skin to display at `now_ms`.
///
/// A pinned index always wins. Otherwise the skin advances once the
/// interval has elapsed; a clock that moved backward counts as "interval
/// definitely elapsed" so rotation never stalls after a clock adjustment.
/// `burn_changed` escalates a no-op resolution to an ambient-only
/// invalidation (the interactive bitmap does not depend on the burn flag).
pub fn resolve_skin(
    current_index: usize,
    last_rotation_ms: i64,
    now_ms: i64,
    config: &RotationConfig,
    burn_changed: bool,
    skin_count: usize,
) -> Resolution {
    if skin_count == 0 {
        return Resolution {
            skin_index: current_index,
            last_rotation_ms,
            invalidate: Invalidate::None,
        };
    }

    let (skin_index, last_rotation_ms, mut invalidate) = match config.pinned_skin_index {
        Some(pinned) => {
            let pinned = pinned.min(skin_count - 1);
            if pinned != current_index {
                (pinned, last_rotation_ms, Invalidate::Both)
            } else {
                (current_index, last_rotation_ms, Invalidate::None)
            }
        }
        None => {
            let due = now_ms >= last_rotation_ms.saturating_add(config.interval_ms)
                || last_rotation_ms > now_ms;
            if due {
                ((current_index + 1) % skin_count, now_ms, Invalidate::Both)
            } else {
                (current_index, last_rotation_ms, Invalidate::None)
            }
        }
    };

    if burn_changed && invalidate == Invalidate::None {
        invalidate = Invalidate::Ambient;
    }

    Resolution {
        skin_index,
        last_rotation_ms,
        invalidate,
    }
}
