use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::deck::NavigationMap;
use crate::engine::DeckEngine;

/// Transition duration forced onto the engine for jumps spanning more than
/// one position.
const LONG_JUMP_MS: u64 = 1500;

/// How long a long-jump override is held before the saved duration may be
/// restored.
const LONG_JUMP_HOLD: Duration = Duration::from_millis(1500);

/// Delay between the list becoming visible and the scroll-to-active
/// measurement, so the entrance animation finishes before layout is read.
const ENTRANCE_SCROLL_DELAY: Duration = Duration::from_millis(500);

/// Mini-map navigator state: renders the curated list, highlights the active
/// entry, auto-scrolls it into view, and issues distance-aware `goto`
/// commands.
pub struct MiniMap {
    visible: bool,
    active_node_id: String,
    scroll_top: f32,
    deferred_scroll: Option<Instant>,
    scroll_requested: bool,
    /// Scoped transition-duration override. Each outstanding long jump holds
    /// the override; the saved value is restored when the last hold expires,
    /// so overlapping long jumps extend rather than race the restore.
    override_holds: VecDeque<Instant>,
    saved_duration_ms: Option<u64>,
}

impl MiniMap {
    pub fn new(initial_active: &str) -> Self {
        Self {
            visible: false,
            active_node_id: initial_active.to_string(),
            scroll_top: 0.0,
            deferred_scroll: None,
            scroll_requested: false,
            override_holds: VecDeque::new(),
            saved_duration_ms: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn active_node_id(&self) -> &str {
        &self.active_node_id
    }

    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    pub fn set_scroll_top(&mut self, value: f32) {
        self.scroll_top = value.max(0.0);
    }

    /// Consume the toolbar's broadcast toggle. On becoming visible the
    /// scroll-to-active is deferred until the entrance animation completes.
    pub fn on_toggle(&mut self, now: Instant) {
        self.visible = !self.visible;
        if self.visible {
            self.deferred_scroll = Some(now + ENTRANCE_SCROLL_DELAY);
        }
    }

    /// Track the deck's active step. The highlighted entry follows every
    /// `StepEnter`, including the overview sentinel (which simply matches no
    /// curated row).
    pub fn on_step_enter(&mut self, id: &str) {
        if self.active_node_id != id {
            self.active_node_id = id.to_string();
            self.scroll_requested = true;
        }
    }

    /// Whether a scroll-to-active measurement should run this frame.
    pub fn take_scroll_request(&mut self, now: Instant) -> bool {
        if !self.visible {
            self.scroll_requested = false;
            return false;
        }
        if let Some(deadline) = self.deferred_scroll {
            if now >= deadline {
                self.deferred_scroll = None;
                self.scroll_requested = false;
                return true;
            }
            return false;
        }
        std::mem::take(&mut self.scroll_requested)
    }

    /// Handle a click on the row for `target`, issuing a `goto` with a
    /// widened transition for long jumps.
    pub fn click(
        &mut self,
        map: &NavigationMap,
        engine: &mut dyn DeckEngine,
        target: &str,
        now: Instant,
    ) {
        let current_index = map.index_of(&self.active_node_id).unwrap_or(0);
        let target_index = map.index_of(target).unwrap_or(0);
        let distance = current_index.abs_diff(target_index);

        self.active_node_id = target.to_string();

        if distance > 1 {
            debug!(target, distance, "long jump");
            if self.override_holds.is_empty() {
                self.saved_duration_ms = Some(engine.transition_duration_ms());
            }
            engine.set_transition_duration_ms(LONG_JUMP_MS);
            self.override_holds.push_back(now + LONG_JUMP_HOLD);
            engine.goto(target);
        } else {
            engine.goto(target);
        }
    }

    /// Expire long-jump holds and restore the saved transition duration once
    /// the last hold is gone.
    pub fn tick(&mut self, engine: &mut dyn DeckEngine, now: Instant) {
        while self
            .override_holds
            .front()
            .is_some_and(|deadline| now >= *deadline)
        {
            self.override_holds.pop_front();
        }
        if self.override_holds.is_empty() {
            if let Some(saved) = self.saved_duration_ms.take() {
                engine.set_transition_duration_ms(saved);
            }
        }
    }

    /// Earliest pending deadline (deferred scroll or override hold), for
    /// frame scheduling.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.deferred_scroll, self.override_holds.front().copied()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Mini-map header text: position within the curated list.
    pub fn header_progress(&self, map: &NavigationMap) -> String {
        let index = map.index_of(&self.active_node_id).map_or(0, |i| i + 1);
        format!("{index}/{}", map.len())
    }
}

/// Whether the row at `element_top` is fully inside the visible scroll
/// window.
pub fn row_is_fully_visible(
    element_top: f32,
    element_height: f32,
    scroll_top: f32,
    container_height: f32,
) -> bool {
    element_top >= scroll_top && element_top + element_height <= scroll_top + container_height
}

/// Scroll offset that centers the row in the container, clamped to 0.
pub fn centered_scroll_target(element_top: f32, element_height: f32, container_height: f32) -> f32 {
    (element_top - container_height / 2.0 + element_height / 2.0).max(0.0)
}
