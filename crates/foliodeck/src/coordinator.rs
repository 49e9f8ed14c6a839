use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::deck::OVERVIEW_ID;
use crate::engine::{DeckEngine, DeckSignal, MIN_CANVAS_HEIGHT, MIN_CANVAS_WIDTH};

/// Opacity of non-active slides outside overview mode.
pub const DIM_OPACITY: f32 = 0.4;

/// Fade applied by the reset-all rule when entering overview (constant A).
pub const RESET_FADE: Duration = Duration::from_millis(300);

/// Fade applied to the slide becoming focal (constant B). Entry fades in
/// slower than exit fades out; the asymmetry with `DIM_FADE` is intentional.
pub const FOCUS_FADE: Duration = Duration::from_millis(800);

/// Fade applied to slides losing focus (constant C).
pub const DIM_FADE: Duration = Duration::from_millis(600);

/// How long a leaving slide keeps its cross-fade marker.
const TRANSITIONING_HOLD: Duration = Duration::from_millis(1000);

/// Navigation state owned exclusively by the coordinator. When `overview` is
/// true, `active_slide_id` is ignored for opacity purposes.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    pub active_slide_id: Option<String>,
    pub overview: bool,
}

/// Derived per-slide visual state. Recomputed in full on every navigation
/// change, never diffed incrementally.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideVisualState {
    pub opacity: f32,
    pub interactive: bool,
    pub transitioning: bool,
    pub fade: Duration,
}

impl Default for SlideVisualState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            interactive: true,
            transitioning: false,
            fade: RESET_FADE,
        }
    }
}

/// Single source of truth translating raw deck signals into consistent
/// visual state across all slides.
///
/// Overview mode is reported over two independent channels (the enter/leave
/// signal pair and the root marker observation); every handler here
/// computes-and-sets the flag, never toggles it, so both channels converge
/// to the same terminal state regardless of delivery order.
pub struct Coordinator {
    state: NavigationState,
    visuals: HashMap<String, SlideVisualState>,
    transition_deadlines: HashMap<String, Instant>,
}

impl Coordinator {
    /// `step_ids` is the engine's full step order; the overview sentinel is
    /// excluded from all opacity mutation and carries no visual entry.
    pub fn new(step_ids: &[String]) -> Self {
        let visuals = step_ids
            .iter()
            .filter(|id| id.as_str() != OVERVIEW_ID)
            .map(|id| (id.clone(), SlideVisualState::default()))
            .collect();
        Self {
            state: NavigationState::default(),
            visuals,
            transition_deadlines: HashMap::new(),
        }
    }

    pub fn is_overview_mode(&self) -> bool {
        self.state.overview
    }

    /// Explicit active-slide query so widgets need not re-derive it from
    /// rendered markers.
    pub fn current_active_slide_id(&self) -> Option<&str> {
        self.state.active_slide_id.as_deref()
    }

    pub fn visual(&self, id: &str) -> Option<&SlideVisualState> {
        self.visuals.get(id)
    }

    pub fn visuals(&self) -> impl Iterator<Item = (&str, &SlideVisualState)> {
        self.visuals.iter().map(|(id, v)| (id.as_str(), v))
    }

    /// On mount: apply the highlight rule for a pre-existing active slide
    /// (e.g. a restored start position), read the marker channel once, and
    /// push the initial canvas size.
    pub fn initialize(&mut self, engine: &mut dyn DeckEngine, viewport: (u32, u32)) {
        let active = engine.active_slide();
        if let Some(ref active) = active {
            self.on_step_enter(active);
        }
        self.on_overview_marker(engine.overview_marker(), active.as_deref());
        self.push_canvas_size(engine, viewport.0, viewport.1);
    }

    /// Push viewport dimensions into the engine's sizing attributes,
    /// enforcing the 1024x768 floor. Called on mount and on every resize.
    pub fn push_canvas_size(&self, engine: &mut dyn DeckEngine, width: u32, height: u32) {
        engine.set_canvas_size(width.max(MIN_CANVAS_WIDTH), height.max(MIN_CANVAS_HEIGHT));
    }

    pub fn handle_signal(&mut self, signal: &DeckSignal, engine_active: Option<&str>, now: Instant) {
        match signal {
            DeckSignal::StepEnter(id) => self.on_step_enter(id),
            DeckSignal::StepLeave(id) => self.on_step_leave(id, now),
            DeckSignal::OverviewMarker(flag) => self.on_overview_marker(*flag, engine_active),
        }
    }

    pub fn on_step_enter(&mut self, id: &str) {
        if id == OVERVIEW_ID {
            debug!("enter overview");
            self.state.overview = true;
            self.reset_all();
        } else {
            self.state.overview = false;
            self.state.active_slide_id = Some(id.to_string());
            self.highlight(id);
        }
    }

    /// Mark a genuinely leaving slide for a visible cross-fade, distinguishing
    /// real navigation from the reset performed by `on_step_enter`.
    pub fn on_step_leave(&mut self, id: &str, now: Instant) {
        if self.state.overview || id == OVERVIEW_ID {
            return;
        }
        if let Some(visual) = self.visuals.get_mut(id) {
            visual.transitioning = true;
            self.transition_deadlines
                .insert(id.to_string(), now + TRANSITIONING_HOLD);
        }
    }

    /// React to the engine root's overview marker, the second channel for the
    /// same logical fact. Reads the marker value, never writes it back.
    pub fn on_overview_marker(&mut self, on_overview: bool, engine_active: Option<&str>) {
        self.state.overview = on_overview;
        if on_overview {
            self.reset_all();
        } else if let Some(active) = engine_active {
            if active != OVERVIEW_ID {
                self.state.active_slide_id = Some(active.to_string());
                self.highlight(active);
            }
        }
    }

    /// Clear expired cross-fade markers.
    pub fn tick(&mut self, now: Instant) {
        let expired: Vec<String> = self
            .transition_deadlines
            .iter()
            .filter(|(_, deadline)| now >= **deadline)
            .map(|(id, _)| id.clone())
            .collect();
        for id in expired {
            self.transition_deadlines.remove(&id);
            if let Some(visual) = self.visuals.get_mut(&id) {
                visual.transitioning = false;
            }
        }
    }

    /// Earliest pending cross-fade deadline, for frame scheduling.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.transition_deadlines.values().min().copied()
    }

    /// Highlight rule: exactly one slide focal, everything else dimmed.
    fn highlight(&mut self, active_id: &str) {
        self.transition_deadlines.clear();
        for (id, visual) in self.visuals.iter_mut() {
            visual.transitioning = false;
            if id == active_id {
                visual.opacity = 1.0;
                visual.interactive = true;
                visual.fade = FOCUS_FADE;
            } else {
                visual.opacity = DIM_OPACITY;
                visual.interactive = false;
                visual.fade = DIM_FADE;
            }
        }
    }

    /// Reset-all rule: in overview every slide is uniformly visible.
    fn reset_all(&mut self) {
        for visual in self.visuals.values_mut() {
            visual.opacity = 1.0;
            visual.interactive = true;
            visual.fade = RESET_FADE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_ids() -> Vec<String> {
        ["title", "homepage", "profile", "gallery", "termfolio", OVERVIEW_ID]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn coordinator() -> Coordinator {
        Coordinator::new(&step_ids())
    }

    fn focal_slides(c: &Coordinator) -> Vec<String> {
        c.visuals()
            .filter(|(_, v)| v.opacity == 1.0 && v.interactive)
            .map(|(id, _)| id.to_string())
            .collect()
    }

    #[test]
    fn sentinel_has_no_visual_entry() {
        let c = coordinator();
        assert!(c.visual(OVERVIEW_ID).is_none());
        assert_eq!(c.visuals().count(), 5);
    }

    #[test]
    fn highlight_rule_makes_exactly_one_slide_focal() {
        let mut c = coordinator();
        c.on_step_enter("profile");

        assert_eq!(focal_slides(&c), vec!["profile".to_string()]);
        assert_eq!(c.current_active_slide_id(), Some("profile"));
        assert!(!c.is_overview_mode());

        let focal = c.visual("profile").unwrap();
        assert_eq!(focal.fade, FOCUS_FADE);
        for (id, v) in c.visuals() {
            if id != "profile" {
                assert_eq!(v.opacity, DIM_OPACITY);
                assert!(!v.interactive);
                assert_eq!(v.fade, DIM_FADE);
            }
        }
    }

    #[test]
    fn entry_fade_is_slower_than_exit_fade() {
        assert!(FOCUS_FADE > DIM_FADE);
    }

    #[test]
    fn overview_entry_resets_all_slides_idempotently() {
        let mut c = coordinator();
        c.on_step_enter("gallery");
        c.on_step_enter(OVERVIEW_ID);
        assert!(c.is_overview_mode());
        for (_, v) in c.visuals() {
            assert_eq!(v.opacity, 1.0);
            assert!(v.interactive);
            assert_eq!(v.fade, RESET_FADE);
        }

        // Entering overview twice in a row yields the same state.
        let before: Vec<_> = c.visuals().map(|(id, v)| (id.to_string(), v.clone())).collect();
        c.on_step_enter(OVERVIEW_ID);
        let after: Vec<_> = c.visuals().map(|(id, v)| (id.to_string(), v.clone())).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn leave_marks_cross_fade_and_tick_clears_it() {
        let mut c = coordinator();
        let t0 = Instant::now();
        c.on_step_enter("title");
        c.on_step_leave("title", t0);
        assert!(c.visual("title").unwrap().transitioning);

        c.tick(t0 + Duration::from_millis(999));
        assert!(c.visual("title").unwrap().transitioning);
        c.tick(t0 + Duration::from_millis(1000));
        assert!(!c.visual("title").unwrap().transitioning);
    }

    #[test]
    fn leave_is_ignored_in_overview_mode_and_for_the_sentinel() {
        let mut c = coordinator();
        let t0 = Instant::now();
        c.on_step_enter(OVERVIEW_ID);
        c.on_step_leave("title", t0);
        assert!(!c.visual("title").unwrap().transitioning);

        let mut c = coordinator();
        c.on_step_enter("title");
        c.on_step_leave(OVERVIEW_ID, t0);
        assert!(c.next_deadline().is_none());
    }

    #[test]
    fn highlight_clears_pending_cross_fade_markers() {
        let mut c = coordinator();
        let t0 = Instant::now();
        c.on_step_enter("title");
        c.on_step_leave("title", t0);
        c.on_step_enter("homepage");
        assert!(!c.visual("title").unwrap().transitioning);
        assert!(c.next_deadline().is_none());
    }

    #[test]
    fn dual_channel_overview_converges_in_either_order() {
        let now = Instant::now();

        // Channel order 1: enter signal first, marker second.
        let mut a = coordinator();
        a.on_step_enter("homepage");
        a.handle_signal(&DeckSignal::StepEnter(OVERVIEW_ID.to_string()), Some(OVERVIEW_ID), now);
        a.handle_signal(&DeckSignal::OverviewMarker(true), Some(OVERVIEW_ID), now);

        // Channel order 2: marker first, enter signal second.
        let mut b = coordinator();
        b.on_step_enter("homepage");
        b.handle_signal(&DeckSignal::OverviewMarker(true), Some(OVERVIEW_ID), now);
        b.handle_signal(&DeckSignal::StepEnter(OVERVIEW_ID.to_string()), Some(OVERVIEW_ID), now);

        assert!(a.is_overview_mode());
        assert!(b.is_overview_mode());
        for id in ["title", "homepage", "profile", "gallery", "termfolio"] {
            assert_eq!(a.visual(id), b.visual(id), "visual state differs for {id}");
        }
    }

    #[test]
    fn marker_clearing_rehighlights_the_engine_active_slide() {
        let mut c = coordinator();
        c.on_step_enter(OVERVIEW_ID);
        c.on_overview_marker(false, Some("gallery"));
        assert!(!c.is_overview_mode());
        assert_eq!(focal_slides(&c), vec!["gallery".to_string()]);
    }

    #[test]
    fn marker_handler_computes_rather_than_toggles() {
        let mut c = coordinator();
        c.on_overview_marker(true, None);
        c.on_overview_marker(true, None);
        assert!(c.is_overview_mode());
        c.on_overview_marker(false, Some("title"));
        c.on_overview_marker(false, Some("title"));
        assert!(!c.is_overview_mode());
    }

    #[test]
    fn initialize_respects_a_restored_overview_start() {
        use crate::deck;
        use crate::engine::SpatialEngine;

        let deck = deck::builtin();
        let mut engine = SpatialEngine::new(&deck, deck.step_ids().len() - 1);
        let mut c = coordinator();
        c.initialize(&mut engine, (1280, 720));
        assert!(c.is_overview_mode());
        for (_, v) in c.visuals() {
            assert_eq!(v.opacity, 1.0);
        }
    }

    #[test]
    fn canvas_floor_is_enforced() {
        use crate::deck;
        use crate::engine::SpatialEngine;

        let deck = deck::builtin();
        let mut engine = SpatialEngine::new(&deck, 0);
        let c = coordinator();
        c.push_canvas_size(&mut engine, 640, 480);
        assert_eq!(engine.canvas_size(), (1024, 768));
        c.push_canvas_size(&mut engine, 1920, 1080);
        assert_eq!(engine.canvas_size(), (1920, 1080));
    }
}
