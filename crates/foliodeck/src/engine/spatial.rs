use std::collections::VecDeque;
use std::time::Instant;

use tracing::debug;

use crate::deck::{Deck, OVERVIEW_ID, Placement};
use crate::engine::{DEFAULT_TRANSITION_MS, DeckEngine, DeckSignal};

/// Camera pose on the spatial canvas: the inverse of the active slide's
/// placement, interpolated during transitions.
#[derive(Debug, Clone, Copy)]
pub struct CameraPose {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub scale: f32,
}

impl CameraPose {
    fn for_placement(p: Placement) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
            scale: p.scale.unwrap_or(1.0),
        }
    }

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            z: a.z + (b.z - a.z) * t,
            scale: a.scale + (b.scale - a.scale) * t,
        }
    }
}

struct CameraMove {
    from: CameraPose,
    to: CameraPose,
    start: Instant,
    duration_ms: u64,
}

/// Headless spatial deck engine. Owns the step order (content slides plus the
/// overview sentinel), the transition-duration attribute, the canvas size
/// hints, and an in-order signal queue drained by the app each frame.
pub struct SpatialEngine {
    steps: Vec<String>,
    placements: Vec<Placement>,
    current: usize,
    overview: bool,
    transition_ms: u64,
    canvas: (u32, u32),
    signals: VecDeque<DeckSignal>,
    camera: CameraPose,
    camera_move: Option<CameraMove>,
    initialized: bool,
}

impl SpatialEngine {
    pub fn new(deck: &Deck, start: usize) -> Self {
        let steps = deck.step_ids();
        let placements: Vec<Placement> = steps.iter().map(|id| deck.placement(id)).collect();
        let current = start.min(steps.len().saturating_sub(1));
        let camera = CameraPose::for_placement(placements[current]);
        let overview = steps[current] == OVERVIEW_ID;
        Self {
            steps,
            placements,
            current,
            overview,
            transition_ms: DEFAULT_TRANSITION_MS,
            canvas: (0, 0),
            signals: VecDeque::new(),
            camera,
            camera_move: None,
            initialized: false,
        }
    }

    pub fn step_ids(&self) -> &[String] {
        &self.steps
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas
    }

    pub fn placement_of(&self, id: &str) -> Option<Placement> {
        self.steps
            .iter()
            .position(|s| s == id)
            .map(|i| self.placements[i])
    }

    /// Current camera pose, advancing any in-flight interpolation.
    pub fn camera(&mut self, now: Instant) -> CameraPose {
        if let Some(ref m) = self.camera_move {
            let elapsed = now.duration_since(m.start).as_millis() as f32;
            let t = (elapsed / m.duration_ms.max(1) as f32).clamp(0.0, 1.0);
            self.camera = CameraPose::lerp(m.from, m.to, ease_in_out(t));
            if t >= 1.0 {
                self.camera_move = None;
            }
        }
        self.camera
    }

    pub fn is_moving(&self) -> bool {
        self.camera_move.is_some()
    }

    fn transition_to(&mut self, target: usize) {
        if target == self.current {
            return;
        }
        let leaving = self.steps[self.current].clone();
        let entering = self.steps[target].clone();
        debug!(from = %leaving, to = %entering, "step transition");

        self.camera_move = Some(CameraMove {
            from: self.camera,
            to: CameraPose::for_placement(self.placements[target]),
            start: Instant::now(),
            duration_ms: self.transition_ms,
        });
        self.current = target;

        self.signals.push_back(DeckSignal::StepLeave(leaving));
        self.signals.push_back(DeckSignal::StepEnter(entering.clone()));

        // The root marker is a second, independent channel for the same fact.
        let on_overview = entering == OVERVIEW_ID;
        if on_overview != self.overview {
            self.overview = on_overview;
            self.signals.push_back(DeckSignal::OverviewMarker(on_overview));
        }
    }
}

impl DeckEngine for SpatialEngine {
    fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        let id = self.steps[self.current].clone();
        debug!(step = %id, "engine init");
        self.signals.push_back(DeckSignal::StepEnter(id));
    }

    fn next(&mut self) {
        let target = (self.current + 1) % self.steps.len();
        self.transition_to(target);
    }

    fn prev(&mut self) {
        let len = self.steps.len();
        let target = (self.current + len - 1) % len;
        self.transition_to(target);
    }

    fn goto(&mut self, id: &str) {
        if let Some(target) = self.steps.iter().position(|s| s == id) {
            self.transition_to(target);
        }
    }

    fn active_slide(&self) -> Option<String> {
        self.steps.get(self.current).cloned()
    }

    fn overview_marker(&self) -> bool {
        self.overview
    }

    fn transition_duration_ms(&self) -> u64 {
        self.transition_ms
    }

    fn set_transition_duration_ms(&mut self, ms: u64) {
        self.transition_ms = ms;
    }

    fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas = (width, height);
    }

    fn poll(&mut self) -> Vec<DeckSignal> {
        self.signals.drain(..).collect()
    }
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck;

    fn engine() -> SpatialEngine {
        SpatialEngine::new(&deck::builtin(), 0)
    }

    #[test]
    fn init_emits_enter_for_restored_slide_once() {
        let mut e = engine();
        e.init();
        e.init();
        assert_eq!(
            e.poll(),
            vec![DeckSignal::StepEnter("title".to_string())]
        );
    }

    #[test]
    fn transition_emits_leave_then_enter() {
        let mut e = engine();
        e.init();
        e.poll();
        e.next();
        assert_eq!(
            e.poll(),
            vec![
                DeckSignal::StepLeave("title".to_string()),
                DeckSignal::StepEnter("homepage".to_string()),
            ]
        );
    }

    #[test]
    fn entering_overview_also_flips_the_root_marker() {
        let mut e = engine();
        e.init();
        e.poll();
        e.goto(OVERVIEW_ID);
        let signals = e.poll();
        assert!(signals.contains(&DeckSignal::OverviewMarker(true)));
        assert!(e.overview_marker());

        e.goto("gallery");
        let signals = e.poll();
        assert!(signals.contains(&DeckSignal::OverviewMarker(false)));
        assert!(!e.overview_marker());
    }

    #[test]
    fn restored_overview_start_sets_the_marker() {
        let deck = deck::builtin();
        let e = SpatialEngine::new(&deck, deck.step_ids().len() - 1);
        assert_eq!(e.active_slide().as_deref(), Some(OVERVIEW_ID));
        assert!(e.overview_marker());
    }

    #[test]
    fn next_and_prev_wrap_over_the_step_list() {
        let mut e = engine();
        e.prev();
        assert_eq!(e.active_slide().as_deref(), Some(OVERVIEW_ID));
        e.next();
        assert_eq!(e.active_slide().as_deref(), Some("title"));
    }

    #[test]
    fn goto_unknown_id_is_a_no_op() {
        let mut e = engine();
        e.init();
        e.poll();
        e.goto("nope");
        assert!(e.poll().is_empty());
        assert_eq!(e.active_slide().as_deref(), Some("title"));
    }

    #[test]
    fn transition_duration_attribute_round_trips() {
        let mut e = engine();
        assert_eq!(e.transition_duration_ms(), DEFAULT_TRANSITION_MS);
        e.set_transition_duration_ms(1500);
        assert_eq!(e.transition_duration_ms(), 1500);
    }
}
