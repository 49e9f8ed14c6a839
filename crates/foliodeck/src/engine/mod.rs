pub mod spatial;

pub use spatial::SpatialEngine;

/// Default transition-duration attribute, in milliseconds.
pub const DEFAULT_TRANSITION_MS: u64 = 1000;

/// Canvas floor enforced before any dimension write.
pub const MIN_CANVAS_WIDTH: u32 = 1024;
pub const MIN_CANVAS_HEIGHT: u32 = 768;

/// A signal emitted by the deck engine. For a transition A -> B the engine
/// emits `StepLeave(A)` then `StepEnter(B)`, but consumers must not rely on
/// more than "both eventually fire". `OverviewMarker` is an independent
/// channel reporting the overview fact out-of-band from the enter/leave pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckSignal {
    StepEnter(String),
    StepLeave(String),
    OverviewMarker(bool),
}

/// A navigation command issued by a widget. Commands are queued and applied
/// on the single UI thread, which serializes access to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckCommand {
    Next,
    Prev,
    Goto(String),
}

/// The deck engine's command-and-observation surface. The concrete engine is
/// injected so tests can substitute a fake.
pub trait DeckEngine {
    /// Idempotent setup. Emits the initial `StepEnter` for the restored
    /// active slide.
    fn init(&mut self);

    fn next(&mut self);
    fn prev(&mut self);

    /// Jump directly to the slide with the given id. Unknown ids are a no-op.
    fn goto(&mut self, id: &str);

    /// Id of the slide the engine currently considers active.
    fn active_slide(&self) -> Option<String>;

    /// The engine root's mutable overview classification marker.
    fn overview_marker(&self) -> bool;

    fn transition_duration_ms(&self) -> u64;
    fn set_transition_duration_ms(&mut self, ms: u64);

    /// Width/height hints. Callers floor the values before writing.
    fn set_canvas_size(&mut self, width: u32, height: u32);

    /// Drain pending signals in delivery order.
    fn poll(&mut self) -> Vec<DeckSignal>;

    fn apply(&mut self, command: &DeckCommand) {
        match command {
            DeckCommand::Next => self.next(),
            DeckCommand::Prev => self.prev(),
            DeckCommand::Goto(id) => self.goto(id),
        }
    }
}
