pub mod cursor;
pub mod minimap;
pub mod progress;
pub mod toolbar;

/// A payload-less broadcast signal between widgets. Any number of widgets may
/// subscribe; delivery is single-threaded, no ordering guarantee beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Broadcast {
    /// Emitted by the toolbar, consumed by the mini-map (and mirrored by the
    /// toolbar's own visual indicator).
    ToggleMiniMap,
}
