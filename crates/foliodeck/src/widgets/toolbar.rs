use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::Config;
use crate::deck::{NavigationMap, OVERVIEW_ID};
use crate::engine::DeckCommand;
use crate::theme::Theme;
use crate::widgets::Broadcast;

/// Period between autoplay advances.
const AUTOPLAY_INTERVAL: Duration = Duration::from_millis(3000);

/// Autoplay timer. `Running` holds the single pending deadline; the type
/// makes a duplicate timer unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Autoplay {
    Idle,
    Running { next_tick: Instant },
}

/// An action produced by a toolbar button press, applied by the app on the
/// same frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarAction {
    Command(DeckCommand),
    Broadcast(Broadcast),
}

/// Toolbar state: the autoplay state machine, the mini-map indicator mirror,
/// and the theme toggle.
pub struct Toolbar {
    autoplay: Autoplay,
    minimap_indicator: bool,
}

impl Toolbar {
    pub fn new() -> Self {
        Self {
            autoplay: Autoplay::Idle,
            minimap_indicator: false,
        }
    }

    pub fn is_autoplay(&self) -> bool {
        matches!(self.autoplay, Autoplay::Running { .. })
    }

    pub fn minimap_indicator(&self) -> bool {
        self.minimap_indicator
    }

    pub fn prev_action(&self) -> ToolbarAction {
        ToolbarAction::Command(DeckCommand::Prev)
    }

    pub fn next_action(&self) -> ToolbarAction {
        ToolbarAction::Command(DeckCommand::Next)
    }

    pub fn overview_action(&self) -> ToolbarAction {
        ToolbarAction::Command(DeckCommand::Goto(OVERVIEW_ID.to_string()))
    }

    /// The mini-map button broadcasts; the toolbar does not own the map's
    /// visibility, it mirrors it when the broadcast comes back around.
    pub fn minimap_action(&self) -> ToolbarAction {
        ToolbarAction::Broadcast(Broadcast::ToggleMiniMap)
    }

    pub fn on_broadcast(&mut self, broadcast: Broadcast) {
        match broadcast {
            Broadcast::ToggleMiniMap => self.minimap_indicator = !self.minimap_indicator,
        }
    }

    /// Idle -> Running starts the periodic timer (replacing any stray
    /// deadline); Running -> Idle cancels it.
    pub fn toggle_autoplay(&mut self, now: Instant) {
        self.autoplay = match self.autoplay {
            Autoplay::Idle => {
                debug!("autoplay enabled");
                Autoplay::Running {
                    next_tick: now + AUTOPLAY_INTERVAL,
                }
            }
            Autoplay::Running { .. } => {
                debug!("autoplay disabled");
                Autoplay::Idle
            }
        };
    }

    /// Cancel the timer unconditionally. Called on teardown so no command
    /// stream outlives the widget.
    pub fn stop_autoplay(&mut self) {
        self.autoplay = Autoplay::Idle;
    }

    /// Advance one curated position when the autoplay deadline passes.
    /// `active` is the coordinator's explicit active-slide query; an unknown
    /// or absent id falls back to position 0.
    pub fn autoplay_tick(
        &mut self,
        map: &NavigationMap,
        active: Option<&str>,
        now: Instant,
    ) -> Option<DeckCommand> {
        let Autoplay::Running { next_tick } = self.autoplay else {
            return None;
        };
        if now < next_tick || map.is_empty() {
            return None;
        }
        self.autoplay = Autoplay::Running {
            next_tick: now + AUTOPLAY_INTERVAL,
        };
        let next = map.next_id(active.unwrap_or_default())?;
        Some(DeckCommand::Goto(next.to_string()))
    }

    /// Earliest pending autoplay deadline, for frame scheduling.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.autoplay {
            Autoplay::Running { next_tick } => Some(next_tick),
            Autoplay::Idle => None,
        }
    }

    /// Flip the theme, persist it, and hand the new palette back for the app
    /// to apply (presentation attribute plus window chrome).
    pub fn toggle_theme(&self, current: &Theme, config: &mut Config) -> Theme {
        let next = current.toggled();
        config.set_theme(&next.name);
        if let Err(e) = config.save() {
            debug!("failed to persist theme: {e}");
        }
        next
    }
}

impl Default for Toolbar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck;

    fn fixtures() -> (Toolbar, deck::Deck, Instant) {
        (Toolbar::new(), deck::builtin(), Instant::now())
    }

    #[test]
    fn enabling_starts_exactly_one_timer() {
        let (mut tb, deck, t0) = fixtures();
        tb.toggle_autoplay(t0);
        assert!(tb.is_autoplay());

        // No advance before the interval elapses.
        assert_eq!(
            tb.autoplay_tick(&deck.map, Some("title"), t0 + Duration::from_millis(2999)),
            None
        );
        let cmd = tb.autoplay_tick(&deck.map, Some("title"), t0 + Duration::from_millis(3000));
        assert_eq!(cmd, Some(DeckCommand::Goto("homepage".to_string())));
    }

    #[test]
    fn reenabling_while_running_still_yields_one_tick_per_interval() {
        let (mut tb, deck, t0) = fixtures();
        tb.toggle_autoplay(t0);
        tb.toggle_autoplay(t0 + Duration::from_millis(100)); // disable
        tb.toggle_autoplay(t0 + Duration::from_millis(200)); // enable again
        assert!(tb.is_autoplay());

        let t = t0 + Duration::from_millis(3200);
        assert!(tb.autoplay_tick(&deck.map, Some("title"), t).is_some());
        // Same instant again: the single deadline already advanced.
        assert!(tb.autoplay_tick(&deck.map, Some("title"), t).is_none());
    }

    #[test]
    fn disabling_stops_the_command_stream() {
        let (mut tb, deck, t0) = fixtures();
        tb.toggle_autoplay(t0);
        tb.toggle_autoplay(t0 + Duration::from_millis(10));
        assert!(!tb.is_autoplay());
        assert_eq!(
            tb.autoplay_tick(&deck.map, Some("title"), t0 + Duration::from_secs(60)),
            None
        );
    }

    #[test]
    fn teardown_cancels_unconditionally() {
        let (mut tb, deck, t0) = fixtures();
        tb.toggle_autoplay(t0);
        tb.stop_autoplay();
        tb.stop_autoplay();
        assert_eq!(
            tb.autoplay_tick(&deck.map, Some("title"), t0 + Duration::from_secs(10)),
            None
        );
    }

    #[test]
    fn autoplay_wraps_past_the_last_entry() {
        let (mut tb, deck, t0) = fixtures();
        tb.toggle_autoplay(t0);
        let cmd = tb.autoplay_tick(&deck.map, Some("termfolio"), t0 + AUTOPLAY_INTERVAL);
        assert_eq!(cmd, Some(DeckCommand::Goto("title".to_string())));
    }

    #[test]
    fn unknown_active_id_falls_back_to_the_first_position() {
        let (mut tb, deck, t0) = fixtures();
        tb.toggle_autoplay(t0);
        let cmd = tb.autoplay_tick(&deck.map, Some(deck::OVERVIEW_ID), t0 + AUTOPLAY_INTERVAL);
        assert_eq!(cmd, Some(DeckCommand::Goto("homepage".to_string())));
    }

    #[test]
    fn minimap_indicator_mirrors_the_broadcast() {
        let (mut tb, _deck, _t0) = fixtures();
        assert!(!tb.minimap_indicator());
        tb.on_broadcast(Broadcast::ToggleMiniMap);
        assert!(tb.minimap_indicator());
        tb.on_broadcast(Broadcast::ToggleMiniMap);
        assert!(!tb.minimap_indicator());
    }
}
