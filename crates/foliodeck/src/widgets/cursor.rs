use eframe::egui;

/// Side length of a reticle corner bracket.
const CORNER_SIZE: f32 = 12.0;

/// Bracket stroke width; brackets sit this far outside the target bounds.
const BORDER_WIDTH: f32 = 3.0;

/// Offsets of the four corner brackets relative to the pointer, given the
/// hovered target's bounding rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerOffsets {
    pub top_left: egui::Vec2,
    pub top_right: egui::Vec2,
    pub bottom_right: egui::Vec2,
    pub bottom_left: egui::Vec2,
}

/// Pointer-tracking reticle overlay. Decoupled from navigation state: it
/// only consumes pointer-level input and the target rects registered by
/// interactive elements each frame.
pub struct CursorWidget {
    pos: egui::Pos2,
    visible: bool,
    targets: Vec<egui::Rect>,
    active_target: Option<egui::Rect>,
    hide_default: bool,
}

impl CursorWidget {
    pub fn new(hide_default: bool) -> Self {
        Self {
            pos: egui::Pos2::ZERO,
            visible: false,
            targets: Vec::new(),
            active_target: None,
            hide_default,
        }
    }

    pub fn pos(&self) -> egui::Pos2 {
        self.pos
    }

    /// Invisible until the pointer first moves.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_targeting(&self) -> bool {
        self.active_target.is_some()
    }

    /// The center dot spins whenever no target is locked.
    pub fn is_spinning(&self) -> bool {
        self.active_target.is_none()
    }

    /// Forget last frame's target rects.
    pub fn begin_frame(&mut self) {
        self.targets.clear();
    }

    /// Interactive elements register their bounds every frame.
    pub fn register_target(&mut self, rect: egui::Rect) {
        self.targets.push(rect);
    }

    pub fn update_pointer(&mut self, pos: Option<egui::Pos2>) {
        if let Some(p) = pos {
            self.pos = p;
            self.visible = true;
        }
        self.active_target = self
            .targets
            .iter()
            .copied()
            .find(|rect| rect.contains(self.pos))
            .filter(|_| self.visible);
    }

    /// Bracket offsets for the locked target, or `None` when free-roaming.
    pub fn corner_offsets(&self) -> Option<CornerOffsets> {
        self.active_target
            .map(|bounds| corner_offsets(bounds, self.pos))
    }

    /// Suppress the platform cursor while the overlay is mounted.
    pub fn apply_cursor(&self, ctx: &egui::Context) {
        if self.hide_default && self.visible {
            ctx.set_cursor_icon(egui::CursorIcon::None);
        }
    }

    /// Restore the platform cursor on teardown.
    pub fn teardown(&mut self, ctx: &egui::Context) {
        if self.hide_default {
            ctx.set_cursor_icon(egui::CursorIcon::Default);
        }
        self.hide_default = false;
    }
}

fn corner_offsets(bounds: egui::Rect, pointer: egui::Pos2) -> CornerOffsets {
    CornerOffsets {
        top_left: egui::vec2(
            bounds.left() - pointer.x - BORDER_WIDTH,
            bounds.top() - pointer.y - BORDER_WIDTH,
        ),
        top_right: egui::vec2(
            bounds.right() - pointer.x + BORDER_WIDTH - CORNER_SIZE,
            bounds.top() - pointer.y - BORDER_WIDTH,
        ),
        bottom_right: egui::vec2(
            bounds.right() - pointer.x + BORDER_WIDTH - CORNER_SIZE,
            bounds.bottom() - pointer.y + BORDER_WIDTH - CORNER_SIZE,
        ),
        bottom_left: egui::vec2(
            bounds.left() - pointer.x - BORDER_WIDTH,
            bounds.bottom() - pointer.y + BORDER_WIDTH - CORNER_SIZE,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invisible_until_the_pointer_moves() {
        let mut c = CursorWidget::new(true);
        assert!(!c.is_visible());
        c.update_pointer(None);
        assert!(!c.is_visible());
        c.update_pointer(Some(egui::pos2(10.0, 10.0)));
        assert!(c.is_visible());
    }

    #[test]
    fn locks_onto_a_registered_target_under_the_pointer() {
        let mut c = CursorWidget::new(true);
        c.begin_frame();
        c.register_target(egui::Rect::from_min_max(
            egui::pos2(100.0, 100.0),
            egui::pos2(200.0, 150.0),
        ));
        c.update_pointer(Some(egui::pos2(150.0, 120.0)));
        assert!(c.is_targeting());
        assert!(!c.is_spinning());

        c.update_pointer(Some(egui::pos2(50.0, 50.0)));
        assert!(!c.is_targeting());
        assert!(c.is_spinning());
    }

    #[test]
    fn begin_frame_forgets_stale_targets() {
        let mut c = CursorWidget::new(true);
        c.register_target(egui::Rect::from_min_max(
            egui::pos2(0.0, 0.0),
            egui::pos2(10.0, 10.0),
        ));
        c.update_pointer(Some(egui::pos2(5.0, 5.0)));
        assert!(c.is_targeting());
        c.begin_frame();
        c.update_pointer(Some(egui::pos2(5.0, 5.0)));
        assert!(!c.is_targeting());
    }

    #[test]
    fn bracket_offsets_surround_the_target_bounds() {
        let bounds = egui::Rect::from_min_max(egui::pos2(100.0, 100.0), egui::pos2(200.0, 150.0));
        let pointer = egui::pos2(150.0, 125.0);
        let o = corner_offsets(bounds, pointer);

        assert_eq!(o.top_left, egui::vec2(-53.0, -28.0));
        assert_eq!(o.top_right, egui::vec2(50.0 + 3.0 - 12.0, -28.0));
        assert_eq!(o.bottom_right, egui::vec2(41.0, 25.0 + 3.0 - 12.0));
        assert_eq!(o.bottom_left, egui::vec2(-53.0, 16.0));
    }
}
