use eframe::egui;
use std::collections::HashMap;
use std::time::Instant;

use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::deck::{Deck, OVERVIEW_ID, TITLE_ID};
use crate::engine::{DeckCommand, DeckEngine, DeckSignal, SpatialEngine};
use crate::github::RepoInfo;
use crate::theme::Theme;
use crate::widgets::Broadcast;
use crate::widgets::cursor::CursorWidget;
use crate::widgets::minimap::{self, MiniMap};
use crate::widgets::progress;
use crate::widgets::toolbar::{Toolbar, ToolbarAction};

const PROGRESS_BAR_HEIGHT: f32 = 4.0;
const MINIMAP_WIDTH: f32 = 260.0;
const MINIMAP_ROW_HEIGHT: f32 = 42.0;
const TOOLBAR_BUTTON: f32 = 44.0;
const PERSPECTIVE: f32 = 1000.0;

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: String) -> Self {
        Self {
            message,
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let duration = 1.5;
        let fade_start = 1.0;
        if elapsed < fade_start {
            1.0
        } else if elapsed < duration {
            1.0 - (elapsed - fade_start) / (duration - fade_start)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= 1.5
    }
}

struct DeckApp {
    deck: Deck,
    /// The external engine handle. Absent means every command silently
    /// declines rather than failing.
    engine: Option<SpatialEngine>,
    coordinator: Coordinator,
    toolbar: Toolbar,
    minimap: MiniMap,
    cursor: CursorWidget,
    theme: Theme,
    config: Config,
    repo_info: HashMap<String, RepoInfo>,
    commands: Vec<DeckCommand>,
    broadcasts: Vec<Broadcast>,
    /// Per-slide displayed opacity, eased toward the coordinator's target.
    shown_opacity: HashMap<String, f32>,
    last_canvas: (u32, u32),
    /// Theme name the window chrome was last synced to.
    chrome_theme: String,
    last_frame: Instant,
    last_esc: Option<Instant>,
    toast: Option<Toast>,
    initialized: bool,
}

impl DeckApp {
    fn new(
        deck: Deck,
        engine: SpatialEngine,
        theme: Theme,
        config: Config,
        repo_info: HashMap<String, RepoInfo>,
    ) -> Self {
        let coordinator = Coordinator::new(engine.step_ids());
        let shown_opacity = deck
            .map
            .entries()
            .iter()
            .map(|e| (e.id.clone(), 1.0))
            .collect();
        let initial_active = engine
            .active_slide()
            .unwrap_or_else(|| TITLE_ID.to_string());
        Self {
            deck,
            engine: Some(engine),
            coordinator,
            toolbar: Toolbar::new(),
            minimap: MiniMap::new(&initial_active),
            cursor: CursorWidget::new(true),
            theme,
            config,
            repo_info,
            commands: Vec::new(),
            broadcasts: Vec::new(),
            shown_opacity,
            last_canvas: (0, 0),
            chrome_theme: String::new(),
            last_frame: Instant::now(),
            last_esc: None,
            toast: None,
            initialized: false,
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.toolbar.toggle_theme(&self.theme, &mut self.config);
        self.toast = Some(Toast::new(format!("Theme: {}", self.theme.name)));
    }

    /// Mirror the theme into whatever window chrome the platform exposes.
    /// Platforms without a tintable chrome simply ignore the hint.
    fn apply_chrome(&self, ctx: &egui::Context) {
        let mut visuals = if self.theme.name == "dark" {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        visuals.panel_fill = self.theme.chrome;
        visuals.window_fill = self.theme.chrome;
        ctx.set_visuals(visuals);
    }

    fn dispatch_commands(&mut self) {
        // The engine is the single shared external resource; the UI thread
        // serializes these applications.
        let Some(engine) = self.engine.as_mut() else {
            self.commands.clear();
            return;
        };
        for command in self.commands.drain(..) {
            engine.apply(&command);
        }
    }

    fn drain_signals(&mut self, now: Instant) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let signals = engine.poll();
        let engine_active = engine.active_slide();
        for signal in &signals {
            self.coordinator
                .handle_signal(signal, engine_active.as_deref(), now);
            if let DeckSignal::StepEnter(id) = signal {
                self.minimap.on_step_enter(id);
            }
        }
    }

    fn drain_broadcasts(&mut self, now: Instant) {
        for broadcast in self.broadcasts.drain(..) {
            self.toolbar.on_broadcast(broadcast);
            match broadcast {
                Broadcast::ToggleMiniMap => self.minimap.on_toggle(now),
            }
        }
    }

    fn apply_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::Command(cmd) => self.commands.push(cmd),
            ToolbarAction::Broadcast(b) => self.broadcasts.push(b),
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context, now: Instant) {
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let mut theme_toggle = false;

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }

            // Double-tap Esc to quit
            if i.key_pressed(egui::Key::Escape) {
                if let Some(last) = self.last_esc {
                    if last.elapsed().as_secs_f32() < 1.0 {
                        viewport_cmds.push(egui::ViewportCommand::Close);
                        return;
                    }
                }
                self.last_esc = Some(Instant::now());
                self.toast = Some(Toast::new("Press Esc again to exit".to_string()));
                return;
            }

            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
                return;
            }

            if i.key_pressed(egui::Key::D) {
                theme_toggle = true;
                return;
            }

            // Forward: Right, N, Space
            if i.key_pressed(egui::Key::ArrowRight)
                || i.key_pressed(egui::Key::N)
                || i.key_pressed(egui::Key::Space)
            {
                self.commands.push(DeckCommand::Next);
            }
            // Backward: Left, P
            if i.key_pressed(egui::Key::ArrowLeft) || i.key_pressed(egui::Key::P) {
                self.commands.push(DeckCommand::Prev);
            }
            // Overview: O
            if i.key_pressed(egui::Key::O) {
                self.commands
                    .push(DeckCommand::Goto(OVERVIEW_ID.to_string()));
            }
            // Mini-map: M
            if i.key_pressed(egui::Key::M) {
                self.broadcasts.push(Broadcast::ToggleMiniMap);
            }
            // Autoplay: A
            if i.key_pressed(egui::Key::A) {
                self.toolbar.toggle_autoplay(now);
            }
            if i.key_pressed(egui::Key::Home) {
                if let Some(first) = self.deck.map.get(0) {
                    self.commands.push(DeckCommand::Goto(first.id.clone()));
                }
            }
            if i.key_pressed(egui::Key::End) {
                if let Some(last) = self.deck.map.get(self.deck.map.len().saturating_sub(1)) {
                    self.commands.push(DeckCommand::Goto(last.id.clone()));
                }
            }
        });

        if theme_toggle {
            self.toggle_theme();
        }

        let closing = viewport_cmds
            .iter()
            .any(|c| matches!(c, egui::ViewportCommand::Close));
        if closing {
            // Unmount: cancel the periodic command stream and restore the
            // platform cursor before the window goes away.
            self.toolbar.stop_autoplay();
            self.cursor.teardown(ctx);
        }
        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }
    }

    /// Ease displayed opacities toward the coordinator's targets using each
    /// slide's fade constant.
    fn advance_opacity(&mut self, dt: f32) -> bool {
        let mut animating = false;
        for (id, visual) in self.coordinator.visuals() {
            let Some(shown) = self.shown_opacity.get_mut(id) else {
                continue;
            };
            let target = visual.opacity;
            let fade = visual.fade.as_secs_f32().max(0.01);
            let diff = target - *shown;
            if diff.abs() < 0.01 {
                *shown = target;
            } else {
                *shown += diff * (dt / fade).clamp(0.0, 1.0);
                animating = true;
            }
        }
        animating
    }

    /// Project a canvas placement through the camera onto the screen.
    fn project(
        &self,
        engine: &SpatialEngine,
        camera: crate::engine::spatial::CameraPose,
        id: &str,
        rect: egui::Rect,
    ) -> (egui::Rect, f32) {
        let placement = engine.placement_of(id).unwrap_or_default();
        let depth = placement.z - camera.z;
        let perspective = PERSPECTIVE / (PERSPECTIVE + depth.max(-PERSPECTIVE + 1.0));
        let view = perspective / camera.scale.max(0.01);

        let center = rect.center()
            + egui::vec2(placement.x - camera.x, placement.y - camera.y) * view;
        // Slides are laid out at canvas resolution (floored viewport size).
        let (cw, ch) = engine.canvas_size();
        let size = egui::vec2(cw as f32, ch as f32) * view * 0.82;
        (egui::Rect::from_center_size(center, size), view)
    }

    fn draw_slide(&self, ui: &egui::Ui, id: &str, rect: egui::Rect, opacity: f32, scale: f32) {
        if opacity < 0.01 {
            return;
        }
        let fg = Theme::with_opacity(self.theme.foreground, opacity);
        let heading = Theme::with_opacity(self.theme.heading_color, opacity);
        let accent = Theme::with_opacity(self.theme.accent, opacity);
        let panel = Theme::with_opacity(self.theme.panel_background, opacity * 0.92);

        ui.painter().rect_filled(rect, 10.0 * scale, panel);

        let visual = self.coordinator.visual(id);
        if visual.is_some_and(|v| v.transitioning) {
            // Cross-fade artifact for a genuinely leaving slide.
            ui.painter().rect_stroke(
                rect,
                10.0 * scale,
                egui::Stroke::new(2.0 * scale, Theme::with_opacity(self.theme.accent, 0.6)),
                egui::StrokeKind::Outside,
            );
        }

        let padding = 48.0 * scale;
        let content = rect.shrink(padding);

        if id == TITLE_ID {
            let galley = ui.painter().layout(
                "FolioDeck".to_string(),
                egui::FontId::proportional(self.theme.h1_size * scale),
                heading,
                content.width(),
            );
            let pos = egui::pos2(
                content.center().x - galley.rect.width() / 2.0,
                content.center().y - galley.rect.height(),
            );
            ui.painter().galley(pos, galley, heading);

            let sub = ui.painter().layout(
                "A portfolio in 3D space. Arrows to navigate, O for overview, M for the map."
                    .to_string(),
                egui::FontId::proportional(self.theme.body_size * scale),
                fg,
                content.width(),
            );
            let sub_pos = egui::pos2(
                content.center().x - sub.rect.width() / 2.0,
                content.center().y + 20.0 * scale,
            );
            ui.painter().galley(sub_pos, sub, fg);
            return;
        }

        let Some(project) = self.deck.project(id) else {
            return;
        };

        let title_galley = ui.painter().layout(
            project.title.clone(),
            egui::FontId::proportional(self.theme.h2_size * scale),
            heading,
            content.width(),
        );
        let mut y = content.top();
        ui.painter()
            .galley(egui::pos2(content.left(), y), title_galley.clone(), heading);
        y += title_galley.rect.height() + 24.0 * scale;

        let desc_galley = ui.painter().layout(
            project.description.clone(),
            egui::FontId::proportional(self.theme.body_size * scale),
            fg,
            content.width(),
        );
        ui.painter()
            .galley(egui::pos2(content.left(), y), desc_galley.clone(), fg);
        y += desc_galley.rect.height() + 20.0 * scale;

        if !project.tech.is_empty() {
            let tech = project.tech.join("  ·  ");
            let tech_galley = ui.painter().layout_no_wrap(
                tech,
                egui::FontId::monospace(self.theme.body_size * 0.7 * scale),
                accent,
            );
            ui.painter()
                .galley(egui::pos2(content.left(), y), tech_galley, accent);
            y += 34.0 * scale;
        }

        for link in &project.links {
            let mut line = format!("{}: {}", link.text, link.url);
            if let Some(repo) = link.github_repo.as_deref() {
                if let Some(info) = self.repo_info.get(repo) {
                    line = format!(
                        "{line}   ★ {}  ⑂ {}  ◌ {} open",
                        info.stars, info.forks, info.issues
                    );
                    if !info.language.is_empty() {
                        line = format!("{line}  [{}]", info.language);
                    }
                    if let Some(license) = info.license.as_deref() {
                        line = format!("{line}  {license}");
                    }
                }
            }
            let link_galley = ui.painter().layout_no_wrap(
                line,
                egui::FontId::proportional(self.theme.body_size * 0.65 * scale),
                fg,
            );
            ui.painter()
                .galley(egui::pos2(content.left(), y), link_galley, fg);
            y += 26.0 * scale;
        }
    }

    fn draw_progress_bar(&self, ui: &egui::Ui, rect: egui::Rect) {
        let active = self
            .coordinator
            .current_active_slide_id()
            .unwrap_or(TITLE_ID);
        let percentage = progress::compute_percentage(&self.deck.map, active);
        let bar = egui::Rect::from_min_size(
            rect.left_top(),
            egui::vec2(rect.width() * percentage / 100.0, PROGRESS_BAR_HEIGHT),
        );
        ui.painter().rect_filled(bar, 0.0, self.theme.accent);
    }

    fn draw_minimap(&mut self, ui: &mut egui::Ui, rect: egui::Rect, now: Instant) {
        if !self.minimap.is_visible() {
            return;
        }

        let panel_rect = egui::Rect::from_min_max(
            egui::pos2(rect.right() - MINIMAP_WIDTH - 16.0, rect.top() + 48.0),
            egui::pos2(rect.right() - 16.0, rect.bottom() - 120.0),
        );
        ui.painter().rect_filled(
            panel_rect,
            10.0,
            Theme::with_opacity(self.theme.panel_background, 0.95),
        );

        // Header: position within the curated list.
        let header = format!("Map  {}", self.minimap.header_progress(&self.deck.map));
        let header_galley = ui.painter().layout_no_wrap(
            header,
            egui::FontId::proportional(16.0),
            self.theme.heading_color,
        );
        ui.painter().galley(
            panel_rect.left_top() + egui::vec2(14.0, 12.0),
            header_galley,
            self.theme.heading_color,
        );

        let list_rect = egui::Rect::from_min_max(
            panel_rect.left_top() + egui::vec2(0.0, 44.0),
            panel_rect.right_bottom(),
        );
        let container_height = list_rect.height();

        // Deferred / on-change auto-scroll: only when the active row is not
        // already fully inside the window.
        if self.minimap.take_scroll_request(now) {
            if let Some(index) = self.deck.map.index_of(self.minimap.active_node_id()) {
                let element_top = index as f32 * MINIMAP_ROW_HEIGHT;
                if !minimap::row_is_fully_visible(
                    element_top,
                    MINIMAP_ROW_HEIGHT,
                    self.minimap.scroll_top(),
                    container_height,
                ) {
                    self.minimap.set_scroll_top(minimap::centered_scroll_target(
                        element_top,
                        MINIMAP_ROW_HEIGHT,
                        container_height,
                    ));
                }
            }
        }

        let scroll = self.minimap.scroll_top();
        let mut clicked: Option<String> = None;

        let list_ui = ui.new_child(
            egui::UiBuilder::new()
                .max_rect(list_rect)
                .id_salt("minimap_list"),
        );
        for (index, entry) in self.deck.map.entries().iter().enumerate() {
            let row_top = list_rect.top() + index as f32 * MINIMAP_ROW_HEIGHT - scroll;
            let row_rect = egui::Rect::from_min_size(
                egui::pos2(list_rect.left() + 8.0, row_top),
                egui::vec2(list_rect.width() - 16.0, MINIMAP_ROW_HEIGHT - 6.0),
            );
            if !row_rect.intersects(list_rect) {
                continue;
            }

            let is_active = entry.id == self.minimap.active_node_id();
            if is_active {
                list_ui.painter().rect_filled(
                    row_rect,
                    6.0,
                    Theme::with_opacity(self.theme.accent, 0.25),
                );
            }

            let label = format!("{}  {}", icon_glyph(&entry.icon_ref), entry.display_name);
            let color = if is_active {
                self.theme.heading_color
            } else {
                Theme::with_opacity(self.theme.foreground, 0.8)
            };
            let galley =
                list_ui
                    .painter()
                    .layout_no_wrap(label, egui::FontId::proportional(15.0), color);
            list_ui
                .painter()
                .galley(row_rect.left_top() + egui::vec2(10.0, 8.0), galley, color);

            let response = ui.interact(
                row_rect,
                egui::Id::new(("minimap_row", index)),
                egui::Sense::click(),
            );
            self.cursor.register_target(row_rect);
            if response.clicked() {
                clicked = Some(entry.id.clone());
            }
        }

        if let Some(target) = clicked {
            if let Some(engine) = self.engine.as_mut() {
                self.minimap.click(&self.deck.map, engine, &target, now);
            }
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui, rect: egui::Rect, now: Instant) {
        let buttons: [(&str, usize); 6] = [
            ("‹", 0),
            ("›", 1),
            (if self.toolbar.is_autoplay() { "⏸" } else { "▶" }, 2),
            ("▦", 3),
            ("🗺", 4),
            (if self.theme.name == "light" { "🌙" } else { "☀" }, 5),
        ];
        let total = buttons.len() as f32 * (TOOLBAR_BUTTON + 8.0) - 8.0;
        let origin = egui::pos2(
            rect.center().x - total / 2.0,
            rect.bottom() - TOOLBAR_BUTTON - 24.0,
        );

        let mut pressed: Option<usize> = None;
        for (glyph, slot) in buttons {
            let btn_rect = egui::Rect::from_min_size(
                egui::pos2(origin.x + slot as f32 * (TOOLBAR_BUTTON + 8.0), origin.y),
                egui::vec2(TOOLBAR_BUTTON, TOOLBAR_BUTTON),
            );
            let response = ui.interact(
                btn_rect,
                egui::Id::new(("toolbar_btn", slot)),
                egui::Sense::click(),
            );
            self.cursor.register_target(btn_rect);

            let fill = if response.hovered() {
                Theme::with_opacity(self.theme.accent, 0.25)
            } else {
                Theme::with_opacity(self.theme.panel_background, 0.9)
            };
            ui.painter().rect_filled(btn_rect, 8.0, fill);

            // Active-state indicators on the autoplay and mini-map buttons.
            let indicator = (slot == 2 && self.toolbar.is_autoplay())
                || (slot == 4 && self.toolbar.minimap_indicator());
            if indicator {
                ui.painter().circle_filled(
                    btn_rect.right_top() + egui::vec2(-6.0, 6.0),
                    3.0,
                    self.theme.accent,
                );
            }

            let galley = ui.painter().layout_no_wrap(
                glyph.to_string(),
                egui::FontId::proportional(20.0),
                self.theme.foreground,
            );
            let pos = btn_rect.center() - galley.rect.size() / 2.0;
            ui.painter().galley(pos, galley, self.theme.foreground);

            if response.clicked() {
                pressed = Some(slot);
            }
        }

        match pressed {
            Some(0) => {
                let a = self.toolbar.prev_action();
                self.apply_action(a);
            }
            Some(1) => {
                let a = self.toolbar.next_action();
                self.apply_action(a);
            }
            Some(2) => self.toolbar.toggle_autoplay(now),
            Some(3) => {
                let a = self.toolbar.overview_action();
                self.apply_action(a);
            }
            Some(4) => {
                let a = self.toolbar.minimap_action();
                self.apply_action(a);
            }
            Some(5) => self.toggle_theme(),
            _ => {}
        }
    }

    fn draw_cursor(&self, ui: &egui::Ui) {
        if !self.cursor.is_visible() {
            return;
        }
        let pos = self.cursor.pos();
        let color = self.theme.accent;

        ui.painter().circle_filled(pos, 3.0, color);

        if self.cursor.is_targeting() {
            if let Some(corners) = self.cursor.corner_offsets() {
                for offset in [
                    corners.top_left,
                    corners.top_right,
                    corners.bottom_right,
                    corners.bottom_left,
                ] {
                    let corner = egui::Rect::from_min_size(pos + offset, egui::vec2(12.0, 12.0));
                    ui.painter().rect_stroke(
                        corner,
                        0.0,
                        egui::Stroke::new(2.0, color),
                        egui::StrokeKind::Inside,
                    );
                }
            }
        } else if self.cursor.is_spinning() {
            // Free-roaming: ring around the center dot.
            ui.painter()
                .circle_stroke(pos, 10.0, egui::Stroke::new(1.5, color));
        }
    }

    fn draw_toast(&self, ui: &egui::Ui, rect: egui::Rect, ctx: &egui::Context) {
        if let Some(ref toast) = self.toast {
            let opacity = toast.opacity();
            if opacity > 0.0 {
                let toast_color = Theme::with_opacity(self.theme.foreground, opacity * 0.9);
                let toast_bg = Theme::with_opacity(self.theme.panel_background, opacity * 0.9);
                let galley = ui.painter().layout_no_wrap(
                    toast.message.clone(),
                    egui::FontId::proportional(18.0),
                    toast_color,
                );
                let padding = 14.0;
                let toast_rect = egui::Rect::from_min_size(
                    egui::pos2(
                        rect.center().x - galley.rect.width() / 2.0 - padding,
                        rect.bottom() - 110.0,
                    ),
                    galley.rect.size() + egui::vec2(padding * 2.0, padding * 2.0),
                );
                ui.painter().rect_filled(toast_rect, 8.0, toast_bg);
                ui.painter().galley(
                    toast_rect.min + egui::vec2(padding, padding),
                    galley,
                    toast_color,
                );
                ctx.request_repaint();
            }
        }
    }
}

fn icon_glyph(icon_ref: &str) -> &'static str {
    match icon_ref {
        "home" => "⌂",
        "globe" => "◉",
        "user" => "☻",
        "images" => "▣",
        "terminal" => ">_",
        _ => "•",
    }
}

impl eframe::App for DeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;

        let screen = ctx.screen_rect();
        let canvas = (screen.width() as u32, screen.height() as u32);

        if !self.initialized {
            self.initialized = true;
            if let Some(engine) = self.engine.as_mut() {
                engine.init();
                self.coordinator.initialize(engine, canvas);
            }
            self.last_canvas = canvas;
        } else if canvas != self.last_canvas {
            // Viewport resize: re-push floored dimensions.
            self.last_canvas = canvas;
            if let Some(engine) = self.engine.as_mut() {
                self.coordinator
                    .push_canvas_size(engine, canvas.0, canvas.1);
            }
        }

        // Re-sync the chrome whenever the theme changed (toolbar or D key).
        if self.chrome_theme != self.theme.name {
            self.apply_chrome(ctx);
            self.chrome_theme = self.theme.name.clone();
        }

        self.handle_keyboard(ctx, now);
        self.drain_broadcasts(now);

        // Autoplay advances via the coordinator's explicit active-slide query.
        let active = self
            .coordinator
            .current_active_slide_id()
            .map(str::to_string);
        if let Some(cmd) = self
            .toolbar
            .autoplay_tick(&self.deck.map, active.as_deref(), now)
        {
            self.commands.push(cmd);
        }

        self.dispatch_commands();
        self.drain_signals(now);

        self.coordinator.tick(now);
        if let Some(engine) = self.engine.as_mut() {
            self.minimap.tick(engine, now);
        }

        let animating = self.advance_opacity(dt);

        // Expire toast
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }

        let bg = self.theme.background;

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                ui.painter().rect_filled(rect, 0.0, bg);

                self.cursor.begin_frame();

                let camera_state = self.engine.as_mut().map(|e| (e.camera(now), e.is_moving()));
                if let Some((camera, moving)) = camera_state {
                    if let Some(engine) = self.engine.as_ref() {
                        for id in engine.step_ids() {
                            if id.as_str() == OVERVIEW_ID {
                                continue;
                            }
                            let (slide_rect, view) = self.project(engine, camera, id, rect);
                            if !slide_rect.intersects(rect) {
                                continue;
                            }
                            let opacity =
                                self.shown_opacity.get(id.as_str()).copied().unwrap_or(1.0);
                            self.draw_slide(ui, id, slide_rect, opacity, view.min(1.5));
                        }
                    }
                    if moving {
                        ctx.request_repaint();
                    }
                }

                self.draw_progress_bar(ui, rect);
                self.draw_minimap(ui, rect, now);
                self.draw_toolbar(ui, rect, now);
                self.draw_toast(ui, rect, ctx);

                let pointer = ctx.input(|i| i.pointer.hover_pos());
                self.cursor.update_pointer(pointer);
                self.cursor.apply_cursor(ctx);
                self.draw_cursor(ui);
            });

        if animating {
            ctx.request_repaint();
        }
        // Wake up for pending deadline timers rather than spinning.
        let mut deadlines: Vec<Instant> = Vec::new();
        deadlines.extend(self.coordinator.next_deadline());
        deadlines.extend(self.toolbar.next_deadline());
        deadlines.extend(self.minimap.next_deadline());
        if let Some(deadline) = deadlines.into_iter().min() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Resource-cleanup invariant: no periodic command stream may outlive
        // the widget.
        self.toolbar.stop_autoplay();
    }
}

pub fn run(
    deck: Deck,
    windowed: bool,
    start_slide: Option<usize>,
    start_overview: bool,
    offline: bool,
) -> anyhow::Result<()> {
    if deck.map.is_empty() {
        anyhow::bail!("Deck has no slides");
    }

    let config = Config::load_or_default();
    let theme = Theme::from_name(config.theme());

    // Start position: CLI flags override the configured start mode.
    let config_start = config
        .defaults
        .as_ref()
        .and_then(|d| d.start_mode.as_deref());
    let step_count = deck.step_ids().len();
    let overview_index = step_count - 1;

    let start_index = if start_overview {
        overview_index
    } else if let Some(s) = start_slide {
        s.saturating_sub(1).min(deck.map.len() - 1)
    } else {
        match config_start {
            Some("overview") => overview_index,
            Some("first") | None => 0,
            Some(n) => n
                .parse::<usize>()
                .map(|num| num.saturating_sub(1).min(deck.map.len() - 1))
                .unwrap_or(0),
        }
    };

    let repo_info = if offline {
        Default::default()
    } else {
        crate::github::fetch_all(&deck)
    };

    let engine = SpatialEngine::new(&deck, start_index);

    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("FolioDeck")
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title("FolioDeck")
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "FolioDeck",
        options,
        Box::new(move |_cc| Ok(Box::new(DeckApp::new(deck, engine, theme, config, repo_info)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
