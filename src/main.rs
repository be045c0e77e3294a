//! Sling Sweeper entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, HtmlCanvasElement, HtmlInputElement, MouseEvent, TouchEvent,
    };

    use glam::Vec2;
    use sling_sweeper::advice::{AdviceQuery, fetch_advice};
    use sling_sweeper::audio::{AudioManager, GameSound};
    use sling_sweeper::board::BoardLayout;
    use sling_sweeper::consts::*;
    use sling_sweeper::leaderboard::LocalStorageStore;
    use sling_sweeper::session::Session;
    use sling_sweeper::settings::Settings;
    use sling_sweeper::sim::{
        CellStatus, GameEvent, GamePhase, ParticleKind, Playfield, ShotKind, TickInput,
        flight_path,
    };

    /// Standard minesweeper number palette, index = neighbor count
    const NUMBER_COLORS: [&str; 9] = [
        "#000000", "#4a90d9", "#5aa02c", "#d94a4a", "#7a4ad9", "#a0522d", "#2ca0a0", "#333333",
        "#777777",
    ];

    /// Game instance holding all state
    struct Game {
        session: Session<LocalStorageStore>,
        settings: Settings,
        audio: AudioManager,
        layout: BoardLayout,
        view_w: f32,
        view_h: f32,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        /// Pouch currently held by mouse/touch
        dragging: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, view_w: f32, view_h: f32) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            let session = Session::new(seed, LocalStorageStore);
            let layout = BoardLayout::new(view_w, view_h, session.state.grid.size());
            Self {
                session,
                settings,
                audio,
                layout,
                view_w,
                view_h,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                dragging: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Rebuild the layout when the level (and grid size) changes
        fn ensure_layout(&mut self) {
            if self.layout.grid_size() != self.session.state.grid.size() {
                self.layout =
                    BoardLayout::new(self.view_w, self.view_h, self.session.state.grid.size());
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            // Settings knobs the simulation reads each tick
            self.session.state.aim_assist = self.settings.aim_assist;
            self.session.state.max_particles = self.settings.max_particles();

            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.ensure_layout();
                let input = self.input.clone();
                self.session.advance(&input, &self.layout, js_sys::Date::now());
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.release = None;
                self.input.toggle_flag_mode = false;
                self.input.start = false;
                self.input.advance = false;
                self.input.retry = false;
                self.input.pause = false;
                self.input.quit = false;
                self.input.submit_name = None;

                self.route_events();
            }
            self.ensure_layout();
        }

        /// Route drained events to audio and the advice fetch
        fn route_events(&mut self) {
            for event in self.session.state.take_events() {
                match event {
                    GameEvent::LevelStarted => {
                        let session = &self.session.state.session;
                        fetch_advice(
                            AdviceQuery {
                                level: session.level,
                                grid_size: session.grid_size,
                                mines_left: session.mines_left(),
                            },
                            "advice",
                        );
                    }
                    GameEvent::Launched(_) => self.audio.play(GameSound::Launch),
                    GameEvent::Landed => {}
                    GameEvent::Revealed { cells } => {
                        if cells > 3 {
                            self.audio.play(GameSound::CascadeReveal);
                        } else {
                            self.audio.play(GameSound::RevealPop);
                        }
                    }
                    GameEvent::Flagged { .. } => self.audio.play(GameSound::FlagPlant),
                    GameEvent::Exploded => self.audio.play(GameSound::Explosion),
                    GameEvent::LevelWon => self.audio.play(GameSound::Win),
                    GameEvent::LevelLost => self.audio.play(GameSound::Lose),
                    GameEvent::ScoreRecorded { rank } => {
                        log::info!("leaderboard rank {rank}");
                        self.audio.play(GameSound::HighScore);
                    }
                }
            }
        }

        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 {
                let elapsed = time - oldest;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        // === Rendering (Canvas 2D) ===

        fn render(&self, ctx: &CanvasRenderingContext2d) {
            ctx.save();

            // Background
            ctx.set_fill_style_str("#1b2430");
            ctx.fill_rect(0.0, 0.0, self.view_w as f64, self.view_h as f64);

            // Screen shake as a whole-scene offset
            let shake = self.session.state.screen_shake;
            if shake > 0.0 && self.settings.effective_screen_shake() {
                let t = self.session.state.time_ticks as f64;
                let dx = (t * 1.7).sin() * shake as f64 * 8.0;
                let dy = (t * 2.3).cos() * shake as f64 * 8.0;
                let _ = ctx.translate(dx, dy);
            }

            self.draw_grid(ctx);
            self.draw_slingshot(ctx);
            if let Some(aim) = &self.session.state.aim {
                self.draw_trajectory(ctx, aim.landing, aim.snapped_cell);
            }
            self.draw_projectile(ctx);
            self.draw_particles(ctx);

            ctx.restore();

            // Win flash on top, unaffected by shake
            let flash = self.session.state.win_flash;
            if flash > 0.0 {
                ctx.set_fill_style_str(&format!("rgba(255, 240, 180, {:.3})", flash * 0.35));
                ctx.fill_rect(0.0, 0.0, self.view_w as f64, self.view_h as f64);
            }
        }

        fn draw_grid(&self, ctx: &CanvasRenderingContext2d) {
            let state = &self.session.state;
            let size = state.grid.size();
            let cell = self.layout.cell_px() as f64;
            let show_mines = state.phase == GamePhase::Lost;

            ctx.set_font(&format!("{}px monospace", (cell * 0.55).round()));
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");

            for row in 0..size {
                for col in 0..size {
                    let corner = self.layout.cell_corner(row, col);
                    let (x, y) = (corner.x as f64, corner.y as f64);
                    let c = state.grid.cell(row, col);

                    let fill = match c.status {
                        CellStatus::Hidden => {
                            if (row + col) % 2 == 0 { "#3a4a5e" } else { "#344355" }
                        }
                        CellStatus::Flagged => "#3a4a5e",
                        CellStatus::Revealed => {
                            if (row + col) % 2 == 0 { "#c9c2ae" } else { "#bfb8a4" }
                        }
                        CellStatus::Exploded => "#b03030",
                    };
                    ctx.set_fill_style_str(fill);
                    ctx.fill_rect(x + 0.5, y + 0.5, cell - 1.0, cell - 1.0);

                    let center = self.layout.cell_center(row, col);
                    let (cx, cy) = (center.x as f64, center.y as f64);

                    match c.status {
                        CellStatus::Revealed if c.neighbor_mines > 0 => {
                            let n = c.neighbor_mines as usize;
                            ctx.set_fill_style_str(NUMBER_COLORS[n.min(8)]);
                            let _ = ctx.fill_text(&n.to_string(), cx, cy);
                        }
                        CellStatus::Flagged => {
                            ctx.set_fill_style_str("#e05050");
                            ctx.begin_path();
                            ctx.move_to(cx - cell * 0.1, cy - cell * 0.28);
                            ctx.line_to(cx + cell * 0.26, cy - cell * 0.12);
                            ctx.line_to(cx - cell * 0.1, cy + 0.04 * cell);
                            ctx.close_path();
                            ctx.fill();
                            ctx.set_stroke_style_str("#ddd");
                            ctx.begin_path();
                            ctx.move_to(cx - cell * 0.1, cy - cell * 0.28);
                            ctx.line_to(cx - cell * 0.1, cy + cell * 0.3);
                            ctx.stroke();
                        }
                        CellStatus::Exploded => {
                            ctx.set_fill_style_str("#200");
                            ctx.begin_path();
                            let _ = ctx.arc(cx, cy, cell * 0.28, 0.0, TAU);
                            ctx.fill();
                        }
                        _ => {}
                    }

                    // Post-loss mine reveal
                    if show_mines
                        && c.is_mine
                        && c.status != CellStatus::Exploded
                        && c.status != CellStatus::Flagged
                    {
                        ctx.set_fill_style_str("#111");
                        ctx.begin_path();
                        let _ = ctx.arc(cx, cy, cell * 0.22, 0.0, TAU);
                        ctx.fill();
                    }
                }
            }
        }

        fn draw_slingshot(&self, ctx: &CanvasRenderingContext2d) {
            let anchor = self.layout.anchor();
            let (ax, ay) = (anchor.x as f64, anchor.y as f64);

            // Pouch follows the drag (pull points from drag toward anchor)
            let pouch = match &self.session.state.aim {
                Some(aim) => anchor - aim.pull,
                None => anchor,
            };
            let (px, py) = (pouch.x as f64, pouch.y as f64);

            // Forks
            ctx.set_stroke_style_str("#8a6b4a");
            ctx.set_line_width(6.0);
            ctx.begin_path();
            ctx.move_to(ax - 28.0, ay + 30.0);
            ctx.line_to(ax - 22.0, ay);
            ctx.move_to(ax + 28.0, ay + 30.0);
            ctx.line_to(ax + 22.0, ay);
            ctx.stroke();

            // Band through the pouch
            ctx.set_stroke_style_str("#d9b38c");
            ctx.set_line_width(3.0);
            ctx.begin_path();
            ctx.move_to(ax - 22.0, ay);
            ctx.line_to(px, py);
            ctx.line_to(ax + 22.0, ay);
            ctx.stroke();

            // The stone waiting in the pouch
            if !self.session.state.shot.in_flight() {
                ctx.set_fill_style_str("#ccc");
                ctx.begin_path();
                let _ = ctx.arc(px, py, 7.0, 0.0, TAU);
                ctx.fill();
            }
        }

        fn draw_trajectory(
            &self,
            ctx: &CanvasRenderingContext2d,
            landing: Vec2,
            snapped: Option<(usize, usize)>,
        ) {
            let state = &self.session.state;
            let Some(aim) = &state.aim else { return };

            // Dotted arc, rendered at apparent height (y - z)
            ctx.set_fill_style_str("rgba(255, 255, 255, 0.55)");
            for sample in flight_path(self.layout.anchor(), &aim.launch).iter().step_by(4) {
                ctx.begin_path();
                let _ = ctx.arc(
                    sample.pos.x as f64,
                    (sample.pos.y - sample.z) as f64,
                    2.0,
                    0.0,
                    TAU,
                );
                ctx.fill();
            }

            // Landing marker; snapped target gets a cell outline
            ctx.set_stroke_style_str("#ffd24a");
            ctx.set_line_width(2.0);
            if let Some((row, col)) = snapped {
                let corner = self.layout.cell_corner(row, col);
                let cell = self.layout.cell_px() as f64;
                ctx.stroke_rect(corner.x as f64 + 1.0, corner.y as f64 + 1.0, cell - 2.0, cell - 2.0);
            } else {
                ctx.begin_path();
                let _ = ctx.arc(landing.x as f64, landing.y as f64, 6.0, 0.0, TAU);
                ctx.stroke();
            }
        }

        fn draw_projectile(&self, ctx: &CanvasRenderingContext2d) {
            let Some(shot) = self.session.state.shot.active() else {
                return;
            };

            // Ground shadow shrinks with altitude
            let shadow_r = (8.0 - shot.z as f64 * 0.02).max(3.0);
            ctx.set_fill_style_str("rgba(0, 0, 0, 0.3)");
            ctx.begin_path();
            let _ = ctx.arc(shot.pos.x as f64, shot.pos.y as f64, shadow_r, 0.0, TAU);
            ctx.fill();

            if self.settings.trails {
                for (i, point) in shot.trail.iter().enumerate() {
                    let alpha = 0.4 * (1.0 - i as f64 / shot.trail.len().max(1) as f64);
                    ctx.set_fill_style_str(&format!("rgba(220, 220, 220, {alpha:.3})"));
                    ctx.begin_path();
                    let _ = ctx.arc(
                        point.pos.x as f64,
                        (point.pos.y - point.z) as f64,
                        3.0,
                        0.0,
                        TAU,
                    );
                    ctx.fill();
                }
            }

            let color = match shot.kind {
                ShotKind::Probe => "#eee",
                ShotKind::Flag => "#e05050",
            };
            ctx.set_fill_style_str(color);
            ctx.begin_path();
            let _ = ctx.arc(
                shot.pos.x as f64,
                (shot.pos.y - shot.z) as f64,
                7.0,
                0.0,
                TAU,
            );
            ctx.fill();
        }

        fn draw_particles(&self, ctx: &CanvasRenderingContext2d) {
            for particle in &self.session.state.particles {
                let color = match particle.kind {
                    ParticleKind::Dust => "200, 190, 160",
                    ParticleKind::Debris => "230, 120, 60",
                    ParticleKind::Spark => "255, 240, 160",
                    ParticleKind::Confetti => "120, 220, 160",
                };
                ctx.set_fill_style_str(&format!("rgba({color}, {:.3})", particle.life));
                ctx.fill_rect(
                    (particle.pos.x - particle.size / 2.0) as f64,
                    (particle.pos.y - particle.size / 2.0) as f64,
                    particle.size as f64,
                    particle.size as f64,
                );
            }
        }

        // === DOM HUD ===

        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let state = &self.session.state;

            let set = |id: &str, text: &str| {
                if let Some(el) = document.get_element_by_id(id) {
                    if el.text_content().as_deref() != Some(text) {
                        el.set_text_content(Some(text));
                    }
                }
            };

            set("hud-level", &state.session.level.to_string());
            set("hud-mines", &state.session.mines_left().to_string());
            set("hud-probes", &state.session.total_probes.to_string());
            set("hud-flags", &state.session.flags_used.to_string());
            set(
                "hud-mode",
                if state.flag_mode { "FLAG" } else { "PROBE" },
            );
            if self.settings.show_fps {
                set("hud-fps", &self.fps.to_string());
            }

            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "overlay" } else { "overlay hidden" });
                }
            };

            show("menu-overlay", state.phase == GamePhase::Menu);
            show("pause-overlay", state.phase == GamePhase::Paused);
            show("won-overlay", state.phase == GamePhase::Won);
            show("lost-overlay", state.phase == GamePhase::Lost);
            show("record-overlay", state.phase == GamePhase::Recording);

            if state.phase == GamePhase::Menu {
                self.update_leaderboard_list(&document);
            }
        }

        fn update_leaderboard_list(&self, document: &web_sys::Document) {
            let Some(list) = document.get_element_by_id("leaderboard") else {
                return;
            };
            let mut html = String::new();
            for (i, entry) in self.session.leaderboard.entries.iter().enumerate() {
                html.push_str(&format!(
                    "<li>#{} {} - level {}, {} probes</li>",
                    i + 1,
                    entry.name,
                    entry.level,
                    entry.total_probes
                ));
            }
            if list.inner_html() != html {
                list.set_inner_html(&html);
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("failed to init logger");

        log::info!("Sling Sweeper starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Render in CSS pixels; scale the backing store for the DPR
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width() as f32;
        let client_h = canvas.client_height() as f32;
        canvas.set_width((client_w as f64 * dpr) as u32);
        canvas.set_height((client_h as f64 * dpr) as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");
        let _ = ctx.scale(dpr, dpr);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, client_w, client_h)));
        log::info!("game initialized with seed {seed}");

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game, ctx);

        log::info!("Sling Sweeper running!");
    }

    fn canvas_point(canvas: &HtmlCanvasElement, client_x: f32, client_y: f32) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        Vec2::new(client_x - rect.left() as f32, client_y - rect.top() as f32)
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse down - grab the pouch
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.dragging = true;
                let point =
                    canvas_point(&canvas_clone, event.client_x() as f32, event.client_y() as f32);
                g.input.drag = Some(point);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - track the drag
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.dragging {
                    let point = canvas_point(
                        &canvas_clone,
                        event.client_x() as f32,
                        event.client_y() as f32,
                    );
                    g.input.drag = Some(point);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up - release the shot
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.dragging {
                    g.dragging = false;
                    let point = canvas_point(
                        &canvas_clone,
                        event.client_x() as f32,
                        event.client_y() as f32,
                    );
                    g.input.release = Some(point);
                    g.input.drag = None;
                }
            });
            // On window, so a release outside the canvas still fires
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    g.audio.resume();
                    g.dragging = true;
                    let point = canvas_point(
                        &canvas_clone,
                        touch.client_x() as f32,
                        touch.client_y() as f32,
                    );
                    g.input.drag = Some(point);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    if g.dragging {
                        let point = canvas_point(
                            &canvas_clone,
                            touch.client_x() as f32,
                            touch.client_y() as f32,
                        );
                        g.input.drag = Some(point);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end - release at the last drag point
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if g.dragging {
                    g.dragging = false;
                    g.input.release = g.input.drag.take();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "f" | "F" => g.input.toggle_flag_mode = true,
                    "Escape" => g.input.pause = true,
                    "q" | "Q" => g.input.quit = true,
                    " " | "Enter" => match g.session.state.phase {
                        GamePhase::Menu => g.input.start = true,
                        GamePhase::Won => g.input.advance = true,
                        GamePhase::Lost => g.input.retry = true,
                        _ => {}
                    },
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        let intent = |id: &str, set: fn(&mut TickInput)| {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    let mut g = game.borrow_mut();
                    g.audio.resume();
                    set(&mut g.input);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        };

        intent("start-btn", |i| i.start = true);
        intent("resume-btn", |i| i.pause = true);
        intent("next-btn", |i| i.advance = true);
        intent("retry-btn", |i| i.retry = true);
        intent("quit-btn", |i| i.quit = true);
        intent("flag-btn", |i| i.toggle_flag_mode = true);

        // Name entry submits through the same intent channel
        if let Some(btn) = document.get_element_by_id("submit-score-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let document = web_sys::window().unwrap().document().unwrap();
                let name = document
                    .get_element_by_id("name-input")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| input.value())
                    .unwrap_or_default();
                game.borrow_mut().input.submit_name = Some(name);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.session.state.phase == GamePhase::Playing {
                        g.input.pause = true;
                        log::info!("auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur: pause and optionally mute
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.session.state.phase == GamePhase::Playing {
                    g.input.pause = true;
                }
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Focus regained: unmute
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(false);
                }
            });
            let window = web_sys::window().unwrap();
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, ctx: CanvasRenderingContext2d) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, ctx, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, ctx: CanvasRenderingContext2d, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.track_fps(time);
            g.render(&ctx);
            g.update_hud();
        }

        request_animation_frame(game, ctx);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Sling Sweeper (native) starting...");
    log::info!("native mode is headless - run with `trunk serve` for the web version");

    run_headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted run through one small level, exercising the full aim/launch/
/// resolve path without a browser.
#[cfg(not(target_arch = "wasm32"))]
fn run_headless_demo() {
    use glam::Vec2;
    use sling_sweeper::board::BoardLayout;
    use sling_sweeper::leaderboard::MemoryStore;
    use sling_sweeper::session::Session;
    use sling_sweeper::sim::{
        GamePhase, Grid, Playfield, TickInput, solve_pull_for_range,
    };

    let mut session = Session::new(0xC0FFEE, MemoryStore::default());
    let field = BoardLayout::new(600.0, 700.0, 5);
    let now = 0.0;

    session.advance(&TickInput { start: true, ..Default::default() }, &field, now);
    // Known layout so the script is deterministic
    session.state.grid = Grid::with_mines(5, &[(0, 0)]);
    session.state.session.has_first_probe = true;

    let drag_for_cell = |row: usize, col: usize| -> Vec2 {
        let anchor = field.anchor();
        let to_center = field.cell_center(row, col) - anchor;
        anchor - to_center.normalize() * solve_pull_for_range(to_center.length())
    };

    let idle = TickInput::default();
    let drag = drag_for_cell(4, 4);
    session.advance(&TickInput { drag: Some(drag), ..Default::default() }, &field, now);
    session.advance(&TickInput { release: Some(drag), ..Default::default() }, &field, now);

    let mut ticks = 0u32;
    while session.state.shot.in_flight() && ticks < 2000 {
        session.advance(&idle, &field, now);
        ticks += 1;
    }

    log::info!(
        "demo shot resolved after {ticks} ticks: phase={:?}, revealed={}, probes={}",
        session.state.phase,
        session.state.grid.revealed_count(),
        session.state.session.total_probes
    );
    assert_eq!(session.state.phase, GamePhase::Won, "single-mine board should clear");
    log::info!("headless demo complete");
}
