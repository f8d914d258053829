//! Ring Sort entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, PointerEvent};

    use ring_sort::camera::ndc_to_screen;
    use ring_sort::consts::*;
    use ring_sort::presenter::{Presenter, Snapshot, report};
    use ring_sort::sim::{GameEvent, GameState, TickInput, tick};
    use ring_sort::{Camera, Settings};

    const BACKGROUND: &str = "#202020";

    /// Draws snapshots onto a 2D canvas and drives the DOM prompt button
    struct CanvasPresenter {
        ctx: CanvasRenderingContext2d,
        document: Document,
        camera: Camera,
        width: f32,
        height: f32,
    }

    impl CanvasPresenter {
        fn resize(&mut self, width: f32, height: f32) {
            self.width = width;
            self.height = height;
            self.camera.set_aspect(width, height);
        }

        fn set_prompt_visible(&self, visible: bool) {
            if let Some(btn) = self.document.get_element_by_id("playNowBtn") {
                let display = if visible { "display: block" } else { "display: none" };
                let _ = btn.set_attribute("style", display);
            }
        }

        fn draw_hexagon(&self, cx: f64, cy: f64, radius: f64, fill: &str, outline: bool) {
            self.ctx.begin_path();
            for i in 0..6 {
                let a = std::f64::consts::FRAC_PI_3 * i as f64;
                let (x, y) = (cx + radius * a.cos(), cy + radius * a.sin());
                if i == 0 {
                    self.ctx.move_to(x, y);
                } else {
                    self.ctx.line_to(x, y);
                }
            }
            self.ctx.close_path();
            self.ctx.set_fill_style_str(fill);
            self.ctx.fill();
            if outline {
                self.ctx.set_stroke_style_str("#ffffff");
                self.ctx.set_line_width(2.0);
                self.ctx.stroke();
            }
        }
    }

    /// Darken blocks turned away from the camera
    fn shade(rgb: u32, yaw: f32) -> String {
        let k = 0.55 + 0.45 * yaw.cos().max(0.0);
        let channel = |shift: u32| ((((rgb >> shift) & 0xff) as f32) * k) as u32;
        format!("#{:02x}{:02x}{:02x}", channel(16), channel(8), channel(0))
    }

    impl Presenter for CanvasPresenter {
        fn present(&mut self, snapshot: &Snapshot) {
            let (w, h) = (self.width, self.height);
            self.ctx.set_fill_style_str(BACKGROUND);
            self.ctx.fill_rect(0.0, 0.0, w as f64, h as f64);

            let focal = h / (2.0 * (self.camera.fov_y / 2.0).tan());

            // Painter's order: farthest first
            let mut visible: Vec<_> = snapshot
                .blocks
                .iter()
                .filter_map(|b| {
                    let world = glam::Vec3::from_array(b.position);
                    let ndc = self.camera.project(world)?;
                    let distance = (world - self.camera.position).length();
                    Some((b, ndc, distance))
                })
                .collect();
            visible.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

            for (block, ndc, distance) in visible {
                let px = ndc_to_screen(ndc.truncate(), w, h);
                let radius = BLOCK_RADIUS * focal / distance.max(1.0);
                self.draw_hexagon(
                    px.x as f64,
                    px.y as f64,
                    radius as f64,
                    &shade(block.rgb, block.yaw),
                    snapshot.dragging == Some(block.id),
                );
            }

            self.ctx.set_fill_style_str("white");
            self.ctx.set_font("bold 32px Arial");
            let _ = self.ctx.fill_text(&format!("Score: {}", snapshot.score), 10.0, 40.0);
        }

        fn handle_event(&mut self, event: &GameEvent) {
            match event {
                GameEvent::PromptShown => self.set_prompt_visible(true),
                GameEvent::GameReset => self.set_prompt_visible(false),
                GameEvent::ColumnMatched { column, .. } => {
                    log::info!("Column {} cleared", column)
                }
                _ => {}
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        presenter: CanvasPresenter,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        pointer_held: bool,
    }

    impl Game {
        fn camera(&self) -> &Camera {
            &self.presenter.camera
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.clear();
            }
        }

        fn render(&mut self) {
            report(&mut self.state, &mut self.presenter);
        }
    }

    fn load_settings() -> Settings {
        let query = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        match Settings::from_query(&query) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring page settings: {}", e);
                Settings::default()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Ring Sort starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let width = canvas.client_width() as f32;
        let height = canvas.client_height() as f32;
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let settings = load_settings();
        let seed = settings.seed.unwrap_or(js_sys::Date::now() as u64);
        let config = settings.grid_config().unwrap_or_default();

        let presenter = CanvasPresenter {
            ctx,
            document: document.clone(),
            camera: Camera::new(width / height.max(1.0)),
            width,
            height,
        };
        presenter.set_prompt_visible(false);

        let game = Rc::new(RefCell::new(Game {
            state: GameState::new(config, seed),
            presenter,
            accumulator: 0.0,
            last_time: 0.0,
            input: TickInput::default(),
            pointer_held: false,
        }));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&window, &canvas, game.clone());
        setup_resize_handler(&window, &canvas, game.clone());
        setup_prompt_button(&document, game.clone());

        request_animation_frame(game);

        log::info!("Ring Sort running!");
    }

    /// Pointer position relative to the canvas, as a world ray
    fn pointer_ray(canvas: &HtmlCanvasElement, game: &Game, event: &PointerEvent) -> ring_sort::Ray {
        let rect = canvas.get_bounding_client_rect();
        let x = event.client_x() as f32 - rect.left() as f32;
        let y = event.client_y() as f32 - rect.top() as f32;
        game.camera()
            .ray_from_screen(x, y, rect.width() as f32, rect.height() as f32)
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) {
        // Pointer down - pick a block
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                let ray = pointer_ray(&canvas_clone, &g, &event);
                g.input.pointer_down = Some(ray);
                g.input.pointer_move = None;
                g.pointer_held = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer move - drag the held row
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                if !g.pointer_held {
                    return;
                }
                let ray = pointer_ray(&canvas_clone, &g, &event);
                g.input.pointer_move = Some(ray);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer up - release and resolve columns, even when released off the canvas
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                let mut g = game.borrow_mut();
                g.input.pointer_up = true;
                g.pointer_held = false;
            });
            let _ = window
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) {
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let width = canvas.client_width() as f32;
            let height = canvas.client_height() as f32;
            if width <= 0.0 || height <= 0.0 {
                return;
            }
            canvas.set_width(width as u32);
            canvas.set_height(height as u32);
            game.borrow_mut().presenter.resize(width, height);
            log::debug!("Resized to {}x{}", width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_prompt_button(document: &Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("playNowBtn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().input.reset = true;
                log::info!("Reset requested");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("No #playNowBtn element; reset button disabled");
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ring Sort (native) starting...");
    log::info!("Native mode runs a headless auto-play - run with `trunk serve` for the web version");

    let query = std::env::args().nth(1).unwrap_or_default();
    let settings = match ring_sort::Settings::from_query(&query) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("invalid settings: {e}");
            std::process::exit(2);
        }
    };

    match settings.grid_config() {
        Ok(config) => autoplay::run(config, settings.seed.unwrap_or(42)),
        Err(e) => {
            eprintln!("invalid settings: {e}");
            std::process::exit(2);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: rotates rows toward the bottom row's colors through the
/// same pointer path a player uses.
#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use glam::Vec3;
    use ring_sort::consts::*;
    use ring_sort::presenter::{LogPresenter, report};
    use ring_sort::sim::{Block, GameState, TickInput, tick};
    use ring_sort::{Camera, GridConfig, cylinder_to_cartesian, shortest_angle_delta};

    const MOVES: usize = 40;

    /// Rotation (in slots) that lines the row up best with row 0
    fn best_rotation(state: &GameState, row: usize) -> usize {
        let cols = state.config.cols;
        let mut base = vec![None; cols];
        for b in state.blocks.iter().filter(|b| b.row == 0) {
            base[b.col] = Some(b.color);
        }
        (0..cols)
            .max_by_key(|&k| {
                let agree = state
                    .blocks
                    .iter()
                    .filter(|b| b.row == row && base[(b.col + k) % cols] == Some(b.color))
                    .count();
                // Prefer the smallest rotation among equals
                (agree, std::cmp::Reverse(k))
            })
            .unwrap_or(0)
    }

    /// Block of the row facing the camera
    fn front_block(state: &GameState, row: usize) -> Option<Block> {
        state
            .row_blocks(row)
            .into_iter()
            .min_by(|a, b| {
                let da = shortest_angle_delta(a.current_angle, 0.0).abs();
                let db = shortest_angle_delta(b.current_angle, 0.0).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .cloned()
    }

    pub fn run(config: GridConfig, seed: u64) {
        let mut state = GameState::new(config, seed);
        let camera = Camera::new(16.0 / 9.0);
        let mut presenter = LogPresenter::default();
        report(&mut state, &mut presenter);

        if state.config.rows < 2 {
            log::warn!("Nothing to sort with a single row");
            return;
        }

        for n in 0..MOVES {
            // Let refills land and blocks settle before planning
            for _ in 0..REFILL_DELAY_TICKS * 2 {
                tick(&mut state, &TickInput::default());
            }

            let row = 1 + n % (state.config.rows - 1);
            let k = best_rotation(&state, row);
            let Some(block) = front_block(&state, row) else {
                continue;
            };

            // Press on the block as seen from the camera
            let center = block.world_position(&state.config);
            let Some(ndc) = camera.project(center) else {
                continue;
            };
            tick(
                &mut state,
                &TickInput {
                    pointer_down: Some(camera.ray_from_ndc(ndc.truncate())),
                    ..Default::default()
                },
            );
            let Some(drag) = state.drag.clone() else {
                log::debug!("Missed block {}, skipping", block.id);
                continue;
            };

            // Carry the grab point around to the target slot, then release
            let angle = (block.col + k) as f32 * state.config.step();
            let offset = Vec3::new(drag.grab_offset.x, 0.0, drag.grab_offset.z);
            let target = cylinder_to_cartesian(state.config.radius, angle, center.y) + offset;
            let move_ray = camera
                .project(target)
                .map(|ndc| camera.ray_from_ndc(ndc.truncate()));
            tick(
                &mut state,
                &TickInput {
                    pointer_move: move_ray,
                    pointer_up: true,
                    ..Default::default()
                },
            );
            report(&mut state, &mut presenter);
        }

        for _ in 0..REFILL_DELAY_TICKS * 2 {
            tick(&mut state, &TickInput::default());
        }
        report(&mut state, &mut presenter);

        log::info!(
            "Auto-play finished: {} columns cleared, score {}",
            state.matches,
            state.score
        );
        println!("score {} after {} ticks", state.score, state.time_ticks);
    }
}
