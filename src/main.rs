//! GUST: a tiny ninja platformer
//!
//! Run, jump, wall-slide and dash through small tile levels at a fixed
//! 320x240 resolution, scaled up to whatever window the player has. The
//! simulation runs at 60 ticks per second regardless of display refresh.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod asset;
mod game;
mod input;
mod world;

use macroquad::prelude::*;
use macroquad::rand::gen_range;

use asset::AssetLibrary;
use game::{Game, TICK_DT, VIEW_HEIGHT, VIEW_WIDTH};
use input::InputState;
use world::Level;

/// Level file loaded at startup.
const LEVEL_PATH: &str = "assets/maps/0.ron";

/// Cap on the frame time fed to the tick accumulator, so a long stall (window
/// drag, breakpoint) does not trigger a catch-up burst of hundreds of ticks.
const MAX_FRAME_TIME: f32 = 0.25;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("GUST v{}", VERSION),
        window_width: 640,
        window_height: 480,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    macroquad::rand::srand(macroquad::miniquad::date::now() as u64);

    let assets = AssetLibrary::load().await;

    let level = match load_string(LEVEL_PATH).await {
        Ok(text) => match Level::from_ron(&text) {
            Ok(level) => level,
            Err(err) => {
                eprintln!("Bad level file {}: {}", LEVEL_PATH, err);
                println!("Using built-in level");
                Level::fallback()
            }
        },
        Err(err) => {
            eprintln!("Failed to read {}: {}", LEVEL_PATH, err);
            println!("Using built-in level");
            Level::fallback()
        }
    };

    let mut game = Game::new(
        assets.animations().clone(),
        level,
        assets.image_count("clouds"),
    );
    let input = InputState::new();

    // The game draws into a fixed-size render target that gets scaled to the
    // window at the end of the frame.
    let target = render_target(VIEW_WIDTH as u32, VIEW_HEIGHT as u32);
    target.texture.set_filter(FilterMode::Nearest);
    let mut camera =
        Camera2D::from_display_rect(Rect::new(0.0, 0.0, VIEW_WIDTH, VIEW_HEIGHT));
    camera.render_target = Some(target.clone());

    let mut accumulator = 0.0f32;

    loop {
        if input.quit_requested() {
            break;
        }

        accumulator += get_frame_time().min(MAX_FRAME_TIME);
        let mut tick_input = input.snapshot();
        while accumulator >= TICK_DT {
            accumulator -= TICK_DT;
            game.update(tick_input);
            // Edge actions fire once even when several ticks run this frame.
            tick_input = tick_input.without_edges();
        }

        set_camera(&camera);
        clear_background(BLACK);
        game.render(&assets);

        set_default_camera();
        clear_background(BLACK);
        let shake = game.screenshake;
        let offset = vec2(
            gen_range(0.0, shake) - shake / 2.0,
            gen_range(0.0, shake) - shake / 2.0,
        );
        let scale = (screen_width() / VIEW_WIDTH).min(screen_height() / VIEW_HEIGHT);
        let dest = vec2(VIEW_WIDTH, VIEW_HEIGHT) * scale;
        let corner = (vec2(screen_width(), screen_height()) - dest) / 2.0 + offset;
        draw_texture_ex(
            &target.texture,
            corner.x,
            corner.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(dest),
                // Render targets come out upside down relative to screen space.
                flip_y: true,
                ..Default::default()
            },
        );

        next_frame().await;
    }
}
