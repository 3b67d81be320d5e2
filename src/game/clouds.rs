//! Parallax cloud layer behind the level.

use macroquad::prelude::*;
use macroquad::rand::gen_range;

use crate::asset::AssetLibrary;

const CLOUD_COUNT: usize = 16;

/// One cloud drifting rightward forever.
#[derive(Debug, Clone, Copy)]
pub struct Cloud {
    pub pos: Vec2,
    pub image_index: usize,
    pub speed: f32,
    /// Parallax factor, smaller is further away.
    pub depth: f32,
}

impl Cloud {
    fn render(&self, assets: &AssetLibrary, scroll: Vec2, view: Vec2) {
        let texture = assets.image("clouds", self.image_index);
        let parallax = self.pos - scroll * self.depth;
        // Wrap over the view plus one image so clouds re-enter smoothly.
        let x = parallax.x.rem_euclid(view.x + texture.width()) - texture.width();
        let y = parallax.y.rem_euclid(view.y + texture.height()) - texture.height();
        draw_texture(texture, x, y, WHITE);
    }
}

/// The whole cloud layer, depth-sorted back to front.
pub struct Clouds {
    clouds: Vec<Cloud>,
}

impl Clouds {
    pub fn new(image_count: usize) -> Self {
        let mut clouds: Vec<Cloud> = (0..CLOUD_COUNT)
            .map(|_| Cloud {
                pos: vec2(gen_range(0.0, 99999.0), gen_range(0.0, 99999.0)),
                image_index: if image_count > 0 {
                    gen_range(0, image_count)
                } else {
                    0
                },
                speed: gen_range(0.05, 0.1),
                depth: gen_range(0.2, 0.8),
            })
            .collect();
        clouds.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        Self { clouds }
    }

    pub fn update(&mut self) {
        for cloud in &mut self.clouds {
            cloud.pos.x += cloud.speed;
        }
    }

    pub fn render(&self, assets: &AssetLibrary, scroll: Vec2, view: Vec2) {
        for cloud in &self.clouds {
            cloud.render(assets, scroll, view);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
