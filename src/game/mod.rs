//! Game orchestration.
//!
//! `Game` owns the simulation: tilemap, player, enemies, projectiles and
//! effects, advanced one fixed tick at a time by `update`. Systems talk
//! through the event queues and the loop drains them at fixed points, so
//! spawn ordering is identical from run to run. Rendering is a separate pass
//! that borrows the asset library, the simulation itself never touches
//! textures.

pub mod clouds;
pub mod enemy;
pub mod entity;
pub mod events;
pub mod particles;
pub mod player;
pub mod projectile;

use macroquad::prelude::*;
use macroquad::rand::gen_range;

use crate::asset::{AnimationCatalog, AssetLibrary};
use crate::input::TickInput;
use crate::world::{Level, TileKind, Tilemap};

use clouds::Clouds;
use enemy::Enemy;
use events::Events;
use particles::{Particle, ParticleKind, Spark};
use player::Player;
use projectile::Projectile;

/// Logical display size in pixels, scaled up to the window at the end of the
/// frame.
pub const VIEW_WIDTH: f32 = 320.0;
pub const VIEW_HEIGHT: f32 = 240.0;
/// Fixed simulation step.
pub const TICK_DT: f32 = 1.0 / 60.0;
/// Ticks between the player dying and the level reloading.
const DEATH_RELOAD_TICKS: u32 = 40;

pub struct Game {
    pub catalog: AnimationCatalog,
    pub level: Level,
    pub tilemap: Tilemap,
    pub clouds: Clouds,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub sparks: Vec<Spark>,
    /// Areas under tree canopies that shed leaves.
    pub leaf_spawners: Vec<Rect>,
    pub events: Events,
    pub scroll: Vec2,
    /// Zero while alive, then counts ticks since death.
    pub dead: u32,
    pub screenshake: f32,
}

impl Game {
    pub fn new(catalog: AnimationCatalog, level: Level, cloud_image_count: usize) -> Self {
        let player = Player::new(&catalog, Vec2::ZERO);
        let mut game = Self {
            catalog,
            level,
            tilemap: Tilemap::new(),
            clouds: Clouds::new(cloud_image_count),
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            sparks: Vec::new(),
            leaf_spawners: Vec::new(),
            events: Events::new(),
            scroll: Vec2::ZERO,
            dead: 0,
            screenshake: 0.0,
        };
        game.load_level();
        game
    }

    /// (Re)build the run state from the level description.
    ///
    /// Spawner tiles are pulled out of the map: variant 0 places the player,
    /// the rest become enemies. Tree canopies stay in the map and double as
    /// leaf spawn areas. The player keeps residual velocity across reloads.
    pub fn load_level(&mut self) {
        self.tilemap = self.level.build_tilemap();

        self.leaf_spawners = self
            .tilemap
            .extract(&[(TileKind::LargeDecor, 2)], true)
            .iter()
            .map(|tree| Rect::new(4.0 + tree.pos.x, 4.0 + tree.pos.y, 23.0, 13.0))
            .collect();

        self.enemies.clear();
        for spawner in self
            .tilemap
            .extract(&[(TileKind::Spawners, 0), (TileKind::Spawners, 1)], false)
        {
            if spawner.variant == 0 {
                self.player.entity.pos = spawner.pos;
                self.player.air_time = 0;
            } else {
                self.enemies.push(Enemy::new(&self.catalog, spawner.pos));
            }
        }

        self.projectiles.clear();
        self.particles.clear();
        self.sparks.clear();
        self.events.clear_all();
        self.scroll = Vec2::ZERO;
        self.dead = 0;
        self.screenshake = 0.0;
    }

    /// Advance the simulation one tick.
    pub fn update(&mut self, input: TickInput) {
        self.screenshake = (self.screenshake - 1.0).max(0.0);

        if self.dead > 0 {
            self.dead += 1;
            if self.dead > DEATH_RELOAD_TICKS {
                self.load_level();
            }
        }

        if input.jump {
            self.player.jump();
        }
        if input.dash {
            self.player.dash();
        }

        // Camera eases toward the player; the fractional part is kept so slow
        // scrolling still accumulates, but rendering truncates.
        let target = self.player.entity.center() - vec2(VIEW_WIDTH, VIEW_HEIGHT) * 0.5;
        self.scroll += (target - self.scroll) / 30.0;

        for area in &self.leaf_spawners {
            if gen_range(0.0, 49999.0) < area.w * area.h {
                let pos = vec2(
                    area.x + gen_range(0.0, area.w),
                    area.y + gen_range(0.0, area.h),
                );
                self.particles.push(Particle::new(
                    &self.catalog,
                    ParticleKind::Leaf,
                    pos,
                    vec2(-0.1, 0.3),
                    gen_range(0, 21),
                ));
            }
        }

        self.clouds.update();

        {
            let tilemap = &self.tilemap;
            let catalog = &self.catalog;
            let player = &self.player;
            let events = &mut self.events;
            self.enemies
                .retain_mut(|enemy| !enemy.update(tilemap, catalog, player, events));
        }

        if self.dead == 0 {
            self.player
                .update(&self.tilemap, &self.catalog, input.axis(), &mut self.events);
        }

        self.drain_events();

        let mut killed_player = false;
        {
            let tilemap = &self.tilemap;
            let sparks = &mut self.sparks;
            let player_rect = self.player.entity.rect();
            let immune = self.player.is_immune();
            let dead = self.dead;
            self.projectiles.retain_mut(|projectile| {
                projectile.advance();
                if tilemap.is_solid(projectile.pos) {
                    // Impact sparks fly back toward the shooter.
                    let base = if projectile.direction > 0.0 {
                        std::f32::consts::PI
                    } else {
                        0.0
                    };
                    for _ in 0..4 {
                        sparks.push(Spark::new(
                            projectile.pos,
                            base + gen_range(-0.5, 0.5),
                            2.0 + gen_range(0.0, 1.0),
                        ));
                    }
                    return false;
                }
                if projectile.expired() {
                    return false;
                }
                if dead == 0 && !immune && player_rect.contains(projectile.pos) {
                    killed_player = true;
                    return false;
                }
                true
            });
        }
        if killed_player {
            self.kill_player();
        }

        self.sparks.retain_mut(|spark| !spark.update());

        self.particles.retain_mut(|particle| {
            let finished = particle.update();
            if particle.kind == ParticleKind::Leaf {
                particle.pos.x += (particle.frame() as f32 * 0.035).sin() * 0.3;
            }
            !finished
        });
    }

    /// Turn queued events into world objects.
    ///
    /// Runs after the entity updates and before the projectile pass, so a
    /// shot fired this tick already flies this tick.
    fn drain_events(&mut self) {
        let shots: Vec<_> = self.events.shots.drain().collect();
        for shot in shots {
            self.projectiles.push(Projectile::new(shot.pos, shot.direction));
            let base = if shot.direction < 0.0 {
                std::f32::consts::PI
            } else {
                0.0
            };
            for _ in 0..4 {
                self.sparks.push(Spark::new(
                    shot.pos,
                    base + gen_range(-0.5, 0.5),
                    2.0 + gen_range(0.0, 1.0),
                ));
            }
        }

        let particles: Vec<_> = self.events.particles.drain().collect();
        for event in particles {
            self.particles.push(Particle::new(
                &self.catalog,
                event.kind,
                event.pos,
                event.velocity,
                event.frame_offset,
            ));
        }

        let sparks: Vec<_> = self.events.sparks.drain().collect();
        for event in sparks {
            self.sparks
                .push(Spark::new(event.pos, event.angle, event.speed));
        }

        for amount in self.events.shake.drain() {
            self.screenshake = self.screenshake.max(amount);
        }

        let downed = !self.events.player_down.is_empty();
        self.events.player_down.clear();
        if downed && self.dead == 0 {
            self.dead = 1;
            self.screenshake = self.screenshake.max(16.0);
        }
    }

    /// Death by projectile: burst of sparks and particles, then the death
    /// counter starts.
    fn kill_player(&mut self) {
        self.dead = 1;
        self.screenshake = self.screenshake.max(16.0);
        let center = self.player.entity.center();
        for _ in 0..30 {
            let angle = gen_range(0.0, std::f32::consts::TAU);
            let speed = gen_range(0.0, 5.0);
            self.sparks
                .push(Spark::new(center, angle, 2.0 + gen_range(0.0, 1.0)));
            self.particles.push(Particle::new(
                &self.catalog,
                ParticleKind::Burst,
                center,
                vec2(
                    (angle + std::f32::consts::PI).cos() * speed * 0.5,
                    (angle + std::f32::consts::PI).sin() * speed * 0.5,
                ),
                gen_range(0, 8),
            ));
        }
    }

    /// Draw one frame of the logical display.
    pub fn render(&self, assets: &AssetLibrary) {
        let scroll = self.scroll.trunc();
        let view = vec2(VIEW_WIDTH, VIEW_HEIGHT);

        draw_texture_ex(
            assets.image("background", 0),
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(view),
                ..Default::default()
            },
        );
        self.clouds.render(assets, scroll, view);
        self.tilemap.render(assets, scroll, view);
        for enemy in &self.enemies {
            enemy.render(assets, scroll);
        }
        if self.dead == 0 {
            self.player.render(assets, scroll);
        }
        for projectile in &self.projectiles {
            projectile.render(assets, scroll);
        }
        for spark in &self.sparks {
            spark.render(scroll);
        }
        for particle in &self.particles {
            particle.render(assets, scroll);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::standard_catalog;
    use crate::input::TickInput;
    use crate::world::TILE_SIZE;

    fn new_game() -> Game {
        Game::new(standard_catalog(), Level::fallback(), 2)
    }

    #[test]
    fn test_load_level_extracts_spawners() {
        let game = new_game();
        assert_eq!(game.player.entity.pos, vec2(2.0 * TILE_SIZE, 12.0 * TILE_SIZE));
        assert_eq!(game.enemies.len(), 2);
        // Spawner tiles must not stay behind as visible or solid tiles.
        assert!(game.tilemap.grid_tile((2, 12)).is_none());
        assert!(game.tilemap.grid_tile((10, 8)).is_none());
    }

    #[test]
    fn test_load_level_keeps_tree_and_registers_spawn_area() {
        let game = new_game();
        assert_eq!(game.leaf_spawners.len(), 1);
        let area = game.leaf_spawners[0];
        assert_eq!(area, Rect::new(100.0, 191.0, 23.0, 13.0));
    }

    #[test]
    fn test_death_reloads_after_pause() {
        let mut game = new_game();
        let spawn = game.player.entity.pos;
        game.dead = 1;
        game.player.entity.pos = vec2(500.0, 500.0);

        for _ in 0..DEATH_RELOAD_TICKS {
            game.update(TickInput::default());
            if game.dead == 0 {
                break;
            }
        }
        assert_eq!(game.dead, 0);
        assert_eq!(game.player.entity.pos, spawn);
    }

    #[test]
    fn test_screenshake_decays_per_tick() {
        let mut game = new_game();
        game.screenshake = 5.0;
        game.update(TickInput::default());
        assert_eq!(game.screenshake, 4.0);
    }

    #[test]
    fn test_projectile_impact_spawns_sparks() {
        let mut game = new_game();
        // Fired straight at the left stone wall.
        game.projectiles
            .push(Projectile::new(vec2(17.0, 6.5 * TILE_SIZE), -1.5));
        let sparks_before = game.sparks.len();
        game.update(TickInput::default());
        assert!(game.projectiles.is_empty());
        assert!(game.sparks.len() >= sparks_before + 4);
    }

    #[test]
    fn test_projectile_kills_grounded_player() {
        let mut game = new_game();
        // Let the player settle on the ground first.
        for _ in 0..30 {
            game.update(TickInput::default());
        }
        assert_eq!(game.dead, 0);

        let center = game.player.entity.center();
        game.projectiles.push(Projectile::new(center, 0.0));
        game.update(TickInput::default());

        assert_eq!(game.dead, 1);
        assert!(game.screenshake >= 15.0);
        assert!(game.sparks.len() >= 30);
        assert!(game.particles.len() >= 30);
    }

    #[test]
    fn test_dash_immunity_blocks_projectile() {
        let mut game = new_game();
        for _ in 0..30 {
            game.update(TickInput::default());
        }
        game.update(TickInput {
            dash: true,
            ..Default::default()
        });
        assert!(game.player.is_immune());

        let center = game.player.entity.center();
        game.projectiles.push(Projectile::new(center, 0.0));
        game.update(TickInput::default());
        assert_eq!(game.dead, 0);
    }

    #[test]
    fn test_fall_out_of_level_kills_player() {
        let catalog = standard_catalog();
        // A level with nothing under the player.
        let level = Level {
            tile_size: TILE_SIZE,
            grid: vec![crate::world::GridTile {
                kind: TileKind::Spawners,
                variant: 0,
                cell: (0, 0),
            }],
            offgrid: Vec::new(),
        };
        let mut game = Game::new(catalog, level, 2);
        for _ in 0..130 {
            game.update(TickInput::default());
            if game.dead > 0 {
                break;
            }
        }
        assert!(game.dead > 0);
    }

    #[test]
    fn test_camera_eases_toward_player() {
        let mut game = new_game();
        let target = game.player.entity.center() - vec2(VIEW_WIDTH, VIEW_HEIGHT) * 0.5;
        let before = (target - game.scroll).length();
        game.update(TickInput::default());
        let target = game.player.entity.center() - vec2(VIEW_WIDTH, VIEW_HEIGHT) * 0.5;
        let after = (target - game.scroll).length();
        assert!(after < before.max(1.0));
    }
}
