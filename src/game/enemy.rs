//! Patrolling gunner enemies.
//!
//! Enemies walk short bursts along platforms, probing the ground one step
//! ahead so they turn at ledges. When a burst runs out and the player is
//! level with them, in range and in clear sight, they fire and turn away.

use macroquad::prelude::*;
use macroquad::rand::gen_range;

use crate::asset::AnimationCatalog;
use crate::world::Tilemap;

use super::entity::{rects_overlap, ActionState, Entity, EntityKind};
use super::events::{Events, ParticleEvent, ShotEvent, SparkEvent};
use super::particles::ParticleKind;
use super::player::Player;

const WALK_SPEED: f32 = 0.5;
/// Ground probe offset: one step ahead, one tile below the feet.
const PROBE_AHEAD: f32 = 7.0;
const PROBE_DOWN: f32 = 23.0;
/// Horizontal distance within which an idle enemy may start patrolling.
const NOTICE_RANGE: f32 = 160.0;
/// Chance per tick that a noticed player triggers a patrol burst.
const REPATROL_CHANCE: f32 = 0.01;
/// Maximum horizontal shooting distance.
const SHOOT_RANGE: f32 = 160.0;
/// The player must be within this vertical distance to be shot at.
const VERTICAL_TOLERANCE: f32 = 16.0;
const PROJECTILE_SPEED: f32 = 1.5;
const MUZZLE_OFFSET: f32 = 7.0;
/// Sample spacing for the line-of-sight walk.
const LOS_STEP: f32 = 16.0;

pub struct Enemy {
    pub entity: Entity,
    /// Remaining ticks of the current patrol burst, zero when idle.
    pub walking: u32,
}

impl Enemy {
    pub fn new(catalog: &AnimationCatalog, pos: Vec2) -> Self {
        Self {
            entity: Entity::new(EntityKind::Enemy, catalog, pos, vec2(8.0, 15.0)),
            walking: 0,
        }
    }

    /// One simulation tick. Returns true when the enemy was killed by a
    /// dashing player and must be removed.
    pub fn update(
        &mut self,
        tilemap: &Tilemap,
        catalog: &AnimationCatalog,
        player: &Player,
        events: &mut Events,
    ) -> bool {
        let mut movement = Vec2::ZERO;

        if self.walking > 0 {
            let ahead = if self.entity.flip {
                -PROBE_AHEAD
            } else {
                PROBE_AHEAD
            };
            let probe = vec2(self.entity.center().x + ahead, self.entity.pos.y + PROBE_DOWN);
            if tilemap.is_solid(probe) {
                if self.entity.collisions.right || self.entity.collisions.left {
                    self.entity.flip = !self.entity.flip;
                } else {
                    movement.x = if self.entity.flip {
                        -WALK_SPEED
                    } else {
                        WALK_SPEED
                    };
                }
                self.walking -= 1;
                if self.walking == 0 {
                    self.try_shoot(tilemap, player, events);
                }
            } else {
                // Ledge ahead: turn around and start a fresh burst so the
                // enemy walks back instead of idling on the edge.
                self.entity.flip = !self.entity.flip;
                self.walking = gen_range(30, 120);
            }
        } else {
            let dx = player.entity.pos.x - self.entity.pos.x;
            if dx.abs() <= NOTICE_RANGE && gen_range(0.0, 1.0) < REPATROL_CHANCE {
                self.walking = gen_range(30, 120);
            }
        }

        self.entity.update(tilemap, movement);

        if movement.x != 0.0 {
            self.entity.set_action(catalog, ActionState::Run);
        } else {
            self.entity.set_action(catalog, ActionState::Idle);
        }

        if player.is_immune()
            && rects_overlap(&self.entity.rect(), &player.entity.rect())
        {
            self.explode(events);
            return true;
        }
        false
    }

    fn try_shoot(&mut self, tilemap: &Tilemap, player: &Player, events: &mut Events) {
        let dx = player.entity.pos.x - self.entity.pos.x;
        let dy = player.entity.pos.y - self.entity.pos.y;
        if dy.abs() >= VERTICAL_TOLERANCE || dx.abs() > SHOOT_RANGE {
            return;
        }
        if !self.has_line_of_sight(tilemap, player) {
            return;
        }

        let sign = if dx < 0.0 { -1.0 } else { 1.0 };
        events.shots.send(ShotEvent {
            pos: vec2(
                self.entity.center().x + sign * MUZZLE_OFFSET,
                self.entity.center().y,
            ),
            direction: sign * PROJECTILE_SPEED,
        });
        // Turn away from the shot.
        self.entity.flip = dx > 0.0;
    }

    /// Walk the horizontal line between enemy and player centers at the
    /// enemy's eye height, sampling for solid tiles.
    fn has_line_of_sight(&self, tilemap: &Tilemap, player: &Player) -> bool {
        let y = self.entity.center().y;
        let from = self.entity.center().x;
        let to = player.entity.center().x;
        let distance = (to - from).abs();
        let step = (to - from).signum() * LOS_STEP;
        let samples = (distance / LOS_STEP) as i32;
        for i in 1..=samples {
            if tilemap.is_solid(vec2(from + step * i as f32, y)) {
                return false;
            }
        }
        true
    }

    /// Burst of sparks and particles when run through by a dash.
    fn explode(&self, events: &mut Events) {
        let center = self.entity.center();
        events.shake.send(16.0);
        for _ in 0..30 {
            let angle = gen_range(0.0, std::f32::consts::TAU);
            let speed = gen_range(0.0, 5.0);
            events.sparks.send(SparkEvent {
                pos: center,
                angle,
                speed: 2.0 + gen_range(0.0, 1.0),
            });
            events.particles.send(ParticleEvent {
                kind: ParticleKind::Burst,
                pos: center,
                velocity: vec2(
                    (angle + std::f32::consts::PI).cos() * speed * 0.5,
                    (angle + std::f32::consts::PI).sin() * speed * 0.5,
                ),
                frame_offset: gen_range(0, 8),
            });
        }
        events.sparks.send(SparkEvent {
            pos: center,
            angle: 0.0,
            speed: 5.0 + gen_range(0.0, 1.0),
        });
        events.sparks.send(SparkEvent {
            pos: center,
            angle: std::f32::consts::PI,
            speed: 5.0 + gen_range(0.0, 1.0),
        });
    }

    /// Body sprite plus the gun held at chest height.
    pub fn render(&self, assets: &crate::asset::AssetLibrary, scroll: Vec2) {
        self.entity.render(assets, scroll);
        let gun = assets.image("gun", 0);
        let center = self.entity.center();
        let x = if self.entity.flip {
            center.x - 4.0 - gun.width()
        } else {
            center.x + 4.0
        };
        draw_texture_ex(
            gun,
            x - scroll.x,
            center.y - scroll.y,
            WHITE,
            DrawTextureParams {
                flip_x: self.entity.flip,
                ..Default::default()
            },
        );
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::standard_catalog;
    use crate::world::{TileKind, TILE_SIZE};

    fn platform_map(x_range: std::ops::Range<i32>, y: i32) -> Tilemap {
        let mut map = Tilemap::new();
        for x in x_range {
            map.insert_grid((x, y), TileKind::Grass, 0);
        }
        map
    }

    fn settle(entity_pos: Vec2, map: &Tilemap, catalog: &AnimationCatalog) -> Enemy {
        let mut enemy = Enemy::new(catalog, entity_pos);
        let player = Player::new(catalog, vec2(1000.0, 1000.0));
        let mut events = Events::new();
        for _ in 0..60 {
            enemy.update(map, catalog, &player, &mut events);
        }
        events.clear_all();
        enemy
    }

    #[test]
    fn test_ledge_turns_and_starts_fresh_burst() {
        let catalog = standard_catalog();
        // Standing at the platform edge, the ground probe ahead misses.
        let map = platform_map(3..4, 5);
        let mut enemy = settle(vec2(58.0, 40.0), &map, &catalog);
        let player = Player::new(&catalog, vec2(1000.0, 1000.0));
        let mut events = Events::new();

        enemy.walking = 1;
        let flip_before = enemy.entity.flip;
        enemy.update(&map, &catalog, &player, &mut events);
        assert_ne!(enemy.entity.flip, flip_before);
        assert!((30..120).contains(&enemy.walking));
    }

    #[test]
    fn test_burst_end_fires_at_level_player_and_faces_away() {
        let catalog = standard_catalog();
        let map = platform_map(-2..20, 5);
        let mut enemy = settle(vec2(100.0, 40.0), &map, &catalog);
        let mut player = Player::new(&catalog, vec2(40.0, 40.0));
        let mut events = Events::new();
        // Settle the player onto the same floor.
        {
            let mut scratch = Events::new();
            for _ in 0..60 {
                player.update(&map, &catalog, 0.0, &mut scratch);
            }
        }

        enemy.walking = 1;
        enemy.update(&map, &catalog, &player, &mut events);

        assert_eq!(events.shots.len(), 1);
        let shot: Vec<ShotEvent> = events.shots.drain().collect();
        assert_eq!(shot[0].direction, -PROJECTILE_SPEED);
        assert!(shot[0].pos.x < enemy.entity.center().x);
        // Player is to the left, so the enemy now faces right.
        assert!(!enemy.entity.flip);
    }

    #[test]
    fn test_wall_blocks_line_of_sight() {
        let catalog = standard_catalog();
        let mut map = platform_map(-2..20, 5);
        for y in 0..5 {
            map.insert_grid((5, y), TileKind::Stone, 0);
        }
        let mut enemy = settle(vec2(130.0, 40.0), &map, &catalog);
        let mut player = Player::new(&catalog, vec2(20.0, 40.0));
        let mut events = Events::new();
        {
            let mut scratch = Events::new();
            for _ in 0..60 {
                player.update(&map, &catalog, 0.0, &mut scratch);
            }
        }

        enemy.walking = 1;
        enemy.update(&map, &catalog, &player, &mut events);
        assert!(events.shots.is_empty());
    }

    #[test]
    fn test_out_of_range_player_never_starts_patrol() {
        let catalog = standard_catalog();
        let map = platform_map(-2..20, 5);
        let mut enemy = settle(vec2(100.0, 40.0), &map, &catalog);
        let player = Player::new(&catalog, vec2(100.0 + NOTICE_RANGE + 1.0, 40.0));
        let mut events = Events::new();

        for _ in 0..1000 {
            enemy.update(&map, &catalog, &player, &mut events);
        }
        assert_eq!(enemy.walking, 0);
    }

    #[test]
    fn test_dashing_player_kills_on_contact() {
        let catalog = standard_catalog();
        let map = platform_map(-2..20, 5);
        let mut enemy = settle(vec2(100.0, 40.0), &map, &catalog);
        let mut player = Player::new(&catalog, enemy.entity.pos);
        player.dashing = 55;
        let mut events = Events::new();

        let killed = enemy.update(&map, &catalog, &player, &mut events);
        assert!(killed);
        assert_eq!(events.sparks.len(), 32);
        assert_eq!(events.particles.len(), 30);
        let shakes: Vec<f32> = events.shake.drain().collect();
        assert_eq!(shakes, vec![16.0]);
    }

    #[test]
    fn test_walking_enemy_stays_on_platform() {
        let catalog = standard_catalog();
        let map = platform_map(0..6, 5);
        let mut enemy = settle(vec2(40.0, 40.0), &map, &catalog);
        let player = Player::new(&catalog, vec2(1000.0, 1000.0));
        let mut events = Events::new();

        enemy.walking = 300;
        for _ in 0..300 {
            enemy.update(&map, &catalog, &player, &mut events);
        }
        let left_edge = 0.0;
        let right_edge = 6.0 * TILE_SIZE;
        assert!(enemy.entity.pos.x >= left_edge);
        assert!(enemy.entity.pos.x + enemy.entity.size.x <= right_edge);
        assert!(enemy.entity.collisions.down || enemy.entity.velocity.y == 0.0);
    }
}
