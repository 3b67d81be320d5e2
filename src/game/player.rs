//! Player state machine: running, jumping, wall slides and dashing.

use macroquad::prelude::*;
use macroquad::rand::gen_range;

use crate::asset::AnimationCatalog;
use crate::world::Tilemap;

use super::entity::{ActionState, Entity, EntityKind};
use super::events::{Events, ParticleEvent};
use super::particles::ParticleKind;

/// Ticks of airborne time after which the player counts as fallen out.
const FALL_OUT_TICKS: u32 = 120;
/// Airborne ticks before a lateral collision counts as a wall slide.
const WALL_SLIDE_DELAY: u32 = 4;
/// Dash timer magnitude at the start of a dash, sign encodes direction.
const DASH_TICKS: i32 = 60;
/// While the timer magnitude is above this the dash is at full speed and the
/// player is untouchable.
const DASH_ACTIVE: i32 = 50;
const DASH_SPEED: f32 = 8.0;
const JUMP_SPEED: f32 = 3.0;
const WALL_JUMP_X: f32 = 3.5;
const WALL_JUMP_Y: f32 = 2.5;
/// Horizontal velocity decay per tick.
const DRAG: f32 = 0.1;

pub struct Player {
    pub entity: Entity,
    /// Ticks since the player last stood on ground.
    pub air_time: u32,
    pub jumps: u8,
    pub wall_slide: bool,
    /// Dash timer, zero when not dashing. Counts toward zero each tick.
    pub dashing: i32,
}

impl Player {
    pub fn new(catalog: &AnimationCatalog, pos: Vec2) -> Self {
        Self {
            entity: Entity::new(EntityKind::Player, catalog, pos, vec2(8.0, 15.0)),
            air_time: 0,
            jumps: 1,
            wall_slide: false,
            dashing: 0,
        }
    }

    /// Projectiles cannot kill a player in the fast phase of a dash.
    pub fn is_immune(&self) -> bool {
        self.dashing.abs() >= DASH_ACTIVE
    }

    /// One simulation tick.
    pub fn update(
        &mut self,
        tilemap: &Tilemap,
        catalog: &AnimationCatalog,
        axis: f32,
        events: &mut Events,
    ) {
        self.entity.update(tilemap, vec2(axis, 0.0));

        self.air_time += 1;
        if self.air_time > FALL_OUT_TICKS {
            events.player_down.send(());
        }
        if self.entity.collisions.down {
            self.air_time = 0;
            self.jumps = 1;
        }

        self.wall_slide = false;
        if (self.entity.collisions.right || self.entity.collisions.left)
            && self.air_time > WALL_SLIDE_DELAY
        {
            self.wall_slide = true;
            self.entity.velocity.y = self.entity.velocity.y.min(0.5);
            self.entity.flip = self.entity.collisions.left;
            self.entity.set_action(catalog, ActionState::WallSlide);
        }

        if !self.wall_slide {
            if self.air_time > WALL_SLIDE_DELAY {
                self.entity.set_action(catalog, ActionState::Jump);
            } else if axis != 0.0 {
                self.entity.set_action(catalog, ActionState::Run);
            } else {
                self.entity.set_action(catalog, ActionState::Idle);
            }
        }

        // Particle ring at dash start and at the end of the fast phase.
        if self.dashing.abs() == DASH_TICKS || self.dashing.abs() == DASH_ACTIVE {
            for _ in 0..20 {
                let angle = gen_range(0.0, std::f32::consts::TAU);
                let speed = gen_range(0.5, 1.0);
                events.particles.send(ParticleEvent {
                    kind: ParticleKind::Burst,
                    pos: self.entity.center(),
                    velocity: vec2(angle.cos() * speed, angle.sin() * speed),
                    frame_offset: gen_range(0, 8),
                });
            }
        }
        if self.dashing > 0 {
            self.dashing = (self.dashing - 1).max(0);
        } else if self.dashing < 0 {
            self.dashing = (self.dashing + 1).min(0);
        }
        if self.dashing.abs() > DASH_ACTIVE {
            let sign = self.dashing.signum() as f32;
            self.entity.velocity.x = sign * DASH_SPEED;
            if self.dashing.abs() == DASH_ACTIVE + 1 {
                self.entity.velocity.x *= 0.1;
            }
            events.particles.send(ParticleEvent {
                kind: ParticleKind::Burst,
                pos: self.entity.center(),
                velocity: vec2(sign * gen_range(0.0, 3.0), 0.0),
                frame_offset: gen_range(0, 8),
            });
        }

        if self.entity.velocity.x > 0.0 {
            self.entity.velocity.x = (self.entity.velocity.x - DRAG).max(0.0);
        } else {
            self.entity.velocity.x = (self.entity.velocity.x + DRAG).min(0.0);
        }
    }

    /// Try to jump. Wall slides turn into wall jumps that kick away from the
    /// wall and flip facing without spending the air jump.
    pub fn jump(&mut self) -> bool {
        if self.wall_slide {
            if self.entity.flip && self.entity.last_movement.x < 0.0 {
                self.entity.velocity.x = WALL_JUMP_X;
                self.entity.velocity.y = -WALL_JUMP_Y;
                self.air_time = WALL_SLIDE_DELAY + 1;
                self.entity.flip = false;
                return true;
            } else if !self.entity.flip && self.entity.last_movement.x > 0.0 {
                self.entity.velocity.x = -WALL_JUMP_X;
                self.entity.velocity.y = -WALL_JUMP_Y;
                self.air_time = WALL_SLIDE_DELAY + 1;
                self.entity.flip = true;
                return true;
            }
        } else if self.jumps > 0 {
            self.entity.velocity.y = -JUMP_SPEED;
            self.jumps -= 1;
            self.air_time = WALL_SLIDE_DELAY + 1;
            return true;
        }
        false
    }

    /// Start a dash in the facing direction, if not already dashing.
    pub fn dash(&mut self) {
        if self.dashing == 0 {
            self.dashing = if self.entity.flip {
                -DASH_TICKS
            } else {
                DASH_TICKS
            };
        }
    }

    /// The player is invisible during the fast phase of a dash, only the
    /// particle trail shows.
    pub fn render(&self, assets: &crate::asset::AssetLibrary, scroll: Vec2) {
        if self.dashing.abs() <= DASH_ACTIVE {
            self.entity.render(assets, scroll);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
