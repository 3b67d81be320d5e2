//! Physics entity shared by the player and enemies.
//!
//! Movement resolves against the tilemap one axis at a time: the X step is
//! applied and pushed out of solids, then the Y step. Resolving X first makes
//! walls stop horizontal motion before gravity gets a say, which is what
//! keeps wall slides and wall jumps stable.

use macroquad::prelude::*;

use crate::asset::{Animation, AnimationCatalog};
use crate::world::Tilemap;

/// Downward acceleration per tick.
pub const GRAVITY: f32 = 0.1;
/// Terminal fall speed.
pub const MAX_FALL_SPEED: f32 = 5.0;
/// Sprites are padded a little beyond the collision box.
pub const ANIM_OFFSET: Vec2 = vec2(-3.0, -3.0);

/// Which sides of the entity touched a solid during the last update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Collisions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// What the entity is currently doing, drives sprite selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Idle,
    Run,
    Jump,
    WallSlide,
}

/// Which sprite family an entity draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Enemy,
}

impl EntityKind {
    /// Sprite set for an action. Enemies have no air sprites, they reuse
    /// their idle set.
    fn sprite_key(&self, action: ActionState) -> &'static str {
        match (self, action) {
            (EntityKind::Player, ActionState::Idle) => "player/idle",
            (EntityKind::Player, ActionState::Run) => "player/run",
            (EntityKind::Player, ActionState::Jump) => "player/jump",
            (EntityKind::Player, ActionState::WallSlide) => "player/wall_slide",
            (EntityKind::Enemy, ActionState::Run) => "enemy/run",
            (EntityKind::Enemy, _) => "enemy/idle",
        }
    }
}

/// Rect overlap that excludes shared edges.
///
/// `Rect::overlaps` in macroquad is inclusive, so an entity standing exactly
/// on a tile would count as colliding and get pushed every tick. Contact
/// without penetration must not collide.
pub(crate) fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// A physics body with a sprite.
#[derive(Debug, Clone)]
pub struct Entity {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub collisions: Collisions,
    pub action: ActionState,
    pub animation: Animation,
    pub flip: bool,
    /// Total movement applied last tick, input plus velocity.
    pub last_movement: Vec2,
}

impl Entity {
    pub fn new(kind: EntityKind, catalog: &AnimationCatalog, pos: Vec2, size: Vec2) -> Self {
        let action = ActionState::Idle;
        Self {
            kind,
            pos,
            size,
            velocity: Vec2::ZERO,
            collisions: Collisions::default(),
            action,
            animation: catalog.spec(kind.sprite_key(action)).instantiate(),
            flip: false,
            last_movement: Vec2::ZERO,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Switch action, restarting the animation only on a real change.
    pub fn set_action(&mut self, catalog: &AnimationCatalog, action: ActionState) {
        if action != self.action {
            self.action = action;
            self.animation = catalog.spec(self.kind.sprite_key(action)).instantiate();
        }
    }

    /// Apply one tick of movement with axis-separated collision resolution.
    ///
    /// `movement` is the externally driven part (input, AI); velocity is
    /// added on top. X resolves before Y.
    pub fn update(&mut self, tilemap: &Tilemap, movement: Vec2) {
        self.collisions = Collisions::default();
        let frame_movement = movement + self.velocity;

        self.pos.x += frame_movement.x;
        let mut rect = self.rect();
        for tile_rect in tilemap.physics_rects_around(self.pos) {
            if rects_overlap(&rect, &tile_rect) {
                if frame_movement.x > 0.0 {
                    rect.x = tile_rect.x - rect.w;
                    self.collisions.right = true;
                } else if frame_movement.x < 0.0 {
                    rect.x = tile_rect.x + tile_rect.w;
                    self.collisions.left = true;
                }
                self.pos.x = rect.x;
            }
        }

        self.pos.y += frame_movement.y;
        let mut rect = self.rect();
        for tile_rect in tilemap.physics_rects_around(self.pos) {
            if rects_overlap(&rect, &tile_rect) {
                if frame_movement.y > 0.0 {
                    rect.y = tile_rect.y - rect.h;
                    self.collisions.down = true;
                } else if frame_movement.y < 0.0 {
                    rect.y = tile_rect.y + tile_rect.h;
                    self.collisions.up = true;
                }
                self.pos.y = rect.y;
            }
        }

        if frame_movement.x > 0.0 {
            self.flip = false;
        } else if frame_movement.x < 0.0 {
            self.flip = true;
        }

        self.last_movement = frame_movement;

        self.velocity.y = (self.velocity.y + GRAVITY).min(MAX_FALL_SPEED);
        if self.collisions.down || self.collisions.up {
            self.velocity.y = 0.0;
        }

        self.animation.update();
    }

    /// Draw at the sprite anchor, mirrored when facing left.
    pub fn render(&self, assets: &crate::asset::AssetLibrary, scroll: Vec2) {
        let key = self.kind.sprite_key(self.action);
        let texture = assets.image(key, self.animation.image_index());
        let dest = self.pos + ANIM_OFFSET - scroll;
        draw_texture_ex(
            texture,
            dest.x,
            dest.y,
            WHITE,
            DrawTextureParams {
                flip_x: self.flip,
                ..Default::default()
            },
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
