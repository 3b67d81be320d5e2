//! Particle System
//!
//! Two visual effect families: animated particles (leaves, dash dust, death
//! bursts) that play a one-shot clip while drifting, and sparks, bare white
//! diamonds that shrink as they decelerate. Both live in plain vectors and
//! are dropped in place when finished.

use macroquad::prelude::*;

use crate::asset::{Animation, AnimationCatalog, AssetLibrary};

/// Which one-shot clip a particle plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Leaf,
    Burst,
}

impl ParticleKind {
    pub fn asset_key(&self) -> &'static str {
        match self {
            ParticleKind::Leaf => "particle/leaf",
            ParticleKind::Burst => "particle/particle",
        }
    }
}

/// An animated particle drifting with a constant velocity.
#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub velocity: Vec2,
    animation: Animation,
}

impl Particle {
    pub fn new(
        catalog: &AnimationCatalog,
        kind: ParticleKind,
        pos: Vec2,
        velocity: Vec2,
        frame_offset: u32,
    ) -> Self {
        Self {
            kind,
            pos,
            velocity,
            animation: catalog.spec(kind.asset_key()).instantiate_at(frame_offset),
        }
    }

    /// Advance one tick. Returns true when the clip has finished and the
    /// particle should be removed.
    ///
    /// The done check runs before movement so the particle is culled the
    /// tick after its last image was shown, not one later.
    pub fn update(&mut self) -> bool {
        let dead = self.animation.is_done();
        self.pos += self.velocity;
        self.animation.update();
        dead
    }

    /// Tick position inside the clip, used to phase drift effects.
    pub fn frame(&self) -> u32 {
        self.animation.frame()
    }

    /// Drawn centered on its position.
    pub fn render(&self, assets: &AssetLibrary, scroll: Vec2) {
        let texture = assets.image(self.kind.asset_key(), self.animation.image_index());
        draw_texture(
            texture,
            self.pos.x - texture.width() / 2.0 - scroll.x,
            self.pos.y - texture.height() / 2.0 - scroll.y,
            WHITE,
        );
    }
}

/// A bare white diamond streak that decelerates until it vanishes.
#[derive(Debug, Clone, Copy)]
pub struct Spark {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
}

impl Spark {
    pub fn new(pos: Vec2, angle: f32, speed: f32) -> Self {
        Self { pos, angle, speed }
    }

    /// Advance one tick. Returns true once the spark has stopped.
    pub fn update(&mut self) -> bool {
        self.pos += polar(self.angle) * self.speed;
        self.speed = (self.speed - 0.1).max(0.0);
        self.speed == 0.0
    }

    /// Diamond stretched along the travel direction, three speeds long and
    /// half a speed wide.
    pub fn render(&self, scroll: Vec2) {
        let nose = self.pos + polar(self.angle) * self.speed * 3.0 - scroll;
        let tail = self.pos - polar(self.angle) * self.speed * 3.0 - scroll;
        let side_a =
            self.pos + polar(self.angle + std::f32::consts::FRAC_PI_2) * self.speed * 0.5 - scroll;
        let side_b =
            self.pos - polar(self.angle + std::f32::consts::FRAC_PI_2) * self.speed * 0.5 - scroll;
        draw_triangle(nose, side_a, tail, WHITE);
        draw_triangle(tail, side_b, nose, WHITE);
    }
}

/// Unit vector for an angle in radians.
pub fn polar(angle: f32) -> Vec2 {
    vec2(angle.cos(), angle.sin())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::standard_catalog;

    #[test]
    fn test_particle_drifts_with_velocity() {
        let catalog = standard_catalog();
        let mut p = Particle::new(
            &catalog,
            ParticleKind::Burst,
            vec2(10.0, 10.0),
            vec2(0.5, -0.25),
            0,
        );
        for _ in 0..4 {
            p.update();
        }
        assert_eq!(p.pos, vec2(12.0, 9.0));
    }

    #[test]
    fn test_burst_particle_dies_after_clip() {
        let catalog = standard_catalog();
        let mut p = Particle::new(&catalog, ParticleKind::Burst, Vec2::ZERO, Vec2::ZERO, 0);
        // 4 images x 6 ticks: alive through the clip, dead right after.
        let mut ticks = 0;
        while !p.update() {
            ticks += 1;
            assert!(ticks < 100, "particle never died");
        }
        assert_eq!(ticks, 24);
    }

    #[test]
    fn test_frame_offset_shortens_life() {
        let catalog = standard_catalog();
        let mut early = Particle::new(&catalog, ParticleKind::Burst, Vec2::ZERO, Vec2::ZERO, 0);
        let mut late = Particle::new(&catalog, ParticleKind::Burst, Vec2::ZERO, Vec2::ZERO, 20);
        let mut early_ticks = 0;
        while !early.update() {
            early_ticks += 1;
        }
        let mut late_ticks = 0;
        while !late.update() {
            late_ticks += 1;
        }
        assert!(late_ticks < early_ticks);
    }

    #[test]
    fn test_spark_decelerates_to_death() {
        let mut spark = Spark::new(Vec2::ZERO, 0.0, 1.0);
        let mut alive_ticks = 0;
        while !spark.update() {
            alive_ticks += 1;
            assert!(alive_ticks < 100, "spark never stopped");
        }
        assert_eq!(spark.speed, 0.0);
        assert!(spark.pos.x > 0.0);
        assert_eq!(spark.pos.y, 0.0);
    }

    #[test]
    fn test_spark_speed_is_monotone() {
        let mut spark = Spark::new(Vec2::ZERO, 1.0, 3.0);
        let mut last = spark.speed;
        while !spark.update() {
            assert!(spark.speed <= last);
            last = spark.speed;
        }
    }
}
