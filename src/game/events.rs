//! Event System
//!
//! Events allow decoupled communication between game systems. An enemy does
//! not spawn projectiles itself, it sends a `ShotEvent` that the game loop
//! turns into a projectile plus muzzle sparks. Queues are drained by the loop
//! at fixed points in the tick so spawn ordering stays deterministic.

use macroquad::math::Vec2;

use super::particles::ParticleKind;

/// A queue for events of a single type.
/// Events are collected during the tick and drained at specific points.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Send an event (add to queue)
    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Drain all events (returns iterator and clears queue)
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    /// Check if there are any events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events without processing
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of events in queue
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all game events.
#[derive(Debug, Default)]
pub struct Events {
    /// An enemy fired its gun
    pub shots: EventQueue<ShotEvent>,

    /// A spark should be spawned
    pub sparks: EventQueue<SparkEvent>,

    /// A particle should be spawned
    pub particles: EventQueue<ParticleEvent>,

    /// Screenshake requests, in pixels of amplitude
    pub shake: EventQueue<f32>,

    /// The player was killed this tick
    pub player_down: EventQueue<()>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all event queues. Call at end of tick.
    pub fn clear_all(&mut self) {
        self.shots.clear();
        self.sparks.clear();
        self.particles.clear();
        self.shake.clear();
        self.player_down.clear();
    }
}

// =============================================================================
// Event Types
// =============================================================================

/// An enemy fired its gun
#[derive(Debug, Clone, Copy)]
pub struct ShotEvent {
    /// Muzzle position
    pub pos: Vec2,
    /// Horizontal velocity of the projectile, sign encodes direction
    pub direction: f32,
}

/// A spark should be spawned
#[derive(Debug, Clone, Copy)]
pub struct SparkEvent {
    pub pos: Vec2,
    /// Travel angle in radians
    pub angle: f32,
    pub speed: f32,
}

/// A particle should be spawned
#[derive(Debug, Clone, Copy)]
pub struct ParticleEvent {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub velocity: Vec2,
    /// Starting tick offset into the particle's animation
    pub frame_offset: u32,
}
