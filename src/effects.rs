//! Ripple and celebration animations
//!
//! Effects are plans, not drawings: each one is a list of keyframes with
//! their offset from the moment the effect starts. The host draws the
//! circles; the engine only decides where and how they evolve.

use std::time::Duration;

use itertools::Itertools;
use serde::Serialize;
use serde_with::{DurationMilliSeconds, serde_as};

use crate::{constants::effects as params, data::Position};

/// One frame of a ripple circle
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RippleFrame {
    /// Which of the concentric ripples this frame belongs to
    pub ripple: usize,
    /// Offset from the start of the effect
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub at: Duration,
    /// Circle radius in pixels
    pub radius: f64,
    /// Stroke opacity
    pub opacity: f64,
    /// Stroke width in pixels
    pub weight: f64,
    /// Fill opacity
    pub fill_opacity: f64,
}

/// Expanding, fading rings around a location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ripple {
    /// Center of the rings
    pub origin: Position,
    /// Stroke color
    pub color: String,
    /// Number of staggered rings
    pub count: usize,
}

impl Ripple {
    /// Creates a ripple with the default ring count
    pub fn new(origin: Position, color: impl Into<String>) -> Self {
        Self {
            origin,
            color: color.into(),
            count: params::RIPPLE_COUNT,
        }
    }

    /// All keyframes, ring by ring
    pub fn frames(&self) -> Vec<RippleFrame> {
        (0..self.count)
            .cartesian_product(1..=params::RIPPLE_FRAMES)
            .map(|(ripple, frame)| {
                let t = f64::from(frame) / f64::from(params::RIPPLE_FRAMES);
                RippleFrame {
                    ripple,
                    at: Duration::from_millis(
                        ripple as u64 * params::RIPPLE_STAGGER
                            + u64::from(frame) * params::RIPPLE_FRAME_INTERVAL,
                    ),
                    radius: params::RIPPLE_START_RADIUS + t * params::RIPPLE_GROWTH,
                    opacity: 1. - t,
                    weight: (4. - t * 2.4).max(1.),
                    fill_opacity: (0.08 * (1. - t)).max(0.),
                }
            })
            .collect()
    }

    /// Time after which every ring has faded out
    pub fn duration(&self) -> Duration {
        Duration::from_millis(
            self.count.saturating_sub(1) as u64 * params::RIPPLE_STAGGER
                + u64::from(params::RIPPLE_FRAMES) * params::RIPPLE_FRAME_INTERVAL,
        )
    }
}

/// One particle thrown out by a celebration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    /// Direction of travel in radians
    pub angle: f64,
    /// Speed multiplier
    pub velocity: f64,
    /// Fill color
    pub color: String,
}

/// Where a particle is and how it looks at one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleFrame {
    /// Position of the particle
    pub position: Position,
    /// Fill opacity
    pub opacity: f64,
    /// Radius in pixels
    pub radius: f64,
}

/// Burst of colored particles around a correct answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Celebration {
    /// Where the particles start
    pub origin: Position,
    /// The particles
    pub particles: Vec<Particle>,
}

impl Celebration {
    /// Creates a burst with the default palette and particle count
    pub fn new(origin: Position, rng: &mut fastrand::Rng) -> Self {
        Self::with_colors(origin, &params::PARTICLE_COLORS, params::PARTICLE_COUNT, rng)
    }

    /// Creates a burst of `count` particles drawn from `colors`
    pub fn with_colors(
        origin: Position,
        colors: &[&str],
        count: usize,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let particles = (0..count)
            .map(|_| Particle {
                angle: rng.f64() * std::f64::consts::TAU,
                velocity: 2. + rng.f64() * 4.,
                color: if colors.is_empty() {
                    params::PARTICLE_COLORS[0].to_string()
                } else {
                    colors[rng.usize(..colors.len())].to_string()
                },
            })
            .collect();
        Self { origin, particles }
    }

    /// State of `particle` after `frame` frames
    pub fn frame(&self, particle: &Particle, frame: u32) -> ParticleFrame {
        let t = f64::from(frame.min(params::PARTICLE_FRAMES)) / f64::from(params::PARTICLE_FRAMES);
        let travelled = f64::from(frame) * particle.velocity * params::PARTICLE_STEP;
        ParticleFrame {
            position: Position {
                lat: self.origin.lat + particle.angle.sin() * travelled,
                lng: self.origin.lng + particle.angle.cos() * travelled,
            },
            opacity: 1. - t,
            radius: params::PARTICLE_RADIUS * (1. - t / 2.),
        }
    }

    /// Time after which every particle has vanished
    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::from(params::PARTICLE_FRAMES) * params::PARTICLE_FRAME_INTERVAL)
    }
}

/// A visual effect the host should play
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::From)]
pub enum Effect {
    /// Rings around the answer that now has to be clicked
    Ripple(Ripple),
    /// Particles around a correct answer
    Celebration(Celebration),
}
