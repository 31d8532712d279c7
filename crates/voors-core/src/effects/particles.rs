#![forbid(unsafe_code)]

//! Canvas particle background.
//!
//! A fixed number of dots drift at constant per-particle velocity across the
//! `#particles-canvas` surface and are redrawn every frame.
//!
//! # Invariants
//!
//! 1. After every [`ParticleField::step`], each particle lies within
//!    `[-margin, width + margin] × [-margin, height + margin]`; a coordinate
//!    that crosses a bound is moved to the opposite bound on the same step.
//! 2. The backing store is `floor(box × ratio)` device pixels with the ratio
//!    clamped to `[1, max_pixel_ratio]`; the transform is reset on resize.
//! 3. While the document is hidden the loop keeps rescheduling but draws
//!    nothing, so it resumes without re-arming.
//! 4. The field is rebuilt wholesale on every activation.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use crate::config::{Bounds, ParticleConfig};
use crate::effect::{Effect, EffectCx};
use crate::error::Result;
use crate::event::{Dispatch, DomEvent, HostEvent};
use crate::host::{Dot, ElementId, EventKind, EventTarget, FrameHandle, Host, ListenerId, Rect};
use crate::marker::Marker;

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub alpha: f64,
    /// Index into the configured palette.
    pub color: usize,
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

fn sample(rng: &mut SmallRng, bounds: Bounds) -> f64 {
    if bounds.max > bounds.min {
        rng.gen_range(bounds.min..bounds.max)
    } else {
        bounds.min
    }
}

impl ParticleField {
    /// Scatter `config.count` particles over a `width × height` box.
    #[must_use]
    pub fn spawn(config: &ParticleConfig, width: f64, height: f64, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let palette_len = config.palette.len();
        let particles = (0..config.count)
            .map(|_| Particle {
                x: sample(&mut rng, Bounds::new(0.0, width)),
                y: sample(&mut rng, Bounds::new(0.0, height)),
                radius: sample(&mut rng, config.radius),
                vx: sample(&mut rng, config.speed_x),
                vy: sample(&mut rng, config.speed_y),
                alpha: sample(&mut rng, config.alpha),
                color: if palette_len == 0 {
                    0
                } else {
                    rng.gen_range(0..palette_len)
                },
            })
            .collect();
        Self { particles }
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Move every particle by its velocity and wrap at the soft bounds.
    pub fn step(&mut self, width: f64, height: f64, margin: f64) {
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            p.x = wrap(p.x, width, margin);
            p.y = wrap(p.y, height, margin);
        }
    }
}

fn wrap(v: f64, extent: f64, margin: f64) -> f64 {
    if v < -margin {
        extent + margin
    } else if v > extent + margin {
        -margin
    } else {
        v
    }
}

// ---------------------------------------------------------------------------
// Effect
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Particles {
    canvas: Option<ElementId>,
    field: Option<ParticleField>,
    pixel_ratio: f64,
    frame: Option<FrameHandle>,
    resize: Option<ListenerId>,
}

impl Particles {
    fn fit(&self, host: &mut dyn Host, canvas: ElementId) -> Result<Rect> {
        let rect = host.bounding_rect(canvas);
        let width = (rect.width * self.pixel_ratio).floor().max(0.0) as u32;
        let height = (rect.height * self.pixel_ratio).floor().max(0.0) as u32;
        host.resize_canvas(canvas, width, height, self.pixel_ratio)?;
        Ok(rect)
    }

    fn draw(&mut self, cx: &mut EffectCx<'_>) {
        let (Some(canvas), Some(field)) = (self.canvas, self.field.as_mut()) else {
            return;
        };
        let config = &cx.config.particles;
        let rect = cx.host.bounding_rect(canvas);

        cx.host.clear_canvas(canvas, rect.width, rect.height);
        field.step(rect.width, rect.height, config.wrap_margin);
        for p in field.particles() {
            let color = config.palette.get(p.color).map_or("#fff", String::as_str);
            cx.host.fill_dot(
                canvas,
                Dot {
                    x: p.x,
                    y: p.y,
                    radius: p.radius,
                    alpha: p.alpha,
                    color,
                },
            );
        }
    }
}

impl Effect for Particles {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn decorative(&self) -> bool {
        true
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        let Some(canvas) = cx.host.query(Marker::ParticlesCanvas) else {
            return;
        };
        let all = cx.config;
        let config = &all.particles;
        self.pixel_ratio = cx
            .host
            .device_pixel_ratio()
            .clamp(1.0, config.max_pixel_ratio.max(1.0));

        let rect = match self.fit(cx.host, canvas) {
            Ok(rect) => rect,
            Err(err) => {
                warn!(%err, "particle canvas unavailable");
                return;
            }
        };

        self.canvas = Some(canvas);
        self.field = Some(ParticleField::spawn(
            config,
            rect.width,
            rect.height,
            config.seed.unwrap_or_else(|| cx.host.random_seed()),
        ));
        self.resize = cx.listen(EventTarget::Window, EventKind::Resize);
        self.frame = cx.request_frame();
        debug!(
            count = config.count,
            ratio = self.pixel_ratio,
            "particle loop started"
        );
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        match event {
            HostEvent::Frame { handle, .. } if Some(*handle) == self.frame => {
                if cx.host.document_hidden() {
                    trace!("document hidden; particle frame skipped");
                } else {
                    self.draw(cx);
                }
                self.frame = cx.request_frame();
                Dispatch::handled()
            }
            HostEvent::Dom {
                listener,
                event: DomEvent::Resize,
            } if Some(*listener) == self.resize => {
                if let Some(canvas) = self.canvas {
                    if let Err(err) = self.fit(cx.host, canvas) {
                        warn!(%err, "particle canvas resize failed");
                    }
                }
                Dispatch::handled()
            }
            _ => Dispatch::default(),
        }
    }

    fn deactivate(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn spawn_respects_configured_ranges() {
        let config = ParticleConfig::default();
        let field = ParticleField::spawn(&config, 640.0, 360.0, 7);
        assert_eq!(field.len(), 42);
        for p in field.particles() {
            assert!((0.0..=640.0).contains(&p.x));
            assert!((0.0..=360.0).contains(&p.y));
            assert!(config.radius.contains(p.radius));
            assert!(config.speed_x.contains(p.vx));
            assert!(config.speed_y.contains(p.vy));
            assert!(config.alpha.contains(p.alpha));
            assert!(p.color < config.palette.len());
        }
    }

    #[test]
    fn same_seed_same_field() {
        let config = ParticleConfig::default();
        let a = ParticleField::spawn(&config, 100.0, 100.0, 42);
        let b = ParticleField::spawn(&config, 100.0, 100.0, 42);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn crossing_a_bound_wraps_same_step() {
        assert_eq!(wrap(-20.5, 100.0, 20.0), 120.0);
        assert_eq!(wrap(120.5, 100.0, 20.0), -20.0);
        assert_eq!(wrap(-20.0, 100.0, 20.0), -20.0);
        assert_eq!(wrap(50.0, 100.0, 20.0), 50.0);
    }

    #[test]
    fn zero_sized_canvas_still_spawns() {
        let field = ParticleField::spawn(&ParticleConfig::default(), 0.0, 0.0, 1);
        assert!(field.particles().iter().all(|p| p.x == 0.0 && p.y == 0.0));
    }

    proptest! {
        #[test]
        fn particles_stay_in_soft_bounds(
            seed in any::<u64>(),
            width in 0.0f64..2000.0,
            height in 0.0f64..1200.0,
            shrink in 0.1f64..1.0,
            steps in 1usize..400,
        ) {
            let config = ParticleConfig::default();
            let mut field = ParticleField::spawn(&config, width, height, seed);
            let (w, h) = (width * shrink, height * shrink);
            for _ in 0..steps {
                field.step(w, h, config.wrap_margin);
                for p in field.particles() {
                    prop_assert!(p.x >= -20.0 && p.x <= w + 20.0);
                    prop_assert!(p.y >= -20.0 && p.y <= h + 20.0);
                }
            }
        }
    }
}
