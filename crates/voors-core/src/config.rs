#![forbid(unsafe_code)]

//! Orchestrator configuration.
//!
//! Every timing, threshold, and sizing constant the effects use lives here.
//! [`OrchestratorConfig::default`] reproduces the shipped site; a host may
//! override any subset from JSON (missing fields keep their defaults).
//!
//! ```
//! use voors_core::OrchestratorConfig;
//!
//! let cfg = OrchestratorConfig::from_json(r#"{"typing":{"pause_ms":500}}"#).unwrap();
//! assert_eq!(cfg.typing.pause_ms, 500);
//! assert_eq!(cfg.typing.type_ms, 44);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::WatchOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Inclusive numeric range used for randomized particle attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Viewports at or below this width count as narrow.
    pub narrow_breakpoint_px: u32,
    /// Quiet period before a resize burst re-evaluates the viewport flag.
    pub resize_debounce_ms: u32,
    pub lazy_load: LazyLoadConfig,
    pub reveal: RevealConfig,
    pub typing: TypingConfig,
    pub counter: CounterConfig,
    pub particles: ParticleConfig,
    pub parallax: ParallaxConfig,
    pub tilt: TiltConfig,
    pub progress: ProgressConfig,
    pub hero: HeroConfig,
    pub carousel: CarouselConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            narrow_breakpoint_px: 900,
            resize_debounce_ms: 180,
            lazy_load: LazyLoadConfig::default(),
            reveal: RevealConfig::default(),
            typing: TypingConfig::default(),
            counter: CounterConfig::default(),
            particles: ParticleConfig::default(),
            parallax: ParallaxConfig::default(),
            tilt: TiltConfig::default(),
            progress: ProgressConfig::default(),
            hero: HeroConfig::default(),
            carousel: CarouselConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Media query for the narrow-viewport flag.
    #[must_use]
    pub fn narrow_query(&self) -> String {
        format!("(max-width: {}px)", self.narrow_breakpoint_px)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LazyLoadConfig {
    pub watch: WatchOptions,
}

impl Default for LazyLoadConfig {
    fn default() -> Self {
        Self {
            watch: WatchOptions::new(0.0, "200px 0px"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub watch: WatchOptions,
    pub stagger_step_ms: u32,
    /// Index at which the stagger stops growing.
    pub stagger_cap: usize,
    /// Parent classes that make reveal children a staggered group.
    pub group_classes: Vec<String>,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            watch: WatchOptions::new(0.12, "0px 0px -10% 0px"),
            stagger_step_ms: 70,
            stagger_cap: 8,
            group_classes: ["grid", "cards", "offers", "services"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    pub type_ms: u32,
    pub delete_ms: u32,
    pub pause_ms: u32,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            type_ms: 44,
            delete_ms: 28,
            pause_ms: 1100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub watch: WatchOptions,
    pub duration_ms: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            watch: WatchOptions::new(0.6, "0px"),
            duration_ms: 900.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Distance outside the canvas at which a particle wraps around.
    pub wrap_margin: f64,
    pub max_pixel_ratio: f64,
    pub radius: Bounds,
    pub speed_x: Bounds,
    pub speed_y: Bounds,
    pub alpha: Bounds,
    pub palette: Vec<String>,
    /// Fixed RNG seed; the host supplies one when absent.
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 42,
            wrap_margin: 20.0,
            max_pixel_ratio: 2.0,
            radius: Bounds::new(1.5, 4.5),
            speed_x: Bounds::new(-0.25, 0.25),
            speed_y: Bounds::new(-0.18, 0.18),
            alpha: Bounds::new(0.25, 0.8),
            palette: [
                "rgba(255,215,0,.75)",
                "rgba(212,175,55,.55)",
                "rgba(180,150,40,.35)",
                "rgba(90,90,90,.22)",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    pub default_speed: f64,
    pub scale_px: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            default_speed: 0.15,
            scale_px: 120.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    pub default_max_deg: f64,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            default_max_deg: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub watch: WatchOptions,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            watch: WatchOptions::new(0.5, "0px"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    pub play_delay_ms: u32,
    pub stagger_step_ms: u32,
    pub stagger_cap: usize,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            play_delay_ms: 50,
            stagger_step_ms: 80,
            stagger_cap: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Back-to-back copies of the partner list in the track.
    pub copies: usize,
    pub badge_label: String,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            copies: 3,
            badge_label: "Investor".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_site() {
        let cfg = OrchestratorConfig::default();
        assert_eq!(cfg.resize_debounce_ms, 180);
        assert_eq!(cfg.reveal.watch.threshold, 0.12);
        assert_eq!(cfg.reveal.watch.root_margin, "0px 0px -10% 0px");
        assert_eq!(cfg.lazy_load.watch.root_margin, "200px 0px");
        assert_eq!(cfg.counter.watch.threshold, 0.6);
        assert_eq!(cfg.particles.count, 42);
        assert_eq!(cfg.particles.palette.len(), 4);
        assert_eq!(cfg.carousel.copies, 3);
        assert_eq!(cfg.narrow_query(), "(max-width: 900px)");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = OrchestratorConfig::from_json(
            r#"{"particles":{"count":10},"reveal":{"stagger_step_ms":50}}"#,
        )
        .unwrap();
        assert_eq!(cfg.particles.count, 10);
        assert_eq!(cfg.particles.wrap_margin, 20.0);
        assert_eq!(cfg.reveal.stagger_step_ms, 50);
        assert_eq!(cfg.reveal.stagger_cap, 8);
        assert_eq!(cfg.typing, TypingConfig::default());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = OrchestratorConfig::from_json("{not json").unwrap_err();
        assert!(err.to_string().starts_with("invalid configuration JSON"));
    }

    #[test]
    fn bounds_contains_endpoints() {
        let b = Bounds::new(1.5, 4.5);
        assert!(b.contains(1.5));
        assert!(b.contains(4.5));
        assert!(!b.contains(4.6));
    }
}
