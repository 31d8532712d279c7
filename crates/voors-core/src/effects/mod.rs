#![forbid(unsafe_code)]

//! The page's sub-behaviors, one [`Effect`](crate::Effect) each.
//!
//! | Effect | Marker | Decorative |
//! |---|---|---|
//! | [`LazyLoad`] | `img[data-src]` | no |
//! | [`Navigation`] | `[data-burger]`, `[data-mobile]`, `a[href^="#"]` | no |
//! | [`Reveal`] | `.reveal` | no |
//! | [`Typing`] | `[data-typing]` | no |
//! | [`Counters`] | `[data-counter]` | no |
//! | [`Particles`] | `#particles-canvas` | yes |
//! | [`Parallax`] | `[data-parallax]` | yes |
//! | [`Tilt`] | `[data-tilt]` | yes |
//! | [`MicroInteractions`] | `[data-animate]` | yes |
//! | [`SectionAccent`] | `section` | yes |
//! | [`ProgressBars`] | `[data-width]` | no |
//! | [`FocusStyling`] | `input, textarea, select` | no |
//! | [`Hero`] | `.hero`, `video` | yes |
//! | [`LogoCarousel`] | `.logos-track` | no |
//! | [`PageVisibility`] | document | no |
//! | [`ViewportWatch`] | window | no |

pub mod carousel;
pub mod counters;
pub mod focus;
pub mod hero;
pub mod lazy_load;
pub mod navigation;
pub mod page;
pub mod parallax;
pub mod particles;
pub mod progress;
pub mod reveal;
pub mod tilt;
pub mod typing;

pub use carousel::{LogoCarousel, PARTNERS, Partner, PartnerKind};
pub use counters::Counters;
pub use focus::FocusStyling;
pub use hero::Hero;
pub use lazy_load::LazyLoad;
pub use navigation::Navigation;
pub use page::{MicroInteractions, PageVisibility, SectionAccent, ViewportWatch};
pub use parallax::Parallax;
pub use particles::{Particle, ParticleField, Particles};
pub use progress::ProgressBars;
pub use reveal::Reveal;
pub use tilt::Tilt;
pub use typing::{Typing, TypingCycle, TypingStep};

use crate::effect::Effect;

/// The full effect set in activation order.
#[must_use]
pub fn standard_effects() -> Vec<Box<dyn Effect>> {
    vec![
        Box::new(LazyLoad::default()),
        Box::new(Navigation::default()),
        Box::new(Reveal::default()),
        Box::new(Typing::default()),
        Box::new(Counters::default()),
        Box::new(Particles::default()),
        Box::new(Parallax::default()),
        Box::new(Tilt::default()),
        Box::new(MicroInteractions::default()),
        Box::new(SectionAccent),
        Box::new(ProgressBars::default()),
        Box::new(FocusStyling::default()),
        Box::new(Hero::default()),
        Box::new(LogoCarousel),
        Box::new(PageVisibility::default()),
        Box::new(ViewportWatch::default()),
    ]
}
