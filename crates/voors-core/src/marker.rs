//! Attribute-marker contract between the page markup and the runtime.
//!
//! Each [`Marker`] names one selector hook. The browser host resolves it with
//! [`Marker::css`]; the headless page matches it structurally.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `img[data-src]`
    LazyImage,
    /// `[data-burger]`
    Burger,
    /// `[data-mobile]`
    MobilePanel,
    /// `a`
    Link,
    /// `a[href^="#"]`
    InPageAnchor,
    /// `.reveal`
    Reveal,
    /// `[data-typing]`
    Typing,
    /// `[data-counter]`
    Counter,
    /// `#particles-canvas`
    ParticlesCanvas,
    /// `[data-parallax]`
    Parallax,
    /// `[data-tilt]`
    Tilt,
    /// `[data-animate]`
    Animate,
    /// `section`
    Section,
    /// `[data-width]`
    ProgressBar,
    /// `input, textarea, select`
    FormControl,
    /// `.hero`
    Hero,
    /// `.hero video`
    HeroVideo,
    /// `video`
    Video,
    /// `.hero .reveal, .hero .hero__content > *`
    HeroCascade,
    /// `.logos-track`
    LogosTrack,
    /// `[data-lang-switch]`
    LangSwitch,
    /// `[data-i18n]`
    I18n,
}

impl Marker {
    /// CSS selector for `querySelectorAll` / `closest`.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::LazyImage => "img[data-src]",
            Self::Burger => "[data-burger]",
            Self::MobilePanel => "[data-mobile]",
            Self::Link => "a",
            Self::InPageAnchor => "a[href^=\"#\"]",
            Self::Reveal => ".reveal",
            Self::Typing => "[data-typing]",
            Self::Counter => "[data-counter]",
            Self::ParticlesCanvas => "#particles-canvas",
            Self::Parallax => "[data-parallax]",
            Self::Tilt => "[data-tilt]",
            Self::Animate => "[data-animate]",
            Self::Section => "section",
            Self::ProgressBar => "[data-width]",
            Self::FormControl => "input, textarea, select",
            Self::Hero => ".hero",
            Self::HeroVideo => ".hero video",
            Self::Video => "video",
            Self::HeroCascade => ".hero .reveal, .hero .hero__content > *",
            Self::LogosTrack => ".logos-track",
            Self::LangSwitch => "[data-lang-switch]",
            Self::I18n => "[data-i18n]",
        }
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.css())
    }
}
