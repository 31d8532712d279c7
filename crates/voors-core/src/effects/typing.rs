#![forbid(unsafe_code)]

//! Typing text: cycles through a pipe-separated list of phrases.
//!
//! # Cycle
//!
//! For a phrase `s` of `n` characters the displayed sequence is
//!
//! ```text
//! s[..1], s[..2], …, s[..n]   (typing, type_ms apart)
//! pause_ms
//! s[..n-1], …, s[..0]         (deleting, delete_ms apart)
//! ```
//!
//! then the next phrase starts from `s[..1]`, wrapping after the last one.
//! Slicing is by `char`, never by byte.

use crate::config::TypingConfig;
use crate::effect::{Effect, EffectCx};
use crate::event::{Dispatch, HostEvent};
use crate::host::{ElementId, TimerHandle};
use crate::marker::Marker;

/// One displayed state and the wait before the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingStep {
    pub text: String,
    pub delay_ms: u32,
}

#[derive(Debug, Clone)]
pub struct TypingCycle {
    phrases: Vec<String>,
    phrase: usize,
    chars: usize,
    deleting: bool,
}

impl TypingCycle {
    /// Parse `data-typing-strings`. Entries are trimmed; empty ones dropped.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let phrases: Vec<String> = raw
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if phrases.is_empty() {
            return None;
        }
        Some(Self {
            phrases,
            phrase: 0,
            chars: 0,
            deleting: false,
        })
    }

    #[must_use]
    pub fn first(&self) -> &str {
        &self.phrases[0]
    }

    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Advance one character (forward or backward).
    pub fn step(&mut self, timing: &TypingConfig) -> TypingStep {
        let current = &self.phrases[self.phrase];
        let len = current.chars().count();

        if self.deleting {
            self.chars = self.chars.saturating_sub(1);
            let text = current.chars().take(self.chars).collect();
            if self.chars == 0 {
                self.deleting = false;
                self.phrase = (self.phrase + 1) % self.phrases.len();
            }
            TypingStep {
                text,
                delay_ms: timing.delete_ms,
            }
        } else {
            self.chars += 1;
            let text = current.chars().take(self.chars).collect();
            if self.chars >= len {
                self.deleting = true;
                TypingStep {
                    text,
                    delay_ms: timing.pause_ms,
                }
            } else {
                TypingStep {
                    text,
                    delay_ms: timing.type_ms,
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Typing {
    target: Option<ElementId>,
    cycle: Option<TypingCycle>,
    timer: Option<TimerHandle>,
}

impl Typing {
    fn tick(&mut self, cx: &mut EffectCx<'_>) {
        let (Some(el), Some(cycle)) = (self.target, self.cycle.as_mut()) else {
            return;
        };
        let step = cycle.step(&cx.config.typing);
        cx.host.set_text(el, &step.text);
        self.timer = cx.set_timeout(step.delay_ms);
    }
}

impl Effect for Typing {
    fn name(&self) -> &'static str {
        "typing"
    }

    fn activate(&mut self, cx: &mut EffectCx<'_>) {
        let Some(el) = cx.host.query(Marker::Typing) else {
            return;
        };
        let raw = cx
            .host
            .attribute(el, "data-typing-strings")
            .unwrap_or_default();
        let Some(cycle) = TypingCycle::parse(&raw) else {
            return;
        };

        if cx.reduced_motion() {
            cx.host.set_text(el, cycle.first());
            return;
        }

        self.target = Some(el);
        self.cycle = Some(cycle);
        self.tick(cx);
    }

    fn on_event(&mut self, cx: &mut EffectCx<'_>, event: &HostEvent) -> Dispatch {
        match event {
            HostEvent::Timer { handle } if Some(*handle) == self.timer => {
                self.timer = None;
                self.tick(cx);
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
    use pretty_assertions::assert_eq;

    fn run(cycle: &mut TypingCycle, steps: usize) -> Vec<TypingStep> {
        let timing = TypingConfig::default();
        (0..steps).map(|_| cycle.step(&timing)).collect()
    }

    #[test]
    fn parse_trims_and_drops_empty_entries() {
        let cycle = TypingCycle::parse(" Acier | |Bois|").unwrap();
        assert_eq!(cycle.phrases(), ["Acier".to_string(), "Bois".to_string()]);
        assert!(TypingCycle::parse(" | ").is_none());
        assert!(TypingCycle::parse("").is_none());
    }

    #[test]
    fn full_cycle_sequence_and_delays() {
        let mut cycle = TypingCycle::parse("abc|de").unwrap();
        let steps = run(&mut cycle, 9);
        let texts: Vec<&str> = steps.iter().map(|s| s.text.as_str()).collect();
        let delays: Vec<u32> = steps.iter().map(|s| s.delay_ms).collect();
        assert_eq!(texts, vec!["a", "ab", "abc", "ab", "a", "", "d", "de", "d"]);
        assert_eq!(delays, vec![44, 44, 1100, 28, 28, 28, 44, 1100, 28]);
    }

    #[test]
    fn loop_restarts_identically() {
        let mut cycle = TypingCycle::parse("xy").unwrap();
        let first = run(&mut cycle, 4);
        let second = run(&mut cycle, 4);
        assert_eq!(first, second);
    }

    #[test]
    fn slices_by_char_not_byte() {
        let mut cycle = TypingCycle::parse("été").unwrap();
        let texts: Vec<String> = run(&mut cycle, 3).into_iter().map(|s| s.text).collect();
        assert_eq!(texts, vec!["é", "ét", "été"]);
    }

    #[test]
    fn single_char_phrase_pauses_then_clears() {
        let mut cycle = TypingCycle::parse("x").unwrap();
        let steps = run(&mut cycle, 3);
        assert_eq!(steps[0], TypingStep { text: "x".into(), delay_ms: 1100 });
        assert_eq!(steps[1], TypingStep { text: String::new(), delay_ms: 28 });
        assert_eq!(steps[2], TypingStep { text: "x".into(), delay_ms: 1100 });
    }
}
