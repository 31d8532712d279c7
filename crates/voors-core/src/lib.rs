#![forbid(unsafe_code)]

//! Core: host abstraction, resource ledger, motion math, and page effects.
//!
//! Everything in this crate is platform-agnostic. Components never touch the
//! browser directly; they are handed a [`Host`] on every call, ask it for
//! resources (frame requests, timers, visibility watchers, listeners), and
//! receive the resulting callbacks as [`HostEvent`]s through
//! [`EventSink::dispatch`].
//!
//! # Lifecycle
//!
//! ```text
//! init(host) ──► activate effects ──► dispatch(host, event)* ──► destroy(host)
//! ```
//!
//! The [`ResourceLedger`] records every resource acquired along the way so
//! that [`AnimationOrchestrator::destroy`] can release all of them together.

pub mod config;
pub mod effect;
pub mod effects;
pub mod env;
pub mod error;
pub mod event;
pub mod host;
pub mod ledger;
pub mod marker;
pub mod motion;
pub mod orchestrator;
pub mod storage;

pub use config::{ConfigError, OrchestratorConfig};
pub use effect::{Effect, EffectCx, Watched};
pub use env::Environment;
pub use error::{HostError, Result};
pub use event::{Dispatch, DomEvent, EventSink, HostEvent};
pub use host::{
    Dot, ElementId, EventKind, EventTarget, FrameHandle, Host, ListenerId, Rect, ScrollBehavior,
    TimerHandle, WatchOptions, WatcherId,
};
pub use ledger::{Owner, ResourceLedger, TeardownReport};
pub use marker::Marker;
pub use orchestrator::AnimationOrchestrator;
pub use storage::{KeyValueStore, MemoryStore};
