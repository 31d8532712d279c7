#![forbid(unsafe_code)]

//! The animation orchestrator: owns every page effect and their resources.
//!
//! # Usage
//!
//! ```ignore
//! let mut orchestrator = AnimationOrchestrator::new(OrchestratorConfig::default());
//! orchestrator.init(host);
//! // host callbacks:
//! let outcome = orchestrator.dispatch(host, &event);
//! // page unload:
//! let report = orchestrator.destroy(host);
//! ```
//!
//! # Invariants
//!
//! 1. `init` on an active orchestrator is ignored.
//! 2. Under reduced motion, decorative effects are never activated.
//! 3. Events are delivered only to the effect that owns the handle, and only
//!    while active.
//! 4. `destroy` releases every resource exactly once; a second call returns an
//!    empty report.
//!
//! # Failure Modes
//!
//! - A host that refuses a resource leaves that effect partially active; the
//!   refusal is logged and the other effects are unaffected.
//! - A failing teardown action is recorded in the [`TeardownReport`] and does
//!   not stop the remaining actions.

use tracing::{debug, info, trace};

use crate::config::OrchestratorConfig;
use crate::effect::{Effect, EffectCx};
use crate::effects::standard_effects;
use crate::env::Environment;
use crate::event::{Dispatch, EventSink, HostEvent};
use crate::host::Host;
use crate::ledger::{ResourceLedger, TeardownReport};

pub const REDUCED_MOTION_CLASS: &str = "reduced-motion";
pub const NO_CURSOR_CLASS: &str = "no-custom-cursor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Active,
    Destroyed,
}

pub struct AnimationOrchestrator {
    config: OrchestratorConfig,
    env: Environment,
    effects: Vec<Box<dyn Effect>>,
    active: Vec<bool>,
    ledger: ResourceLedger,
    phase: Phase,
}

impl std::fmt::Debug for AnimationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.effects.iter().map(|e| e.name()).collect();
        f.debug_struct("AnimationOrchestrator")
            .field("phase", &self.phase)
            .field("env", &self.env)
            .field("effects", &names)
            .field("ledger", &self.ledger)
            .finish()
    }
}

impl Default for AnimationOrchestrator {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}

impl AnimationOrchestrator {
    /// Orchestrator driving the full page effect set.
    #[must_use]
    pub fn new(config: OrchestratorConfig) -> Self {
        Self::with_effects(config, standard_effects())
    }

    /// Orchestrator driving a custom effect set, in activation order.
    #[must_use]
    pub fn with_effects(config: OrchestratorConfig, effects: Vec<Box<dyn Effect>>) -> Self {
        let active = vec![false; effects.len()];
        Self {
            config,
            env: Environment::default(),
            effects,
            active,
            ledger: ResourceLedger::new(),
            phase: Phase::Idle,
        }
    }

    #[inline]
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.env
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Names of the effects that were activated by the last `init`.
    #[must_use]
    pub fn active_effects(&self) -> Vec<&'static str> {
        self.effects
            .iter()
            .zip(&self.active)
            .filter(|(_, on)| **on)
            .map(|(e, _)| e.name())
            .collect()
    }

    pub fn init(&mut self, host: &mut dyn Host) {
        if self.phase == Phase::Active {
            debug!("orchestrator already active; init ignored");
            return;
        }
        self.ledger.reopen();
        self.env = Environment::detect(host, &self.config);

        let root = host.root();
        host.toggle_class(root, REDUCED_MOTION_CLASS, self.env.reduced_motion);
        if let Some(body) = host.body() {
            host.add_class(body, NO_CURSOR_CLASS);
        }

        for (owner, effect) in self.effects.iter_mut().enumerate() {
            if self.env.reduced_motion && effect.decorative() {
                trace!(effect = effect.name(), "skipped under reduced motion");
                self.active[owner] = false;
                continue;
            }
            let name = effect.name();
            let mut cx = EffectCx::new(
                host,
                &mut self.env,
                &self.config,
                &mut self.ledger,
                owner,
                name,
            );
            effect.activate(&mut cx);
            self.active[owner] = true;
        }

        self.phase = Phase::Active;
        info!(
            reduced_motion = self.env.reduced_motion,
            narrow = self.env.narrow_viewport,
            frames = self.ledger.active_frames(),
            timers = self.ledger.active_timers(),
            watchers = self.ledger.active_watchers(),
            listeners = self.ledger.active_listeners(),
            "animations initialized"
        );
    }

    /// Release every resource and deactivate every effect.
    pub fn destroy(&mut self, host: &mut dyn Host) -> TeardownReport {
        if self.phase != Phase::Active {
            return TeardownReport::default();
        }
        let report = self.ledger.release_all(host);
        for (effect, on) in self.effects.iter_mut().zip(self.active.iter_mut()) {
            if *on {
                effect.deactivate();
                *on = false;
            }
        }
        self.phase = Phase::Destroyed;
        info!(
            actions = report.actions_run,
            failures = report.failures.len(),
            "animations destroyed"
        );
        report
    }
}

impl EventSink for AnimationOrchestrator {
    fn dispatch(&mut self, host: &mut dyn Host, event: &HostEvent) -> Dispatch {
        if self.phase != Phase::Active {
            return Dispatch::default();
        }
        let Some(owner) = self.ledger.route(event) else {
            return Dispatch::default();
        };
        let Some(effect) = self.effects.get_mut(owner) else {
            return Dispatch::default();
        };
        let name = effect.name();
        let mut cx = EffectCx::new(
            host,
            &mut self.env,
            &self.config,
            &mut self.ledger,
            owner,
            name,
        );
        effect.on_event(&mut cx, event)
    }
}
