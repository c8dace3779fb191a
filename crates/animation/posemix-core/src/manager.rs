//! AnimationManager: lifecycles of runs across every animated target.
//!
//! Methods:
//! - register / register_deferred: animation definitions
//! - run / run_with_id / stop: run lifecycle, replicated through a [`Synchronizer`]
//! - handle_run_packet / handle_stop_packet: inbound replication
//! - on_frame / tick: compose each target and hand the result to the [`Applier`]
//!
//! A run is an ordered list of request legs. Only the current leg is live; the
//! next one starts when the composer reports the current leg complete.

use hashbrown::HashMap;
use log::{debug, trace, warn};

use crate::applier::{Applier, PoseApplier};
use crate::composer::{AnimatorSnapshot, Composer, CompletionHandler};
use crate::config::Config;
use crate::data::AnimationData;
use crate::error::{AnimationError, Result};
use crate::ids::{AnimationId, AnimationTarget, RunId};
use crate::registry::{AnimationRegistry, AnimationSource};
use crate::request::AnimationRequest;
use crate::sync::{AnimationRunPacket, AnimationStopPacket, PacketOutbox, Synchronizer};

/// Host query used by the stale-target sweep.
pub trait EntityLiveness {
    fn is_alive(&self, entity: i64) -> bool;
}

impl<F> EntityLiveness for F
where
    F: Fn(i64) -> bool,
{
    fn is_alive(&self, entity: i64) -> bool {
        self(entity)
    }
}

#[derive(Clone, Debug)]
struct ActiveRun {
    target: AnimationTarget,
    requests: Vec<AnimationRequest>,
    cursor: usize,
    /// Replicated to peers; a local stop is replicated too.
    synchronized: bool,
}

/// Run bookkeeping, kept apart from the composers so it can receive their
/// completion notifications while they are borrowed.
#[derive(Debug, Default)]
struct RunBook {
    runs: HashMap<RunId, ActiveRun>,
    /// Runs whose next leg should start once composition is done.
    pending_legs: Vec<RunId>,
}

impl RunBook {
    /// Move the cursor to the next leg. Forgets the run and returns false
    /// when it has no legs left.
    fn advance(&mut self, run: RunId) -> bool {
        match self.runs.get_mut(&run) {
            Some(active) if active.cursor + 1 < active.requests.len() => {
                active.cursor += 1;
                debug!("run {run} advancing to leg {}", active.cursor);
                true
            }
            Some(_) => {
                self.runs.remove(&run);
                debug!("run {run} complete");
                false
            }
            None => false,
        }
    }
}

impl CompletionHandler for RunBook {
    fn on_complete(&mut self, run: RunId, complete: bool) -> bool {
        if !complete {
            if self.runs.remove(&run).is_some() {
                debug!("run {run} preempted");
            }
            return false;
        }
        if self.advance(run) {
            self.pending_legs.push(run);
            false
        } else {
            true
        }
    }
}

pub struct AnimationManager<A: Applier = PoseApplier, S: Synchronizer = PacketOutbox> {
    config: Config,
    registry: AnimationRegistry,
    composers: HashMap<AnimationTarget, Composer>,
    book: RunBook,
    applier: A,
    synchronizer: S,
    source: Option<Box<dyn AnimationSource>>,
    liveness: Option<Box<dyn EntityLiveness>>,
}

impl AnimationManager<PoseApplier, PacketOutbox> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let applier = PoseApplier::with_capacity(config.applier_capacity);
        Self::with_parts(config, applier, PacketOutbox::new())
    }
}

impl Default for AnimationManager<PoseApplier, PacketOutbox> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Applier, S: Synchronizer> AnimationManager<A, S> {
    pub fn with_parts(config: Config, applier: A, synchronizer: S) -> Self {
        Self {
            composers: HashMap::with_capacity(config.composer_capacity),
            config,
            registry: AnimationRegistry::new(),
            book: RunBook::default(),
            applier,
            synchronizer,
            source: None,
            liveness: None,
        }
    }

    /// Data provider for deferred animations.
    pub fn set_source(&mut self, source: Box<dyn AnimationSource>) {
        self.source = Some(source);
    }

    /// Liveness query for the stale-target sweep.
    pub fn set_liveness(&mut self, liveness: Box<dyn EntityLiveness>) {
        self.liveness = Some(liveness);
    }

    // ---------- Definitions ----------

    pub fn register(&mut self, id: AnimationId, data: &AnimationData) -> bool {
        self.registry.register(id, data)
    }

    pub fn register_deferred(&mut self, id: AnimationId) -> bool {
        self.registry.register_deferred(id)
    }

    // ---------- Runs ----------

    /// Start a run of `requests` on `target` under a fresh id. Synchronized runs
    /// on entity targets are broadcast through the synchronizer.
    pub fn run(
        &mut self,
        target: AnimationTarget,
        synchronize: bool,
        requests: &[AnimationRequest],
    ) -> Result<RunId> {
        let run_id = RunId::new();
        let synchronize = synchronize && !target.is_local_view();
        self.start_run(target, run_id, requests, synchronize)?;
        if synchronize {
            self.synchronizer.sync_run(&AnimationRunPacket {
                run_id,
                target,
                requests: requests.to_vec(),
            });
        }
        Ok(run_id)
    }

    /// Start a run under a known id without broadcasting it. Re-running an id
    /// that is already active does nothing.
    pub fn run_with_id(
        &mut self,
        target: AnimationTarget,
        run_id: RunId,
        requests: &[AnimationRequest],
    ) -> Result<()> {
        self.start_run(target, run_id, requests, false)
    }

    /// Stop a run wherever it got to. Unknown ids are ignored.
    pub fn stop(&mut self, run_id: RunId) {
        if let Some(active) = self.stop_local(run_id) {
            if active.synchronized {
                self.synchronizer.sync_stop(&AnimationStopPacket { run_id });
            }
        }
    }

    pub fn handle_run_packet(&mut self, packet: &AnimationRunPacket) -> Result<()> {
        self.run_with_id(packet.target, packet.run_id, &packet.requests)
    }

    pub fn handle_stop_packet(&mut self, packet: &AnimationStopPacket) {
        self.stop_local(packet.run_id);
    }

    fn start_run(
        &mut self,
        target: AnimationTarget,
        run_id: RunId,
        requests: &[AnimationRequest],
        synchronized: bool,
    ) -> Result<()> {
        if self.book.runs.contains_key(&run_id) {
            debug!("run {run_id} already active");
            return Ok(());
        }
        self.sweep_stale();
        if let Err(err) = self.check_requests(target, run_id, requests) {
            warn!("dropping run {run_id} on {target:?}: {err}");
            return Err(err);
        }

        self.book.runs.insert(
            run_id,
            ActiveRun {
                target,
                requests: requests.to_vec(),
                cursor: 0,
                synchronized,
            },
        );
        debug!("run {run_id} on {target:?} with {} legs", requests.len());
        if let Err(err) = self.start_leg(run_id) {
            warn!("dropping run {run_id} on {target:?}: {err}");
            self.book.runs.remove(&run_id);
            self.drop_if_idle(target);
            return Err(err);
        }
        // a run made only of stops on idle categories leaves nothing behind
        self.drop_if_idle(target);
        Ok(())
    }

    /// Every leg must name a resolvable animation with executable parameters.
    fn check_requests(
        &mut self,
        target: AnimationTarget,
        run_id: RunId,
        requests: &[AnimationRequest],
    ) -> Result<()> {
        if requests.is_empty() {
            return Err(AnimationError::EmptyRequest { run_id });
        }
        for request in requests {
            request.parameters.validate()?;
            let source = self.source.as_mut().map(|s| &mut **s as &mut dyn AnimationSource);
            self.registry.resolve(request.animation, target, source)?;
        }
        Ok(())
    }

    /// Start the run's current leg. Legs that turn out to be no-ops (a stop on
    /// an idle category) count as complete and the next leg starts right away.
    fn start_leg(&mut self, run_id: RunId) -> Result<()> {
        loop {
            let Some(active) = self.book.runs.get(&run_id) else {
                return Ok(());
            };
            let target = active.target;
            let request = active.requests[active.cursor];
            let source = self.source.as_mut().map(|s| &mut **s as &mut dyn AnimationSource);
            let animation = self.registry.resolve(request.animation, target, source)?;
            let composer = self.composers.entry(target).or_default();
            if composer.run(run_id, &request, animation, &mut self.book)? {
                return Ok(());
            }
            if !self.book.advance(run_id) {
                return Ok(());
            }
        }
    }

    fn start_pending_legs(&mut self) {
        for run_id in std::mem::take(&mut self.book.pending_legs) {
            if let Err(err) = self.start_leg(run_id) {
                warn!("dropping run {run_id}: {err}");
                self.book.runs.remove(&run_id);
            }
        }
    }

    fn drop_if_idle(&mut self, target: AnimationTarget) {
        if self.composers.get(&target).is_some_and(Composer::is_empty) {
            self.composers.remove(&target);
        }
    }

    fn stop_local(&mut self, run_id: RunId) -> Option<ActiveRun> {
        let active = self.book.runs.remove(&run_id)?;
        if let Some(composer) = self.composers.get_mut(&active.target) {
            composer.stop_run(run_id);
        }
        debug!("run {run_id} stopped");
        Some(active)
    }

    // ---------- Frame ----------

    /// Compose `target` for this tick and hand the result to the applier.
    pub fn on_frame(&mut self, target: AnimationTarget, dt: f32) {
        self.sweep_stale();
        self.compose_target(target, dt);
    }

    /// Start a new tick: forget last tick's frames, then compose every target.
    pub fn tick(&mut self, dt: f32) {
        self.applier.clear();
        self.sweep_stale();
        let targets: Vec<AnimationTarget> = self.composers.keys().copied().collect();
        for target in targets {
            self.compose_target(target, dt);
        }
    }

    fn compose_target(&mut self, target: AnimationTarget, dt: f32) {
        self.applier.remove_target(target);
        let Some(composer) = self.composers.get_mut(&target) else {
            return;
        };
        let frame = composer.compose(dt, &mut self.book);
        self.start_pending_legs();
        self.drop_if_idle(target);
        trace!("{target:?}: {} elements", frame.len());
        self.applier.add_animation(target, frame);
    }

    /// Drop everything pointing at dead entities: runs, composers, cached
    /// per-target animations and applier entries.
    fn sweep_stale(&mut self) {
        if !self.config.stale_sweep {
            return;
        }
        let Some(liveness) = self.liveness.as_ref() else {
            return;
        };
        let mut stale: Vec<AnimationTarget> = self
            .composers
            .keys()
            .copied()
            .chain(self.book.runs.values().map(|active| active.target))
            .filter(|target| target.entity_id().is_some_and(|entity| !liveness.is_alive(entity)))
            .collect();
        stale.sort_unstable_by_key(|target| target.entity_id());
        stale.dedup();

        for target in stale {
            let runs: Vec<RunId> = self
                .book
                .runs
                .iter()
                .filter(|(_, active)| active.target == target)
                .map(|(run_id, _)| *run_id)
                .collect();
            for run_id in runs {
                self.stop_local(run_id);
            }
            self.composers.remove(&target);
            self.registry.forget_target(target);
            self.applier.remove_target(target);
            debug!("swept stale target {target:?}");
        }
    }

    // ---------- Introspection ----------

    pub fn set_enabled(&mut self, target: AnimationTarget, category: u32, enabled: bool) -> bool {
        self.composers
            .get_mut(&target)
            .is_some_and(|composer| composer.set_enabled(category, enabled))
    }

    pub fn registered_count(&self) -> usize {
        self.registry.len()
    }

    pub fn active_run_count(&self) -> usize {
        self.book.runs.len()
    }

    pub fn is_active(&self, run_id: RunId) -> bool {
        self.book.runs.contains_key(&run_id)
    }

    pub fn target_count(&self) -> usize {
        self.composers.len()
    }

    pub fn animator_count(&self, target: AnimationTarget) -> usize {
        self.composers.get(&target).map_or(0, Composer::len)
    }

    pub fn animators(&self, target: AnimationTarget) -> Vec<AnimatorSnapshot> {
        self.composers
            .get(&target)
            .map(Composer::animators)
            .unwrap_or_default()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    pub fn applier(&self) -> &A {
        &self.applier
    }

    pub fn applier_mut(&mut self) -> &mut A {
        &mut self.applier
    }

    pub fn synchronizer(&self) -> &S {
        &self.synchronizer
    }

    pub fn synchronizer_mut(&mut self) -> &mut S {
        &mut self.synchronizer
    }
}
