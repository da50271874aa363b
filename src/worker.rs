use glam::DVec3;
use parking_lot::{Mutex, RwLock};
use std::{
    io,
    ops::Range,
    sync::{Arc, atomic::{AtomicBool, Ordering}, mpsc::{SyncSender, TrySendError}},
    thread::{self, JoinHandle},
};
use crate::{
    barrier::CyclicBarrier,
    body::{Body, BodyConfig},
    channel::FrameChannel,
    collision::CollisionEvent,
    config::SimParams,
    physics::{self, CycleInputs, StepContext},
};

/// Splits `0..len` into contiguous runs of at most `per_worker` slots
///
/// The runs cover every slot exactly once, in order. Zero slots gives zero runs.
pub fn partition(len: usize, per_worker: usize) -> Vec<Range<usize>> {
    let per_worker = per_worker.max(1);
    (0..len).step_by(per_worker)
        .map(|start| start..(start + per_worker).min(len))
        .collect()
}

/// Body states of one worker's slots
///
/// Only that worker locks it while the pool cycles. The controller locks it between cycles.
#[derive(Debug)]
pub struct BodyPartition {
    pub range: Range<usize>,
    pub bodies: Mutex<Vec<Body>>,
}

/// State shared by the controller and every worker of a field
#[derive(Debug)]
pub struct FieldState {
    pub params: SimParams,
    pub orbit_factor: f64,
    pub attractor_mass: f64,
    pub attractor_radius: f64,
    pub configs: Vec<BodyConfig>,
    pub partitions: Vec<BodyPartition>,
    pub channel: FrameChannel,
    pub camera: Mutex<DVec3>, // display units
    pub cycle: RwLock<Arc<CycleInputs>>,
    pub running: AtomicBool,
}

impl FieldState {
    pub fn body_count(&self) -> usize {
        self.configs.len()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Stops the whole pool if a worker unwinds, so a panic surfaces at join instead of hanging `await_all`
///
/// The running flag drops before the barrier opens, so no surviving worker starts another cycle.
struct PanicRelease<'a> {
    state: &'a FieldState,
    barrier: &'a CyclicBarrier,
}

impl<'a> Drop for PanicRelease<'a> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.state.running.store(false, Ordering::Release);
            self.barrier.force_release();
        }
    }
}

/// One worker thread and the slots it owns
pub struct Worker {
    index: usize,
    range: Range<usize>,
    state: Arc<FieldState>,
    barrier: Arc<CyclicBarrier>,
    events: SyncSender<CollisionEvent>,
    pending: Vec<CollisionEvent>,
}

impl Worker {
    pub fn new(index: usize, state: Arc<FieldState>, barrier: Arc<CyclicBarrier>, events: SyncSender<CollisionEvent>) -> Self {
        let range = state.partitions[index].range.clone();
        Worker {
            index: index,
            range: range,
            state: state,
            barrier: barrier,
            events: events,
            pending: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("belt-worker-{}", self.index))
            .spawn(move || self.run())
    }

    /// Computing, then done at the barrier, then waiting for release, until the running flag drops
    fn run(mut self) {
        log::debug!("worker {} entering loop over {:?}", self.index, self.range);
        let barrier = Arc::clone(&self.barrier);
        let state = Arc::clone(&self.state);
        let _guard = PanicRelease { state: &state, barrier: &barrier };

        loop {
            if !self.state.is_running() {
                break
            }
            self.compute_cycle();
            let generation = barrier.mark_done();
            barrier.await_release(generation);
        }

        log::debug!("worker {} leaving loop", self.index);
    }

    /// Steps every body of this worker's range once and writes its records
    pub fn compute_cycle(&mut self) {
        let inputs = Arc::clone(&*self.state.cycle.read());
        let camera = *self.state.camera.lock();
        let state = &*self.state;

        let ctx = StepContext {
            params: &state.params,
            inputs: &inputs,
            orbit_factor: state.orbit_factor,
            attractor_mass: state.attractor_mass,
            attractor_radius: state.attractor_radius,
            camera: camera,
        };

        {
            let mut bodies = state.partitions[self.index].bodies.lock();
            let mut records = state.channel.writer(self.index);
            let configs = &state.configs[self.range.clone()];
            physics::step_range(&ctx, self.range.start, &mut bodies, configs, &mut records, &mut self.pending);
        }

        let mut dropped = 0;
        for event in self.pending.drain(..) {
            match self.events.try_send(event) {
                Ok(()) => {},
                Err(TrySendError::Full(_)) => dropped += 1,
                // nobody listening any more, the field is going away
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
        if dropped > 0 {
            log::debug!("worker {} dropped {} undrained collision events", self.index, dropped);
        }
    }
}
