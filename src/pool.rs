use std::{
    sync::{Arc, atomic::Ordering, mpsc::SyncSender},
    thread::JoinHandle,
};
use crate::{
    barrier::CyclicBarrier,
    collision::CollisionEvent,
    error::FieldError,
    physics::CycleInputs,
    worker::{FieldState, Worker},
};

/// Fixed set of worker threads, one per body partition, stepping in lockstep with the controller
///
/// A cycle is launched by publishing its inputs and releasing the barrier, and finished by waiting
/// for every worker at the barrier. The pool never has more than one cycle in flight.
pub struct WorkerPool {
    state: Arc<FieldState>,
    events: SyncSender<CollisionEvent>,
    barrier: Option<Arc<CyclicBarrier>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(state: Arc<FieldState>, events: SyncSender<CollisionEvent>) -> Self {
        WorkerPool {
            state: state,
            events: events,
            barrier: None,
            handles: Vec::new(),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.state.partitions.len()
    }

    pub fn is_running(&self) -> bool {
        self.barrier.is_some()
    }

    /// Spawns the workers, which immediately compute a first cycle with `inputs`
    ///
    /// Starting a running pool does nothing. With zero partitions the pool runs without threads.
    pub fn start(&mut self, inputs: CycleInputs) -> Result<(), FieldError> {
        if self.is_running() {
            return Ok(())
        }

        let workers = self.worker_count();
        let barrier = Arc::new(CyclicBarrier::new(workers));
        *self.state.cycle.write() = Arc::new(inputs);
        self.state.running.store(true, Ordering::Release);
        self.barrier = Some(Arc::clone(&barrier));

        for index in 0..workers {
            let worker = Worker::new(index, Arc::clone(&self.state), Arc::clone(&barrier), self.events.clone());
            match worker.spawn() {
                Ok(handle) => self.handles.push(handle),
                Err(source) => {
                    // the workers already spawned are waiting on parties that will never arrive
                    self.state.running.store(false, Ordering::Release);
                    barrier.force_release();
                    self.join_all();
                    self.barrier = None;
                    return Err(FieldError::Spawn { index, source })
                }
            }
        }

        log::info!(
            "worker pool started with {} workers over {} bodies ({} per worker)",
            workers,
            self.state.body_count(),
            self.state.params.bodies_per_worker,
        );
        Ok(())
    }

    /// Lets the cycle in flight complete, then shuts the workers down and joins them
    ///
    /// Panics if a worker panicked.
    pub fn stop(&mut self) {
        let barrier = match self.barrier.take() {
            Some(barrier) => barrier,
            None => return,
        };

        barrier.await_all();
        self.state.running.store(false, Ordering::Release);
        barrier.force_release();
        self.join_all();

        log::info!("worker pool stopped");
    }

    /// Blocks until the cycle in flight is complete. Returns false if the pool is not running
    pub(crate) fn finish_cycle(&self) -> bool {
        match self.barrier.as_ref() {
            Some(barrier) => {
                barrier.await_all();
                true
            },
            None => false,
        }
    }

    /// Publishes the next cycle's inputs and releases the workers
    ///
    /// Waits for the cycle in flight first, a no-op after `finish_cycle`.
    pub(crate) fn launch_cycle(&self, inputs: CycleInputs) {
        if let Some(barrier) = self.barrier.as_ref() {
            barrier.await_all();
            *self.state.cycle.write() = Arc::new(inputs);
            barrier.release();
        }
    }

    fn join_all(&mut self) {
        let mut panicked = 0;
        for handle in self.handles.drain(..) {
            let name = handle.thread().name().unwrap_or("belt-worker").to_string();
            if handle.join().is_err() {
                log::error!("{} panicked and could not be joined", name);
                panicked += 1;
            }
        }
        if panicked > 0 && !std::thread::panicking() {
            panic!("{} worker thread(s) panicked", panicked);
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}
