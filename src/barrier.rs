use parking_lot::{Condvar, Mutex};

/// Identifies one cycle of a `CyclicBarrier`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    shutdown: bool,
}

/// Reusable rendezvous between a fixed number of workers and one controller
///
/// Workers call `mark_done` once per cycle and then block in `await_release`. The controller
/// blocks in `await_all` until every worker has arrived and then calls `release` to begin the
/// next cycle. Only one cycle is ever outstanding.
///
/// `force_release` is for shutdown. It is sticky: once called, no wait on this barrier blocks again.
#[derive(Debug)]
pub struct CyclicBarrier {
    parties: usize,
    state: Mutex<BarrierState>,
    all_done: Condvar,
    released: Condvar,
}

impl CyclicBarrier {
    pub fn new(parties: usize) -> Self {
        CyclicBarrier {
            parties: parties,
            state: Mutex::new(BarrierState { arrived: 0, generation: 0, shutdown: false }),
            all_done: Condvar::new(),
            released: Condvar::new(),
        }
    }

    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Number of workers that reached the barrier in the current cycle
    pub fn arrived(&self) -> usize {
        self.state.lock().arrived
    }

    pub fn generation(&self) -> Generation {
        Generation(self.state.lock().generation)
    }

    pub fn is_shutdown(&self) -> bool {
        self.state.lock().shutdown
    }

    /// Worker side. Records the arrival and returns the generation to wait on
    pub fn mark_done(&self) -> Generation {
        let mut state = self.state.lock();
        state.arrived += 1;
        if state.arrived >= self.parties {
            self.all_done.notify_all();
        }
        Generation(state.generation)
    }

    /// Worker side. Blocks until the cycle `generation` is released
    pub fn await_release(&self, generation: Generation) {
        let mut state = self.state.lock();
        while state.generation == generation.0 && !state.shutdown {
            self.released.wait(&mut state);
        }
    }

    /// Controller side. Blocks until every worker marked the current cycle done
    pub fn await_all(&self) {
        let mut state = self.state.lock();
        while state.arrived < self.parties && !state.shutdown {
            self.all_done.wait(&mut state);
        }
    }

    /// Controller side. Starts the next cycle
    pub fn release(&self) {
        let mut state = self.state.lock();
        if state.arrived < self.parties {
            log::warn!("barrier released with {} of {} workers done", state.arrived, self.parties);
        }
        state.arrived = 0;
        state.generation = state.generation.wrapping_add(1);
        self.released.notify_all();
    }

    /// Wakes every waiter regardless of arrivals, and keeps doing so from now on
    pub fn force_release(&self) {
        let mut state = self.state.lock();
        state.shutdown = true;
        state.generation = state.generation.wrapping_add(1);
        self.released.notify_all();
        self.all_done.notify_all();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::{sync::{Arc, atomic::{AtomicUsize, Ordering}}, thread, time::Duration};

    #[test]
    fn test_await_all_counts_arrivals() {
        let barrier = CyclicBarrier::new(3);
        barrier.mark_done();
        barrier.mark_done();
        assert_eq!(barrier.arrived(), 2);
        barrier.mark_done();
        // must not block with all three arrived
        barrier.await_all();
        barrier.release();
        assert_eq!(barrier.arrived(), 0);
    }

    #[test]
    fn test_zero_parties_never_blocks() {
        let barrier = CyclicBarrier::new(0);
        barrier.await_all();
        barrier.release();
    }

    #[test]
    fn test_release_wakes_waiting_workers() {
        let workers = 4;
        let cycles = 50;
        let barrier = Arc::new(CyclicBarrier::new(workers));
        let work = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..workers).map(|_| {
            let barrier = Arc::clone(&barrier);
            let work = Arc::clone(&work);
            thread::spawn(move || {
                for _ in 0..cycles {
                    work.fetch_add(1, Ordering::SeqCst);
                    let generation = barrier.mark_done();
                    barrier.await_release(generation);
                }
            })
        }).collect();

        for cycle in 1..=cycles {
            barrier.await_all();
            // every worker finished this cycle and none has started the next one
            assert_eq!(work.load(Ordering::SeqCst), cycle * workers);
            barrier.release();
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_await_all_blocks_until_last_arrival() {
        let barrier = Arc::new(CyclicBarrier::new(2));
        barrier.mark_done();

        let late = {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                barrier.mark_done();
            })
        };

        barrier.await_all();
        assert_eq!(barrier.arrived(), 2);
        late.join().unwrap();
    }

    #[test]
    fn test_force_release_wakes_blocked_workers() {
        let barrier = Arc::new(CyclicBarrier::new(3));

        // two workers wait for a release that never comes, the third never arrives
        let handles: Vec<_> = (0..2).map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let generation = barrier.mark_done();
                barrier.await_release(generation);
            })
        }).collect();

        while barrier.arrived() < 2 {
            thread::yield_now();
        }
        barrier.force_release();

        for handle in handles {
            handle.join().unwrap();
        }

        // sticky, later waits return straight away
        assert!(barrier.is_shutdown());
        barrier.await_all();
        let generation = barrier.mark_done();
        barrier.await_release(generation);
    }
}
