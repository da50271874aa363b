use parking_lot::{Mutex, MutexGuard};
use std::ops::{Deref, Range};
use crate::body::RenderRecord;

/// Writer-side records of one partition
#[derive(Debug)]
struct WriterSlot {
    range: Range<usize>,
    records: Mutex<Vec<RenderRecord>>,
}

/// Double-buffered per-body render records
///
/// The writer side is split along the worker partition, each worker only ever touches its own
/// slot so the slot locks are never contended. The reader side is one snapshot behind a single
/// lock. `swap` copies every slot into the snapshot, it never exchanges buffers, because the
/// workers resume writing as soon as they are released while the consumer may still be reading.
#[derive(Debug)]
pub struct FrameChannel {
    slots: Vec<WriterSlot>,
    snapshot: Mutex<Vec<RenderRecord>>,
}

/// Read access to the last swapped frame. The snapshot lock is held for the guard's lifetime
pub struct FrameSnapshot<'a>(MutexGuard<'a, Vec<RenderRecord>>);

impl<'a> Deref for FrameSnapshot<'a> {
    type Target = [RenderRecord];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl FrameChannel {
    /// `ranges` must partition `0..initial.len()`, both sides start out holding `initial`
    pub fn new(ranges: &[Range<usize>], initial: Vec<RenderRecord>) -> Self {
        let slots = ranges.iter().map(|range| WriterSlot {
            range: range.clone(),
            records: Mutex::new(initial[range.clone()].to_vec()),
        }).collect();

        FrameChannel {
            slots: slots,
            snapshot: Mutex::new(initial),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn partitions(&self) -> usize {
        self.slots.len()
    }

    pub fn range(&self, partition: usize) -> Range<usize> {
        self.slots[partition].range.clone()
    }

    /// Writer-side records of one partition, index 0 is the first body of its range
    pub fn writer(&self, partition: usize) -> MutexGuard<'_, Vec<RenderRecord>> {
        self.slots[partition].records.lock()
    }

    /// Copies the writer side into the snapshot. Controller only, while no worker is computing
    pub fn swap(&self) {
        let mut snapshot = self.snapshot.lock();
        for slot in self.slots.iter() {
            let records = slot.records.lock();
            snapshot[slot.range.clone()].copy_from_slice(&records);
        }
    }

    pub fn read(&self) -> FrameSnapshot<'_> {
        FrameSnapshot(self.snapshot.lock())
    }
}
