use crate::sample::Sample;
use rand::Rng;

/// Default number of samples retained for repetition.
pub const DEFAULT_CAPACITY: usize = 20_000;

/// Snapshot of repetition buffer counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepetitionStats {
    pub repeats: u64,
    pub misses: u64,
    pub overwrites: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Fixed-capacity store of previously emitted samples.
///
/// All slots are allocated up front. Until the buffer is full, inserts append;
/// afterwards every insert overwrites a uniformly chosen slot, so there is no
/// notion of "oldest" entry and no growth past `capacity`.
pub struct RepetitionBuffer {
    slots: Box<[Sample]>,
    len: usize,
    capacity: usize,
    repeats: u64,
    misses: u64,
    overwrites: u64,
}

impl RepetitionBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Sample::default(); capacity].into_boxed_slice(),
            len: 0,
            capacity,
            repeats: 0,
            misses: 0,
            overwrites: 0,
        }
    }

    /// With probability `repeat_probability`, return a uniformly chosen past sample.
    ///
    /// An empty buffer returns `None` without touching `rng`.
    pub fn maybe_repeat<R: Rng + ?Sized>(
        &mut self,
        repeat_probability: f32,
        rng: &mut R,
    ) -> Option<Sample> {
        if self.len == 0 {
            self.misses += 1;
            return None;
        }
        if rng.gen::<f32>() > 1.0 - repeat_probability {
            self.repeats += 1;
            Some(self.slots[rng.gen_range(0..self.len)])
        } else {
            self.misses += 1;
            None
        }
    }

    /// Record `sample`, appending while there is room and overwriting a random slot once full.
    pub fn insert<R: Rng + ?Sized>(&mut self, sample: Sample, rng: &mut R) {
        if self.capacity == 0 {
            return;
        }
        if self.len < self.capacity {
            self.slots[self.len] = sample;
            self.len += 1;
        } else {
            self.slots[rng.gen_range(0..self.len)] = sample;
            self.overwrites += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Occupied slots in insertion order (until the first overwrite).
    pub fn entries(&self) -> &[Sample] {
        &self.slots[..self.len]
    }

    pub fn stats(&self) -> RepetitionStats {
        RepetitionStats {
            repeats: self.repeats,
            misses: self.misses,
            overwrites: self.overwrites,
            len: self.len,
            capacity: self.capacity,
        }
    }
}
