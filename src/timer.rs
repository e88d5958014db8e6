use std::time::Instant;

/// Monotonic counter the frame clock samples.
pub trait TickSource {
    /// Ticks per second. Never zero.
    fn frequency(&self) -> u64;
    fn now(&self) -> u64;
}

/// Nanosecond ticks since construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTicks {
    origin: Instant,
}

impl MonotonicTicks {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MonotonicTicks {
    fn frequency(&self) -> u64 {
        1_000_000_000
    }

    fn now(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Per-frame delta time.
#[derive(Debug)]
pub struct Clock<S: TickSource = MonotonicTicks> {
    source: S,
    frequency: u64,
    last: u64,
    delta: f32,
}

impl<S: TickSource> Clock<S> {
    pub fn new(source: S) -> Self {
        let frequency = source.frequency();
        let last = source.now();
        Self {
            source,
            frequency,
            last,
            delta: 0.0,
        }
    }

    pub fn tick(&mut self) {
        let current = self.source.now();
        self.delta = current.saturating_sub(self.last) as f32 / self.frequency as f32;
        self.last = current;
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn reset(&mut self) {
        self.last = self.source.now();
        self.delta = 0.0;
    }

    /// Seconds since the last tick or reset, without consuming them.
    pub fn since_last(&self) -> f32 {
        self.source.now().saturating_sub(self.last) as f32 / self.frequency as f32
    }
}
