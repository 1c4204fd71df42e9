use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LazyLoadingOptions {
    #[serde(default = "default_init_size")]
    pub init_size: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_init_size() -> usize {
    20
}
fn default_chunk_size() -> usize {
    50
}
fn default_delay_ms() -> u64 {
    50
}

impl Default for LazyLoadingOptions {
    fn default() -> Self {
        Self {
            init_size: default_init_size(),
            chunk_size: default_chunk_size(),
            delay_ms: default_delay_ms(),
        }
    }
}

/// Materializes a long source list in time-sliced chunks.
///
/// The loader hands out index ranges of the source; the caller copies them into
/// its destination. Restarting with [`LazyLoader::run`] drops whatever chunk the
/// previous fill still had pending.
#[derive(Debug)]
pub struct LazyLoader {
    options: LazyLoadingOptions,
    total: usize,
    loaded: usize,
    next_due: Option<Instant>,
    generation: u64,
}

impl LazyLoader {
    pub fn new(options: LazyLoadingOptions) -> Self {
        Self {
            options,
            total: 0,
            loaded: 0,
            next_due: None,
            generation: 0,
        }
    }

    /// Starts a new fill of `source_len` items and returns the initial slice.
    pub fn run(&mut self, source_len: usize, now: Instant) -> Range<usize> {
        self.generation += 1;
        self.total = source_len;
        self.loaded = self.options.init_size.min(source_len);
        self.next_due = self.pending_deadline(now);
        0..self.loaded
    }

    /// Returns the next chunk once its delay has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<Range<usize>> {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        let start = self.loaded;
        self.loaded = (start + self.options.chunk_size.max(1)).min(self.total);
        self.next_due = self.pending_deadline(now);
        tracing::trace!(generation = self.generation, start, end = self.loaded, "lazy chunk");
        Some(start..self.loaded)
    }

    pub fn is_loading(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    fn pending_deadline(&self, now: Instant) -> Option<Instant> {
        (self.loaded < self.total).then(|| now + Duration::from_millis(self.options.delay_ms))
    }
}
