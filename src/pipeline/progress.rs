use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::foundation::error::{FadeGifError, FadeGifResult};

/// Share of the bar covered by image loading.
pub const LOAD_SHARE: u8 = 50;

/// Monotonic percentage reporter.
///
/// Forwards a value only when it is larger than the last one sent. Values are clamped to
/// `0..=100`, and anything short of [`ProgressTracker::finish`] is held at 99.
pub struct ProgressTracker<'a> {
    sink: &'a mut (dyn FnMut(u8) + Send),
    last: Option<u8>,
}

impl<'a> ProgressTracker<'a> {
    /// Start a job: reports 0.
    pub fn start(sink: &'a mut (dyn FnMut(u8) + Send)) -> Self {
        let mut tracker = Self { sink, last: None };
        tracker.emit(0);
        tracker
    }

    /// Report `pct`, ignoring regressions.
    pub fn report(&mut self, pct: u8) {
        self.emit(pct.min(99));
    }

    /// First half: `done` of `total` images loaded.
    pub fn loaded(&mut self, done: usize, total: usize) {
        self.report(scaled(done, total, 0, LOAD_SHARE));
    }

    /// Second half: `done` of `total` processing units finished.
    pub fn processed(&mut self, done: usize, total: usize) {
        self.report(scaled(done, total, LOAD_SHARE, 100 - LOAD_SHARE));
    }

    /// Report 100. Call only once the output is in place.
    pub fn finish(&mut self) {
        self.emit(100);
    }

    fn emit(&mut self, pct: u8) {
        let pct = pct.min(100);
        if self.last.is_some_and(|last| pct <= last) {
            return;
        }
        self.last = Some(pct);
        (self.sink)(pct);
    }
}

fn scaled(done: usize, total: usize, base: u8, span: u8) -> u8 {
    if total == 0 {
        return base.saturating_add(span);
    }
    let done = done.min(total) as u64;
    let add = done * u64::from(span) / total as u64;
    base.saturating_add(add as u8)
}

/// Cooperative cancellation shared between a job and its owner.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag that has not been raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the job to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancellation was requested.
    pub fn check(&self) -> FadeGifResult<()> {
        if self.is_cancelled() {
            return Err(FadeGifError::Cancelled);
        }
        Ok(())
    }
}
