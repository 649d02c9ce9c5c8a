use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::{
    config::model::PipelineConfig,
    foundation::error::{ErrorKind, FadeGifError, FadeGifResult},
    pipeline::{
        generate::{JobResult, run_job},
        progress::CancelFlag,
    },
};

/// Inputs of one background job.
#[derive(Clone, Debug)]
pub struct JobRequest {
    /// Source images, in animation order.
    pub inputs: Vec<PathBuf>,
    /// Destination `.gif` path.
    pub output: PathBuf,
    /// Job configuration.
    pub config: PipelineConfig,
}

/// Messages a running job sends to its owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobEvent {
    /// Progress percentage; never decreases within a job.
    Progress(u8),
    /// Final outcome; always the last event of a job.
    Finished(JobResult),
}

/// Runs generation jobs on a background thread, one at a time.
#[derive(Debug, Default)]
pub struct JobWorker {
    busy: Arc<AtomicBool>,
}

impl JobWorker {
    /// An idle worker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a job is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Start `request` on a new thread.
    ///
    /// Fails with [`FadeGifError::Busy`] while a previous job has not finished.
    pub fn start(&self, request: JobRequest) -> FadeGifResult<JobHandle> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FadeGifError::Busy);
        }

        let (tx, rx) = unbounded();
        let cancel = CancelFlag::new();
        let guard = BusyGuard(Arc::clone(&self.busy));
        let job_cancel = cancel.clone();
        let spawned = thread::Builder::new()
            .name("fadegif-job".to_string())
            .spawn(move || run_on_thread(request, tx, job_cancel, guard));

        match spawned {
            Ok(join) => Ok(JobHandle {
                events: rx,
                cancel,
                join: Some(join),
            }),
            Err(e) => Err(FadeGifError::Other(anyhow::anyhow!(
                "spawn job thread: {e}"
            ))),
        }
    }
}

/// Clears the busy flag when the job thread is done, even on panic.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn run_on_thread(request: JobRequest, tx: Sender<JobEvent>, cancel: CancelFlag, guard: BusyGuard) {
    let progress_tx = tx.clone();
    let mut on_progress = move |p: u8| {
        // A dropped receiver only means nobody is listening.
        let _ = progress_tx.send(JobEvent::Progress(p));
    };
    let result: JobResult = run_job(
        &request.inputs,
        &request.output,
        &request.config,
        &mut on_progress,
        &cancel,
    )
    .into();

    if let JobResult::Failure { kind, message } = &result {
        tracing::warn!(?kind, %message, "job failed");
    }
    // Idle before the final event is observable.
    drop(guard);
    let _ = tx.send(JobEvent::Finished(result));
}

/// Owner side of a running job.
#[derive(Debug)]
pub struct JobHandle {
    events: Receiver<JobEvent>,
    cancel: CancelFlag,
    join: Option<JoinHandle<()>>,
}

impl JobHandle {
    /// Event stream of the job; ends after [`JobEvent::Finished`].
    pub fn events(&self) -> &Receiver<JobEvent> {
        &self.events
    }

    /// Ask the job to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the job finishes and return its result.
    ///
    /// Progress events still queued are discarded.
    pub fn wait(mut self) -> JobResult {
        self.wait_with(|_| {})
    }

    /// Block until the job finishes, handing each progress event to `on_progress`.
    pub fn wait_with(&mut self, mut on_progress: impl FnMut(u8)) -> JobResult {
        let mut result = None;
        for event in self.events.iter() {
            match event {
                JobEvent::Progress(p) => on_progress(p),
                JobEvent::Finished(r) => {
                    result = Some(r);
                    break;
                }
            }
        }
        if let Some(join) = self.join.take()
            && join.join().is_err()
            && result.is_none()
        {
            tracing::error!("job thread panicked");
        }
        result.unwrap_or_else(|| JobResult::Failure {
            kind: ErrorKind::Internal,
            message: "job thread exited without a result".to_string(),
        })
    }
}
