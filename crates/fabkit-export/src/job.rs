//! Export jobs and their handles.
//!
//! An [`ExportJob`] is validated by [`ExportJob::prepare`] and runs on one
//! named worker thread after [`ExportJob::spawn`]. Callers observe it through
//! a [`JobHandle`], which never blocks unless `wait` is used.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use fabkit_core::{
    CancelTokens, ExportError, ExportEvent, ExportEventBus, ExportResult, JobId, JobOutcome,
    JobState, OutputKind, ProgressChannel,
};
use parking_lot::{Condvar, Mutex, RwLock};

use crate::config::ExportConfig;
use crate::drivers::{self, Driver, StageContext};
use crate::source::ExportSource;
use crate::writer::CommitGate;

/// State shared between a worker and every handle to its job
#[derive(Debug)]
struct JobShared {
    id: JobId,
    kind: OutputKind,
    destination: PathBuf,
    tokens: CancelTokens,
    progress: ProgressChannel,
    gate: CommitGate,
    state: RwLock<JobState>,
    outcome: Mutex<Option<JobOutcome>>,
    finished: Condvar,
}

/// Observable side of one export job
///
/// Cheap to clone; all clones see the same job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    shared: Arc<JobShared>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.shared.id
    }

    /// Output kind inferred from the destination suffix
    pub fn kind(&self) -> OutputKind {
        self.shared.kind
    }

    pub fn destination(&self) -> &Path {
        &self.shared.destination
    }

    /// Latest progress percentage
    pub fn progress(&self) -> u8 {
        self.shared.progress.percent()
    }

    /// Whether the worker has finished with the progress channel
    pub fn is_progress_closed(&self) -> bool {
        self.shared.progress.is_closed()
    }

    pub fn state(&self) -> JobState {
        *self.shared.state.read()
    }

    /// Request cancellation
    ///
    /// Sets the soft and hard tokens and returns immediately. Repeated
    /// calls have no further effect, and a call arriving after the
    /// artifact was committed is ignored.
    pub fn cancel(&self) {
        if self.shared.tokens.is_cancelled() {
            return;
        }
        if self.shared.gate.cancel(&self.shared.tokens) {
            tracing::debug!(job_id = %self.shared.id.short(), "cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.tokens.is_cancelled()
    }

    /// Terminal outcome, once the job has finished
    pub fn outcome(&self) -> Option<JobOutcome> {
        self.shared.outcome.lock().clone()
    }

    /// Block until the job finishes
    pub fn wait(&self) -> JobOutcome {
        let mut outcome = self.shared.outcome.lock();
        loop {
            if let Some(done) = outcome.as_ref() {
                return done.clone();
            }
            self.shared.finished.wait(&mut outcome);
        }
    }

    /// Block until the job finishes or `timeout` elapses
    pub fn wait_timeout(&self, timeout: Duration) -> Option<JobOutcome> {
        let mut outcome = self.shared.outcome.lock();
        if outcome.is_none() {
            self.shared
                .finished
                .wait_while_for(&mut outcome, |o| o.is_none(), timeout);
        }
        outcome.clone()
    }
}

/// A validated export that has not started yet
#[derive(Debug)]
pub struct ExportJob {
    shared: Arc<JobShared>,
    source: ExportSource,
    config: ExportConfig,
    driver: &'static Driver,
    bus: Arc<ExportEventBus>,
}

impl ExportJob {
    /// Validate a request and build a job in state `Created`
    ///
    /// Fails with `UnsupportedFormat` when no driver handles the
    /// destination suffix for this source, and with
    /// `InvalidConfiguration` when the options do not suit the kind.
    pub fn prepare(
        source: impl Into<ExportSource>,
        destination: impl AsRef<Path>,
        config: ExportConfig,
        bus: Arc<ExportEventBus>,
    ) -> ExportResult<Self> {
        let source = source.into();
        let destination = destination.as_ref().to_path_buf();

        let kind = OutputKind::from_path(&destination)?;
        let driver = drivers::lookup(source.kind(), kind).ok_or_else(|| {
            ExportError::UnsupportedFormat {
                extension: kind.extension().to_string(),
            }
        })?;
        config.validate_for(kind, &source)?;

        let shared = Arc::new(JobShared {
            id: JobId::new(),
            kind,
            destination,
            tokens: CancelTokens::new(),
            progress: ProgressChannel::new(),
            gate: CommitGate::new(),
            state: RwLock::new(JobState::Created),
            outcome: Mutex::new(None),
            finished: Condvar::new(),
        });
        tracing::debug!(job_id = %shared.id.short(), driver = driver.name, "export job prepared");

        Ok(Self {
            shared,
            source,
            config,
            driver,
            bus,
        })
    }

    pub fn handle(&self) -> JobHandle {
        JobHandle {
            shared: self.shared.clone(),
        }
    }

    /// Start the worker thread
    pub fn spawn(self) -> ExportResult<JobHandle> {
        let handle = self.handle();
        let name = format!("export-{}", self.shared.id.short());
        let destination = self.shared.destination.clone();
        std::thread::Builder::new()
            .name(name)
            .spawn(move || self.run())
            .map_err(|e| ExportError::io(&destination, e))?;
        Ok(handle)
    }

    fn run(self) {
        let shared = &self.shared;
        let job_id = shared.id.short();
        tracing::info!(
            job_id = %job_id,
            kind = %shared.kind,
            destination = %shared.destination.display(),
            "export started"
        );

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.execute())) {
            Ok(result) => JobOutcome::from_result(result),
            // artifact already committed
            Err(_) if shared.gate.is_committed() => {
                tracing::error!(job_id = %job_id, "event handler panicked after commit");
                JobOutcome::Completed
            }
            Err(payload) => JobOutcome::Failed(ExportError::worker_panic(payload.as_ref())),
        };
        match &outcome {
            JobOutcome::Completed => tracing::info!(job_id = %job_id, "export completed"),
            JobOutcome::Cancelled => tracing::warn!(job_id = %job_id, "export cancelled"),
            JobOutcome::Failed(err) => tracing::error!(job_id = %job_id, error = %err, "export failed"),
        }
        self.finish(outcome);
    }

    /// Announce the job and run its driver
    fn execute(&self) -> ExportResult<()> {
        let shared = &self.shared;
        *shared.state.write() = JobState::Running;
        self.bus
            .publish(ExportEvent::Started {
                job: shared.id,
                kind: shared.kind,
                destination: shared.destination.clone(),
            })
            .ok();

        if shared.tokens.is_cancelled() {
            return Err(ExportError::Cancelled);
        }
        let ctx = StageContext::new(
            shared.id,
            &shared.destination,
            &shared.tokens,
            &shared.progress,
            &shared.gate,
            &self.bus,
        );
        (self.driver.run)(&ctx, &self.source, &self.config)
    }

    /// Close progress, publish the outcome, then wake waiters
    fn finish(&self, outcome: JobOutcome) {
        let shared = &self.shared;
        shared.progress.close();
        *shared.state.write() = outcome.state();
        let event = ExportEvent::Finished {
            job: shared.id,
            outcome: outcome.clone(),
        };
        if panic::catch_unwind(AssertUnwindSafe(|| self.bus.publish(event))).is_err() {
            tracing::error!(job_id = %shared.id.short(), "event handler panicked on job finish");
        }

        let mut cell = shared.outcome.lock();
        *cell = Some(outcome);
        shared.finished.notify_all();
    }
}
