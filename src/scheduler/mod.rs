//! Fixed-interval driver of the reconciliation cycle.
//!
//! One cycle is: collect a snapshot from the engine, extract the manifest,
//! publish it. Cycles never overlap; the scheduler sleeps for the whole
//! interval after each one, whether it succeeded or not.
use std::fmt;
use std::time::Duration;

use crate::engine::SnapshotProvider;
use crate::manifest::{self, ManifestPublisher};

mod error;

pub use error::CycleError;

/// Stage of the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Collecting,
    Extracting,
    Publishing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Collecting => "collecting",
            Phase::Extracting => "extracting",
            Phase::Publishing => "publishing",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub containers: usize,
    pub apps: usize,
}

/// Suspends the scheduler between cycles.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&mut self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

pub struct Scheduler<P, S = TokioSleeper> {
    provider: P,
    publisher: ManifestPublisher,
    interval: Duration,
    sleeper: S,
    phase: Phase,
}

impl<P> Scheduler<P, TokioSleeper>
where
    P: SnapshotProvider,
{
    pub fn new(provider: P, publisher: ManifestPublisher, interval: Duration) -> Self {
        Self {
            provider,
            publisher,
            interval,
            sleeper: TokioSleeper,
            phase: Phase::Idle,
        }
    }
}

impl<P, S> Scheduler<P, S>
where
    P: SnapshotProvider,
    S: Sleeper,
{
    /// Replaces the sleeper, e.g. to run cycles without real-time delay.
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> Scheduler<P, T> {
        Scheduler {
            provider: self.provider,
            publisher: self.publisher,
            interval: self.interval,
            sleeper,
            phase: self.phase,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Runs cycles forever, starting immediately.
    ///
    /// Cycle failures are logged and retried after the next interval; they
    /// never end the loop.
    pub async fn run(&mut self) {
        log::info!(
            "Publishing apps to `{}` every {}s",
            self.publisher.path().display(),
            self.interval.as_secs()
        );
        loop {
            let outcome = self.run_cycle().await;
            self.report(&outcome);
            self.sleeper.sleep(self.interval).await;
        }
    }

    /// Runs exactly `cycles` cycles, sleeping between them but not after the
    /// last one.
    pub async fn run_cycles(&mut self, cycles: usize) -> Vec<Result<CycleReport, CycleError>> {
        let mut outcomes = Vec::with_capacity(cycles);
        for n in 0..cycles {
            if n > 0 {
                self.sleeper.sleep(self.interval).await;
            }
            let outcome = self.run_cycle().await;
            self.report(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Runs a single cycle: collect, extract, publish.
    ///
    /// The scheduler is back in [`Phase::Idle`] when this returns, also on error.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Collect`] if the snapshot could not be obtained and
    /// [`CycleError::Publish`] if the manifest could not be written. Nothing is
    /// published in either case.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        log::info!("Run started");
        let outcome = self.cycle().await;
        self.enter(Phase::Idle);
        outcome
    }

    fn report(&self, outcome: &Result<CycleReport, CycleError>) {
        match outcome {
            Ok(report) => log::info!(
                "Run finished: {} apps from {} containers",
                report.apps,
                report.containers
            ),
            Err(err) => log::warn!(
                "Run failed while {}, retrying in {}s: {}",
                err.phase(),
                self.interval.as_secs(),
                err
            ),
        }
    }

    async fn cycle(&mut self) -> Result<CycleReport, CycleError> {
        self.enter(Phase::Collecting);
        let containers = self
            .provider
            .list_containers()
            .await
            .map_err(CycleError::Collect)?;

        self.enter(Phase::Extracting);
        let manifest = manifest::reconcile(&containers);

        self.enter(Phase::Publishing);
        self.publisher
            .publish(&manifest)
            .map_err(CycleError::Publish)?;

        Ok(CycleReport {
            containers: containers.len(),
            apps: manifest.len(),
        })
    }

    fn enter(&mut self, phase: Phase) {
        log::trace!("{} -> {}", self.phase, phase);
        self.phase = phase;
    }
}
