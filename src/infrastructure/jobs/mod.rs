//! In-process job scheduler
//!
//! Minimal interval scheduler behind the [`JobScheduler`] seam. The job
//! worker in the runtime only calls `run_pending`; registering jobs is up
//! to the embedding application.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::domain::traits::JobScheduler;

struct Job {
    name: String,
    every: Duration,
    last_run: Instant,
    run: Box<dyn Fn() + Send>,
}

/// Interval jobs executed from the runtime's job worker.
#[derive(Default)]
pub struct InProcessScheduler {
    jobs: Mutex<Vec<Job>>,
}

impl InProcessScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job to run every `every`, counted from now.
    pub fn every(&self, name: impl Into<String>, every: Duration, run: impl Fn() + Send + 'static) {
        let name = name.into();
        info!("scheduled job \"{}\" every {:?}", name, every);
        let Ok(mut jobs) = self.jobs.lock() else { return };
        jobs.push(Job {
            name,
            every,
            last_run: Instant::now(),
            run: Box::new(run),
        });
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().map(|jobs| jobs.len()).unwrap_or(0)
    }
}

impl JobScheduler for InProcessScheduler {
    fn run_pending(&self) {
        let Ok(mut jobs) = self.jobs.lock() else { return };
        let now = Instant::now();
        for job in jobs.iter_mut() {
            if now.duration_since(job.last_run) >= job.every {
                debug!("running job \"{}\"", job.name);
                (job.run)();
                job.last_run = now;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn due_jobs_run_and_reset() {
        let scheduler = InProcessScheduler::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_job = Arc::clone(&calls);
        scheduler.every("tick", Duration::ZERO, move || {
            calls_job.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.run_pending();
        scheduler.run_pending();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn not_yet_due_jobs_are_skipped() {
        let scheduler = InProcessScheduler::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_job = Arc::clone(&calls);
        scheduler.every("slow", Duration::from_secs(3600), move || {
            calls_job.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.run_pending();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.job_count(), 1);
    }
}
