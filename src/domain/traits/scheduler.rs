/// JobScheduler trait - abstraction for the scheduled-job library
///
/// The job worker only ever asks the scheduler to run whatever is due.
/// Job registration and timing bookkeeping belong to the implementation.
pub trait JobScheduler: Send + Sync {
    /// Execute every job whose interval has elapsed since its last run
    fn run_pending(&self);
}
