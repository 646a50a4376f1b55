pub mod context;
pub mod cycle;
pub mod scheduler;
pub mod state_machine;

pub use context::OracleContext;
pub use cycle::{run_cycle, run_cycle_tracked, CycleOutcome, UpdateProgress};
pub use scheduler::{initial_delay, run_with_deadline, Scheduler, SchedulerStats};
