pub mod adapters;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod metrics;
pub mod model;
pub mod report;
pub mod scheduler;

pub use command::{CommandRunner, Invocation, SystemCommandRunner};
pub use config::{Config, SAMPLE_INTERVAL};
pub use error::{CoreError, Result};
pub use host::{HostProbe, SysinfoHost};
pub use metrics::SnapshotAssembler;
pub use model::*;
pub use report::{reporter_for, JsonReporter, Reporter, TextReporter};
pub use scheduler::{Scheduler, SchedulerStats, TickGuard};
