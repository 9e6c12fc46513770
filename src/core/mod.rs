//! Core batch engines: classification, retries, scheduling, migration and
//! bulk mutation.

pub mod audit;
pub mod classifier;
pub mod error;
pub mod gateway;
pub mod migration;
pub mod mutation;
pub mod report;
pub mod retry;
pub mod scheduler;

pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink, SharedAuditSink};
pub use classifier::{classify, ErrorKind};
pub use error::{AppResult, EngineError, GatewayError};
pub use gateway::{GatewayOp, TaskGateway};
pub use migration::{MigrationEngine, MigrationItem, MIGRATE_OPERATION};
pub use mutation::{BatchMutationEngine, MutationKind};
pub use report::{
    BatchReport, ItemReport, MigrationReport, OperationOutcome, OutcomeStatus, ReasonCode,
    ReportCounts,
};
pub use retry::{RetryExecutor, RetryFailure, RetryPolicy, RetryResult, RetryState, Retried};
pub use scheduler::{BatchPlan, BatchScheduler, Pacing, RoundStats, ShrinkPolicy};
