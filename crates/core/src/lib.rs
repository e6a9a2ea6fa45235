//! `jobq-core` — domain foundation for the job queue.
//!
//! This crate contains **pure domain** primitives (no storage concerns):
//! typed identifiers, the job/status/result data model, request shapes,
//! the error taxonomy, and the record codec shared by every backend.

pub mod codec;
pub mod error;
pub mod id;
pub mod model;
pub mod request;
pub mod time;

pub use error::{QueueError, QueueResult, StoreError};
pub use id::{JobId, ResultId, StatusId};
pub use model::{
    Job, JobBody, JobResult, JobStatus, SerializedJob, SerializedJobStatus, StatusKind,
};
pub use request::{
    NewJobRequest, NewJobResultRequest, NewJobStatusRequest, NewSerializedJobRequest,
};
