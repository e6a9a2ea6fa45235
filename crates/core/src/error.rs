//! Error taxonomy for the queue.

use thiserror::Error;

use crate::id::JobId;

/// Result type used across the queue services.
pub type QueueResult<T> = Result<T, QueueError>;

/// Caller-facing error.
///
/// Every variant is a recoverable, caller-correctable condition; none of them
/// is retried internally.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The referenced job ID was never created (or is unknown to this store).
    #[error("job with id {0} not found")]
    JobNotFound(JobId),

    /// A pop found no pending job matching the filter. Normal outcome for a
    /// polling worker, not a fault.
    #[error("{}", empty_queue_message(.job_type.as_deref()))]
    EmptyQueue { job_type: Option<String> },

    /// The job type was never registered with a serializer.
    #[error("no serializer registered for job type {0:?}")]
    SerializerNotFound(String),

    /// A registered serializer rejected a payload.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The backing store failed (I/O, record codec).
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn empty_queue_message(job_type: Option<&str>) -> String {
    match job_type {
        Some(t) => format!("no pending job with job type {t:?}"),
        None => "no jobs in queue".to_string(),
    }
}

/// Storage-level error, shared by the in-memory and disk backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode record: {0}")]
    Encode(String),

    #[error("failed to decode record: {0}")]
    Decode(String),
}
