//! The job/status/result data model.
//!
//! Each entity comes in two flavors: a domain form carrying an opaque
//! [`JobBody`] payload, and a serialized form carrying the raw bytes a
//! registered serializer produced. Repositories only ever see the serialized
//! forms; the services translate between the two through the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::datetime_tag;
use crate::id::{JobId, ResultId, StatusId};

/// Opaque application payload. The queue never interprets it; it only
/// round-trips it through whatever serializer the job type is bound to.
pub type JobBody = serde_json::Value;

/// Lifecycle status of a job, as reported by workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusKind {
    Initial,
    Pending,
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StatusKind::Initial => "INITIAL",
            StatusKind::Pending => "PENDING",
            StatusKind::Running => "RUNNING",
            StatusKind::Completed => "COMPLETED",
            StatusKind::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for StatusKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INITIAL" => Ok(StatusKind::Initial),
            "PENDING" => Ok(StatusKind::Pending),
            "RUNNING" => Ok(StatusKind::Running),
            "COMPLETED" => Ok(StatusKind::Completed),
            "FAILED" => Ok(StatusKind::Failed),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// A unit of work with its payload in domain form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    /// Selects the serializer and is the pop filter key.
    pub job_type: String,
    pub job_body: JobBody,
    /// Signed priority; lower pops first. Defaults to 0.
    pub nice: i32,
    /// Stamped at creation; tie-break key for equal-`nice` pops.
    #[serde(with = "datetime_tag")]
    pub created_time: DateTime<Utc>,
}

/// A unit of work as the repositories store it: body already serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedJob {
    pub job_id: JobId,
    pub job_type: String,
    pub job_body_serialized: Vec<u8>,
    pub nice: i32,
    #[serde(with = "datetime_tag")]
    pub created_time: DateTime<Utc>,
}

/// One point-in-time status report for a job, payload in domain form.
///
/// `result` is `None` when no result was attached — distinct from
/// `Some` of an empty payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub status_id: StatusId,
    pub job_id: JobId,
    #[serde(with = "datetime_tag")]
    pub issue_time: DateTime<Utc>,
    pub status: StatusKind,
    pub detail: String,
    pub result: Option<JobBody>,
}

/// A status report as the repositories store it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedJobStatus {
    pub status_id: StatusId,
    pub job_id: JobId,
    #[serde(with = "datetime_tag")]
    pub issue_time: DateTime<Utc>,
    pub status: StatusKind,
    pub detail: String,
    /// `None` means "no result attached", `Some(vec![])` an empty result.
    pub result_serialized: Option<Vec<u8>>,
}

/// One uploaded result blob for a job.
///
/// Results arrive pre-serialized (workers upload bytes); deserialization is
/// an optional, registry-driven step on the way out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub result_id: ResultId,
    pub job_id: JobId,
    #[serde(with = "datetime_tag")]
    pub issue_time: DateTime<Utc>,
    pub result_serialized: Vec<u8>,
}
