//! Request shapes consumed by the services.

use chrono::{DateTime, Utc};

use crate::id::JobId;
use crate::model::{JobBody, StatusKind};

/// Submit a job whose body still needs serializing through the registry.
#[derive(Debug, Clone)]
pub struct NewJobRequest {
    pub job_type: String,
    pub job_body: JobBody,
    pub nice: i32,
}

impl NewJobRequest {
    pub fn new(job_type: impl Into<String>, job_body: JobBody) -> Self {
        Self {
            job_type: job_type.into(),
            job_body,
            nice: 0,
        }
    }

    pub fn with_nice(mut self, nice: i32) -> Self {
        self.nice = nice;
        self
    }
}

/// Submit a job whose body is already serialized; the registry is skipped.
#[derive(Debug, Clone)]
pub struct NewSerializedJobRequest {
    pub job_type: String,
    pub job_body_serialized: Vec<u8>,
    pub nice: i32,
}

impl NewSerializedJobRequest {
    pub fn new(job_type: impl Into<String>, job_body_serialized: Vec<u8>) -> Self {
        Self {
            job_type: job_type.into(),
            job_body_serialized,
            nice: 0,
        }
    }

    pub fn with_nice(mut self, nice: i32) -> Self {
        self.nice = nice;
        self
    }
}

/// Record a status transition for an existing job.
///
/// `issue_time` defaults to the current time when absent. `result` is an
/// optional inline payload; `None` records "no result attached".
#[derive(Debug, Clone)]
pub struct NewJobStatusRequest {
    pub job_id: JobId,
    pub status: StatusKind,
    pub issue_time: Option<DateTime<Utc>>,
    pub detail: String,
    pub result: Option<JobBody>,
}

impl NewJobStatusRequest {
    pub fn new(job_id: JobId, status: StatusKind, detail: impl Into<String>) -> Self {
        Self {
            job_id,
            status,
            issue_time: None,
            detail: detail.into(),
            result: None,
        }
    }

    pub fn at(mut self, issue_time: DateTime<Utc>) -> Self {
        self.issue_time = Some(issue_time);
        self
    }

    pub fn with_result(mut self, result: JobBody) -> Self {
        self.result = Some(result);
        self
    }
}

/// Upload a result blob for an existing job.
#[derive(Debug, Clone)]
pub struct NewJobResultRequest {
    pub job_id: JobId,
    pub issue_time: Option<DateTime<Utc>>,
    pub result_bytes: Vec<u8>,
}

impl NewJobResultRequest {
    pub fn new(job_id: JobId, result_bytes: Vec<u8>) -> Self {
        Self {
            job_id,
            issue_time: None,
            result_bytes,
        }
    }

    pub fn at(mut self, issue_time: DateTime<Utc>) -> Self {
        self.issue_time = Some(issue_time);
        self
    }
}
