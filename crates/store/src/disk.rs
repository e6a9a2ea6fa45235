//! Directory-of-files backends.
//!
//! Layout under the queue root:
//!
//! ```text
//! <root>/job/<job_id>                   pending jobs
//! <root>/history/<job_id>               popped jobs
//! <root>/status/<job_id>/<status_id>    status reports
//! <root>/result/<job_id>/<result_id>.json  uploaded results
//! ```
//!
//! Each file holds one msgpack-encoded record. The pending→historical
//! transition is a single `rename` into the history directory, so a crash
//! mid-pop can never leave a job in both partitions or neither. Records are
//! also written via a dot-prefixed temp file plus rename; directory scans
//! skip dot-prefixed names.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use jobq_core::{JobId, JobResult, SerializedJob, SerializedJobStatus, StoreError, codec};

use crate::job::{JobStore, JobStoreState, pop_order_key};
use crate::status::{StatusStore, StatusStoreState, sort_results, sort_statuses};

const QUEUE_DIR: &str = "job";
const HISTORY_DIR: &str = "history";
const STATUS_DIR: &str = "status";
const RESULT_DIR: &str = "result";
const RESULT_EXT: &str = "json";

fn write_record<T: Serialize>(dir: &Path, file_name: &str, record: &T) -> Result<(), StoreError> {
    let raw = codec::encode(record)?;
    let tmp = dir.join(format!(".{file_name}.tmp"));
    fs::write(&tmp, &raw)?;
    fs::rename(&tmp, dir.join(file_name))?;
    Ok(())
}

fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match fs::read(path) {
        Ok(raw) => Ok(Some(codec::decode(&raw)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn visible_entries(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut paths = Vec::new();
    if !dir.is_dir() {
        return Ok(paths);
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        paths.push(entry.path());
    }
    Ok(paths)
}

fn read_records<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, StoreError> {
    let mut records = Vec::new();
    for path in visible_entries(dir)? {
        if let Some(record) = read_record(&path)? {
            records.push(record);
        }
    }
    Ok(records)
}

fn clear_dir(dir: &Path) -> Result<(), StoreError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Persistent job repository; survives restarts and is shareable with other
/// readers of the same root directory.
#[derive(Debug)]
pub struct DiskJobStore {
    root: PathBuf,
    // Serializes pops so two callers cannot select the same candidate. The
    // actual partition move is a single rename.
    pop_lock: Mutex<()>,
}

impl DiskJobStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(root.join(QUEUE_DIR))?;
        fs::create_dir_all(root.join(HISTORY_DIR))?;
        Ok(Self {
            root,
            pop_lock: Mutex::new(()),
        })
    }

    fn queue_dir(&self) -> PathBuf {
        self.root.join(QUEUE_DIR)
    }

    fn history_dir(&self) -> PathBuf {
        self.root.join(HISTORY_DIR)
    }
}

impl JobStore for DiskJobStore {
    fn job_exists(&self, job_id: &JobId) -> Result<bool, StoreError> {
        Ok(self.queue_dir().join(job_id.as_str()).is_file()
            || self.history_dir().join(job_id.as_str()).is_file())
    }

    fn add_job(&self, job: SerializedJob) -> Result<(), StoreError> {
        debug!(job_id = %job.job_id, job_type = %job.job_type, nice = job.nice, "enqueue job");
        write_record(&self.queue_dir(), job.job_id.as_str(), &job)
    }

    fn get_job(&self, job_id: &JobId) -> Result<Option<SerializedJob>, StoreError> {
        if let Some(job) = read_record(&self.queue_dir().join(job_id.as_str()))? {
            return Ok(Some(job));
        }
        read_record(&self.history_dir().join(job_id.as_str()))
    }

    fn list_jobs(&self) -> Result<Vec<SerializedJob>, StoreError> {
        let mut jobs: Vec<SerializedJob> = read_records(&self.queue_dir())?;
        jobs.extend(read_records::<SerializedJob>(&self.history_dir())?);
        Ok(jobs)
    }

    fn pop_highest_priority_job(
        &self,
        job_type: Option<&str>,
    ) -> Result<Option<SerializedJob>, StoreError> {
        let _guard = self.pop_lock.lock().unwrap();
        let candidate = read_records::<SerializedJob>(&self.queue_dir())?
            .into_iter()
            .filter(|job| job_type.map_or(true, |t| job.job_type == t))
            .min_by_key(pop_order_key);

        let Some(job) = candidate else {
            return Ok(None);
        };
        fs::rename(
            self.queue_dir().join(job.job_id.as_str()),
            self.history_dir().join(job.job_id.as_str()),
        )?;
        debug!(job_id = %job.job_id, job_type = %job.job_type, "popped job");
        Ok(Some(job))
    }

    fn snapshot(&self) -> Result<JobStoreState, StoreError> {
        let mut queue: Vec<SerializedJob> = read_records(&self.queue_dir())?;
        let mut history: Vec<SerializedJob> = read_records(&self.history_dir())?;
        queue.sort_by(|a, b| a.job_id.cmp(&b.job_id));
        history.sort_by(|a, b| a.job_id.cmp(&b.job_id));
        Ok(JobStoreState { queue, history })
    }

    fn restore(&self, state: JobStoreState) -> Result<(), StoreError> {
        clear_dir(&self.queue_dir())?;
        clear_dir(&self.history_dir())?;
        for job in &state.queue {
            write_record(&self.queue_dir(), job.job_id.as_str(), job)?;
        }
        for job in &state.history {
            write_record(&self.history_dir(), job.job_id.as_str(), job)?;
        }
        Ok(())
    }
}

/// Persistent status/result repository sharing the same root as
/// [`DiskJobStore`].
#[derive(Debug)]
pub struct DiskStatusStore {
    root: PathBuf,
}

impl DiskStatusStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(root.join(STATUS_DIR))?;
        fs::create_dir_all(root.join(RESULT_DIR))?;
        Ok(Self { root })
    }

    fn status_dir(&self, job_id: &JobId) -> PathBuf {
        self.root.join(STATUS_DIR).join(job_id.as_str())
    }

    fn result_dir(&self, job_id: &JobId) -> PathBuf {
        self.root.join(RESULT_DIR).join(job_id.as_str())
    }
}

impl StatusStore for DiskStatusStore {
    fn add_status(&self, status: SerializedJobStatus) -> Result<(), StoreError> {
        let dir = self.status_dir(&status.job_id);
        fs::create_dir_all(&dir)?;
        debug!(job_id = %status.job_id, status = %status.status, "append status");
        write_record(&dir, status.status_id.as_str(), &status)
    }

    fn list_status(&self, job_id: &JobId) -> Result<Vec<SerializedJobStatus>, StoreError> {
        let mut statuses: Vec<SerializedJobStatus> = read_records(&self.status_dir(job_id))?;
        sort_statuses(&mut statuses);
        Ok(statuses)
    }

    fn add_result(&self, result: JobResult) -> Result<(), StoreError> {
        let dir = self.result_dir(&result.job_id);
        fs::create_dir_all(&dir)?;
        debug!(job_id = %result.job_id, result_id = %result.result_id, "append result");
        let file_name = format!("{}.{RESULT_EXT}", result.result_id);
        write_record(&dir, &file_name, &result)
    }

    fn list_results(&self, job_id: &JobId) -> Result<Vec<JobResult>, StoreError> {
        let mut results: Vec<JobResult> = read_records(&self.result_dir(job_id))?;
        sort_results(&mut results);
        Ok(results)
    }

    fn snapshot(&self) -> Result<StatusStoreState, StoreError> {
        let mut state = StatusStoreState::default();
        for dir in visible_entries(&self.root.join(STATUS_DIR))? {
            let mut statuses: Vec<SerializedJobStatus> = read_records(&dir)?;
            statuses.sort_by(|a, b| a.status_id.cmp(&b.status_id));
            if let Some(first) = statuses.first() {
                state
                    .status_history
                    .insert(first.job_id.clone(), statuses);
            }
        }
        for dir in visible_entries(&self.root.join(RESULT_DIR))? {
            let mut results: Vec<JobResult> = read_records(&dir)?;
            results.sort_by(|a, b| a.result_id.cmp(&b.result_id));
            if let Some(first) = results.first() {
                state.result_history.insert(first.job_id.clone(), results);
            }
        }
        Ok(state)
    }

    fn restore(&self, state: StatusStoreState) -> Result<(), StoreError> {
        clear_dir(&self.root.join(STATUS_DIR))?;
        clear_dir(&self.root.join(RESULT_DIR))?;
        for status in state.status_history.values().flatten() {
            self.add_status(status.clone())?;
        }
        for result in state.result_history.values().flatten() {
            self.add_result(result.clone())?;
        }
        Ok(())
    }
}
