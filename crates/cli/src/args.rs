use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use jobq_core::{JobId, StatusKind};
use jobq_store::Backend;

#[derive(Parser, Debug)]
#[command(name = "jobq", about, long_about = None, version)]
pub(crate) struct Args {
    /// Repository backend.
    #[arg(long, default_value = "disk", value_parser = Backend::from_str)]
    pub(crate) store: Backend,
    /// Queue root directory for the disk backend.
    #[arg(long, default_value = ".jobq")]
    pub(crate) root: PathBuf,
    /// Emit log lines as JSON instead of human-readable text.
    #[arg(long, default_value_t)]
    pub(crate) log_json: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Enqueue a job. The body is JSON, from --body or stdin; --raw
    /// submits pre-serialized bytes from a file instead.
    Submit {
        job_type: String,
        /// Inline JSON body.
        #[arg(short, long, conflicts_with = "raw")]
        body: Option<String>,
        /// File of already-serialized body bytes.
        #[arg(long)]
        raw: Option<PathBuf>,
        /// Priority; lower pops first.
        #[arg(short, long, default_value_t = 0)]
        nice: i32,
    },
    /// Pop the next job and write its body bytes out.
    Pop {
        /// Only pop jobs of this type.
        #[arg(short = 't', long)]
        job_type: Option<String>,
        /// Write the body here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Record a status transition for a job.
    PostStatus {
        job_id: JobId,
        #[arg(value_parser = StatusKind::from_str)]
        status: StatusKind,
        #[arg(short, long, default_value = "")]
        detail: String,
    },
    /// Show the latest status of a job.
    Status { job_id: JobId },
    /// Upload a result for a job, from a file or stdin.
    Upload {
        job_id: JobId,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Download a result for a job and write its bytes out.
    Download {
        job_id: JobId,
        /// Signed 1-based recency index: 1 is the newest, -1 the oldest.
        #[arg(short = 'k', long, default_value_t = 1)]
        index: i64,
        /// Write the result here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List all jobs, pending and historical.
    List,
    /// Write a full-state snapshot to a file or stdout.
    Export {
        output: Option<PathBuf>,
    },
    /// Replace the queue state with a previously exported snapshot.
    Import {
        input: Option<PathBuf>,
    },
}
