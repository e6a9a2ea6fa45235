//! `jobq-store` — repository layer for the job queue.
//!
//! Two repositories, each with an in-memory and a directory-of-files backend
//! implementing identical semantics:
//!
//! * [`JobStore`] — owns the pending/historical job partitions and the
//!   priority-pop algorithm.
//! * [`StatusStore`] — owns the append-only per-job status and result
//!   histories.
//!
//! [`snapshot`] provides the symmetric dump/load format shared by both
//! backends; [`config`] provides the backend selector and factory.

pub mod config;
pub mod disk;
pub mod job;
pub mod snapshot;
pub mod status;

pub use config::{Backend, StoreConfig, build_stores};
pub use disk::{DiskJobStore, DiskStatusStore};
pub use job::{JobStore, JobStoreState, MemoryJobStore};
pub use status::{MemoryStatusStore, StatusStore, StatusStoreState};
