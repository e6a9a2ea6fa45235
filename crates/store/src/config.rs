//! Backend selection and construction.
//!
//! No ambient container: the composition root builds a [`StoreConfig`] and
//! calls [`build_stores`], which hands back the chosen repository pair.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use jobq_core::StoreError;

use crate::disk::{DiskJobStore, DiskStatusStore};
use crate::job::{JobStore, MemoryJobStore};
use crate::status::{MemoryStatusStore, StatusStore};

/// Which repository implementation backs the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// In-process maps; state is lost when the process exits.
    Memory,
    /// Directory of files under `root_dir`; survives restarts.
    Disk,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "disk" => Ok(Backend::Disk),
            other => Err(format!("unknown backend: {other} (expected memory|disk)")),
        }
    }
}

/// Configuration surface consumed by the repository layer.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: Backend,
    /// Queue root for the disk backend; ignored by the memory backend.
    pub root_dir: PathBuf,
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory,
            root_dir: PathBuf::new(),
        }
    }

    pub fn disk(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Disk,
            root_dir: root_dir.into(),
        }
    }
}

/// Build the repository pair for the configured backend.
pub fn build_stores(
    config: &StoreConfig,
) -> Result<(Arc<dyn JobStore>, Arc<dyn StatusStore>), StoreError> {
    match config.backend {
        Backend::Memory => Ok((
            Arc::new(MemoryJobStore::new()),
            Arc::new(MemoryStatusStore::new()),
        )),
        Backend::Disk => Ok((
            Arc::new(DiskJobStore::new(&config.root_dir)?),
            Arc::new(DiskStatusStore::new(&config.root_dir)?),
        )),
    }
}
