//! Serializer registry: the single polymorphism seam of the queue.
//!
//! A job type string maps to one [`JobSerializer`]. The queue core never
//! inspects a body or a result; it only round-trips bytes through whatever
//! serializer the job's type is bound to.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use jobq_core::{JobBody, QueueError, QueueResult};

/// Converts opaque bodies and results to and from bytes for one job type.
///
/// Result payloads default to the body encoding; implementors with a
/// different result wire format override the `_result` pair.
pub trait JobSerializer: Send + Sync {
    fn serialize(&self, body: &JobBody) -> QueueResult<Vec<u8>>;

    fn deserialize(&self, raw: &[u8]) -> QueueResult<JobBody>;

    fn serialize_result(&self, result: &JobBody) -> QueueResult<Vec<u8>> {
        self.serialize(result)
    }

    fn deserialize_result(&self, raw: &[u8]) -> QueueResult<JobBody> {
        self.deserialize(raw)
    }
}

/// JSON body encoding; the default serializer for most job types.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonJobSerializer;

impl JobSerializer for JsonJobSerializer {
    fn serialize(&self, body: &JobBody) -> QueueResult<Vec<u8>> {
        serde_json::to_vec(body).map_err(|e| QueueError::Serialization(e.to_string()))
    }

    fn deserialize(&self, raw: &[u8]) -> QueueResult<JobBody> {
        serde_json::from_slice(raw).map_err(|e| QueueError::Serialization(e.to_string()))
    }
}

/// Maps job types to serializers. Purely a mapping construct; no ordering
/// guarantees.
#[derive(Default)]
pub struct SerializerRegistry {
    serializers: RwLock<HashMap<String, Arc<dyn JobSerializer>>>,
}

impl SerializerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a serializer with a job type, replacing any previous
    /// association. Always succeeds.
    pub fn register(&self, job_type: impl Into<String>, serializer: Arc<dyn JobSerializer>) {
        self.serializers
            .write()
            .unwrap()
            .insert(job_type.into(), serializer);
    }

    /// The serializer registered for `job_type`, or
    /// [`QueueError::SerializerNotFound`].
    pub fn get(&self, job_type: &str) -> QueueResult<Arc<dyn JobSerializer>> {
        self.serializers
            .read()
            .unwrap()
            .get(job_type)
            .cloned()
            .ok_or_else(|| QueueError::SerializerNotFound(job_type.to_string()))
    }
}
