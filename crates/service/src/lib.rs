//! `jobq-service` — orchestration layer of the job queue.
//!
//! The services own no state; they hold references to the repositories and
//! the serializer registry and translate between domain and serialized forms
//! at the boundary.

pub mod job_queue;
pub mod registry;
pub mod result;
pub mod status;


pub use job_queue::JobQueueService;
pub use registry::{JobSerializer, JsonJobSerializer, SerializerRegistry};
pub use result::ResultService;
pub use status::StatusService;
