//! The isolated child-process execution model (§4.5): wire protocol, parent-side
//! orchestrator, and the child-side entry point the `bench-worker` binary drives.

mod child;
mod orchestrator;
mod protocol;

pub use child::{run_child, ExportedBenchmark, Registry};
pub use orchestrator::{WorkerOrchestrator, CHILD_SELF_TERMINATE, WORKER_FLAG, WORKER_TIMEOUT};
pub use protocol::{read_framed, write_framed, ChildReply, RunMessage, WireSpec};
