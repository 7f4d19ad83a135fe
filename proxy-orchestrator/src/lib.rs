//! proxy-orchestrator - Per-request coordination of extraction, detection,
//! conflict resolution, masking, and the mask/route dispatch decision.

mod orchestrator;

pub use orchestrator::{Dispatch, MaskingOrchestrator};
