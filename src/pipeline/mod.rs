//! Construction pipeline over an external geometry kernel.
//!
//! - [`kernel`]: the [`GeometryKernel`](kernel::GeometryKernel) seam and the
//!   [`KernelSession`](kernel::KernelSession) scope guard
//! - [`options`]: pipeline configuration and the visualization toggle
//! - [`construct`]: dispatch of sequenced entities and mesh extraction
//! - [`recording`]: an in-memory kernel for tests and dry runs

pub mod construct;
pub mod kernel;
pub mod options;
pub mod recording;

pub use construct::{
    Construction, ElementRecord, FemMesh, construct, element_node_count, extract_mesh,
    mesh_entities, mesh_entities_with_hook,
};
pub use kernel::{ElementBlock, GeometryKernel, Handle, KernelSession};
pub use options::{PipelineOptions, ViewStage, Visualization};
pub use recording::{KernelCall, RecordingKernel};
