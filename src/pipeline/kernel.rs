//! Geometry kernel boundary.
//!
//! [`GeometryKernel`] is the seam between the sequencing core and whatever
//! native library actually builds primitives and meshes. The pipeline only
//! ever talks to a kernel through a [`KernelSession`], which initializes the
//! kernel on creation and finalizes it on drop, so every exit path (including
//! `?` on a dispatch failure) releases the session.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geo_error::GeoSeqError;
use crate::geometry::entity::Dimension;
use crate::pipeline::options::ViewStage;

/// Kernel-assigned tag, unique per dimension.
pub type Tag = i32;
/// Kernel-assigned mesh node id.
pub type NodeId = u64;
/// Kernel-assigned mesh element id.
pub type ElementId = u64;

/// Opaque reference to a constructed primitive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    pub dim: Dimension,
    pub tag: Tag,
}

impl Handle {
    #[inline]
    pub const fn new(dim: Dimension, tag: Tag) -> Self {
        Self { dim, tag }
    }
}

/// Elements of one type generated on one entity, as reported by the kernel.
///
/// `node_ids` is the concatenation of the connectivity of every element in
/// `element_ids` order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementBlock {
    pub element_type: i32,
    pub element_ids: Vec<ElementId>,
    pub node_ids: Vec<NodeId>,
}

/// Operations the construction pipeline needs from a geometry kernel.
///
/// `extra_args` is the entity's pass-through configuration, forwarded
/// untouched.
pub trait GeometryKernel {
    /// Start a kernel session.
    ///
    /// Kernels backed by process-global state return
    /// [`GeoSeqError::KernelSessionActive`] when a session is already open.
    fn initialize(&mut self) -> Result<(), GeoSeqError>;
    /// End the session and release every kernel resource. Must not fail.
    fn finalize(&mut self);

    fn add_point(&mut self, coords: [f64; 3], extra_args: Option<&Value>) -> Result<Tag, GeoSeqError>;
    fn add_line(&mut self, start: Tag, end: Tag, extra_args: Option<&Value>) -> Result<Tag, GeoSeqError>;
    fn add_circle(
        &mut self,
        center: [f64; 3],
        radius: f64,
        extra_args: Option<&Value>,
    ) -> Result<Tag, GeoSeqError>;
    /// Closed loop of curves; returns the loop tag.
    fn add_curve_loop(&mut self, curves: &[Tag]) -> Result<Tag, GeoSeqError>;
    /// Planar surface from curve loops, outer loop first.
    fn add_plane_surface(&mut self, loops: &[Tag], extra_args: Option<&Value>) -> Result<Tag, GeoSeqError>;
    fn add_surface_filling(&mut self, curve_loop: Tag, extra_args: Option<&Value>) -> Result<Tag, GeoSeqError>;
    /// Closed shell of surfaces; returns the loop tag.
    fn add_surface_loop(&mut self, surfaces: &[Tag]) -> Result<Tag, GeoSeqError>;
    /// Volume from surface loops, outer shell first.
    fn add_volume(&mut self, shells: &[Tag], extra_args: Option<&Value>) -> Result<Tag, GeoSeqError>;

    /// Commit constructed geometry to the kernel model.
    fn synchronize(&mut self) -> Result<(), GeoSeqError>;
    /// Mesh the model, up to `dim` when given. May block for a long time.
    fn generate_mesh(&mut self, dim: Option<Dimension>) -> Result<(), GeoSeqError>;
    /// Open the interactive viewer and block until it is closed.
    fn show(&mut self, stage: ViewStage) -> Result<(), GeoSeqError>;

    /// All mesh nodes with their coordinates.
    fn nodes(&mut self) -> Result<Vec<(NodeId, [f64; 3])>, GeoSeqError>;
    /// Mesh elements generated on the entity behind `handle`, one block per
    /// element type.
    fn element_blocks(&mut self, handle: Handle) -> Result<Vec<ElementBlock>, GeoSeqError>;
}

/// Scope guard over an initialized kernel.
///
/// Dereferences to the kernel; finalizes it when dropped.
pub struct KernelSession<'k, K: GeometryKernel + ?Sized> {
    kernel: &'k mut K,
}

impl<'k, K: GeometryKernel + ?Sized> KernelSession<'k, K> {
    /// Initialize `kernel` and take exclusive use of it for the session.
    pub fn open(kernel: &'k mut K) -> Result<Self, GeoSeqError> {
        kernel.initialize()?;
        log::info!("geometry kernel session opened");
        Ok(Self { kernel })
    }
}

impl<K: GeometryKernel + ?Sized> Deref for KernelSession<'_, K> {
    type Target = K;

    fn deref(&self) -> &K {
        self.kernel
    }
}

impl<K: GeometryKernel + ?Sized> DerefMut for KernelSession<'_, K> {
    fn deref_mut(&mut self) -> &mut K {
        self.kernel
    }
}

impl<K: GeometryKernel + ?Sized> Drop for KernelSession<'_, K> {
    fn drop(&mut self) {
        self.kernel.finalize();
        log::info!("geometry kernel session closed");
    }
}
