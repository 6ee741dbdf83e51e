//! Construction pipeline: sequenced entities in, mesh out.
//!
//! [`mesh_entities`] runs the whole flow:
//! 1. build the dependency graph and sequence it (no kernel call yet, so
//!    description errors never touch the kernel),
//! 2. open a [`KernelSession`],
//! 3. dispatch every entity in construction order ([`construct`]),
//! 4. synchronize, optionally show the geometry, mesh, optionally show the mesh,
//! 5. read nodes and per-entity elements back ([`extract_mesh`]).
//!
//! The session guard finalizes the kernel on every exit path.
//!
//! # Supported element types
//! Gmsh element type codes: 1 (line), 2 (triangle), 3 (quad), 4 (tet),
//! 5 (hex), 6 (prism), 7 (pyramid), 15 (point). Any other code reported by
//! the kernel aborts extraction with [`GeoSeqError::UnsupportedElementType`].

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geo_error::GeoSeqError;
use crate::geometry::builder::build_graph;
use crate::geometry::entity::{Entity, EntityId, EntityKind, EntityMap};
use crate::pipeline::kernel::{ElementBlock, ElementId, GeometryKernel, Handle, KernelSession, NodeId, Tag};
use crate::pipeline::options::{PipelineOptions, ViewStage};
use crate::topology::sequence::sequence;

/// Number of nodes per element for a Gmsh element type code.
pub fn element_node_count(code: i32) -> Option<usize> {
    match code {
        1 => Some(2),  // line
        2 => Some(3),  // triangle
        3 => Some(4),  // quad
        4 => Some(4),  // tet
        5 => Some(8),  // hex
        6 => Some(6),  // prism
        7 => Some(5),  // pyramid
        15 => Some(1), // point
        _ => None,
    }
}

/// One mesh element generated on an entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    #[serde(rename = "type")]
    pub element_type: i32,
    pub id: ElementId,
    pub nodes: Vec<NodeId>,
}

/// Mesh data keyed by kernel node id and by entity id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FemMesh {
    pub nodes: BTreeMap<NodeId, [f64; 3]>,
    pub elements: BTreeMap<EntityId, Vec<ElementRecord>>,
}

impl FemMesh {
    /// Elements generated on `entity`, if it was constructed.
    pub fn elements_of(&self, entity: &str) -> Option<&[ElementRecord]> {
        self.elements.get(entity).map(Vec::as_slice)
    }
}

/// Kernel handles of constructed entities, in construction order.
#[derive(Clone, Debug, Default)]
pub struct Construction {
    handles: IndexMap<EntityId, Handle>,
}

impl Construction {
    /// Handle of an already constructed entity.
    pub fn handle(&self, id: &str) -> Option<Handle> {
        self.handles.get(id).copied()
    }

    /// Entities with their handles, in construction order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, Handle)> + '_ {
        self.handles.iter().map(|(id, &h)| (id, h))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn record(&mut self, id: EntityId, handle: Handle) {
        self.handles.insert(id, handle);
    }

    fn tag_of(&self, id: &EntityId) -> Result<Tag, GeoSeqError> {
        self.handles
            .get(id)
            .map(|h| h.tag)
            .ok_or_else(|| GeoSeqError::MissingHandle(id.to_string()))
    }

    fn tags_of(&self, ids: &[EntityId]) -> Result<Vec<Tag>, GeoSeqError> {
        ids.iter().map(|id| self.tag_of(id)).collect()
    }
}

/// Dispatch one entity to the kernel using the handles built so far.
fn dispatch<K>(kernel: &mut K, entity: &Entity, built: &Construction) -> Result<Handle, GeoSeqError>
where
    K: GeometryKernel + ?Sized,
{
    let extra = entity.extra_args.as_ref();
    let tag = match &entity.kind {
        EntityKind::Point { coords } => kernel.add_point(*coords, extra)?,
        EntityKind::Line { start, end } => {
            kernel.add_line(built.tag_of(start)?, built.tag_of(end)?, extra)?
        }
        EntityKind::Circle { center, radius } => kernel.add_circle(*center, *radius, extra)?,
        EntityKind::SurfaceFilling { curves } => {
            let curve_loop = kernel.add_curve_loop(&built.tags_of(curves)?)?;
            kernel.add_surface_filling(curve_loop, extra)?
        }
        EntityKind::PlaneSurface { contour, holes } => {
            let mut loops = Vec::with_capacity(1 + holes.len());
            for members in std::iter::once(contour).chain(holes) {
                loops.push(kernel.add_curve_loop(&built.tags_of(members)?)?);
            }
            kernel.add_plane_surface(&loops, extra)?
        }
        EntityKind::Volume { contour, holes } => {
            let mut shells = Vec::with_capacity(1 + holes.len());
            for members in std::iter::once(contour).chain(holes) {
                shells.push(kernel.add_surface_loop(&built.tags_of(members)?)?);
            }
            kernel.add_volume(&shells, extra)?
        }
    };
    Ok(Handle::new(entity.kind.dimension(), tag))
}

/// Construct every entity of `order` on `kernel`.
///
/// `order` must list dependencies before dependents (see
/// [`sequence`](crate::topology::sequence::sequence)).
///
/// # Errors
/// * [`GeoSeqError::DanglingReference`]: an id of `order` is not in `entities`.
/// * [`GeoSeqError::MissingHandle`]: a dependency was not constructed earlier.
/// * Any kernel error.
pub fn construct<K>(
    kernel: &mut K,
    entities: &EntityMap,
    order: &[EntityId],
) -> Result<Construction, GeoSeqError>
where
    K: GeometryKernel + ?Sized,
{
    let mut built = Construction::default();
    for id in order {
        let entity = entities.get(id.as_str()).ok_or_else(|| GeoSeqError::DanglingReference {
            entity: "<construction order>".into(),
            missing: id.to_string(),
        })?;
        let handle = dispatch(kernel, entity, &built)?;
        log::debug!("constructed {} `{id}` as {handle:?}", entity.kind.token());
        built.record(id.clone(), handle);
    }
    Ok(built)
}

/// Split a kernel element block into records.
fn block_records(entity: &EntityId, block: ElementBlock) -> Result<Vec<ElementRecord>, GeoSeqError> {
    let code = block.element_type;
    let n = element_node_count(code).ok_or_else(|| GeoSeqError::UnsupportedElementType {
        entity: entity.to_string(),
        code,
    })?;
    let expected = n * block.element_ids.len();
    if block.node_ids.len() != expected {
        return Err(GeoSeqError::MalformedElementBlock {
            entity: entity.to_string(),
            code,
            expected,
            got: block.node_ids.len(),
        });
    }
    Ok(block
        .element_ids
        .into_iter()
        .zip(block.node_ids.chunks_exact(n))
        .map(|(id, nodes)| ElementRecord {
            element_type: code,
            id,
            nodes: nodes.to_vec(),
        })
        .collect())
}

/// Read nodes and the elements of every constructed entity from `kernel`.
///
/// # Errors
/// * [`GeoSeqError::UnsupportedElementType`]: unknown element type code.
/// * [`GeoSeqError::MalformedElementBlock`]: node array length mismatch.
/// * Any kernel error.
pub fn extract_mesh<K>(kernel: &mut K, built: &Construction) -> Result<FemMesh, GeoSeqError>
where
    K: GeometryKernel + ?Sized,
{
    let mut mesh = FemMesh::default();
    mesh.nodes.extend(kernel.nodes()?);
    for (id, handle) in built.iter() {
        let mut records = Vec::new();
        for block in kernel.element_blocks(handle)? {
            records.extend(block_records(id, block)?);
        }
        if records.is_empty() {
            log::warn!("entity `{id}` has no mesh elements");
        }
        mesh.elements.insert(id.clone(), records);
    }
    Ok(mesh)
}

/// Build, sequence, construct and mesh `entities` on `kernel`.
///
/// # Errors
/// Description errors ([`GeoSeqError::DanglingReference`],
/// [`GeoSeqError::CyclicDependency`]) are raised before the kernel is
/// touched; kernel and extraction errors after the session is opened, which
/// is then finalized before returning.
pub fn mesh_entities<K>(
    kernel: &mut K,
    entities: &EntityMap,
    options: &PipelineOptions,
) -> Result<FemMesh, GeoSeqError>
where
    K: GeometryKernel,
{
    mesh_entities_with_hook(kernel, entities, options, |_| Ok(()))
}

/// Like [`mesh_entities`], running `hook` on the kernel right after the
/// session is opened and before any entity is constructed.
pub fn mesh_entities_with_hook<K, F>(
    kernel: &mut K,
    entities: &EntityMap,
    options: &PipelineOptions,
    hook: F,
) -> Result<FemMesh, GeoSeqError>
where
    K: GeometryKernel,
    F: FnOnce(&mut K) -> Result<(), GeoSeqError>,
{
    let order = sequence(&build_graph(entities)?)?;

    let mut session = KernelSession::open(kernel)?;
    hook(&mut *session)?;

    let built = construct(&mut *session, entities, &order)?;
    session.synchronize()?;
    log::info!("constructed {} entities", built.len());

    if options.visualization.shows(ViewStage::Geometry) {
        session.show(ViewStage::Geometry)?;
    }
    if options.generate_mesh {
        session.generate_mesh(options.mesh_dimension)?;
    }
    if options.visualization.shows(ViewStage::Mesh) {
        session.show(ViewStage::Mesh)?;
    }

    let mesh = extract_mesh(&mut *session, &built)?;
    log::info!(
        "extracted {} nodes over {} entities",
        mesh.nodes.len(),
        mesh.elements.len()
    );
    Ok(mesh)
}
