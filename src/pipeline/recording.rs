//! RecordingKernel: deterministic in-memory implementation of [`GeometryKernel`].
//!
//! Keeps a log of every call it receives and produces a small synthetic
//! mesh with predictable node and element numbering:
//! - every point gets one node and one point element (type 15),
//! - a line becomes one segment (type 1) between its end-point nodes,
//! - a circle is sampled with four nodes and closed with four segments,
//! - a surface gets a centroid node and one triangle (type 2) per boundary
//!   segment of its loops,
//! - a volume gets a centroid node and one tetrahedron (type 4) per boundary
//!   triangle of its shells.
//!
//! Useful for dry-running descriptions and for testing the pipeline without
//! a native kernel.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::geo_error::GeoSeqError;
use crate::geometry::entity::Dimension;
use crate::pipeline::kernel::{ElementBlock, ElementId, GeometryKernel, Handle, NodeId, Tag};
use crate::pipeline::options::ViewStage;

/// A call received by a [`RecordingKernel`].
#[derive(Clone, Debug, PartialEq)]
pub enum KernelCall {
    Initialize,
    Finalize,
    /// An entity-building call (`point`, `line`, ...).
    Add {
        kind: &'static str,
        handle: Handle,
        extra_args: Option<Value>,
    },
    CurveLoop { tag: Tag, curves: Vec<Tag> },
    SurfaceLoop { tag: Tag, surfaces: Vec<Tag> },
    Synchronize,
    GenerateMesh(Option<Dimension>),
    Show(ViewStage),
}

#[derive(Clone, Debug)]
enum Shape {
    Point([f64; 3]),
    Line(Tag, Tag),
    Circle([f64; 3], f64),
    PlaneSurface(Vec<Tag>),
    Filling(Tag),
    Volume(Vec<Tag>),
}

/// Synthetic mesh built by [`GeometryKernel::generate_mesh`].
#[derive(Clone, Debug, Default)]
struct SyntheticMesh {
    nodes: BTreeMap<NodeId, [f64; 3]>,
    elements: HashMap<Handle, ElementBlock>,
    next_node: NodeId,
    next_element: ElementId,
}

impl SyntheticMesh {
    fn node(&mut self, x: [f64; 3]) -> NodeId {
        self.next_node += 1;
        self.nodes.insert(self.next_node, x);
        self.next_node
    }

    fn push(&mut self, handle: Handle, element_type: i32, nodes: &[NodeId]) {
        self.next_element += 1;
        let block = self.elements.entry(handle).or_insert_with(|| ElementBlock {
            element_type,
            ..ElementBlock::default()
        });
        block.element_ids.push(self.next_element);
        block.node_ids.extend_from_slice(nodes);
    }

    fn segments(&self, handle: Handle) -> Vec<[NodeId; 2]> {
        self.elements
            .get(&handle)
            .map(|b| b.node_ids.chunks_exact(2).map(|c| [c[0], c[1]]).collect())
            .unwrap_or_default()
    }

    fn triangles(&self, handle: Handle) -> Vec<[NodeId; 3]> {
        self.elements
            .get(&handle)
            .map(|b| b.node_ids.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
            .unwrap_or_default()
    }

    fn centroid<'a>(&self, ids: impl Iterator<Item = &'a NodeId>) -> [f64; 3] {
        let mut acc = [0.0; 3];
        let mut n = 0usize;
        for id in ids {
            if let Some(x) = self.nodes.get(id) {
                for (a, v) in acc.iter_mut().zip(x) {
                    *a += v;
                }
                n += 1;
            }
        }
        if n > 0 {
            for a in &mut acc {
                *a /= n as f64;
            }
        }
        acc
    }
}

/// Deterministic test double for the geometry kernel.
#[derive(Clone, Debug, Default)]
pub struct RecordingKernel {
    calls: Vec<KernelCall>,
    active: bool,
    synchronized: bool,
    shapes: BTreeMap<(Dimension, Tag), Shape>,
    next_tag: HashMap<Dimension, Tag>,
    curve_loops: HashMap<Tag, Vec<Tag>>,
    surface_loops: HashMap<Tag, Vec<Tag>>,
    next_loop: Tag,
    point_nodes: HashMap<Tag, NodeId>,
    mesh: Option<SyntheticMesh>,
    fail_on: Option<&'static str>,
    element_type_override: HashMap<Dimension, i32>,
}

impl RecordingKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `kind` building call (`"volume"`, `"line"`, ...) fail.
    pub fn failing_on(mut self, kind: &'static str) -> Self {
        self.fail_on = Some(kind);
        self
    }

    /// Report `code` as the element type of every entity of dimension `dim`.
    pub fn with_element_type(mut self, dim: Dimension, code: i32) -> Self {
        self.element_type_override.insert(dim, code);
        self
    }

    /// Calls received so far.
    pub fn calls(&self) -> &[KernelCall] {
        &self.calls
    }

    /// Whether a session is currently open.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Entity kinds in the order they were constructed.
    pub fn constructed_kinds(&self) -> Vec<&'static str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                KernelCall::Add { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    fn ensure_active(&self) -> Result<(), GeoSeqError> {
        if self.active {
            Ok(())
        } else {
            Err(GeoSeqError::Kernel("no active session".into()))
        }
    }

    fn add(
        &mut self,
        kind: &'static str,
        dim: Dimension,
        shape: Shape,
        extra_args: Option<&Value>,
    ) -> Result<Tag, GeoSeqError> {
        self.ensure_active()?;
        if self.fail_on == Some(kind) {
            return Err(GeoSeqError::Kernel(format!("injected failure on {kind}")));
        }
        let next = self.next_tag.entry(dim).or_insert(0);
        *next += 1;
        let tag = *next;
        self.shapes.insert((dim, tag), shape);
        self.calls.push(KernelCall::Add {
            kind,
            handle: Handle::new(dim, tag),
            extra_args: extra_args.cloned(),
        });
        self.synchronized = false;
        Ok(tag)
    }

    fn require(&self, dim: Dimension, tags: &[Tag]) -> Result<(), GeoSeqError> {
        match tags.iter().find(|t| !self.shapes.contains_key(&(dim, **t))) {
            Some(t) => Err(GeoSeqError::Kernel(format!(
                "unknown {dim:?} tag {t}"
            ))),
            None => Ok(()),
        }
    }

    fn loop_members(loops: &HashMap<Tag, Vec<Tag>>, tags: &[Tag]) -> Vec<Tag> {
        tags.iter()
            .filter_map(|t| loops.get(t))
            .flatten()
            .copied()
            .collect()
    }

    fn mesh_upto(&mut self, limit: Dimension) -> SyntheticMesh {
        let mut mesh = SyntheticMesh::default();
        self.point_nodes.clear();
        let shapes: Vec<((Dimension, Tag), Shape)> =
            self.shapes.iter().map(|(k, v)| (*k, v.clone())).collect();

        for ((dim, tag), shape) in &shapes {
            if *dim > limit {
                continue;
            }
            let handle = Handle::new(*dim, *tag);
            match shape {
                Shape::Point(x) => {
                    let n = mesh.node(*x);
                    self.point_nodes.insert(*tag, n);
                    mesh.push(handle, 15, &[n]);
                }
                Shape::Line(a, b) => {
                    let (Some(&na), Some(&nb)) = (self.point_nodes.get(a), self.point_nodes.get(b))
                    else {
                        continue;
                    };
                    mesh.push(handle, 1, &[na, nb]);
                }
                Shape::Circle(c, r) => {
                    let ring: Vec<NodeId> = (0..4u8)
                        .map(|k| {
                            let t = f64::from(k) * std::f64::consts::FRAC_PI_2;
                            mesh.node([c[0] + r * t.cos(), c[1] + r * t.sin(), c[2]])
                        })
                        .collect();
                    for k in 0..4 {
                        mesh.push(handle, 1, &[ring[k], ring[(k + 1) % 4]]);
                    }
                }
                Shape::PlaneSurface(loops) => {
                    let curves = Self::loop_members(&self.curve_loops, loops);
                    Self::fan_surface(&mut mesh, handle, &curves);
                }
                Shape::Filling(curve_loop) => {
                    let curves = Self::loop_members(&self.curve_loops, &[*curve_loop]);
                    Self::fan_surface(&mut mesh, handle, &curves);
                }
                Shape::Volume(shells) => {
                    let surfaces = Self::loop_members(&self.surface_loops, shells);
                    let tris: Vec<[NodeId; 3]> = surfaces
                        .iter()
                        .flat_map(|s| mesh.triangles(Handle::new(Dimension::Surface, *s)))
                        .collect();
                    if tris.is_empty() {
                        continue;
                    }
                    let c = mesh.centroid(tris.iter().flatten());
                    let apex = mesh.node(c);
                    for [a, b, d] in tris {
                        mesh.push(handle, 4, &[a, b, d, apex]);
                    }
                }
            }
        }
        mesh
    }

    fn fan_surface(mesh: &mut SyntheticMesh, handle: Handle, curves: &[Tag]) {
        let segs: Vec<[NodeId; 2]> = curves
            .iter()
            .flat_map(|c| mesh.segments(Handle::new(Dimension::Curve, *c)))
            .collect();
        if segs.is_empty() {
            return;
        }
        let c = mesh.centroid(segs.iter().flatten());
        let apex = mesh.node(c);
        for [a, b] in segs {
            mesh.push(handle, 2, &[a, b, apex]);
        }
    }
}

impl GeometryKernel for RecordingKernel {
    fn initialize(&mut self) -> Result<(), GeoSeqError> {
        if self.active {
            return Err(GeoSeqError::KernelSessionActive);
        }
        self.active = true;
        self.calls.push(KernelCall::Initialize);
        Ok(())
    }

    fn finalize(&mut self) {
        let calls = std::mem::take(&mut self.calls);
        *self = RecordingKernel {
            calls,
            fail_on: self.fail_on,
            element_type_override: std::mem::take(&mut self.element_type_override),
            ..RecordingKernel::default()
        };
        self.calls.push(KernelCall::Finalize);
    }

    fn add_point(&mut self, coords: [f64; 3], extra_args: Option<&Value>) -> Result<Tag, GeoSeqError> {
        self.add("point", Dimension::Point, Shape::Point(coords), extra_args)
    }

    fn add_line(&mut self, start: Tag, end: Tag, extra_args: Option<&Value>) -> Result<Tag, GeoSeqError> {
        self.require(Dimension::Point, &[start, end])?;
        self.add("line", Dimension::Curve, Shape::Line(start, end), extra_args)
    }

    fn add_circle(
        &mut self,
        center: [f64; 3],
        radius: f64,
        extra_args: Option<&Value>,
    ) -> Result<Tag, GeoSeqError> {
        self.add("circle", Dimension::Curve, Shape::Circle(center, radius), extra_args)
    }

    fn add_curve_loop(&mut self, curves: &[Tag]) -> Result<Tag, GeoSeqError> {
        self.ensure_active()?;
        self.require(Dimension::Curve, curves)?;
        self.next_loop += 1;
        let tag = self.next_loop;
        self.curve_loops.insert(tag, curves.to_vec());
        self.calls.push(KernelCall::CurveLoop {
            tag,
            curves: curves.to_vec(),
        });
        Ok(tag)
    }

    fn add_plane_surface(&mut self, loops: &[Tag], extra_args: Option<&Value>) -> Result<Tag, GeoSeqError> {
        if let Some(t) = loops.iter().find(|t| !self.curve_loops.contains_key(*t)) {
            return Err(GeoSeqError::Kernel(format!("unknown curve loop {t}")));
        }
        self.add(
            "plane-surface",
            Dimension::Surface,
            Shape::PlaneSurface(loops.to_vec()),
            extra_args,
        )
    }

    fn add_surface_filling(&mut self, curve_loop: Tag, extra_args: Option<&Value>) -> Result<Tag, GeoSeqError> {
        if !self.curve_loops.contains_key(&curve_loop) {
            return Err(GeoSeqError::Kernel(format!("unknown curve loop {curve_loop}")));
        }
        self.add(
            "surface-filling",
            Dimension::Surface,
            Shape::Filling(curve_loop),
            extra_args,
        )
    }

    fn add_surface_loop(&mut self, surfaces: &[Tag]) -> Result<Tag, GeoSeqError> {
        self.ensure_active()?;
        self.require(Dimension::Surface, surfaces)?;
        self.next_loop += 1;
        let tag = self.next_loop;
        self.surface_loops.insert(tag, surfaces.to_vec());
        self.calls.push(KernelCall::SurfaceLoop {
            tag,
            surfaces: surfaces.to_vec(),
        });
        Ok(tag)
    }

    fn add_volume(&mut self, shells: &[Tag], extra_args: Option<&Value>) -> Result<Tag, GeoSeqError> {
        if let Some(t) = shells.iter().find(|t| !self.surface_loops.contains_key(*t)) {
            return Err(GeoSeqError::Kernel(format!("unknown surface loop {t}")));
        }
        self.add("volume", Dimension::Volume, Shape::Volume(shells.to_vec()), extra_args)
    }

    fn synchronize(&mut self) -> Result<(), GeoSeqError> {
        self.ensure_active()?;
        self.synchronized = true;
        self.calls.push(KernelCall::Synchronize);
        Ok(())
    }

    fn generate_mesh(&mut self, dim: Option<Dimension>) -> Result<(), GeoSeqError> {
        self.ensure_active()?;
        if !self.synchronized {
            return Err(GeoSeqError::Kernel("model not synchronized".into()));
        }
        self.calls.push(KernelCall::GenerateMesh(dim));
        let mesh = self.mesh_upto(dim.unwrap_or(Dimension::Volume));
        self.mesh = Some(mesh);
        Ok(())
    }

    fn show(&mut self, stage: ViewStage) -> Result<(), GeoSeqError> {
        self.ensure_active()?;
        self.calls.push(KernelCall::Show(stage));
        Ok(())
    }

    fn nodes(&mut self) -> Result<Vec<(NodeId, [f64; 3])>, GeoSeqError> {
        self.ensure_active()?;
        Ok(self
            .mesh
            .as_ref()
            .map(|m| m.nodes.iter().map(|(&k, &v)| (k, v)).collect())
            .unwrap_or_default())
    }

    fn element_blocks(&mut self, handle: Handle) -> Result<Vec<ElementBlock>, GeoSeqError> {
        self.ensure_active()?;
        if !self.shapes.contains_key(&(handle.dim, handle.tag)) {
            return Err(GeoSeqError::Kernel(format!("unknown entity {handle:?}")));
        }
        let Some(mut block) = self.mesh.as_ref().and_then(|m| m.elements.get(&handle)).cloned()
        else {
            return Ok(Vec::new());
        };
        if let Some(&code) = self.element_type_override.get(&handle.dim) {
            block.element_type = code;
        }
        Ok(vec![block])
    }
}
