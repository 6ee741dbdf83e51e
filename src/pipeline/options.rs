//! Pipeline configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geo_error::GeoSeqError;
use crate::geometry::entity::Dimension;

/// When to open the kernel's interactive viewer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visualization {
    /// Never open the viewer.
    #[default]
    #[serde(alias = "no")]
    None,
    /// After geometry construction.
    Geometry,
    /// After mesh generation.
    Mesh,
    /// After both stages.
    Both,
}

/// Point in the pipeline at which the viewer may be opened.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ViewStage {
    Geometry,
    Mesh,
}

impl Visualization {
    /// Whether the viewer should be opened at `stage`.
    pub const fn shows(self, stage: ViewStage) -> bool {
        matches!(
            (self, stage),
            (Visualization::Geometry | Visualization::Both, ViewStage::Geometry)
                | (Visualization::Mesh | Visualization::Both, ViewStage::Mesh)
        )
    }
}

impl FromStr for Visualization {
    type Err = GeoSeqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "no" => Ok(Visualization::None),
            "geometry" => Ok(Visualization::Geometry),
            "mesh" => Ok(Visualization::Mesh),
            "both" => Ok(Visualization::Both),
            other => Err(GeoSeqError::InvalidInput(format!(
                "unknown visualization mode `{other}` (expected none, geometry, mesh or both)"
            ))),
        }
    }
}

impl fmt::Display for Visualization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Visualization::None => "none",
            Visualization::Geometry => "geometry",
            Visualization::Mesh => "mesh",
            Visualization::Both => "both",
        })
    }
}

/// Options for [`mesh_entities`](crate::pipeline::construct::mesh_entities).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Viewer toggle, passed through to the kernel.
    pub visualization: Visualization,
    /// Run mesh generation after construction.
    pub generate_mesh: bool,
    /// Highest dimension to mesh; `None` meshes everything.
    pub mesh_dimension: Option<Dimension>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            visualization: Visualization::None,
            generate_mesh: true,
            mesh_dimension: None,
        }
    }
}
