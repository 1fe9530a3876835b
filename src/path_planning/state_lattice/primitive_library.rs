//! Motion primitive library loading
//!
//! The on-disk format is a JSON document with a `lattice_metadata` header and
//! a flat `primitives` array. Primitives are grouped by start heading, keeping
//! their declaration order inside each heading bin; that order is the
//! expansion order seen by the search.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::{LatticeError, LatticeResult, PoseDelta};

/// Global properties of a primitive library
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeMetadata {
    pub num_angle_bins: u32,
    /// Minimum turning radius in world units [m]
    pub min_turning_radius: f64,
}

/// Header of a lattice file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeFileMetadata {
    /// Vehicle model the primitives were generated for (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_model: Option<String>,
    pub turning_radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_resolution: Option<f64>,
    pub number_of_headings: u32,
}

/// One primitive entry of a lattice file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeFilePrimitive {
    pub trajectory_id: u32,
    pub start_angle_index: u32,
    pub end_angle_index: u32,
    /// End displacement in cells
    pub dx: f64,
    pub dy: f64,
    /// Path length in cells
    pub arc_length: f64,
    #[serde(default)]
    pub reverse: bool,
}

/// Full lattice file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<f64>,
    pub lattice_metadata: LatticeFileMetadata,
    pub primitives: Vec<LatticeFilePrimitive>,
}

#[derive(Deserialize)]
struct MetadataOnly {
    lattice_metadata: LatticeFileMetadata,
}

impl LatticeFileMetadata {
    fn to_metadata(&self) -> LatticeResult<LatticeMetadata> {
        if self.number_of_headings == 0 {
            return Err(LatticeError::MalformedLibrary(
                "number_of_headings must be positive".to_string(),
            ));
        }
        if !(self.turning_radius.is_finite() && self.turning_radius >= 0.0) {
            return Err(LatticeError::MalformedLibrary(format!(
                "turning_radius must be a non-negative number, got {}",
                self.turning_radius
            )));
        }
        Ok(LatticeMetadata {
            num_angle_bins: self.number_of_headings,
            min_turning_radius: self.turning_radius,
        })
    }
}

/// A precomputed trajectory segment between two heading bins
#[derive(Debug, Clone, PartialEq)]
pub struct MotionPrimitive {
    pub id: u32,
    pub start_heading: u32,
    pub end_heading: u32,
    /// Integral cell displacement and signed heading change
    pub delta: PoseDelta,
    pub arc_cost: f64,
    pub reverse: bool,
}

/// Validated primitives grouped by start heading
#[derive(Debug, Clone)]
pub struct PrimitiveSet {
    metadata: LatticeMetadata,
    by_heading: Vec<Vec<MotionPrimitive>>,
    id_lookup: HashMap<u32, (u32, usize)>,
}

impl PrimitiveSet {
    pub fn from_file(file: LatticeFile) -> LatticeResult<Self> {
        let metadata = file.lattice_metadata.to_metadata()?;
        let bins = metadata.num_angle_bins;
        let mut by_heading: Vec<Vec<MotionPrimitive>> = vec![Vec::new(); bins as usize];
        let mut id_lookup = HashMap::with_capacity(file.primitives.len());

        for raw in file.primitives {
            let primitive = Self::validate_primitive(&raw, bins)?;
            let slot = &mut by_heading[primitive.start_heading as usize];
            if id_lookup
                .insert(primitive.id, (primitive.start_heading, slot.len()))
                .is_some()
            {
                return Err(LatticeError::MalformedLibrary(format!(
                    "duplicate trajectory_id {}",
                    primitive.id
                )));
            }
            slot.push(primitive);
        }

        for (heading, primitives) in by_heading.iter().enumerate() {
            if primitives.is_empty() {
                warn!(heading, "lattice has no primitives for heading bin");
            }
        }

        Ok(Self {
            metadata,
            by_heading,
            id_lookup,
        })
    }

    pub fn from_json_str(content: &str) -> LatticeResult<Self> {
        Self::from_file(serde_json::from_str(content)?)
    }

    fn validate_primitive(raw: &LatticeFilePrimitive, bins: u32) -> LatticeResult<MotionPrimitive> {
        let malformed = |reason: String| {
            LatticeError::MalformedLibrary(format!("trajectory {}: {}", raw.trajectory_id, reason))
        };

        if raw.start_angle_index >= bins || raw.end_angle_index >= bins {
            return Err(malformed(format!(
                "angle indices ({}, {}) out of range for {} headings",
                raw.start_angle_index, raw.end_angle_index, bins
            )));
        }
        // Lattice targets must land exactly on cells
        if !(raw.dx.is_finite() && raw.dy.is_finite())
            || raw.dx.fract() != 0.0
            || raw.dy.fract() != 0.0
        {
            return Err(malformed(format!(
                "displacement ({}, {}) is not an integral cell offset",
                raw.dx, raw.dy
            )));
        }
        if !(raw.arc_length.is_finite() && raw.arc_length > 0.0) {
            return Err(malformed(format!(
                "arc_length must be positive, got {}",
                raw.arc_length
            )));
        }

        Ok(MotionPrimitive {
            id: raw.trajectory_id,
            start_heading: raw.start_angle_index,
            end_heading: raw.end_angle_index,
            delta: PoseDelta::new(
                raw.dx,
                raw.dy,
                signed_bin_difference(raw.start_angle_index, raw.end_angle_index, bins),
            ),
            arc_cost: raw.arc_length,
            reverse: raw.reverse,
        })
    }

    pub fn metadata(&self) -> LatticeMetadata {
        self.metadata
    }

    pub fn num_angle_bins(&self) -> u32 {
        self.metadata.num_angle_bins
    }

    /// Primitives starting at `heading`, in declaration order
    pub fn for_heading(&self, heading: u32) -> &[MotionPrimitive] {
        self.by_heading
            .get(heading as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get(&self, id: u32) -> Option<&MotionPrimitive> {
        self.id_lookup
            .get(&id)
            .map(|&(heading, pos)| &self.by_heading[heading as usize][pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &MotionPrimitive> {
        self.by_heading.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.id_lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_lookup.is_empty()
    }
}

/// Shortest signed heading change from `start` to `end`, in bins
pub fn signed_bin_difference(start: u32, end: u32, bins: u32) -> i32 {
    let bins = bins as i32;
    let mut diff = (end as i32 - start as i32).rem_euclid(bins);
    if diff > bins / 2 {
        diff -= bins;
    }
    diff
}

/// Source of primitive libraries
pub trait PrimitiveLoader {
    /// Read only the global properties of the library
    fn metadata(&self, path: &Path) -> LatticeResult<LatticeMetadata>;

    /// Read and validate the full library
    fn load(&self, path: &Path) -> LatticeResult<PrimitiveSet>;
}

/// Loader for JSON lattice files on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPrimitiveLoader;

impl JsonPrimitiveLoader {
    fn read(path: &Path) -> LatticeResult<String> {
        fs::read_to_string(path).map_err(|source| LatticeError::LibraryLoad {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl PrimitiveLoader for JsonPrimitiveLoader {
    fn metadata(&self, path: &Path) -> LatticeResult<LatticeMetadata> {
        let content = Self::read(path)?;
        let header: MetadataOnly = serde_json::from_str(&content)?;
        header.lattice_metadata.to_metadata()
    }

    fn load(&self, path: &Path) -> LatticeResult<PrimitiveSet> {
        let content = Self::read(path)?;
        let set = PrimitiveSet::from_json_str(&content)?;
        debug!(
            path = %path.display(),
            primitives = set.len(),
            headings = set.num_angle_bins(),
            "parsed lattice file"
        );
        Ok(set)
    }
}
