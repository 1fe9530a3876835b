use std::collections::{HashMap, HashSet};
use std::f64::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::common::{CollisionChecker, LatticeError, LatticeResult};
use crate::path_planning::state_lattice::{
    LatticeFile, LatticeFileMetadata, LatticeFilePrimitive, LatticeMetadata, PrimitiveLoader,
    PrimitiveSet,
};

/// Rotate an integral offset by `quarter_turns * 90` degrees
fn rotate_quarter(dx: f64, dy: f64, quarter_turns: u32) -> (f64, f64) {
    match quarter_turns % 4 {
        0 => (dx, dy),
        1 => (-dy, dx),
        2 => (-dx, -dy),
        _ => (dy, -dx),
    }
}

/// Four headings (0, 90, 180, 270 deg) with straight, left, right and reverse
/// primitives per heading. Rotationally and mirror symmetric.
pub fn four_heading_file() -> LatticeFile {
    // (dx, dy, heading change, arc, reverse) in the heading-0 frame
    let base = [
        (1.0, 0.0, 0, 1.0, false),
        (1.0, 1.0, 1, FRAC_PI_2, false),
        (1.0, -1.0, -1, FRAC_PI_2, false),
        (-1.0, 0.0, 0, 1.0, true),
    ];
    let mut primitives = Vec::new();
    for heading in 0..4u32 {
        for (k, &(dx, dy, dtheta, arc, reverse)) in base.iter().enumerate() {
            let (rx, ry) = rotate_quarter(dx, dy, heading);
            primitives.push(LatticeFilePrimitive {
                trajectory_id: heading * 4 + k as u32,
                start_angle_index: heading,
                end_angle_index: (heading as i32 + dtheta).rem_euclid(4) as u32,
                dx: rx,
                dy: ry,
                arc_length: arc,
                reverse,
            });
        }
    }
    LatticeFile {
        version: Some(1.0),
        lattice_metadata: LatticeFileMetadata {
            motion_model: Some("ackermann".to_string()),
            turning_radius: 1.0,
            grid_resolution: Some(1.0),
            number_of_headings: 4,
        },
        primitives,
    }
}

/// The shipped 8-heading sample library. Turns move two cells, and the
/// 45 degree headings are not a symmetry of the lattice.
pub fn eight_heading_file() -> LatticeFile {
    serde_json::from_str(include_str!("../data/eight_heading.json"))
        .expect("sample library parses")
}

/// One heading bin and a single one-cell forward primitive
pub fn single_bin_file() -> LatticeFile {
    LatticeFile {
        version: Some(1.0),
        lattice_metadata: LatticeFileMetadata {
            motion_model: None,
            turning_radius: 0.0,
            grid_resolution: None,
            number_of_headings: 1,
        },
        primitives: vec![LatticeFilePrimitive {
            trajectory_id: 42,
            start_angle_index: 0,
            end_angle_index: 0,
            dx: 1.0,
            dy: 0.0,
            arc_length: 1.0,
            reverse: false,
        }],
    }
}

/// In-memory loader that counts how often each operation runs
#[derive(Debug, Default)]
pub struct CountingLoader {
    files: HashMap<PathBuf, LatticeFile>,
    loads: Arc<AtomicUsize>,
    metadata_reads: Arc<AtomicUsize>,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file<P: Into<PathBuf>>(mut self, path: P, file: LatticeFile) -> Self {
        self.files.insert(path.into(), file);
        self
    }

    /// Shared handle on the number of full loads
    pub fn load_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.loads)
    }

    pub fn metadata_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.metadata_reads)
    }

    fn file(&self, path: &Path) -> LatticeResult<&LatticeFile> {
        self.files.get(path).ok_or_else(|| LatticeError::LibraryLoad {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not registered"),
        })
    }
}

impl PrimitiveLoader for CountingLoader {
    fn metadata(&self, path: &Path) -> LatticeResult<LatticeMetadata> {
        self.metadata_reads.fetch_add(1, Ordering::SeqCst);
        let set = PrimitiveSet::from_file(self.file(path)?.clone())?;
        Ok(set.metadata())
    }

    fn load(&self, path: &Path) -> LatticeResult<PrimitiveSet> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        PrimitiveSet::from_file(self.file(path)?.clone())
    }
}

/// Collision checker with an explicit set of blocked cells and a fixed cost
#[derive(Debug, Clone, Default)]
pub struct ScriptedChecker {
    pub blocked: HashSet<(i64, i64)>,
    pub cell_cost: f64,
    pub queries: Vec<(f64, f64, f64)>,
    last_cost: f64,
}

impl ScriptedChecker {
    pub fn free(cell_cost: f64) -> Self {
        Self {
            cell_cost,
            ..Default::default()
        }
    }

    pub fn block(&mut self, x: i64, y: i64) {
        self.blocked.insert((x, y));
    }
}

impl CollisionChecker for ScriptedChecker {
    fn in_collision(&mut self, x: f64, y: f64, theta: f64, _traverse_unknown: bool) -> bool {
        self.queries.push((x, y, theta));
        if self.blocked.contains(&(x.round() as i64, y.round() as i64)) {
            return true;
        }
        self.last_cost = self.cell_cost;
        false
    }

    fn cost(&self) -> f64 {
        self.last_cost
    }
}
