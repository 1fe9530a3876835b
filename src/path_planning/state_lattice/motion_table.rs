//! Lattice motion table
//!
//! Holds the primitives of one library indexed by start heading, the per-bin
//! trigonometry used by the heuristic and the grid width used for indexing.
//! Tables are published as immutable `Arc` snapshots: a search clones the
//! snapshot once and never observes a rebuild.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::common::{Coordinates, LatticeResult, TrigValues};

use super::config::{LatticeConfig, TraversalCostParams};
use super::index::LatticeIndexer;
use super::node_lattice::LatticeNode;
use super::primitive_library::{
    JsonPrimitiveLoader, LatticeMetadata, MotionPrimitive, PrimitiveLoader, PrimitiveSet,
};

/// Immutable motion table for one library and grid width
#[derive(Debug, Clone)]
pub struct LatticeMotionTable {
    lattice_filepath: PathBuf,
    indexer: LatticeIndexer,
    min_turning_radius: f64,
    bin_size: f64,
    trig_values: Vec<TrigValues>,
    primitives: Arc<PrimitiveSet>,
    costs: TraversalCostParams,
}

impl LatticeMotionTable {
    fn new(
        lattice_filepath: PathBuf,
        size_x: u32,
        primitives: Arc<PrimitiveSet>,
        costs: TraversalCostParams,
    ) -> Self {
        let metadata = primitives.metadata();
        let num_angle_bins = metadata.num_angle_bins;
        let bin_size = 2.0 * PI / num_angle_bins as f64;
        let trig_values = (0..num_angle_bins)
            .map(|bin| {
                let angle = bin as f64 * bin_size;
                (angle.cos(), angle.sin())
            })
            .collect();

        Self {
            lattice_filepath,
            indexer: LatticeIndexer::new(size_x, num_angle_bins),
            min_turning_radius: metadata.min_turning_radius,
            bin_size,
            trig_values,
            primitives,
            costs,
        }
    }

    /// Table over an already validated primitive set, without a loader
    pub fn from_primitives<P: Into<PathBuf>>(
        lattice_filepath: P,
        size_x: u32,
        primitives: PrimitiveSet,
        costs: TraversalCostParams,
    ) -> Self {
        Self::new(lattice_filepath.into(), size_x, Arc::new(primitives), costs)
    }

    pub fn lattice_filepath(&self) -> &Path {
        &self.lattice_filepath
    }

    pub fn indexer(&self) -> LatticeIndexer {
        self.indexer
    }

    pub fn size_x(&self) -> u32 {
        self.indexer.size_x()
    }

    pub fn num_angle_bins(&self) -> u32 {
        self.indexer.num_angle_bins()
    }

    pub fn min_turning_radius(&self) -> f64 {
        self.min_turning_radius
    }

    /// Angular width of one heading bin [rad]
    pub fn bin_size(&self) -> f64 {
        self.bin_size
    }

    pub fn trig_values(&self, heading: u32) -> TrigValues {
        self.trig_values[heading as usize]
    }

    pub fn costs(&self) -> TraversalCostParams {
        self.costs
    }

    pub fn neutral_cost(&self) -> f64 {
        self.costs.neutral_cost
    }

    pub fn primitives(&self) -> &PrimitiveSet {
        &self.primitives
    }

    pub fn primitive(&self, id: u32) -> Option<&MotionPrimitive> {
        self.primitives.get(id)
    }

    /// Primitives applicable at the node's heading, in declaration order
    pub fn projections(&self, node: &LatticeNode) -> &[MotionPrimitive] {
        self.projections_for(node.pose().theta)
    }

    pub fn projections_for(&self, heading: u32) -> &[MotionPrimitive] {
        self.primitives.for_heading(heading)
    }

    /// Pose reached by applying `primitive` at `pose`
    pub fn project(&self, pose: &Coordinates, primitive: &MotionPrimitive) -> Coordinates {
        Coordinates::new(
            pose.x + primitive.delta.dx,
            pose.y + primitive.delta.dy,
            primitive.end_heading,
        )
    }

    /// Cost of traversing `primitive`, scaled by the neutral cost
    pub fn primitive_cost(&self, primitive: &MotionPrimitive) -> f64 {
        let direction = if primitive.reverse {
            self.costs.reverse_penalty
        } else {
            1.0
        };
        let heading_change = primitive.delta.dtheta.unsigned_abs() as f64 * self.bin_size;
        self.costs.neutral_cost
            * (primitive.arc_cost * direction + self.costs.change_penalty * heading_change)
    }
}

/// Single-writer cache that rebuilds the motion table when the library changes
pub struct MotionTableCache {
    loader: Box<dyn PrimitiveLoader + Send + Sync>,
    current: Option<Arc<LatticeMotionTable>>,
}

impl std::fmt::Debug for MotionTableCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionTableCache")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl Default for MotionTableCache {
    fn default() -> Self {
        Self::new(JsonPrimitiveLoader)
    }
}

impl MotionTableCache {
    pub fn new<L: PrimitiveLoader + Send + Sync + 'static>(loader: L) -> Self {
        Self {
            loader: Box::new(loader),
            current: None,
        }
    }

    /// Last published snapshot
    pub fn current(&self) -> Option<Arc<LatticeMotionTable>> {
        self.current.clone()
    }

    /// Library properties, without building primitive lists
    pub fn metadata(&self, lattice_filepath: &Path) -> LatticeResult<LatticeMetadata> {
        self.loader.metadata(lattice_filepath)
    }

    /// Build (or reuse) the table for `config.lattice_filepath`.
    ///
    /// The loader runs only when the library reference differs from the cached
    /// one. A failed build leaves the previous snapshot in place.
    pub fn build(
        &mut self,
        size_x: u32,
        config: &LatticeConfig,
    ) -> LatticeResult<Arc<LatticeMotionTable>> {
        config.motion_model.require_state_lattice()?;
        config.validate()?;
        let costs = config.traversal_costs();
        let path = config.lattice_filepath.as_path();

        if let Some(current) = self.current.as_ref() {
            if current.lattice_filepath.as_path() == path {
                if current.size_x() == size_x && current.costs == costs {
                    debug!(path = %path.display(), "motion table cache hit");
                    return Ok(Arc::clone(current));
                }
                debug!(
                    path = %path.display(),
                    size_x,
                    "reusing cached primitives for new grid width or costs"
                );
                let table = Arc::new(LatticeMotionTable::new(
                    path.to_path_buf(),
                    size_x,
                    Arc::clone(&current.primitives),
                    costs,
                ));
                self.current = Some(Arc::clone(&table));
                return Ok(table);
            }
        }

        let primitives = self.loader.load(path)?;
        info!(
            path = %path.display(),
            headings = primitives.num_angle_bins(),
            primitives = primitives.len(),
            size_x,
            "built lattice motion table"
        );
        let table = Arc::new(LatticeMotionTable::new(
            path.to_path_buf(),
            size_x,
            Arc::new(primitives),
            costs,
        ));
        self.current = Some(Arc::clone(&table));
        Ok(table)
    }
}
