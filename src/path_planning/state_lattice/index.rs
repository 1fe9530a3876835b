//! Flat indexing of lattice states
//!
//! A state (x, y, heading bin) maps to `theta + x * bins + y * width * bins`,
//! so headings of one cell are contiguous and rows follow each other.

/// Flat index of a lattice state
pub type NodeIndex = usize;

/// Encoder/decoder between lattice states and flat indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticeIndexer {
    size_x: u32,
    num_angle_bins: u32,
}

impl LatticeIndexer {
    pub fn new(size_x: u32, num_angle_bins: u32) -> Self {
        assert!(size_x > 0, "grid width must be positive");
        assert!(num_angle_bins > 0, "number of heading bins must be positive");
        Self {
            size_x,
            num_angle_bins,
        }
    }

    pub fn size_x(&self) -> u32 {
        self.size_x
    }

    pub fn num_angle_bins(&self) -> u32 {
        self.num_angle_bins
    }

    /// Index of (x, y, theta). Out-of-range x or theta is a caller error.
    pub fn index(&self, x: u32, y: u32, theta: u32) -> NodeIndex {
        assert!(
            theta < self.num_angle_bins,
            "heading bin {} out of range [0, {})",
            theta,
            self.num_angle_bins
        );
        assert!(
            x < self.size_x,
            "x {} out of range [0, {})",
            x,
            self.size_x
        );
        let bins = self.num_angle_bins as NodeIndex;
        theta as NodeIndex + x as NodeIndex * bins + y as NodeIndex * self.size_x as NodeIndex * bins
    }

    /// Inverse of [`LatticeIndexer::index`]
    pub fn decode(&self, index: NodeIndex) -> (u32, u32, u32) {
        let bins = self.num_angle_bins as NodeIndex;
        let row = self.size_x as NodeIndex * bins;
        let y = index / row;
        assert!(
            y <= u32::MAX as NodeIndex,
            "index {} exceeds lattice extent",
            index
        );
        let theta = index % bins;
        let x = (index / bins) % self.size_x as NodeIndex;
        (x as u32, y as u32, theta as u32)
    }
}
