//! Common types used throughout lattice_planning

/// Lattice coordinates
///
/// `x` and `y` are in (possibly fractional) grid cells, `theta` is a heading
/// bin in `[0, num_angle_bins)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub theta: u32,
}

impl Coordinates {
    pub fn new(x: f64, y: f64, theta: u32) -> Self {
        Self { x, y, theta }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, theta: 0 }
    }

    /// Continuous pose with the heading bin expanded to radians
    pub fn to_pose(&self, bin_size: f64) -> Pose2D {
        Pose2D::new(self.x, self.y, self.theta as f64 * bin_size)
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::origin()
    }
}

/// Displacement produced by one motion primitive, as a world-frame cell
/// offset. The library stores one set of deltas per start heading, so the
/// heading is already applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseDelta {
    pub dx: f64,
    pub dy: f64,
    /// Signed heading change in bins
    pub dtheta: i32,
}

impl PoseDelta {
    pub fn new(dx: f64, dy: f64, dtheta: i32) -> Self {
        Self { dx, dy, dtheta }
    }
}

/// 2D pose (position + orientation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }
}

/// (cos, sin) of one heading bin
pub type TrigValues = (f64, f64);
