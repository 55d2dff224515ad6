//! Constants for lattice geometry, mesh algorithms, and game parameters.
//!
//! This module contains all the configuration constants for the board builder
//! and the rules engine. The lattice is addressed with axial hex coordinates
//! (q, r); the implicit third coordinate is s = -q - r.

// =============================================================================
// Lattice Geometry
// =============================================================================

/// Default hex disk radius in lattice rings.
pub const DEFAULT_RADIUS: i32 = 4;

/// Distance between adjacent lattice vertices, in board units.
pub const SPACING: f64 = 40.0;

/// sqrt(3), used when projecting axial coordinates to the plane.
pub const SQRT3: f64 = 1.732_050_807_568_877_2;

/// The 6 axial neighbor directions, in counterclockwise circular order.
/// Consecutive entries are 60 degrees apart, so the pair (i, i+1) spans
/// exactly one lattice triangle.
pub const AXIAL_DIRS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

// =============================================================================
// Symmetry
// =============================================================================

/// cos(120 degrees), for rotating displacement vectors onto orbit peers.
pub const COS_120: f64 = -0.5;

/// sin(120 degrees).
pub const SIN_120: f64 = 0.866_025_403_784_438_6;

// =============================================================================
// Quadrangulation
// =============================================================================

/// Maximum number of shuffled merge passes before the pipeline reverts
/// and reports failure.
pub const MERGE_RETRIES: usize = 12;

/// Maximum deadlock-breaking merges attempted per stalled pass, found by
/// exhaustive pairwise scan rather than the matching heuristic.
pub const MERGE_FALLBACK_CAP: usize = 4;

// =============================================================================
// Relaxation
// =============================================================================

/// Fraction of the offset toward the area-weighted centroid target applied
/// per iteration. Small relative to SPACING so convergence stays animatable.
pub const RELAX_STRENGTH: f64 = 0.002;

/// Lower bound of the acceptable quad area band, relative to the mean area.
/// Used only by the deviation-band relaxation strategy.
pub const AREA_BAND_LOW: f64 = 0.8;

/// Upper bound of the acceptable quad area band, relative to the mean area.
pub const AREA_BAND_HIGH: f64 = 1.25;

/// Fixed step, in board units, applied by the deviation-band strategy.
pub const AREA_BAND_STEP: f64 = 0.05;

// =============================================================================
// Game
// =============================================================================

/// Komi (compensation points for White) under area scoring.
pub const KOMI: f32 = 7.5;

// =============================================================================
// Persistence
// =============================================================================

/// Version tag written into saved mesh files.
pub const MESH_FORMAT_VERSION: u32 = 1;
