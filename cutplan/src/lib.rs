//! Core engine for kerf-aware rectangular cutting and packing on sheet materials.

/// Kerf-aware collision detection between placements
pub mod collision;

/// Entities to model stock sheets, part demands and placements
pub mod entities;

/// Per-sheet free-rectangle bookkeeping
pub mod freespace;

/// Geometric primitives
pub mod geometry;

/// Grain-direction constraint resolution
pub mod grain;

/// Helper functions which do not belong to any specific module
pub mod util;
