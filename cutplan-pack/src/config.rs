use serde::{Deserialize, Serialize};

use cutplan::collision::DEFAULT_EPS;
use cutplan::freespace::DEFAULT_MIN_FRAGMENT;

/// Placement strategy used by the packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Minimize `(y, x)` of the chosen corner: compact, deterministic, cheap
    BottomLeft,
    /// Minimize leftover area in the consumed free rectangle: favors density
    BestFit,
    /// Large parts form a structural backbone, identical small parts are
    /// strip-cut into the remaining free space
    MixedSize,
}

/// How the packer decides which [`Strategy`] to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyMode {
    /// Pick per material group based on the part population: `MixedSize` when
    /// the largest/smallest part area ratio exceeds
    /// [`PackConfig::mixed_size_ratio`], `BestFit` otherwise
    Auto,
    Fixed(Strategy),
}

/// Configuration for the sheet packer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackConfig {
    pub strategy: StrategyMode,
    /// Tolerance absorbing floating-point drift at nominally-touching boundaries
    pub eps: f32,
    /// Leftover fragments narrower than this on either axis are discarded
    pub min_fragment: f32,
    /// Cap on placement attempts per sheet, the safeguard against runaway
    /// search on pathological inputs
    pub max_attempts_per_sheet: usize,
    /// Largest/smallest part area ratio above which `Auto` selects `MixedSize`
    pub mixed_size_ratio: f32,
    /// Attempt to empty a markedly underused trailing sheet after the main loop
    pub rebalance: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyMode::Auto,
            eps: DEFAULT_EPS,
            min_fragment: DEFAULT_MIN_FRAGMENT,
            max_attempts_per_sheet: 500,
            mixed_size_ratio: 2.5,
            rebalance: true,
        }
    }
}
