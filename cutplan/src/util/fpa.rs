use std::cmp::Ordering;
use std::fmt::Display;

///Wrapper around the [`float_cmp::approx_eq!()`] macro for easy comparison of floats with a certain tolerance.
///Two FPAs are considered equal if they are within [`FPA::TOLERANCE`] of each other,
///or within a few ulps at magnitudes where the absolute slack is too coarse.
#[derive(Debug, Clone, Copy)]
pub struct FPA(pub f32);

impl FPA {
    /// Absolute comparison slack for sheet coordinates, areas and thicknesses.
    /// Finer than the collision epsilon, so FPA equality never masks a
    /// separation the collision detector would still accept.
    pub const TOLERANCE: f32 = 1e-3;
}

impl<T> From<T> for FPA
where
    T: Into<f32>,
{
    fn from(n: T) -> Self {
        FPA(n.into())
    }
}

impl PartialEq<Self> for FPA {
    fn eq(&self, other: &Self) -> bool {
        float_cmp::approx_eq!(f32, self.0, other.0, epsilon = Self::TOLERANCE, ulps = 4)
    }
}

impl PartialOrd<Self> for FPA {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.eq(other) {
            true => Some(Ordering::Equal),
            false => self.0.partial_cmp(&other.0),
        }
    }
}

impl Display for FPA {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
