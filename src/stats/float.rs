//! Float trait

use cast::From;
use num_traits::float;

/// Floating point type the statistics kernel is generic over.
///
/// Extends `num_traits::float::Float` with infallible casts from `usize` and `f32`, which the
/// percentile and fence arithmetic needs for its constants.
pub trait Float:
    float::Float + From<usize, Output = Self> + From<f32, Output = Self> + Sync + Send
{
}

impl Float for f32 {}
impl Float for f64 {}
