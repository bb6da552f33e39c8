//! Statistics kernel.
//!
//! Slice-level building blocks that know nothing about records or columns: sorted percentile
//! views, Tukey fences and least squares.


pub mod regression;
pub mod univariate;

mod float;

pub use self::float::Float;

fn dot<A>(xs: &[A], ys: &[A]) -> A
where
    A: Float,
{
    xs.iter()
        .zip(ys)
        .fold(A::cast(0), |acc, (&x, &y)| acc + x * y)
}

fn sum<A>(xs: &[A]) -> A
where
    A: Float,
{
    use std::ops::Add;

    xs.iter().cloned().fold(A::cast(0), Add::add)
}
