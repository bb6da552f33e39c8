use std::{mem, ops};

use crate::stats::float::Float;
use crate::stats::univariate::Percentiles;

/// A collection of data points drawn from a population
///
/// Invariants:
///
/// - The sample contains at least 2 data points
/// - The sample contains no `NaN`s
#[repr(transparent)]
pub struct Sample<A>([A]);

impl<A> Sample<A>
where
    A: Float,
{
    /// Creates a new sample from an existing slice
    ///
    /// # Panics
    ///
    /// Panics if `slice` contains any `NaN` or if `slice` has less than two elements
    #[allow(clippy::new_ret_no_self)]
    pub fn new(slice: &[A]) -> &Sample<A> {
        assert!(Sample::is_valid(slice));

        unsafe { mem::transmute(slice) }
    }

    /// Creates a new sample from an existing slice, or returns `None` if the slice breaks one
    /// of the invariants
    pub fn try_new(slice: &[A]) -> Option<&Sample<A>> {
        if Sample::is_valid(slice) {
            Some(unsafe { mem::transmute(slice) })
        } else {
            None
        }
    }

    fn is_valid(slice: &[A]) -> bool {
        slice.len() > 1 && slice.iter().all(|x| !x.is_nan())
    }

    /// Returns the biggest element in the sample
    ///
    /// - Time: `O(length)`
    pub fn max(&self) -> A {
        let mut elems = self.iter();

        match elems.next() {
            Some(&head) => elems.fold(head, |a, &b| a.max(b)),
            // NB `unreachable!` because `Sample` is guaranteed to have at least one data point
            None => unreachable!(),
        }
    }

    /// Returns the arithmetic average of the sample
    ///
    /// - Time: `O(length)`
    pub fn mean(&self) -> A {
        let n = self.len();

        self.sum() / A::cast(n)
    }

    /// Returns the smallest element in the sample
    ///
    /// - Time: `O(length)`
    pub fn min(&self) -> A {
        let mut elems = self.iter();

        match elems.next() {
            Some(&elem) => elems.fold(elem, |a, &b| a.min(b)),
            // NB `unreachable!` because `Sample` is guaranteed to have at least one data point
            None => unreachable!(),
        }
    }

    /// Returns a "view" into the percentiles of the sample
    ///
    /// This "view" makes consecutive computations of percentiles much faster (`O(1)`)
    ///
    /// - Time: `O(N log N) where N = length`
    /// - Memory: `O(length)`
    pub fn percentiles(&self) -> Percentiles<A>
    where
        usize: cast::From<A, Output = Result<usize, cast::Error>>,
    {
        use std::cmp::Ordering;

        // NB This function assumes that there are no `NaN`s in the sample
        fn cmp<T>(a: &T, b: &T) -> Ordering
        where
            T: PartialOrd,
        {
            match a.partial_cmp(b) {
                Some(o) => o,
                // Arbitrary way to handle NaNs that should never happen
                None => Ordering::Equal,
            }
        }

        let mut v = self.to_vec().into_boxed_slice();
        v.sort_unstable_by(cmp);

        Percentiles::from_sorted(v)
    }

    /// Returns the standard deviation of the sample
    ///
    /// The `mean` can be optionally passed along to speed up (2X) the computation
    ///
    /// - Time: `O(length)`
    pub fn std_dev(&self, mean: Option<A>) -> A {
        self.var(mean).sqrt()
    }

    /// Returns the sum of all the elements of the sample
    ///
    /// - Time: `O(length)`
    pub fn sum(&self) -> A {
        crate::stats::sum(self)
    }

    /// Returns the variance of the sample (`n - 1` denominator)
    ///
    /// The `mean` can be optionally passed along to speed up (2X) the computation
    ///
    /// - Time: `O(length)`
    pub fn var(&self, mean: Option<A>) -> A {
        use std::ops::Add;

        let mean = mean.unwrap_or_else(|| self.mean());
        let slice = self;

        let sum = slice
            .iter()
            .map(|&x| (x - mean).powi(2))
            .fold(A::cast(0), Add::add);

        sum / A::cast(slice.len() - 1)
    }

    #[cfg(test)]
    pub fn iqr(&self) -> A
    where
        usize: cast::From<A, Output = Result<usize, cast::Error>>,
    {
        self.percentiles().iqr()
    }

    #[cfg(test)]
    pub fn median(&self) -> A
    where
        usize: cast::From<A, Output = Result<usize, cast::Error>>,
    {
        self.percentiles().median()
    }
}

impl<A> ops::Deref for Sample<A> {
    type Target = [A];

    fn deref(&self) -> &[A] {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use quickcheck::{quickcheck, TestResult};

    use crate::stats::univariate::Sample;

    #[test]
    fn rejects_short_and_nan_slices() {
        assert!(Sample::<f64>::try_new(&[]).is_none());
        assert!(Sample::try_new(&[1.0_f64]).is_none());
        assert!(Sample::try_new(&[1.0, f64::NAN]).is_none());
        assert!(Sample::try_new(&[1.0_f64, 2.0]).is_some());
    }

    #[test]
    fn moments() {
        let sample = Sample::new(&[2.0_f64, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);

        assert_relative_eq!(sample.mean(), 5.0);
        assert_relative_eq!(sample.var(None), 32.0 / 7.0);
        assert_relative_eq!(sample.std_dev(Some(5.0)), (32.0_f64 / 7.0).sqrt());
        assert_relative_eq!(sample.min(), 2.0);
        assert_relative_eq!(sample.max(), 9.0);
        assert_relative_eq!(sample.median(), 4.5);
        assert_relative_eq!(sample.iqr(), 5.5 - 4.0);
    }

    quickcheck! {
        fn min_max_bracket_the_mean(size: u8, start: u8) -> TestResult {
            let size = size as usize;
            let start = start as usize;
            if let Some(v) = crate::stats::test::vec::<f64>(size, start) {
                let sample = Sample::new(&v[start..]);
                let mean = sample.mean();

                TestResult::from_bool(sample.min() <= mean + 1e-12 && mean <= sample.max() + 1e-12)
            } else {
                TestResult::discard()
            }
        }
    }
}
