//! Tukey's method
//!
//! The original method uses two "fences" to classify the data. All the observations "inside" the
//! fences are considered "normal", and the rest are considered outliers.
//!
//! The fences are computed from the quartiles of the sample, according to the following formula:
//!
//! ``` ignore
//! // q1, q3 are the first and third quartiles
//! let iqr = q3 - q1;  // The interquartile range
//! let (f1, f2) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);  // the "fences"
//!
//! let is_outlier = |x| x < f1 || x > f2;
//! ```
//!
//! The classifier provided here adds two extra outer fences:
//!
//! ``` ignore
//! let (f3, f4) = (q1 - 3 * iqr, q3 + 3 * iqr);  // the outer "fences"
//! ```
//!
//! Data points outside of the outer fences are "severe" outliers, points outside the inner fences
//! are "mild" outliers, and everything inside the inner fences is "normal" data. The inner fences
//! are the lower and upper bounds the record filter works with.
//!
//! ``` ignore
//!          LOW-ish                NORMAL-ish                 HIGH-ish
//!         x   |       +    |  o o  o    o   o o  o  |        +   |   x
//!             f3           f1                       f2           f4
//!
//! Legend:
//! o: "normal" data (not an outlier)
//! +: "mild" outlier
//! x: "severe" outlier
//! ```

use std::slice;

use crate::stats::float::Float;
use crate::stats::univariate::Sample;

use self::Label::*;

/// The four fences of Tukey's method, from lowest to highest
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fences<A>
where
    A: Float,
{
    /// `q1 - 3 * iqr`
    pub low_severe: A,
    /// `q1 - 1.5 * iqr`
    pub low_mild: A,
    /// `q3 + 1.5 * iqr`
    pub high_mild: A,
    /// `q3 + 3 * iqr`
    pub high_severe: A,
}

impl<A> Fences<A>
where
    A: Float,
{
    /// Builds the fences from the first and third quartiles
    pub fn from_quartiles(q1: A, q3: A) -> Fences<A> {
        let iqr = q3 - q1;

        // Mild
        let k_m = A::cast(1.5_f32);
        // Severe
        let k_s = A::cast(3);

        Fences {
            low_severe: q1 - k_s * iqr,
            low_mild: q1 - k_m * iqr,
            high_mild: q3 + k_m * iqr,
            high_severe: q3 + k_s * iqr,
        }
    }

    /// Labels a single data point
    pub fn label(&self, x: A) -> Label {
        if x < self.low_severe {
            LowSevere
        } else if x > self.high_severe {
            HighSevere
        } else if x < self.low_mild {
            LowMild
        } else if x > self.high_mild {
            HighMild
        } else {
            NotAnOutlier
        }
    }
}

/// A classified/labeled sample.
///
/// The order of the data points is retained.
#[derive(Clone, Copy)]
pub struct LabeledSample<'a, A>
where
    A: Float,
{
    fences: Fences<A>,
    sample: &'a Sample<A>,
}

/// Number of data points per label
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    pub low_severe: usize,
    pub low_mild: usize,
    pub not_an_outlier: usize,
    pub high_mild: usize,
    pub high_severe: usize,
}

impl<'a, A> LabeledSample<'a, A>
where
    A: Float,
{
    /// Labels `sample` against already computed `fences`
    pub fn new(sample: &'a Sample<A>, fences: Fences<A>) -> LabeledSample<'a, A> {
        LabeledSample { fences, sample }
    }

    /// Returns the number of data points per label
    ///
    /// - Time: `O(length)`
    pub fn count(&self) -> Counts {
        let mut counts = Counts::default();

        for (_, label) in self {
            match label {
                LowSevere => counts.low_severe += 1,
                LowMild => counts.low_mild += 1,
                NotAnOutlier => counts.not_an_outlier += 1,
                HighMild => counts.high_mild += 1,
                HighSevere => counts.high_severe += 1,
            }
        }

        counts
    }

    /// Returns an iterator over the labeled data
    pub fn iter(&self) -> Iter<'a, A> {
        Iter {
            fences: self.fences,
            iter: self.sample.iter(),
        }
    }
}

impl<'a, A> IntoIterator for &LabeledSample<'a, A>
where
    A: Float,
{
    type Item = (A, Label);
    type IntoIter = Iter<'a, A>;

    fn into_iter(self) -> Iter<'a, A> {
        self.iter()
    }
}

/// Iterator over the labeled data
pub struct Iter<'a, A>
where
    A: Float,
{
    fences: Fences<A>,
    iter: slice::Iter<'a, A>,
}

impl<'a, A> Iterator for Iter<'a, A>
where
    A: Float,
{
    type Item = (A, Label);

    fn next(&mut self) -> Option<(A, Label)> {
        let fences = self.fences;

        self.iter.next().map(|&x| (x, fences.label(x)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Labels used to classify outliers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label {
    /// A "mild" outlier in the "high" spectrum
    HighMild,
    /// A "severe" outlier in the "high" spectrum
    HighSevere,
    /// A "mild" outlier in the "low" spectrum
    LowMild,
    /// A "severe" outlier in the "low" spectrum
    LowSevere,
    /// A normal data point
    NotAnOutlier,
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::{Fences, Label, LabeledSample};
    use crate::stats::univariate::Sample;

    fn label(v: &[f64]) -> (Fences<f64>, Vec<Label>, super::Counts) {
        let sample = Sample::new(v);
        let (q1, _, q3) = sample.percentiles().quartiles();
        let labeled = LabeledSample::new(sample, Fences::from_quartiles(q1, q3));

        (
            Fences::from_quartiles(q1, q3),
            labeled.iter().map(|(_, label)| label).collect(),
            labeled.count(),
        )
    }

    #[test]
    fn fences_and_labels() {
        // q1 = 2, q3 = 6, iqr = 4
        let v = [-20.0_f64, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 13.0, 40.0];
        let (fences, labels, counts) = label(&v);

        assert_relative_eq!(fences.low_mild, -4.0);
        assert_relative_eq!(fences.low_severe, -10.0);
        assert_relative_eq!(fences.high_mild, 12.0);
        assert_relative_eq!(fences.high_severe, 18.0);

        assert_eq!(labels[0], Label::LowSevere);
        assert_eq!(labels[7], Label::HighMild);
        assert_eq!(labels[8], Label::HighSevere);
        assert!(labels[1..7].iter().all(|&l| l == Label::NotAnOutlier));

        assert_eq!(counts.low_severe, 1);
        assert_eq!(counts.low_mild, 0);
        assert_eq!(counts.high_mild, 1);
        assert_eq!(counts.high_severe, 1);
        assert_eq!(counts.not_an_outlier, 6);
    }

    #[test]
    fn points_on_a_fence_are_normal() {
        // q1 = 3, q3 = 7, iqr = 4, inner fences at -3 and 13
        let v = [13.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, -3.0];
        let (_, _, counts) = label(&v);

        assert_eq!(counts.not_an_outlier, 9);
    }
}
