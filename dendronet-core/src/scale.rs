//! Weight ranges used to scale edge colour and width.

use crate::graph::Edge;

/// Extremes of one matrix's weights over a set of edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightRange {
    /// Smallest weight.
    pub min: f64,
    /// Largest weight.
    pub max: f64,
    /// Smallest magnitude.
    pub abs_min: f64,
    /// Largest magnitude.
    pub abs_max: f64,
}

impl WeightRange {
    /// Summarises `values`, skipping `NaN`. Returns `None` when nothing
    /// remains.
    ///
    /// # Examples
    /// ```
    /// use dendronet_core::WeightRange;
    ///
    /// let range = WeightRange::over([0.5, -2.0, f64::NAN, 1.0]).expect("finite values");
    /// assert_eq!((range.min, range.max), (-2.0, 1.0));
    /// assert_eq!((range.abs_min, range.abs_max), (0.5, 2.0));
    /// assert!(WeightRange::over([f64::NAN]).is_none());
    /// ```
    pub fn over(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|value| !value.is_nan())
            .fold(None, |acc: Option<Self>, value| {
                let abs = value.abs();
                Some(match acc {
                    None => Self {
                        min: value,
                        max: value,
                        abs_min: abs,
                        abs_max: abs,
                    },
                    Some(range) => Self {
                        min: range.min.min(value),
                        max: range.max.max(value),
                        abs_min: range.abs_min.min(abs),
                        abs_max: range.abs_max.max(abs),
                    },
                })
            })
    }
}

/// Computes one [`WeightRange`] per matrix over `edges`.
pub(crate) fn weight_stats(edges: &[Edge], matrix_count: usize) -> Vec<Option<WeightRange>> {
    (0..matrix_count)
        .map(|matrix| WeightRange::over(edges.iter().filter_map(|edge| edge.weight(matrix))))
        .collect()
}

/// Colour and width scaling shared by a network and every sub-network
/// extracted from it.
///
/// Ranges are captured once, from the edges present when the top-level network
/// is first built, so related views use the same scale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScaleConfig {
    ranges: Vec<Option<WeightRange>>,
}

impl ScaleConfig {
    /// Wraps precomputed per-matrix ranges.
    #[must_use]
    pub fn new(ranges: Vec<Option<WeightRange>>) -> Self {
        Self { ranges }
    }

    pub(crate) fn from_edges(edges: &[Edge], matrix_count: usize) -> Self {
        Self::new(weight_stats(edges, matrix_count))
    }

    /// Returns the range for matrix `matrix`; `None` when the index is out of
    /// bounds or the matrix had no edges.
    #[must_use]
    pub fn range(&self, matrix: usize) -> Option<WeightRange> {
        self.ranges.get(matrix).copied().flatten()
    }

    /// Returns every per-matrix range.
    #[must_use]
    pub fn ranges(&self) -> &[Option<WeightRange>] {
        &self.ranges
    }
}
