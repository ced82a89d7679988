//! Threshold policies deciding which matrix entries become edges.
//!
//! A policy is a pure function from a matrix and a parameter vector to a new
//! matrix of the same shape in which suppressed entries are `NaN`. The network
//! never assumes a particular policy; it only relies on that contract.

use std::{fmt, str::FromStr, sync::Arc};

use crate::matrix::Matrix;

/// Fraction of the per-row absolute maximum retained by
/// [`RowPercentileCutoff`] when no parameter is supplied.
pub const DEFAULT_ROW_FRACTION: f64 = 0.75;

/// Decides which entries of a matrix survive thresholding.
///
/// # Examples
/// ```
/// use dendronet_core::{AbsoluteCutoff, Matrix, ThresholdPolicy};
///
/// let matrix = Matrix::from_rows(vec![vec![0.0, 0.9], vec![0.9, 0.0]])
///     .expect("rows are square");
/// let kept = AbsoluteCutoff.apply(&matrix, &[0.5]);
/// assert!(kept.get(0, 0).is_some_and(f64::is_nan));
/// assert_eq!(kept.get(0, 1), Some(0.9));
/// ```
pub trait ThresholdPolicy: fmt::Debug + Send + Sync {
    /// Returns a short identifier for diagnostics.
    fn name(&self) -> &str;

    /// Returns the parameter vector used when the caller supplies none.
    fn default_params(&self) -> Vec<f64>;

    /// Returns one label per parameter, aligned with [`Self::default_params`].
    fn param_labels(&self) -> Vec<String>;

    /// Returns a new matrix in which suppressed entries are `NaN`.
    ///
    /// Missing parameters fall back to the policy's defaults.
    fn apply(&self, matrix: &Matrix, params: &[f64]) -> Matrix;
}

/// Suppresses entries whose magnitude is below a global cutoff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AbsoluteCutoff;

impl ThresholdPolicy for AbsoluteCutoff {
    fn name(&self) -> &str {
        ThresholdKind::Absolute.as_str()
    }

    fn default_params(&self) -> Vec<f64> {
        vec![0.0]
    }

    fn param_labels(&self) -> Vec<String> {
        vec!["cutoff".to_owned()]
    }

    fn apply(&self, matrix: &Matrix, params: &[f64]) -> Matrix {
        let cutoff = params.first().copied().unwrap_or(0.0);
        matrix.map_indexed(|_, _, value| keep_if(value, value.abs() >= cutoff))
    }
}

/// Suppresses entries below a fraction of their row's largest magnitude.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowPercentileCutoff;

impl ThresholdPolicy for RowPercentileCutoff {
    fn name(&self) -> &str {
        ThresholdKind::RowPercentile.as_str()
    }

    fn default_params(&self) -> Vec<f64> {
        vec![DEFAULT_ROW_FRACTION]
    }

    fn param_labels(&self) -> Vec<String> {
        vec!["fraction of row maximum".to_owned()]
    }

    fn apply(&self, matrix: &Matrix, params: &[f64]) -> Matrix {
        let fraction = params.first().copied().unwrap_or(DEFAULT_ROW_FRACTION);
        // `f64::max` ignores NaN, so rows of missing values yield a zero cutoff.
        let cutoffs: Vec<f64> = matrix
            .rows()
            .map(|row| row.iter().fold(0.0_f64, |acc, value| acc.max(value.abs())) * fraction)
            .collect();
        matrix.map_indexed(|row, _, value| {
            let cutoff = cutoffs.get(row).copied().unwrap_or(f64::INFINITY);
            keep_if(value, value.abs() >= cutoff)
        })
    }
}

/// Keeps an entry only when the wrapped policy keeps both `(i, j)` and
/// `(j, i)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Symmetric<P>(pub P);

impl<P: ThresholdPolicy> ThresholdPolicy for Symmetric<P> {
    fn name(&self) -> &str {
        match self.0.name() {
            name if name == ThresholdKind::RowPercentile.as_str() => {
                ThresholdKind::SymmetricRowPercentile.as_str()
            }
            _ => "symmetric",
        }
    }

    fn default_params(&self) -> Vec<f64> {
        self.0.default_params()
    }

    fn param_labels(&self) -> Vec<String> {
        self.0.param_labels()
    }

    fn apply(&self, matrix: &Matrix, params: &[f64]) -> Matrix {
        let inner = self.0.apply(matrix, params);
        matrix.map_indexed(|row, col, value| {
            let forward = inner.get(row, col).is_some_and(|v| !v.is_nan());
            let backward = inner.get(col, row).is_some_and(|v| !v.is_nan());
            keep_if(value, forward && backward)
        })
    }
}

fn keep_if(value: f64, keep: bool) -> f64 {
    if keep && !value.is_nan() {
        value
    } else {
        f64::NAN
    }
}

/// Named selection of the bundled threshold policies.
///
/// # Examples
/// ```
/// use dendronet_core::ThresholdKind;
///
/// let kind: ThresholdKind = "row-percentile".parse().expect("known policy");
/// assert_eq!(kind, ThresholdKind::RowPercentile);
/// assert_eq!(kind.policy().default_params(), vec![0.75]);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ThresholdKind {
    /// [`AbsoluteCutoff`].
    Absolute,
    /// [`RowPercentileCutoff`].
    RowPercentile,
    /// [`Symmetric`] wrapping [`RowPercentileCutoff`].
    SymmetricRowPercentile,
}

impl ThresholdKind {
    /// Every bundled policy, in declaration order.
    pub const ALL: [Self; 3] = [
        Self::Absolute,
        Self::RowPercentile,
        Self::SymmetricRowPercentile,
    ];

    /// Returns the stable identifier used in manifests and on the CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::RowPercentile => "row-percentile",
            Self::SymmetricRowPercentile => "symmetric-row-percentile",
        }
    }

    /// Instantiates the policy.
    #[must_use]
    pub fn policy(self) -> Arc<dyn ThresholdPolicy> {
        match self {
            Self::Absolute => Arc::new(AbsoluteCutoff),
            Self::RowPercentile => Arc::new(RowPercentileCutoff),
            Self::SymmetricRowPercentile => Arc::new(Symmetric(RowPercentileCutoff)),
        }
    }
}

impl fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`ThresholdKind`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown threshold policy `{0}`; expected one of absolute, row-percentile, symmetric-row-percentile")]
pub struct UnknownThresholdKind(pub String);

impl FromStr for ThresholdKind {
    type Err = UnknownThresholdKind;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalised = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalised)
            .ok_or_else(|| UnknownThresholdKind(raw.to_owned()))
    }
}
