//! Hierarchical-clustering linkage tables.
//!
//! A linkage table records the merge history of an agglomerative clustering.
//! Each row merges two earlier clusters at a given height. References are
//! 1-indexed: values up to the leaf count name leaves, larger values name the
//! `(ref - leaf_count)`-th earlier merge row.

use crate::error::{NetworkError, Result};

/// One merge of a linkage table, with references kept 1-indexed as supplied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkageRow {
    /// Reference to the left cluster.
    pub left: usize,
    /// Reference to the right cluster.
    pub right: usize,
    /// Merge height.
    pub distance: f64,
}

/// Validated linkage table.
///
/// # Examples
/// ```
/// use dendronet_core::Linkage;
///
/// let linkage = Linkage::try_from_rows(vec![vec![1.0, 2.0, 0.1], vec![3.0, 4.0, 0.3]])
///     .expect("rows are well formed");
/// assert_eq!(linkage.len(), 2);
/// assert_eq!(linkage.rows()[1].left, 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Linkage {
    rows: Vec<LinkageRow>,
}

impl Linkage {
    /// Wraps rows that have already been decoded.
    #[must_use]
    pub fn new(rows: Vec<LinkageRow>) -> Self {
        Self { rows }
    }

    /// Decodes numeric rows of the form `[left, right, distance]`.
    ///
    /// # Errors
    /// Returns [`NetworkError::MalformedLinkage`] when a row does not have
    /// exactly three columns, a reference is not a positive integer, or the
    /// distance is `NaN`.
    pub fn try_from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        rows.into_iter()
            .enumerate()
            .map(|(index, row)| decode_row(index, &row))
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    /// Returns the merges in table order.
    #[must_use]
    pub fn rows(&self) -> &[LinkageRow] {
        &self.rows
    }

    /// Returns the number of merges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the table records no merges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn decode_row(index: usize, row: &[f64]) -> Result<LinkageRow> {
    let [left, right, distance] = row else {
        let hint = if row.len() == 4 {
            "; drop the cluster-size column of scipy-style output"
        } else {
            ""
        };
        return Err(NetworkError::linkage(
            index,
            format!(
                "expected 3 columns (left, right, distance), found {}{hint}",
                row.len()
            ),
        ));
    };
    if distance.is_nan() {
        return Err(NetworkError::linkage(index, "distance is NaN"));
    }
    Ok(LinkageRow {
        left: decode_ref(index, *left)?,
        right: decode_ref(index, *right)?,
        distance: *distance,
    })
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    reason = "value is checked to be a positive integer within usize range"
)]
fn decode_ref(index: usize, raw: f64) -> Result<usize> {
    if !raw.is_finite() || raw.fract() != 0.0 || raw < 1.0 || raw > usize::MAX as f64 {
        return Err(NetworkError::linkage(
            index,
            format!("reference {raw} is not a positive integer"),
        ));
    }
    Ok(raw as usize)
}
