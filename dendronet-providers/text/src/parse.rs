//! Whitespace-separated text formats.
//!
//! Matrices and linkage tables are one row per line with values separated by
//! runs of spaces or tabs. Per-node arrays may be laid out either as a single
//! column or a single row; both flatten to the same 1-D sequence.

use crate::errors::ParseError;

/// Parses a numeric table, one row per non-empty line.
///
/// Rows are returned as read; shape checks happen when the network is built.
/// `NaN` and `inf` tokens are accepted.
///
/// # Errors
/// Returns [`ParseError::InvalidNumber`] for the first token that is not a
/// number.
///
/// # Examples
/// ```
/// use dendronet_providers_text::parse_matrix;
///
/// let rows = parse_matrix("0 0.5\n\n  0.5   0\n").expect("numeric text");
/// assert_eq!(rows, vec![vec![0.0, 0.5], vec![0.5, 0.0]]);
/// ```
pub fn parse_matrix(text: &str) -> Result<Vec<Vec<f64>>, ParseError> {
    text.lines()
        .enumerate()
        .map(|(line, content)| parse_line(line + 1, content))
        .filter(|row| row.as_ref().map_or(true, |values| !values.is_empty()))
        .collect()
}

fn parse_line(line: usize, content: &str) -> Result<Vec<f64>, ParseError> {
    content
        .split_whitespace()
        .enumerate()
        .map(|(column, token)| {
            token.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                line,
                column: column + 1,
                token: token.to_owned(),
            })
        })
        .collect()
}

/// Parses a numeric per-node array laid out as a column or a row.
///
/// # Errors
/// Returns [`ParseError::InvalidNumber`] for the first token that is not a
/// number.
///
/// # Examples
/// ```
/// use dendronet_providers_text::parse_vector;
///
/// assert_eq!(parse_vector("1\n2\n3\n").expect("column"), vec![1.0, 2.0, 3.0]);
/// assert_eq!(parse_vector("1 2 3").expect("row"), vec![1.0, 2.0, 3.0]);
/// ```
pub fn parse_vector(text: &str) -> Result<Vec<f64>, ParseError> {
    Ok(parse_matrix(text)?.into_iter().flatten().collect())
}

/// Splits a per-node label array laid out as a column or a row.
///
/// # Examples
/// ```
/// use dendronet_providers_text::parse_strings;
///
/// assert_eq!(parse_strings("PCC\nACC\n"), vec!["PCC", "ACC"]);
/// assert_eq!(parse_strings("PCC  ACC"), vec!["PCC", "ACC"]);
/// ```
#[must_use]
pub fn parse_strings(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_owned).collect()
}
